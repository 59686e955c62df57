use crate::domain::condition::Condition;
use crate::domain::ids::PatternId;

/// Shape of a rule (or of one of its structural children).
///
/// A shape without children is a leaf: it is satisfied by its condition alone.
/// A shape with children additionally requires the port's input signals to
/// satisfy the children position by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternShape {
    pub condition: Condition,
    pub children: Vec<PatternShape>,
    /// Pattern for inputs beyond the listed children.
    pub catch_all: Option<Box<PatternShape>>,
    /// Require the port's input arity to equal the number of children.
    pub exact: bool,
    /// Require children to line up with inputs in order.
    pub ordered: bool,
    /// Capture-group label attached to this level.
    pub group: Option<String>,
}

impl PatternShape {
    pub fn new(condition: Condition) -> Self {
        Self {
            condition,
            children: Vec::new(),
            catch_all: None,
            exact: true,
            ordered: true,
            group: None,
        }
    }

    pub fn with_children(mut self, children: Vec<PatternShape>) -> Self {
        self.children = children;
        self
    }

    pub fn with_catch_all(mut self, catch_all: PatternShape) -> Self {
        self.catch_all = Some(Box::new(catch_all));
        self
    }

    pub fn with_group(mut self, label: impl Into<String>) -> Self {
        self.group = Some(label.into());
        self
    }

    pub fn unordered(mut self) -> Self {
        self.ordered = false;
        self
    }

    pub fn inexact(mut self) -> Self {
        self.exact = false;
        self
    }

    /// True when matching has to descend into the port's inputs.
    pub fn is_tree(&self) -> bool {
        !self.children.is_empty() || self.catch_all.is_some()
    }
}

/// A named rule registered with the discrimination network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub id: PatternId,
    pub shape: PatternShape,
}

impl Pattern {
    pub fn new(id: impl Into<PatternId>, shape: PatternShape) -> Self {
        Self {
            id: id.into(),
            shape,
        }
    }

    pub fn leaf(id: impl Into<PatternId>, condition: Condition) -> Self {
        Self::new(id, PatternShape::new(condition))
    }

    pub fn tree(
        id: impl Into<PatternId>,
        condition: Condition,
        children: Vec<PatternShape>,
    ) -> Self {
        Self::new(id, PatternShape::new(condition).with_children(children))
    }

    pub fn with_group(mut self, label: impl Into<String>) -> Self {
        self.shape.group = Some(label.into());
        self
    }
}
