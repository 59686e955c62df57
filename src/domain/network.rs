//! Discrimination network: patterns with equal condition prefixes share nodes.
//!
//! The network is a tree of [`CoalescedTreeNode`]s rooted at an always-true
//! node. Each node carries one condition and two axes:
//!
//! - the **condition axis**: further conditions tested against the same
//!   `(signal, port)` pair (an `AND` chain walks down this axis);
//! - the **pattern axis**: structural groups whose positions are matched
//!   against the port's input signals and their drivers.
//!
//! A failing condition prunes its whole subtree, so a prefix shared by many
//! patterns is evaluated once per query.

use crate::domain::condition::{Condition, ConditionKind};
use crate::domain::error::{MatchError, NotFound};
use crate::domain::ids::{PatternId, PortId, SignalId};
use crate::domain::matching::{Capture, Match, MatchCollection};
use crate::domain::pattern::{Pattern, PatternShape};
use crate::domain::ports::GraphView;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct CoalescedTreeNode {
    condition: Condition,
    subscriptions: Vec<PatternId>,
    groups: BTreeMap<PatternId, String>,
    condition_axis: Vec<CoalescedTreeNode>,
    pattern_axis: Vec<CoalescedChildPattern>,
}

/// Structural group: one sub-tree per input position of the port.
#[derive(Debug, Clone)]
pub struct CoalescedChildPattern {
    exact: bool,
    ordered: bool,
    positions: Vec<CoalescedTreeNode>,
    catch_all: Option<Box<CoalescedTreeNode>>,
}

type Terminal<'a> = &'a mut dyn FnMut(&mut CoalescedTreeNode);

// Only an AND chain splits into nodes: walking the chain sums to the same
// score along a single path. An AND carrying a custom score stays atomic.
fn decomposes(condition: &Condition) -> bool {
    match &condition.kind {
        ConditionKind::And(ops) => ops.iter().map(|c| c.score).sum::<u32>() == condition.score,
        _ => false,
    }
}

impl CoalescedTreeNode {
    pub fn new(condition: Condition) -> Self {
        Self {
            condition,
            ..Self::default()
        }
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Pattern ids satisfied as soon as this node's condition holds.
    pub fn subscriptions(&self) -> &[PatternId] {
        &self.subscriptions
    }

    pub fn group_labels(&self) -> &BTreeMap<PatternId, String> {
        &self.groups
    }

    pub fn condition_axis(&self) -> &[CoalescedTreeNode] {
        &self.condition_axis
    }

    pub fn pattern_axis(&self) -> &[CoalescedChildPattern] {
        &self.pattern_axis
    }

    /// Number of nodes in this subtree, structural positions included.
    pub fn node_count(&self) -> usize {
        1 + self
            .condition_axis
            .iter()
            .map(CoalescedTreeNode::node_count)
            .sum::<usize>()
            + self
                .pattern_axis
                .iter()
                .map(CoalescedChildPattern::node_count)
                .sum::<usize>()
    }

    // ------------------------------------------------------------------
    // Compilation
    // ------------------------------------------------------------------

    fn merge_shape(&mut self, id: &PatternId, shape: &PatternShape) {
        Self::merge_condition(self, &shape.condition, &mut |node: &mut CoalescedTreeNode| {
            node.subscribe(id, shape)
        });
    }

    fn merge_condition(node: &mut Self, condition: &Condition, at_terminal: Terminal<'_>) {
        match &condition.kind {
            ConditionKind::AlwaysTrue => at_terminal(node),
            ConditionKind::And(ops) if decomposes(condition) => {
                Self::merge_chain(node, ops, at_terminal)
            }
            _ => at_terminal(node.child_for(condition)),
        }
    }

    fn merge_chain(node: &mut Self, ops: &[Condition], at_terminal: Terminal<'_>) {
        match ops.split_first() {
            None => at_terminal(node),
            Some((first, rest)) => {
                Self::merge_condition(node, first, &mut |next: &mut CoalescedTreeNode| {
                    Self::merge_chain(next, rest, &mut *at_terminal)
                })
            }
        }
    }

    fn child_for(&mut self, condition: &Condition) -> &mut Self {
        let position = match self.condition_axis.iter().position(|c| c.condition == *condition) {
            Some(position) => position,
            None => {
                self.condition_axis.push(Self::new(condition.clone()));
                self.condition_axis.len() - 1
            }
        };
        &mut self.condition_axis[position]
    }

    fn subscribe(&mut self, id: &PatternId, shape: &PatternShape) {
        if shape.is_tree() {
            self.group_for(shape).merge(id, shape);
        } else if !self.subscriptions.contains(id) {
            self.subscriptions.push(id.clone());
        }
        if let Some(label) = &shape.group {
            self.groups.insert(id.clone(), label.clone());
        }
    }

    fn group_for(&mut self, shape: &PatternShape) -> &mut CoalescedChildPattern {
        let position = self.pattern_axis.iter().position(|g| g.accepts(shape));
        let position = match position {
            Some(position) => position,
            None => {
                self.pattern_axis.push(CoalescedChildPattern::for_shape(shape));
                self.pattern_axis.len() - 1
            }
        };
        &mut self.pattern_axis[position]
    }

    // ------------------------------------------------------------------
    // Matching
    // ------------------------------------------------------------------

    /// Every pattern satisfied below this node, with accumulated scores.
    pub fn match_all(
        &self,
        view: &dyn GraphView,
        signal: SignalId,
        port: Option<PortId>,
        inherited: u32,
    ) -> Result<MatchCollection, MatchError> {
        if !self.condition.fulfills(view, signal, port) {
            return Ok(MatchCollection::new());
        }
        let score = inherited + self.condition.score;

        let mut parts = Vec::with_capacity(self.condition_axis.len() + self.pattern_axis.len());
        for child in &self.condition_axis {
            parts.push(child.match_all(view, signal, port, score)?);
        }
        for group in &self.pattern_axis {
            parts.push(group.match_all(view, port, score)?);
        }
        let mut result = MatchCollection::combine_union(parts);

        for id in &self.subscriptions {
            result.add_if_absent(id, score);
        }
        let capture = Capture { signal, port };
        for (id, label) in &self.groups {
            result.append_capture(id, label, capture);
        }
        Ok(result)
    }

    /// First pattern found below this node.
    ///
    /// A local subscription scores `1 + condition.score`; ancestor scores are
    /// not accumulated.
    pub fn match_first(
        &self,
        view: &dyn GraphView,
        signal: SignalId,
        port: Option<PortId>,
    ) -> Result<Option<Match>, MatchError> {
        if !self.condition.fulfills(view, signal, port) {
            return Ok(None);
        }
        let mut found = self
            .subscriptions
            .first()
            .map(|id| Match::new(id.clone(), 1 + self.condition.score));

        if found.is_none() {
            for child in &self.condition_axis {
                found = child.match_first(view, signal, port)?;
                if found.is_some() {
                    break;
                }
            }
        }
        if found.is_none() {
            for group in &self.pattern_axis {
                found = group.match_all(view, port, self.condition.score)?.into_best();
                if found.is_some() {
                    break;
                }
            }
        }

        if let Some(m) = found.as_mut()
            && let Some(label) = self.groups.get(&m.pattern)
        {
            m.append(label, Capture { signal, port });
        }
        Ok(found)
    }
}

impl CoalescedChildPattern {
    fn for_shape(shape: &PatternShape) -> Self {
        Self {
            exact: shape.exact,
            ordered: shape.ordered,
            positions: vec![CoalescedTreeNode::default(); shape.children.len()],
            catch_all: None,
        }
    }

    fn accepts(&self, shape: &PatternShape) -> bool {
        self.positions.len() == shape.children.len()
            && self.exact == shape.exact
            && self.ordered == shape.ordered
            && self.catch_all.is_some() == shape.catch_all.is_some()
    }

    fn merge(&mut self, id: &PatternId, shape: &PatternShape) {
        for (position, child) in self.positions.iter_mut().zip(&shape.children) {
            position.merge_shape(id, child);
        }
        if let Some(catch_all) = &shape.catch_all {
            self.catch_all
                .get_or_insert_with(Box::default)
                .merge_shape(id, catch_all);
        }
    }

    pub fn arity(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[CoalescedTreeNode] {
        &self.positions
    }

    fn node_count(&self) -> usize {
        self.positions.iter().map(CoalescedTreeNode::node_count).sum::<usize>()
            + self.catch_all.as_ref().map_or(0, |c| c.node_count())
    }

    /// Patterns whose every position is satisfied by the driver of the matching input.
    ///
    /// Only ordered, exact-arity groups are supported; the other modes fail loudly.
    pub fn match_all(
        &self,
        view: &dyn GraphView,
        port: Option<PortId>,
        inherited: u32,
    ) -> Result<MatchCollection, MatchError> {
        if !self.ordered {
            return Err(MatchError::UnsupportedMode("unordered children"));
        }
        if !self.exact {
            return Err(MatchError::UnsupportedMode("non-exact arity"));
        }
        if self.catch_all.is_some() {
            return Err(MatchError::UnsupportedMode("catch-all children"));
        }
        let Some(port) = port else {
            return Ok(MatchCollection::new());
        };
        let inputs = view.input_signals(port);
        if inputs.len() != self.positions.len() {
            return Ok(MatchCollection::new());
        }

        let mut parts = Vec::with_capacity(inputs.len());
        for (position, input) in self.positions.iter().zip(inputs) {
            let Some(input) = input else {
                return Ok(MatchCollection::new());
            };
            let driver = view.driven_by_port(input);
            let part = position.match_all(view, input, driver, 0)?;
            if part.is_empty() {
                return Ok(MatchCollection::new());
            }
            parts.push(part);
        }
        let mut result = MatchCollection::combine_intersect(parts);
        result.add_score(inherited);
        Ok(result)
    }
}

/// Registered patterns compiled into one shared tree.
#[derive(Debug, Default)]
pub struct DiscriminationNetwork {
    root: CoalescedTreeNode,
    patterns: BTreeMap<PatternId, Pattern>,
}

impl DiscriminationNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `pattern` into the shared tree.
    pub fn register(&mut self, pattern: Pattern) -> Result<(), MatchError> {
        if self.patterns.contains_key(&pattern.id) {
            return Err(MatchError::DuplicatePattern(pattern.id));
        }
        self.root.merge_shape(&pattern.id, &pattern.shape);
        debug!(pattern = %pattern.id, nodes = self.root.node_count(), "registered pattern");
        self.patterns.insert(pattern.id.clone(), pattern);
        Ok(())
    }

    pub fn pattern(&self, id: &PatternId) -> Result<&Pattern, NotFound> {
        self.patterns
            .get(id)
            .ok_or_else(|| NotFound::Pattern(id.clone()))
    }

    pub fn patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.values()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn root(&self) -> &CoalescedTreeNode {
        &self.root
    }

    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    pub fn match_all(
        &self,
        view: &dyn GraphView,
        signal: SignalId,
        port: Option<PortId>,
    ) -> Result<MatchCollection, MatchError> {
        self.root.match_all(view, signal, port, 0)
    }

    pub fn match_first(
        &self,
        view: &dyn GraphView,
        signal: SignalId,
        port: Option<PortId>,
    ) -> Result<Option<Match>, MatchError> {
        self.root.match_first(view, signal, port)
    }

    /// Match `signal` against its own driving port.
    pub fn match_signal(
        &self,
        view: &dyn GraphView,
        signal: SignalId,
    ) -> Result<MatchCollection, MatchError> {
        self.match_all(view, signal, view.driven_by_port(signal))
    }
}
