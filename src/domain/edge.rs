/// Edge kind - the positional relations between graph elements.
///
/// The slot index is part of the edge so that port inputs, outputs and bus
/// slots keep the order they were instantiated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    // ============ Data Flow ============
    Drives(usize), // Port → Signal, output slot of the port
    Feeds(usize),  // Signal → Port, input slot of the port

    // ============ Grouping ============
    Attaches(usize), // Bus → Port, bus slot of the port
}

impl EdgeKind {
    pub fn slot(&self) -> usize {
        match self {
            EdgeKind::Drives(slot) | EdgeKind::Feeds(slot) | EdgeKind::Attaches(slot) => *slot,
        }
    }
}
