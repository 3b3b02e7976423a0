/// A single evaporation event reported by the evaporation solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EvaporationEvent {
    /// 1-based index of the node that left the emitter.
    pub node_index: usize,
}

impl EvaporationEvent {
    pub fn new(node_index: usize) -> Self {
        Self { node_index }
    }
}
