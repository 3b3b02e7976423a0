use super::node::Node;

/// Header flags following the node count on the `ASCII` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshHeader {
    pub flags: Vec<String>,
}

impl Default for MeshHeader {
    fn default() -> Self {
        Self {
            flags: vec!["0".to_string(), "0".to_string()],
        }
    }
}

/// The `composite_id=element_label` listing carried on a snapshot's trailing comment line.
///
/// It lets downstream tooling recover species from raw category codes without the
/// in-memory registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeciesLegend {
    entries: Vec<(u32, String)>,
    source_line: Option<String>,
}

impl SpeciesLegend {
    pub fn new(entries: Vec<(u32, String)>) -> Self {
        Self {
            entries,
            source_line: None,
        }
    }

    pub fn with_source_line(mut self, line: String) -> Self {
        self.source_line = Some(line);
        self
    }

    pub fn entries(&self) -> &[(u32, String)] {
        &self.entries
    }

    pub fn source_line(&self) -> Option<&str> {
        self.source_line.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn label_for(&self, composite_id: u32) -> Option<&str> {
        self.entries
            .iter()
            .find(|(id, _)| *id == composite_id)
            .map(|(_, label)| label.as_str())
    }
}

/// The full ordered node sequence of the emitter plus its header and species legend.
///
/// Node indices are 1-based and stable for the lifetime of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometrySnapshot {
    pub header: MeshHeader,
    nodes: Vec<Node>,
    pub legend: SpeciesLegend,
}

impl GeometrySnapshot {
    pub fn new(header: MeshHeader, nodes: Vec<Node>, legend: SpeciesLegend) -> Self {
        Self {
            header,
            nodes,
            legend,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Looks up a node by its 1-based index.
    pub fn node(&self, index: usize) -> Option<&Node> {
        index.checked_sub(1).and_then(|i| self.nodes.get(i))
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut Node> {
        index.checked_sub(1).and_then(move |i| self.nodes.get_mut(i))
    }

    /// Iterates over `(index, node)` pairs with 1-based indices.
    pub fn indexed(&self) -> impl Iterator<Item = (usize, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (i + 1, n))
    }

    pub fn atoms(&self) -> impl Iterator<Item = (usize, &Node)> {
        self.indexed().filter(|(_, n)| n.is_atom())
    }

    pub fn non_atoms(&self) -> impl Iterator<Item = (usize, &Node)> {
        self.indexed().filter(|(_, n)| !n.is_atom())
    }

    pub fn atom_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_atom()).count()
    }
}
