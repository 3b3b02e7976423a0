use nalgebra::Point3;

/// Highest category code reserved for vacuum and boundary node classes.
///
/// Codes `0..=RESERVED_CATEGORY_MAX` never denote an atom; every atom carries a
/// composite species identifier above this value.
pub const RESERVED_CATEGORY_MAX: u32 = 3;

/// The category code written to a node once its atom has evaporated.
pub const INERT_CATEGORY: u32 = 0;

/// Classification of a node derived from its category code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeClass {
    /// A vacuum or boundary node (codes 0 to 3).
    Reserved(u32),
    /// An atom node carrying a composite species identifier.
    Atom(u32),
}

impl NodeClass {
    pub fn from_code(code: u32) -> Self {
        if code <= RESERVED_CATEGORY_MAX {
            NodeClass::Reserved(code)
        } else {
            NodeClass::Atom(code)
        }
    }

    pub fn code(self) -> u32 {
        match self {
            NodeClass::Reserved(code) | NodeClass::Atom(code) => code,
        }
    }

    pub fn is_atom(self) -> bool {
        matches!(self, NodeClass::Atom(_))
    }
}

/// One mesh point of the emitter.
///
/// A node's position in the owning [`GeometrySnapshot`](super::snapshot::GeometrySnapshot)
/// is its identity, so nodes are never removed, only marked inert. The text line a
/// node was parsed from is retained so that untouched nodes are written back
/// byte-for-byte.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Position in metres.
    pub position: Point3<f64>,
    /// Category code: 0 to 3 for vacuum/boundary classes, a composite species id otherwise.
    pub category_code: u32,
    /// Evaporation charge state column.
    pub charge_state: f64,
    /// Set when the node was removed by an evaporation event during this run.
    pub is_evaporated: bool,
    source_line: Option<String>,
}

impl Node {
    pub fn new(position: Point3<f64>, category_code: u32, charge_state: f64) -> Self {
        Self {
            position,
            category_code,
            charge_state,
            is_evaporated: false,
            source_line: None,
        }
    }

    /// Attaches the raw text line this node was decoded from.
    pub fn with_source_line(mut self, line: String) -> Self {
        self.source_line = Some(line);
        self
    }

    /// The raw text line, if the node is unchanged since it was read.
    pub fn source_line(&self) -> Option<&str> {
        self.source_line.as_deref()
    }

    pub fn class(&self) -> NodeClass {
        NodeClass::from_code(self.category_code)
    }

    pub fn is_atom(&self) -> bool {
        self.class().is_atom()
    }

    /// Turns the node into an inert mesh point, keeping its position.
    pub fn mark_evaporated(&mut self) {
        self.category_code = INERT_CATEGORY;
        self.charge_state = 0.0;
        self.is_evaporated = true;
        self.source_line = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_codes_are_not_atoms() {
        for code in 0..=RESERVED_CATEGORY_MAX {
            assert_eq!(NodeClass::from_code(code), NodeClass::Reserved(code));
            assert!(!NodeClass::from_code(code).is_atom());
        }
        assert_eq!(NodeClass::from_code(4), NodeClass::Atom(4));
        assert!(NodeClass::from_code(17).is_atom());
        assert_eq!(NodeClass::from_code(17).code(), 17);
    }

    #[test]
    fn mark_evaporated_zeroes_category_and_charge_but_keeps_position() {
        let mut node = Node::new(Point3::new(1e-10, 2e-10, 3e-10), 12, 3.0)
            .with_source_line("1e-10\t2e-10\t3e-10\t12\t3".to_string());
        node.mark_evaporated();

        assert_eq!(node.category_code, INERT_CATEGORY);
        assert_eq!(node.charge_state, 0.0);
        assert!(node.is_evaporated);
        assert!(!node.is_atom());
        assert_eq!(node.position, Point3::new(1e-10, 2e-10, 3e-10));
        assert!(node.source_line().is_none());
    }
}
