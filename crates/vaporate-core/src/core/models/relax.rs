//! Records of the relaxation-solver side of the bridge.
//!
//! All positions in this module are in Ångström.

use nalgebra::Point3;

/// Suffix appended to a reassigned type code when the atom detached from the emitter.
pub const LOST_SENTINEL: char = 'x';

/// One relaxation atom type and its mass-table row.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomType {
    /// 1-based type number as written to the data file.
    pub id: usize,
    pub label: String,
    pub mass: f64,
}

/// Axis-aligned simulation cell bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBounds {
    pub lo: Point3<f64>,
    pub hi: Point3<f64>,
}

impl CellBounds {
    /// Bounding box of `positions` with every face moved outward by `padding`.
    ///
    /// Returns `None` for an empty position set.
    pub fn enclosing<'a>(
        positions: impl IntoIterator<Item = &'a Point3<f64>>,
        padding: f64,
    ) -> Option<Self> {
        let mut iter = positions.into_iter();
        let first = iter.next()?;
        let (mut lo, mut hi) = (*first, *first);
        for p in iter {
            for axis in 0..3 {
                lo[axis] = lo[axis].min(p[axis]);
                hi[axis] = hi[axis].max(p[axis]);
            }
        }
        for axis in 0..3 {
            lo[axis] -= padding;
            hi[axis] += padding;
        }
        Some(Self { lo, hi })
    }
}

/// An atom line of the relaxation data file.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxAtom {
    /// Contiguous 1-based index local to the data file.
    pub local_index: usize,
    pub type_id: usize,
    pub position: Point3<f64>,
}

/// The contents of a relaxation data file.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomData {
    pub title: String,
    pub atom_types: Vec<AtomType>,
    pub cell: CellBounds,
    pub atoms: Vec<RelaxAtom>,
}

/// One atom row of a relaxed-output dump.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxedAtom {
    pub local_index: usize,
    pub position: Point3<f64>,
    /// The raw content of the dump's `type` column.
    pub type_token: String,
    /// Coordination number, when the dump carries a coordination column.
    pub coordination: Option<u32>,
}

/// A relaxed atom after coordination-number reassignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ReclassifiedAtom {
    pub local_index: usize,
    pub position: Point3<f64>,
    pub category_code: u32,
    pub coordination: Option<u32>,
    pub lost: bool,
}

impl ReclassifiedAtom {
    /// The `type` column token: the category code, suffixed with [`LOST_SENTINEL`] for lost atoms.
    pub fn type_token(&self) -> String {
        if self.lost {
            format!("{}{}", self.category_code, LOST_SENTINEL)
        } else {
            self.category_code.to_string()
        }
    }

    pub fn to_relaxed(&self) -> RelaxedAtom {
        RelaxedAtom {
            local_index: self.local_index,
            position: self.position,
            type_token: self.type_token(),
            coordination: self.coordination,
        }
    }

    /// Decodes a dump row whose type column holds a reassigned category code.
    ///
    /// Returns `None` when the token is not a category code with an optional sentinel.
    pub fn from_relaxed(atom: &RelaxedAtom) -> Option<Self> {
        let token = atom.type_token.trim();
        let (code, lost) = match token.strip_suffix(LOST_SENTINEL) {
            Some(code) => (code, true),
            None => (token, false),
        };
        let category_code = code.parse().ok()?;
        Some(Self {
            local_index: atom.local_index,
            position: atom.position,
            category_code,
            coordination: atom.coordination,
            lost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enclosing_pads_every_face() {
        let points = [
            Point3::new(1.0, -2.0, 3.0),
            Point3::new(-4.0, 5.0, 0.5),
            Point3::new(2.5, 0.0, -1.0),
        ];
        let cell = CellBounds::enclosing(points.iter(), 10.0).unwrap();
        assert_eq!(cell.lo, Point3::new(-14.0, -12.0, -11.0));
        assert_eq!(cell.hi, Point3::new(12.5, 15.0, 13.0));
    }

    #[test]
    fn enclosing_empty_set_is_none() {
        assert!(CellBounds::enclosing(std::iter::empty(), 10.0).is_none());
    }

    #[test]
    fn type_token_carries_lost_sentinel() {
        let mut atom = ReclassifiedAtom {
            local_index: 3,
            position: Point3::origin(),
            category_code: 14,
            coordination: Some(4),
            lost: false,
        };
        assert_eq!(atom.type_token(), "14");
        atom.lost = true;
        assert_eq!(atom.type_token(), "14x");

        let decoded = ReclassifiedAtom::from_relaxed(&atom.to_relaxed()).unwrap();
        assert_eq!(decoded, atom);
    }

    #[test]
    fn from_relaxed_rejects_garbage_tokens() {
        let atom = RelaxedAtom {
            local_index: 1,
            position: Point3::origin(),
            type_token: "W".to_string(),
            coordination: None,
        };
        assert!(ReclassifiedAtom::from_relaxed(&atom).is_none());
    }
}
