use crate::core::models::relax::{AtomData, AtomType, CellBounds, RelaxAtom};
use crate::core::models::snapshot::GeometrySnapshot;
use crate::core::species::registry::SpeciesRegistry;
use crate::core::utils::units::{CELL_PADDING_ANGSTROM, to_relaxation_units};
use crate::engine::error::EngineError;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

pub const RELAXATION_TITLE: &str = "LAMMPS Emitter";

/// The relaxation-side view of a snapshot's atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxationInput {
    pub data: AtomData,
    /// `origin[local_index - 1]` is the geometry index the local atom was taken from.
    pub origin: Vec<usize>,
    /// Local indices of atoms held static during relaxation, ascending.
    pub frozen: Vec<usize>,
}

impl RelaxationInput {
    pub fn geometry_index(&self, local_index: usize) -> Option<usize> {
        local_index
            .checked_sub(1)
            .and_then(|i| self.origin.get(i))
            .copied()
    }

    /// Element labels in atom-type order.
    pub fn type_labels(&self) -> Vec<String> {
        self.data.atom_types.iter().map(|t| t.label.clone()).collect()
    }
}

/// Extracts the atoms of `snapshot` into relaxation records.
///
/// Atoms are renumbered 1..K in snapshot order. Atoms whose geometry index is not
/// in `surface` end up in the frozen list.
pub fn to_relaxation(
    snapshot: &GeometrySnapshot,
    registry: &SpeciesRegistry,
    surface: &BTreeSet<usize>,
) -> Result<RelaxationInput, EngineError> {
    let mut labels = Vec::new();
    let mut origin = Vec::new();
    let mut positions = Vec::new();
    for (index, node) in snapshot.atoms() {
        labels.push(registry.resolve(node.category_code)?);
        origin.push(index);
        positions.push(to_relaxation_units(&node.position));
    }

    let cell = CellBounds::enclosing(&positions, CELL_PADDING_ANGSTROM)
        .ok_or(EngineError::EmptyEmitter)?;

    let present: HashSet<&str> = labels.iter().copied().collect();
    let mut atom_types = Vec::new();
    for label in registry.element_labels().filter(|l| present.contains(l)) {
        atom_types.push(AtomType {
            id: atom_types.len() + 1,
            label: label.to_string(),
            mass: registry.element(label)?.mass,
        });
    }

    let mut atoms = Vec::with_capacity(positions.len());
    for (i, (label, position)) in labels.iter().zip(positions).enumerate() {
        let type_id = atom_types
            .iter()
            .find(|t| t.label == *label)
            .map(|t| t.id)
            .ok_or_else(|| EngineError::Internal(format!("no atom type for '{}'", label)))?;
        atoms.push(RelaxAtom {
            local_index: i + 1,
            type_id,
            position,
        });
    }

    let frozen: Vec<usize> = origin
        .iter()
        .enumerate()
        .filter(|(_, index)| !surface.contains(index))
        .map(|(i, _)| i + 1)
        .collect();

    debug!(
        atoms = atoms.len(),
        types = atom_types.len(),
        frozen = frozen.len(),
        "Converted emitter atoms to relaxation records."
    );

    Ok(RelaxationInput {
        data: AtomData {
            title: RELAXATION_TITLE.to_string(),
            atom_types,
            cell,
            atoms,
        },
        origin,
        frozen,
    })
}
