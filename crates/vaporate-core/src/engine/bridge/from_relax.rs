use crate::core::io::dump::DumpFrame;
use crate::core::io::error::FormatError;
use crate::core::models::node::Node;
use crate::core::models::relax::ReclassifiedAtom;
use crate::core::models::snapshot::GeometrySnapshot;
use crate::core::utils::units::to_geometry_units;
use crate::engine::error::EngineError;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeReport {
    pub survivors: usize,
    pub lost: usize,
    /// Non-atom nodes carried over from the pre-bridge snapshot.
    pub reinserted: usize,
}

impl MergeReport {
    pub fn node_count(&self) -> usize {
        self.survivors + self.reinserted
    }
}

/// Reads the reassigned category codes back out of a dump frame.
pub fn decode_reclassified(frame: &DumpFrame) -> Result<Vec<ReclassifiedAtom>, FormatError> {
    frame
        .atoms
        .iter()
        .map(|atom| {
            ReclassifiedAtom::from_relaxed(atom).ok_or_else(|| {
                FormatError::Inconsistency(format!(
                    "atom {} has type '{}', expected a category code",
                    atom.local_index, atom.type_token
                ))
            })
        })
        .collect()
}

/// Builds the next geometry snapshot from reassigned atoms.
///
/// Lost atoms are dropped. Surviving atoms come first, in local-index order,
/// followed by every non-atom node of `original` exactly as it was read.
pub fn from_relaxation(
    atoms: &[ReclassifiedAtom],
    original: &GeometrySnapshot,
) -> Result<(GeometrySnapshot, MergeReport), EngineError> {
    let mut nodes = Vec::with_capacity(original.node_count());
    let mut report = MergeReport::default();

    for atom in atoms {
        if atom.lost {
            report.lost += 1;
            continue;
        }
        let node = Node::new(to_geometry_units(&atom.position), atom.category_code, 0.0);
        if !node.is_atom() {
            return Err(EngineError::InvalidCategory {
                local_index: atom.local_index,
                code: atom.category_code,
            });
        }
        nodes.push(node);
        report.survivors += 1;
    }

    for (_, node) in original.non_atoms() {
        nodes.push(node.clone());
        report.reinserted += 1;
    }

    if report.lost > 0 {
        warn!(
            lost = report.lost,
            relaxed = atoms.len(),
            "Atoms detached from the emitter during relaxation and were dropped."
        );
    }
    debug!(
        survivors = report.survivors,
        reinserted = report.reinserted,
        "Merged relaxed atoms with non-atom nodes."
    );

    let snapshot = GeometrySnapshot::new(original.header.clone(), nodes, original.legend.clone());
    Ok((snapshot, report))
}
