use super::error::EngineError;
use crate::core::models::event::EvaporationEvent;
use crate::core::models::snapshot::GeometrySnapshot;
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReductionReport {
    pub events: usize,
    /// Distinct nodes marked inert.
    pub removed: usize,
}

/// Marks every node named by `events` as evaporated.
///
/// The node count is unchanged; evaporated nodes keep their position and become
/// inert mesh points. Every event is range-checked before any node is touched.
pub fn remove_evaporated(
    snapshot: &GeometrySnapshot,
    events: &[EvaporationEvent],
) -> Result<(GeometrySnapshot, ReductionReport), EngineError> {
    let node_count = snapshot.node_count();
    let mut indices = BTreeSet::new();
    for event in events {
        if event.node_index == 0 || event.node_index > node_count {
            return Err(EngineError::EventOutOfRange {
                index: event.node_index,
                node_count,
            });
        }
        indices.insert(event.node_index);
    }

    let mut reduced = snapshot.clone();
    for &index in &indices {
        let node = reduced.node_mut(index).ok_or(EngineError::EventOutOfRange {
            index,
            node_count,
        })?;
        node.mark_evaporated();
    }

    let report = ReductionReport {
        events: events.len(),
        removed: indices.len(),
    };
    debug!(
        events = report.events,
        removed = report.removed,
        "Applied evaporation events."
    );
    Ok((reduced, report))
}
