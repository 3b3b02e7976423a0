//! Coordination-number driven species reassignment of relaxed atoms.

use super::bridge::RelaxationInput;
use super::config::ConfigError;
use super::error::EngineError;
use crate::core::models::relax::{ReclassifiedAtom, RelaxedAtom};
use crate::core::models::snapshot::GeometrySnapshot;
use crate::core::species::registry::SpeciesRegistry;
use tracing::debug;

/// Coordination number of a fully coordinated BCC bulk atom.
pub const DEFAULT_BULK_COORDINATION: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinationAction {
    /// The atom detached from the emitter.
    Lost,
    /// Reassign to a fixed field bin of the atom's element.
    Bin(u32),
    /// Reassign to the field bin equal to the coordination number, capped at the last bin.
    MatchCoordination,
}

/// An inclusive coordination range; `max: None` leaves the range open upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinationBand {
    pub min: u32,
    pub max: Option<u32>,
    pub action: CoordinationAction,
}

impl CoordinationBand {
    pub fn contains(&self, coordination: u32) -> bool {
        coordination >= self.min && self.max.is_none_or(|max| coordination <= max)
    }
}

/// Ordered, non-overlapping coordination bands.
///
/// Coordination numbers outside every band leave the atom's category untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinationPolicy {
    bands: Vec<CoordinationBand>,
}

impl CoordinationPolicy {
    pub fn new(mut bands: Vec<CoordinationBand>) -> Result<Self, ConfigError> {
        bands.sort_by_key(|b| b.min);
        for band in &bands {
            if let Some(max) = band.max {
                if max < band.min {
                    return Err(ConfigError::Invalid {
                        parameter: "coordination bands",
                        reason: format!("band {}..={} is empty", band.min, max),
                    });
                }
            }
        }
        for pair in bands.windows(2) {
            let overlaps = match pair[0].max {
                Some(max) => pair[1].min <= max,
                None => true,
            };
            if overlaps {
                return Err(ConfigError::Invalid {
                    parameter: "coordination bands",
                    reason: format!(
                        "bands starting at {} and {} overlap",
                        pair[0].min, pair[1].min
                    ),
                });
            }
        }
        Ok(Self { bands })
    }

    /// A policy that never reclassifies.
    pub fn untouched() -> Self {
        Self { bands: Vec::new() }
    }

    /// Zero neighbours means lost; every under-coordinated count maps to the
    /// matching field bin; `bulk` and above are left alone.
    pub fn bulk_cutoff(bulk: u32) -> Self {
        let mut bands = vec![CoordinationBand {
            min: 0,
            max: Some(0),
            action: CoordinationAction::Lost,
        }];
        if bulk > 1 {
            bands.push(CoordinationBand {
                min: 1,
                max: Some(bulk - 1),
                action: CoordinationAction::MatchCoordination,
            });
        }
        Self { bands }
    }

    pub fn bands(&self) -> &[CoordinationBand] {
        &self.bands
    }

    pub fn is_untouched(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn classify(&self, coordination: u32) -> Option<CoordinationAction> {
        self.bands
            .iter()
            .find(|b| b.contains(coordination))
            .map(|b| b.action)
    }
}

impl Default for CoordinationPolicy {
    fn default() -> Self {
        Self::bulk_cutoff(DEFAULT_BULK_COORDINATION)
    }
}

/// Recomputes the category code of every relaxed atom from its coordination number.
///
/// `relaxed` must hold exactly the atoms of `input`, in local-index order. Atoms
/// that fall outside every band keep the category code they had in `snapshot`.
pub fn reassign(
    relaxed: &[RelaxedAtom],
    input: &RelaxationInput,
    snapshot: &GeometrySnapshot,
    registry: &SpeciesRegistry,
    policy: &CoordinationPolicy,
) -> Result<Vec<ReclassifiedAtom>, EngineError> {
    if relaxed.len() != input.data.atoms.len() {
        return Err(EngineError::AtomCountMismatch {
            expected: input.data.atoms.len(),
            found: relaxed.len(),
        });
    }

    let mut reassigned = Vec::with_capacity(relaxed.len());
    for (atom, sent) in relaxed.iter().zip(&input.data.atoms) {
        let type_matches = atom.local_index == sent.local_index
            && atom.type_token.trim().parse::<usize>().ok() == Some(sent.type_id);
        if !type_matches {
            return Err(EngineError::AtomTypeMismatch {
                local_index: sent.local_index,
                expected: sent.type_id,
                found: atom.type_token.clone(),
            });
        }

        let geometry_index = input.geometry_index(sent.local_index).ok_or_else(|| {
            EngineError::Internal(format!("local atom {} has no origin", sent.local_index))
        })?;
        let original_code = snapshot
            .node(geometry_index)
            .map(|n| n.category_code)
            .ok_or_else(|| {
                EngineError::Internal(format!(
                    "origin node {} is outside the pre-bridge snapshot",
                    geometry_index
                ))
            })?;

        let action = if policy.is_untouched() {
            None
        } else {
            let cn = atom.coordination.ok_or(EngineError::MissingCoordination {
                local_index: sent.local_index,
            })?;
            policy.classify(cn).map(|action| (cn, action))
        };

        let (category_code, lost) = match action {
            None => (original_code, false),
            Some((_, CoordinationAction::Lost)) => (original_code, true),
            Some((_, CoordinationAction::Bin(bin))) => {
                let label = registry.resolve(original_code)?;
                (registry.composite_id_for(label, bin)?, false)
            }
            Some((cn, CoordinationAction::MatchCoordination)) => {
                let label = registry.resolve(original_code)?;
                let last_bin = registry.bin_count(label)?.saturating_sub(1) as u32;
                (registry.composite_id_for(label, cn.min(last_bin))?, false)
            }
        };

        reassigned.push(ReclassifiedAtom {
            local_index: sent.local_index,
            position: atom.position,
            category_code,
            coordination: atom.coordination,
            lost,
        });
    }

    debug!(
        atoms = reassigned.len(),
        lost = reassigned.iter().filter(|a| a.lost).count(),
        "Reassigned relaxed atoms by coordination."
    );
    Ok(reassigned)
}
