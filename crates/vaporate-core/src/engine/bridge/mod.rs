//! Conversions between the geometry snapshot and the relaxation solver's atom records.

mod from_relax;
mod to_relax;

pub use from_relax::{MergeReport, decode_reclassified, from_relaxation};
pub use to_relax::{RELAXATION_TITLE, RelaxationInput, to_relaxation};
