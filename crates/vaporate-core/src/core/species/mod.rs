//! # Species Module
//!
//! Maps element labels and discretized evaporation-field bins to the composite integer
//! identifiers stored in a node's category code, and back.
//!
//! - [`registry`] - The [`registry::SpeciesRegistry`] and its construction rules
//!
//! ```ignore
//! use vaporate::core::species::registry::{ElementSpec, SpeciesRegistry};
//!
//! let registry = SpeciesRegistry::from_elements(&[tungsten])?;
//! let id = registry.composite_id_for("W", 3)?;
//! assert_eq!(registry.resolve(id)?, "W");
//! ```

pub mod registry;
