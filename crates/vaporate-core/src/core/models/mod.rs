//! # Core Models Module
//!
//! Data structures describing the emitter on both sides of the solver bridge.
//!
//! - [`node`] - A single mesh point with its category code and charge state
//! - [`snapshot`] - The ordered node sequence, header and species legend of the evaporation format
//! - [`relax`] - Atom types, cell bounds and atom records of the relaxation format
//! - [`event`] - Evaporation events reported by the evaporation solver
//!
//! Nodes are identified by their 1-based position in a [`snapshot::GeometrySnapshot`]; that
//! position never changes during a run. Only the relaxation data file renumbers atoms, and
//! the bridge keeps an explicit table to undo it.

pub mod event;
pub mod node;
pub mod relax;
pub mod snapshot;
