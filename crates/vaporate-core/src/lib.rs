//! # Vaporate Core Library
//!
//! Orchestrates iterative field-evaporation simulations that alternate between an
//! electrostatic evaporation solver and a molecular-dynamics relaxation solver, keeping
//! one emitter geometry consistent across both.
//!
//! ## Layers
//!
//! - **[`core`]: The Foundation.** Data models for the emitter (`GeometrySnapshot`,
//!   `Node`), the species registry, unit conversions and the readers/writers for every
//!   solver file format.
//!
//! - **[`engine`]: The Logic Core.** Evaporation bookkeeping, the geometry ↔ relaxation
//!   bridges, coordination-number reassignment, configuration and the external solver
//!   boundary.
//!
//! - **[`workflows`]: The Public API.** Setup, single cycles and the complete run loop,
//!   each working in its own step directory.

pub mod core;
pub mod engine;
pub mod workflows;
