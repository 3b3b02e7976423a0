//! # Core Module
//!
//! Stateless building blocks shared by the engine and the workflows.
//!
//! - **Emitter Representation** ([`models`]) - Nodes, geometry snapshots and relaxation records
//! - **Species Identity** ([`species`]) - The registry mapping element/field-bin pairs to composite ids
//! - **File I/O** ([`io`]) - Codecs for the evaporation and relaxation solver formats
//! - **Conventions** ([`utils`]) - Unit conversion between the two solver formats

pub mod io;
pub mod models;
pub mod species;
pub mod utils;
