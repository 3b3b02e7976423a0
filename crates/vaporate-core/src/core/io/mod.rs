//! Provides input/output functionality for the solver file formats.
//!
//! Each format is a thin encode/decode layer over the structured records in
//! [`crate::core::models`]. Record-shaped formats implement [`traits::TextFormat`];
//! one-way artifacts (event lists, surface tables, solver scripts) expose plain functions.

pub mod dump;
pub mod error;
pub mod events;
pub mod lammps_data;
pub mod lammps_input;
pub mod mesh;
pub mod surface;
pub mod tapsim_cfg;
pub mod traits;
