//! Operations over the core records: evaporation bookkeeping, the two format bridges,
//! coordination reassignment and the external solver boundary.

pub mod bridge;
pub mod config;
pub mod coordination;
pub mod error;
pub mod progress;
pub mod reducer;
pub mod solvers;

use crate::core::io::traits::TextFormat;
use error::EngineError;
use std::path::Path;

/// Reads a record of format `F`, attaching the path to any failure.
pub fn read_record<F: TextFormat>(path: &Path) -> Result<F::Record, EngineError> {
    F::read_from_path(path).map_err(|source| EngineError::Format {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a record of format `F`, attaching the path to any failure.
pub fn write_record<F: TextFormat>(record: &F::Record, path: &Path) -> Result<(), EngineError> {
    F::write_to_path(record, path).map_err(|source| EngineError::Format {
        path: path.to_path_buf(),
        source,
    })
}
