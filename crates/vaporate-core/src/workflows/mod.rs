//! # Workflows Module
//!
//! Top-level procedures that drive the external solvers through the evaporation and
//! relaxation cycle, one working directory per step.
//!
//! - [`setup`] prepares `step_0000`: the initial mesh, its species legend and the
//!   solver configuration.
//! - [`cycle`] runs one evaporate → reduce → relax → reassign → merge pass.
//! - [`run`] repeats cycles until the event budget is spent and records a history.

pub mod cycle;
pub mod run;
pub mod setup;

#[cfg(test)]
pub(crate) mod testing;

use crate::core::io::error::FormatError;
use crate::engine::error::EngineError;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub use crate::engine::solvers::{MESH_CONFIG_FILE, MESH_FILE, RELAX_SCRIPT_FILE};

pub const MESHGEN_INI_FILE: &str = "meshgen.ini";
pub const UPDATED_MESH_FILE: &str = "updated_mesh.txt";
pub const RELAX_DATA_FILE: &str = "data.emitter";
pub const FIXED_INDICES_FILE: &str = "fixed_indices.txt";
pub const RELAXED_DUMP_FILE: &str = "relaxed_emitter.lmp";
pub const RECLASSIFIED_DUMP_FILE: &str = "reclassified_emitter.lmp";
pub const RELAXED_MESH_FILE: &str = "relaxed_emitter.txt";
pub const HISTORY_FILE: &str = "history.csv";

/// Substring identifying evaporation result files.
pub const RESULTS_NEEDLE: &str = "results_data";
/// Substring identifying surface classification files.
pub const SURFACE_NEEDLE: &str = "surface_data";

/// The working directory of cycle `cycle`; the setup step is cycle 0.
pub fn step_dir(root: &Path, cycle: usize) -> PathBuf {
    root.join(format!("step_{:04}", cycle))
}

/// Files in `dir` whose name contains `needle`, sorted by name.
pub(crate) fn find_files(dir: &Path, needle: &str) -> Result<Vec<PathBuf>, EngineError> {
    let io_err = |source| EngineError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let matches = entry.file_name().to_string_lossy().contains(needle);
        if matches && entry.path().is_file() {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

pub(crate) fn create_dir(path: &Path) -> Result<(), EngineError> {
    fs::create_dir_all(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn copy_file(from: &Path, to: &Path) -> Result<(), EngineError> {
    fs::copy(from, to).map(|_| ()).map_err(|source| EngineError::Io {
        path: from.to_path_buf(),
        source,
    })
}

/// Opens `path` and hands a buffered reader to `parse`, attaching the path to any failure.
pub(crate) fn parse_file<T>(
    path: &Path,
    parse: impl FnOnce(&mut BufReader<File>) -> Result<T, FormatError>,
) -> Result<T, EngineError> {
    let file = File::open(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&mut BufReader::new(file)).map_err(|source| EngineError::Format {
        path: path.to_path_buf(),
        source,
    })
}
