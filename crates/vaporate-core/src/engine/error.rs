use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::error::FormatError;
use crate::core::species::registry::RegistryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("I/O error on {path}: {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to process {path}: {source}", path = path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    #[error("Species registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Evaporation event names node {index}, but the emitter has {node_count} nodes")]
    EventOutOfRange { index: usize, node_count: usize },

    #[error("The emitter contains no atoms to relax")]
    EmptyEmitter,

    #[error("Relaxed output has {found} atoms, but {expected} were sent to relaxation")]
    AtomCountMismatch { expected: usize, found: usize },

    #[error("Relaxed atom {local_index} has type '{found}', but was sent as type {expected}")]
    AtomTypeMismatch {
        local_index: usize,
        expected: usize,
        found: String,
    },

    #[error("Relaxed atom {local_index} carries no coordination number")]
    MissingCoordination { local_index: usize },

    #[error("Atom {local_index} has category code {code}, which is not an atom class")]
    InvalidCategory { local_index: usize, code: u32 },

    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}: {stderr}")]
    ExternalProcess {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Failed to record history in {path}: {source}", path = path.display())]
    History {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
