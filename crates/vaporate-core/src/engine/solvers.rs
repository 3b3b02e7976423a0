//! The boundary to the external mesh generator, evaporation solver and relaxation solver.

use super::config::{EventBudget, SimulationConfig};
use super::error::EngineError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

pub const MESH_FILE: &str = "mesh.txt";
pub const MESH_CONFIG_FILE: &str = "mesh.cfg";
pub const RELAX_SCRIPT_FILE: &str = "in.emitter_relax";
pub const RELAX_LOG_FILE: &str = "log.lammps";

/// Blocking calls into the external solvers, each run inside a working directory.
pub trait ExternalSolvers {
    /// Builds `mesh.txt` and the `mesh.cfg` template from `node_file`.
    fn generate_mesh(&self, dir: &Path, node_file: &Path) -> Result<(), EngineError>;

    /// Runs one batch of evaporation events on `mesh.txt`/`mesh.cfg`.
    fn evaporate(&self, dir: &Path) -> Result<(), EngineError>;

    /// Runs the relaxation script `in.emitter_relax`.
    fn relax(&self, dir: &Path) -> Result<(), EngineError>;
}

/// Runs the solvers as child processes.
#[derive(Debug, Clone)]
pub struct ProcessSolvers {
    meshgen_bin: PathBuf,
    tapsim_bin: PathBuf,
    lammps_bin: PathBuf,
    events_per_step: EventBudget,
}

impl ProcessSolvers {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            meshgen_bin: config.evaporation.meshgen_bin.clone(),
            tapsim_bin: config.evaporation.tapsim_bin.clone(),
            lammps_bin: config.relaxation.lammps_bin.clone(),
            events_per_step: config.evaporation.events_per_step,
        }
    }

    fn meshgen_args(node_file: &Path) -> Vec<OsString> {
        vec![
            node_file.as_os_str().to_owned(),
            MESH_FILE.into(),
            format!("--create-config-template={}", MESH_CONFIG_FILE).into(),
            "--write-ascii".into(),
        ]
    }

    fn tapsim_args(&self) -> Vec<OsString> {
        vec![
            "evaporation".into(),
            MESH_CONFIG_FILE.into(),
            MESH_FILE.into(),
            format!("--event-limit={}", self.events_per_step).into(),
            "--write-ascii".into(),
        ]
    }

    fn lammps_args() -> Vec<OsString> {
        vec![
            "-l".into(),
            RELAX_LOG_FILE.into(),
            "-i".into(),
            RELAX_SCRIPT_FILE.into(),
        ]
    }
}

impl ExternalSolvers for ProcessSolvers {
    fn generate_mesh(&self, dir: &Path, node_file: &Path) -> Result<(), EngineError> {
        run_program(&self.meshgen_bin, &Self::meshgen_args(node_file), dir)
    }

    fn evaporate(&self, dir: &Path) -> Result<(), EngineError> {
        run_program(&self.tapsim_bin, &self.tapsim_args(), dir)
    }

    fn relax(&self, dir: &Path) -> Result<(), EngineError> {
        run_program(&self.lammps_bin, &Self::lammps_args(), dir)
    }
}

fn run_program(program: &Path, args: &[OsString], dir: &Path) -> Result<(), EngineError> {
    let name = program.display().to_string();
    info!(program = %name, dir = %dir.display(), "Running external solver.");
    debug!(?args, "Solver arguments.");

    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|source| EngineError::Spawn {
            program: name.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(EngineError::ExternalProcess {
            program: name,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}
