use super::{MESH_CONFIG_FILE, MESH_FILE, MESHGEN_INI_FILE, copy_file, create_dir, step_dir};
use crate::core::io::mesh::MeshFile;
use crate::core::io::tapsim_cfg::write_species_blocks;
use crate::core::species::registry::SpeciesRegistry;
use crate::engine::config::SimulationConfig;
use crate::engine::error::EngineError;
use crate::engine::solvers::ExternalSolvers;
use crate::engine::{read_record, write_record};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct SetupReport {
    pub dir: PathBuf,
    /// The initial geometry, legend included.
    pub mesh_path: PathBuf,
    /// The evaporation solver configuration shared by every cycle.
    pub mesh_config_path: PathBuf,
    pub node_count: usize,
    pub atom_count: usize,
}

/// Generates the initial mesh in `step_0000` under `workdir`.
#[instrument(skip_all, name = "setup_workflow", fields(workdir = %workdir.display()))]
pub fn run(
    workdir: &Path,
    config: &SimulationConfig,
    registry: &SpeciesRegistry,
    solvers: &dyn ExternalSolvers,
) -> Result<SetupReport, EngineError> {
    let dir = step_dir(workdir, 0);
    create_dir(&dir)?;

    let source = &config.emitter.node_file;
    let node_file_name = source.file_name().ok_or_else(|| EngineError::Io {
        path: source.clone(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file path"),
    })?;
    copy_file(source, &dir.join(node_file_name))?;
    if let Some(ini) = &config.evaporation.meshgen_ini {
        copy_file(ini, &dir.join(MESHGEN_INI_FILE))?;
    }

    solvers.generate_mesh(&dir, Path::new(node_file_name))?;

    let mesh_path = dir.join(MESH_FILE);
    let mut snapshot = read_record::<MeshFile>(&mesh_path)?;
    for (_, node) in snapshot.atoms() {
        registry.resolve(node.category_code)?;
    }
    snapshot.legend = registry.legend();
    write_record::<MeshFile>(&snapshot, &mesh_path)?;

    let mesh_config_path = dir.join(MESH_CONFIG_FILE);
    append_species_blocks(&mesh_config_path, registry)?;

    let report = SetupReport {
        dir,
        mesh_path,
        mesh_config_path,
        node_count: snapshot.node_count(),
        atom_count: snapshot.atom_count(),
    };
    info!(
        nodes = report.node_count,
        atoms = report.atom_count,
        species = registry.entries().len(),
        "Initial mesh generated."
    );
    Ok(report)
}

fn append_species_blocks(path: &Path, registry: &SpeciesRegistry) -> Result<(), EngineError> {
    let io_err = |source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = OpenOptions::new().append(true).open(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    write_species_blocks(registry, &mut writer).map_err(|source| EngineError::Format {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)
}
