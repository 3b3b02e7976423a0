use super::{
    FIXED_INDICES_FILE, MESH_CONFIG_FILE, MESH_FILE, RECLASSIFIED_DUMP_FILE, RELAX_DATA_FILE,
    RELAX_SCRIPT_FILE, RELAXED_DUMP_FILE, RELAXED_MESH_FILE, RESULTS_NEEDLE, SURFACE_NEEDLE,
    UPDATED_MESH_FILE, copy_file, create_dir, find_files, parse_file,
};
use crate::core::io::dump::{DumpFile, DumpFrame};
use crate::core::io::error::FormatError;
use crate::core::io::events::read_events;
use crate::core::io::lammps_data::{LammpsDataFile, write_index_list};
use crate::core::io::lammps_input::{RelaxScript, write_relax_script};
use crate::core::io::mesh::MeshFile;
use crate::core::io::surface::read_surface_nodes;
use crate::core::species::registry::SpeciesRegistry;
use crate::engine::bridge::{from_relaxation, to_relaxation};
use crate::engine::config::SimulationConfig;
use crate::engine::coordination::reassign;
use crate::engine::error::EngineError;
use crate::engine::reducer::remove_evaporated;
use crate::engine::solvers::ExternalSolvers;
use crate::engine::{read_record, write_record};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Shared, read-only inputs of every cycle.
pub struct CycleContext<'a> {
    pub config: &'a SimulationConfig,
    pub registry: &'a SpeciesRegistry,
    pub solvers: &'a dyn ExternalSolvers,
    /// The evaporation solver configuration produced by setup.
    pub mesh_config: &'a Path,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub cycle: usize,
    pub events: usize,
    pub removed: usize,
    pub relaxed: usize,
    pub lost: usize,
    pub atoms_remaining: usize,
    /// The geometry the next cycle starts from.
    #[serde(skip)]
    pub geometry: PathBuf,
}

/// Runs cycle number `cycle` in `dir`, starting from the geometry file `previous`.
#[instrument(skip_all, name = "cycle", fields(cycle = cycle))]
pub fn run(
    ctx: &CycleContext,
    cycle: usize,
    previous: &Path,
    dir: &Path,
) -> Result<CycleReport, EngineError> {
    create_dir(dir)?;
    copy_file(ctx.mesh_config, &dir.join(MESH_CONFIG_FILE))?;
    let mesh_path = dir.join(MESH_FILE);
    copy_file(previous, &mesh_path)?;
    let snapshot = read_record::<MeshFile>(&mesh_path)?;

    ctx.solvers.evaporate(dir)?;

    let mut events = Vec::new();
    let results = find_files(dir, RESULTS_NEEDLE)?;
    if results.is_empty() {
        warn!(dir = %dir.display(), "Evaporation produced no results file.");
    }
    for path in &results {
        events.extend(parse_file(path, read_events)?);
    }
    let (reduced, reduction) = remove_evaporated(&snapshot, &events)?;
    let updated_path = dir.join(UPDATED_MESH_FILE);
    write_record::<MeshFile>(&reduced, &updated_path)?;
    info!(
        events = reduction.events,
        removed = reduction.removed,
        atoms = reduced.atom_count(),
        "Removed evaporated nodes."
    );

    if reduced.atom_count() == 0 {
        warn!("No atoms remain after evaporation; skipping relaxation.");
        return Ok(CycleReport {
            cycle,
            events: reduction.events,
            removed: reduction.removed,
            relaxed: 0,
            lost: 0,
            atoms_remaining: 0,
            geometry: updated_path,
        });
    }

    // Only the last surface file by name describes the emitter after this step's events.
    let surface = match find_files(dir, SURFACE_NEEDLE)?.last() {
        Some(path) => parse_file(path, read_surface_nodes)?,
        None => BTreeSet::new(),
    };
    let minimize = &ctx.config.relaxation.minimize;
    if minimize.surface_only && surface.is_empty() {
        warn!("No surface nodes reported; every atom will be held static.");
    }

    let input = to_relaxation(&reduced, ctx.registry, &surface)?;
    write_record::<LammpsDataFile>(&input.data, &dir.join(RELAX_DATA_FILE))?;
    write_text(&dir.join(FIXED_INDICES_FILE), |w| write_index_list(&input.frozen, w))?;

    let script = RelaxScript {
        data_file: RELAX_DATA_FILE.to_string(),
        dump_file: RELAXED_DUMP_FILE.to_string(),
        potentials_path: ctx.config.relaxation.potentials_path.clone(),
        elements: input.type_labels(),
        frozen: input.frozen.clone(),
        surface_only: minimize.surface_only,
        coordination_cutoff: ctx.config.relaxation.coordination_cutoff,
        temperature: minimize.temperature,
        etol: minimize.etol,
        ftol: minimize.ftol,
        maxiter: minimize.maxiter,
        maxeval: minimize.maxeval,
    };
    write_text(&dir.join(RELAX_SCRIPT_FILE), |w| write_relax_script(&script, w))?;

    ctx.solvers.relax(dir)?;

    let frame = read_record::<DumpFile>(&dir.join(RELAXED_DUMP_FILE))?;
    let reassigned = reassign(
        &frame.atoms,
        &input,
        &reduced,
        ctx.registry,
        &ctx.config.relaxation.coordination,
    )?;
    let reclassified = DumpFrame {
        atoms: reassigned.iter().map(|a| a.to_relaxed()).collect(),
        ..frame
    };
    write_record::<DumpFile>(&reclassified, &dir.join(RECLASSIFIED_DUMP_FILE))?;

    let (merged, merge) = from_relaxation(&reassigned, &reduced)?;
    let relaxed_path = dir.join(RELAXED_MESH_FILE);
    write_record::<MeshFile>(&merged, &relaxed_path)?;

    Ok(CycleReport {
        cycle,
        events: reduction.events,
        removed: reduction.removed,
        relaxed: reassigned.len(),
        lost: merge.lost,
        atoms_remaining: merge.survivors,
        geometry: relaxed_path,
    })
}

fn write_text(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> Result<(), FormatError>,
) -> Result<(), EngineError> {
    let format_err = |source| EngineError::Format {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    write(&mut writer).map_err(format_err)?;
    writer.flush().map_err(|e| format_err(FormatError::Io(e)))
}
