use crate::cli::ToLammpsArgs;
use crate::config::{
    DefaultsConfig, build_minimize_config, build_species, load_file_config, resolve_file_path,
};
use crate::error::{CliError, Result};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;
use vaporate::core::io::error::FormatError;
use vaporate::core::io::lammps_data::{LammpsDataFile, write_index_list};
use vaporate::core::io::lammps_input::{RelaxScript, write_relax_script};
use vaporate::core::io::mesh::MeshFile;
use vaporate::core::io::surface::read_surface_nodes;
use vaporate::core::species::registry::SpeciesRegistry;
use vaporate::engine::bridge::to_relaxation;
use vaporate::engine::error::EngineError;
use vaporate::engine::{read_record, write_record};

const DUMP_FILE: &str = "relaxed_emitter.lmp";

pub fn run(args: ToLammpsArgs) -> Result<()> {
    let defaults = DefaultsConfig::default();
    let file_config = load_file_config(&args.config, &args.set_values)?;
    let registry = SpeciesRegistry::from_elements(&build_species(&file_config, &defaults))
        .map_err(EngineError::from)?;

    let snapshot = read_record::<MeshFile>(&args.mesh)?;
    let surface: BTreeSet<usize> = match &args.surface {
        Some(path) => {
            let mut reader = BufReader::new(File::open(path)?);
            read_surface_nodes(&mut reader).map_err(|e| CliError::FileParsing {
                path: path.clone(),
                source: e.into(),
            })?
        }
        None => snapshot.atoms().map(|(index, _)| index).collect(),
    };

    let input = to_relaxation(&snapshot, &registry, &surface)?;
    write_record::<LammpsDataFile>(&input.data, &args.output)?;
    write_text(&args.fixed, |w| write_index_list(&input.frozen, w))?;
    info!(
        atoms = input.data.atoms.len(),
        frozen = input.frozen.len(),
        "Wrote relaxation data."
    );

    if let Some(script_path) = &args.script {
        let relaxation = file_config.relaxation.as_ref();
        let potentials = relaxation
            .and_then(|r| r.potentials.as_deref())
            .unwrap_or(&defaults.potentials);
        let minimize = build_minimize_config(relaxation.and_then(|r| r.minimize.as_ref()), &defaults);
        let script = RelaxScript {
            data_file: file_name(&args.output),
            dump_file: DUMP_FILE.to_string(),
            potentials_path: resolve_file_path(potentials)?,
            elements: input.type_labels(),
            frozen: input.frozen.clone(),
            surface_only: minimize.surface_only,
            coordination_cutoff: relaxation
                .and_then(|r| r.coordination_cutoff)
                .unwrap_or(defaults.coordination_cutoff),
            temperature: minimize.temperature,
            etol: minimize.etol,
            ftol: minimize.ftol,
            maxiter: minimize.maxiter,
            maxeval: minimize.maxeval,
        };
        write_text(script_path, |w| write_relax_script(&script, w))?;
    }

    println!(
        "Converted {} atoms ({} held static) to {}",
        input.data.atoms.len(),
        input.frozen.len(),
        args.output.display()
    );
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn write_text(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> std::result::Result<(), FormatError>,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write(&mut writer).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    writer.flush()?;
    Ok(())
}
