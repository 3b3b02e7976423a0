use crate::cli::FromLammpsArgs;
use crate::config::{DefaultsConfig, build_coordination_policy, build_species, load_file_config};
use crate::error::{CliError, Result};
use std::collections::BTreeSet;
use tracing::info;
use vaporate::core::io::dump::{DumpFile, DumpFrame};
use vaporate::core::io::mesh::MeshFile;
use vaporate::core::models::relax::ReclassifiedAtom;
use vaporate::core::models::snapshot::GeometrySnapshot;
use vaporate::core::species::registry::SpeciesRegistry;
use vaporate::engine::bridge::{decode_reclassified, from_relaxation, to_relaxation};
use vaporate::engine::coordination::{CoordinationPolicy, reassign};
use vaporate::engine::error::EngineError;
use vaporate::engine::{read_record, write_record};

pub fn run(args: FromLammpsArgs) -> Result<()> {
    let original = read_record::<MeshFile>(&args.mesh)?;
    let frame = read_record::<DumpFile>(&args.dump)?;

    let reassigned = if args.reclassified_input {
        decode_reclassified(&frame).map_err(|e| CliError::FileParsing {
            path: args.dump.clone(),
            source: e.into(),
        })?
    } else {
        reassign_frame(&args, &original, frame)?
    };

    let (merged, report) = from_relaxation(&reassigned, &original)?;
    write_record::<MeshFile>(&merged, &args.output)?;

    println!(
        "Merged {} atoms and {} non-atom nodes ({} lost) into {}",
        report.survivors,
        report.reinserted,
        report.lost,
        args.output.display()
    );
    Ok(())
}

fn reassign_frame(
    args: &FromLammpsArgs,
    original: &GeometrySnapshot,
    frame: DumpFrame,
) -> Result<Vec<ReclassifiedAtom>> {
    let defaults = DefaultsConfig::default();
    let file_config = load_file_config(&args.config, &args.set_values)?;
    let registry = SpeciesRegistry::from_elements(&build_species(&file_config, &defaults))
        .map_err(EngineError::from)?;
    let policy = if args.no_reassign {
        CoordinationPolicy::untouched()
    } else {
        build_coordination_policy(
            file_config
                .relaxation
                .as_ref()
                .and_then(|r| r.coordination.as_ref()),
            &defaults,
        )?
    };

    // Atom order and types are reproduced exactly, so the surface set is irrelevant here.
    let input = to_relaxation(original, &registry, &BTreeSet::new())?;
    let reassigned = reassign(&frame.atoms, &input, original, &registry, &policy)?;

    if let Some(path) = &args.reclassified {
        let reclassified = DumpFrame {
            atoms: reassigned.iter().map(|a| a.to_relaxed()).collect(),
            ..frame
        };
        write_record::<DumpFile>(&reclassified, path)?;
        info!(file = %path.display(), "Wrote reassigned dump.");
    }
    Ok(reassigned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const MESH: &str = "ASCII 5 0 0\n\
        1e-10\t2e-10\t3e-10\t10\t0\n\
        0\t0\t0\t0\t0\n\
        4e-10\t5e-10\t6e-10\t11\t0\n\
        0\t1e-9\t0\t1\t0\n\
        0\t0\t1e-9\t2\t0\n\
        # 10=W 11=W\n";

    const DUMP: &str = "ITEM: TIMESTEP\n100\nITEM: NUMBER OF ATOMS\n2\n\
        ITEM: BOX BOUNDS pp pp pp\n-10 20\n-10 20\n-10 20\n\
        ITEM: ATOMS id x y z type c_cnum\n\
        1 1.5 2 3 1 0\n\
        2 4 5 6.5 1 3\n";

    fn args(dir: &Path) -> FromLammpsArgs {
        let config = dir.join("setup.toml");
        fs::write(&config, "").unwrap();
        let mesh = dir.join("mesh.txt");
        fs::write(&mesh, MESH).unwrap();
        let dump = dir.join("relaxed_emitter.lmp");
        fs::write(&dump, DUMP).unwrap();
        FromLammpsArgs {
            config,
            mesh,
            dump,
            output: dir.join("relaxed_emitter.txt"),
            no_reassign: false,
            reclassified_input: false,
            reclassified: Some(dir.join("reclassified_emitter.lmp")),
            set_values: vec![],
        }
    }

    #[test]
    fn merges_reassigned_atoms_with_vacuum_nodes() {
        let dir = tempdir().unwrap();
        run(args(dir.path())).unwrap();

        let text = fs::read_to_string(dir.path().join("relaxed_emitter.txt")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ASCII 4 0 0");
        assert_eq!(lines[1].split('\t').nth(3), Some("13"));
        assert_eq!(lines[2], "0\t0\t0\t0\t0");
        assert_eq!(lines[3], "0\t1e-9\t0\t1\t0");
        assert_eq!(lines[4], "0\t0\t1e-9\t2\t0");
        assert!(lines[5].starts_with("# 10=W"));

        let reclassified =
            fs::read_to_string(dir.path().join("reclassified_emitter.lmp")).unwrap();
        assert!(reclassified.contains(" 10x 0"));
        assert!(reclassified.contains(" 13 3"));
    }

    #[test]
    fn no_reassign_keeps_species() {
        let dir = tempdir().unwrap();
        let mut args = args(dir.path());
        args.no_reassign = true;
        args.reclassified = None;
        run(args).unwrap();

        let text = fs::read_to_string(dir.path().join("relaxed_emitter.txt")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ASCII 5 0 0");
        assert_eq!(lines[1].split('\t').nth(3), Some("10"));
        assert_eq!(lines[2].split('\t').nth(3), Some("11"));
    }

    #[test]
    fn atom_count_mismatch_is_reported() {
        let dir = tempdir().unwrap();
        let args = args(dir.path());
        fs::write(&args.mesh, "ASCII 1 0 0\n0\t0\t0\t10\t0\n").unwrap();
        let err = run(args).unwrap_err();
        assert!(matches!(
            err,
            CliError::Engine(EngineError::AtomCountMismatch { expected: 1, found: 2 })
        ));
    }

    #[test]
    fn reclassified_dump_is_merged_without_reassignment() {
        let dir = tempdir().unwrap();
        let first = args(dir.path());
        let reclassified = dir.path().join("reclassified_emitter.lmp");
        run(first).unwrap();

        let mut second = args(dir.path());
        second.dump = reclassified;
        second.reclassified_input = true;
        second.reclassified = None;
        second.output = dir.path().join("merged_again.txt");
        run(second).unwrap();

        let direct = fs::read_to_string(dir.path().join("relaxed_emitter.txt")).unwrap();
        let again = fs::read_to_string(dir.path().join("merged_again.txt")).unwrap();
        assert_eq!(again, direct);
        assert!(again.starts_with("ASCII 4 0 0\n"));
    }

    #[test]
    fn reclassified_input_rejects_unknown_type_tokens() {
        let dir = tempdir().unwrap();
        let mut args = args(dir.path());
        fs::write(&args.dump, DUMP.replace(" 1 3\n", " W 3\n")).unwrap();
        args.reclassified_input = true;
        args.reclassified = None;
        let err = run(args).unwrap_err();
        assert!(matches!(err, CliError::FileParsing { .. }));
    }
}
