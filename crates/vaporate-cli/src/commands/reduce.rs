use crate::cli::ReduceArgs;
use crate::error::{CliError, Result};
use std::fs::File;
use std::io::BufReader;
use tracing::info;
use vaporate::core::io::events::read_events;
use vaporate::core::io::mesh::MeshFile;
use vaporate::engine::reducer::remove_evaporated;
use vaporate::engine::{read_record, write_record};

pub fn run(args: ReduceArgs) -> Result<()> {
    let snapshot = read_record::<MeshFile>(&args.mesh)?;

    let mut events = Vec::new();
    for path in &args.results {
        let mut reader = BufReader::new(File::open(path)?);
        let batch = read_events(&mut reader).map_err(|e| CliError::FileParsing {
            path: path.clone(),
            source: e.into(),
        })?;
        info!(file = %path.display(), events = batch.len(), "Read evaporation events.");
        events.extend(batch);
    }

    let (reduced, report) = remove_evaporated(&snapshot, &events)?;
    write_record::<MeshFile>(&reduced, &args.output)?;

    println!(
        "Removed {} node(s) from {} event(s); {} atoms remain. Written to {}",
        report.removed,
        report.events,
        reduced.atom_count(),
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reduce_marks_events_inert() {
        let dir = tempdir().unwrap();
        let mesh = dir.path().join("mesh.txt");
        fs::write(
            &mesh,
            "ASCII 3 0 0\n1e-10\t0\t0\t10\t0\n0\t0\t0\t1\t0\n2e-10\t0\t0\t11\t0\n# 10=W 11=W\n",
        )
        .unwrap();
        let results = dir.path().join("results_data.txt");
        fs::write(&results, "header\nASCII\n1 0.1 3 0\n2 0.2 3 0\n").unwrap();
        let output = dir.path().join("updated.txt");

        run(ReduceArgs {
            mesh,
            results: vec![results],
            output: output.clone(),
        })
        .unwrap();

        let text = fs::read_to_string(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ASCII 3 0 0");
        assert_eq!(lines[1], "1e-10\t0\t0\t10\t0");
        assert_eq!(lines[3], "2e-10\t0e0\t0e0\t0\t0");
        assert_eq!(lines[4], "# 10=W 11=W");
    }

    #[test]
    fn results_without_marker_fail() {
        let dir = tempdir().unwrap();
        let mesh = dir.path().join("mesh.txt");
        fs::write(&mesh, "ASCII 1 0 0\n0\t0\t0\t10\t0\n").unwrap();
        let results = dir.path().join("results_data.txt");
        fs::write(&results, "1 0.1 1 0\n").unwrap();

        let err = run(ReduceArgs {
            mesh,
            results: vec![results],
            output: dir.path().join("out.txt"),
        })
        .unwrap_err();
        assert!(matches!(err, CliError::FileParsing { .. }));
    }
}
