//! The relaxation solver's input script.

use super::error::FormatError;
use std::io::Write;
use std::path::PathBuf;

/// Name of the per-atom coordination compute referenced by the dump.
pub const COORDINATION_COMPUTE: &str = "cnum";

/// Everything the relaxation script needs, resolved to concrete values.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxScript {
    pub data_file: String,
    pub dump_file: String,
    pub potentials_path: PathBuf,
    /// Element labels in atom-type order.
    pub elements: Vec<String>,
    /// Local indices held static during minimization.
    pub frozen: Vec<usize>,
    pub surface_only: bool,
    pub coordination_cutoff: f64,
    pub temperature: f64,
    pub etol: f64,
    pub ftol: f64,
    pub maxiter: usize,
    pub maxeval: usize,
}

pub fn write_relax_script(script: &RelaxScript, writer: &mut impl Write) -> Result<(), FormatError> {
    let elements = script.elements.join(" ");

    writeln!(writer, "# Emitter Relaxation")?;
    writeln!(writer)?;
    writeln!(writer, "units real")?;
    writeln!(writer, "atom_style atomic")?;
    writeln!(writer)?;
    writeln!(writer, "read_data {}", script.data_file)?;
    writeln!(writer)?;
    writeln!(writer, "pair_style meam/c")?;
    writeln!(
        writer,
        "pair_coeff * * {} {} NULL {}",
        script.potentials_path.display(),
        elements,
        elements
    )?;
    writeln!(writer)?;
    writeln!(writer, "neighbor 1.0 bin")?;
    if script.surface_only && !script.frozen.is_empty() {
        let ids: Vec<String> = script.frozen.iter().map(|i| i.to_string()).collect();
        writeln!(writer, "group inner id {}", ids.join(" "))?;
        writeln!(writer, "velocity inner set 0 0 0")?;
        writeln!(writer, "fix frozen inner setforce 0 0 0")?;
        writeln!(writer)?;
    }
    writeln!(
        writer,
        "compute {} all coord/atom cutoff {}",
        COORDINATION_COMPUTE, script.coordination_cutoff
    )?;
    writeln!(
        writer,
        "fix 1 all nvt temp {} {} 100.0",
        script.temperature, script.temperature
    )?;
    writeln!(
        writer,
        "minimize {} {} {} {}",
        script.etol, script.ftol, script.maxiter, script.maxeval
    )?;
    writeln!(
        writer,
        "write_dump all custom {} id x y z type c_{}",
        script.dump_file, COORDINATION_COMPUTE
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script() -> RelaxScript {
        RelaxScript {
            data_file: "data.emitter".into(),
            dump_file: "relaxed_emitter.lmp".into(),
            potentials_path: PathBuf::from("/opt/potentials/library.meam"),
            elements: vec!["W".into(), "Re".into()],
            frozen: vec![1, 4, 7],
            surface_only: true,
            coordination_cutoff: 3.0,
            temperature: 50.0,
            etol: 1e-8,
            ftol: 1e-8,
            maxiter: 1000,
            maxeval: 1000,
        }
    }

    fn render(script: &RelaxScript) -> String {
        let mut out = Vec::new();
        write_relax_script(script, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn script_maps_types_and_freezes_inner_atoms() {
        let text = render(&script());
        assert!(text.contains("read_data data.emitter\n"));
        assert!(text.contains("pair_coeff * * /opt/potentials/library.meam W Re NULL W Re\n"));
        assert!(text.contains("group inner id 1 4 7\n"));
        assert!(text.contains("fix frozen inner setforce 0 0 0\n"));
        assert!(text.contains("compute cnum all coord/atom cutoff 3\n"));
        assert!(text.contains("minimize 0.00000001 0.00000001 1000 1000\n"));
        assert!(text.ends_with("write_dump all custom relaxed_emitter.lmp id x y z type c_cnum\n"));
    }

    #[test]
    fn frozen_group_is_omitted_when_all_atoms_relax() {
        let mut s = script();
        s.surface_only = false;
        assert!(!render(&s).contains("group inner"));

        let mut s = script();
        s.frozen.clear();
        assert!(!render(&s).contains("group inner"));
    }
}
