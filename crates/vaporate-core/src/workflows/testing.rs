//! An in-process stand-in for the external solvers.

use super::{MESH_CONFIG_FILE, MESH_FILE, RELAX_DATA_FILE, RELAXED_DUMP_FILE};
use crate::core::io::dump::{DumpFile, DumpFrame};
use crate::core::io::lammps_data::LammpsDataFile;
use crate::core::io::mesh::MeshFile;
use crate::core::io::traits::TextFormat;
use crate::core::models::relax::RelaxedAtom;
use crate::core::species::registry::ElementSpec;
use crate::engine::config::{EventBudget, SimulationConfig, SimulationConfigBuilder};
use crate::engine::error::EngineError;
use crate::engine::solvers::ExternalSolvers;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Evaporates the first `per_step` atoms of each mesh and relaxes atoms in place.
pub(crate) struct FakeSolvers {
    per_step: usize,
    lost_per_relax: usize,
    fail_relax: bool,
    surface_limit: Option<usize>,
}

impl FakeSolvers {
    pub(crate) fn new(per_step: usize) -> Self {
        Self {
            per_step,
            lost_per_relax: 0,
            fail_relax: false,
            surface_limit: None,
        }
    }

    /// Reports a coordination of zero for the first `n` relaxed atoms.
    pub(crate) fn with_lost_per_relax(mut self, n: usize) -> Self {
        self.lost_per_relax = n;
        self
    }

    /// Marks only the first `n` atoms as surface in the final surface file, after an
    /// earlier surface file that marks every atom.
    pub(crate) fn with_surface_limit(mut self, n: usize) -> Self {
        self.surface_limit = Some(n);
        self
    }

    pub(crate) fn failing_relax(mut self) -> Self {
        self.fail_relax = true;
        self
    }
}

impl ExternalSolvers for FakeSolvers {
    fn generate_mesh(&self, dir: &Path, node_file: &Path) -> Result<(), EngineError> {
        fs::copy(dir.join(node_file), dir.join(MESH_FILE)).unwrap();
        fs::write(dir.join(MESH_CONFIG_FILE), "[template]\n").unwrap();
        Ok(())
    }

    fn evaporate(&self, dir: &Path) -> Result<(), EngineError> {
        let mesh = MeshFile::read_from_path(dir.join(MESH_FILE)).unwrap();
        let mut results = String::from("header\nASCII\n");
        let mut surface = String::from("h\nh\nh\nh\nh\n");
        let mut stale = surface.clone();
        for (n, (index, _)) in mesh.atoms().enumerate() {
            if n < self.per_step {
                writeln!(results, "{} 0.5 {} 0 0", n + 1, index).unwrap();
            }
            let on_surface = self.surface_limit.is_none_or(|limit| n < limit);
            writeln!(surface, "{} {}", index, if on_surface { 10 } else { 0 }).unwrap();
            writeln!(stale, "{} 10", index).unwrap();
        }
        fs::write(dir.join("tapsim.results_data.txt"), results).unwrap();
        if self.surface_limit.is_some() {
            fs::write(dir.join("tapsim.0000.surface_data.txt"), stale).unwrap();
        }
        fs::write(dir.join("tapsim.surface_data.txt"), surface).unwrap();
        Ok(())
    }

    fn relax(&self, dir: &Path) -> Result<(), EngineError> {
        if self.fail_relax {
            return Err(EngineError::Spawn {
                program: "lmp".into(),
                source: std::io::Error::other("relaxation unavailable"),
            });
        }
        let data = LammpsDataFile::read_from_path(dir.join(RELAX_DATA_FILE)).unwrap();
        let atoms = data
            .atoms
            .iter()
            .enumerate()
            .map(|(n, atom)| RelaxedAtom {
                local_index: atom.local_index,
                position: atom.position,
                type_token: atom.type_id.to_string(),
                coordination: Some(if n < self.lost_per_relax { 0 } else { 8 }),
            })
            .collect();
        let frame = DumpFrame {
            timestep: 1000,
            box_lines: Vec::new(),
            atoms,
        };
        DumpFile::write_to_path(&frame, dir.join(RELAXED_DUMP_FILE)).unwrap();
        Ok(())
    }
}

/// Writes a node file of `atoms` tungsten atoms followed by `vacuum` vacuum nodes.
pub(crate) fn write_node_file(dir: &Path, atoms: usize, vacuum: usize) -> PathBuf {
    let mut text = format!("ASCII {} 0 0\n", atoms + vacuum);
    for i in 0..atoms {
        writeln!(text, "{:e}\t0\t0\t18\t0", i as f64 * 2.7e-10).unwrap();
    }
    for i in 0..vacuum {
        writeln!(text, "0\t{:e}\t0\t{}\t0", (i + 1) as f64 * 1e-9, i % 4).unwrap();
    }
    let path = dir.join("emitter.txt");
    fs::write(&path, text).unwrap();
    path
}

pub(crate) fn config_for(
    node_file: PathBuf,
    total: EventBudget,
    per_step: EventBudget,
) -> SimulationConfig {
    let bins: BTreeMap<u32, f64> = (0..10).map(|b| (b, 57e-9 - b as f64 * 3e-9)).collect();
    SimulationConfigBuilder::new()
        .node_file(node_file)
        .elements(vec![ElementSpec {
            label: "W".into(),
            mass: 183.85,
            charge: 3,
            field_bins: bins,
        }])
        .tapsim_bin("tapsim".into())
        .meshgen_bin("meshgen".into())
        .total_events(total)
        .events_per_step(per_step)
        .lammps_bin("lmp".into())
        .potentials_path("library.meam".into())
        .build()
        .unwrap()
}
