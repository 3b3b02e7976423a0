use super::cycle::{self, CycleContext, CycleReport};
use super::{HISTORY_FILE, create_dir, setup, step_dir};
use crate::core::species::registry::SpeciesRegistry;
use crate::engine::config::SimulationConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::solvers::ExternalSolvers;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    BudgetReached,
    EmitterEmpty,
    MaxCycles,
    NoEvents,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::BudgetReached => "event budget reached",
            StopReason::EmitterEmpty => "no atoms remain",
            StopReason::MaxCycles => "cycle limit reached",
            StopReason::NoEvents => "evaporation produced no events",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub cycles: Vec<CycleReport>,
    /// Event budget resolved against the initial atom count.
    pub budget: usize,
    pub total_removed: usize,
    pub initial_atoms: usize,
    pub atoms_remaining: usize,
    pub final_geometry: PathBuf,
    pub stop: StopReason,
}

/// Runs setup followed by evaporation/relaxation cycles until a stop condition holds.
#[instrument(skip_all, name = "run_workflow", fields(workdir = %workdir.display()))]
pub fn run(
    workdir: &Path,
    config: &SimulationConfig,
    solvers: &dyn ExternalSolvers,
    reporter: &ProgressReporter,
) -> Result<RunSummary, EngineError> {
    let registry = SpeciesRegistry::from_elements(&config.emitter.elements)?;
    create_dir(workdir)?;

    reporter.report(Progress::PhaseStart { name: "Setup" });
    let setup = setup::run(workdir, config, &registry, solvers)?;
    reporter.report(Progress::PhaseFinish);

    let budget = config.evaporation.total_events.resolve(setup.atom_count);
    info!(
        budget,
        atoms = setup.atom_count,
        per_step = %config.evaporation.events_per_step,
        "Starting evaporation cycles."
    );

    let history_path = workdir.join(HISTORY_FILE);
    let history_err = |source| EngineError::History {
        path: history_path.clone(),
        source,
    };
    let mut history = csv::Writer::from_path(&history_path).map_err(history_err)?;

    let ctx = CycleContext {
        config,
        registry: &registry,
        solvers,
        mesh_config: &setup.mesh_config_path,
    };

    let mut reports: Vec<CycleReport> = Vec::new();
    let mut geometry = setup.mesh_path.clone();
    let mut atoms_remaining = setup.atom_count;
    let mut total_removed = 0;

    let stop = loop {
        if atoms_remaining == 0 {
            break StopReason::EmitterEmpty;
        }
        if total_removed >= budget {
            break StopReason::BudgetReached;
        }
        if config.run.max_cycles.is_some_and(|max| reports.len() >= max) {
            break StopReason::MaxCycles;
        }

        let number = reports.len() + 1;
        reporter.report(Progress::CycleStart {
            cycle: number,
            total_events: budget,
        });
        let report = cycle::run(&ctx, number, &geometry, &step_dir(workdir, number))?;

        history.serialize(&report).map_err(history_err)?;
        history
            .flush()
            .map_err(|e| history_err(csv::Error::from(e)))?;

        total_removed += report.removed;
        atoms_remaining = report.atoms_remaining;
        geometry = report.geometry.clone();
        info!(
            cycle = number,
            removed = report.removed,
            lost = report.lost,
            atoms = report.atoms_remaining,
            total_removed,
            "Cycle complete."
        );
        reporter.report(Progress::CycleFinish {
            removed_so_far: total_removed,
        });

        if config.run.cleanup && number > 1 {
            remove_step(&step_dir(workdir, number - 1))?;
        }

        let no_events = report.events == 0;
        reports.push(report);
        if no_events {
            warn!(cycle = number, "Evaporation produced no events; stopping.");
            break StopReason::NoEvents;
        }
    };

    info!(%stop, cycles = reports.len(), total_removed, "Run finished.");
    Ok(RunSummary {
        cycles: reports,
        budget,
        total_removed,
        initial_atoms: setup.atom_count,
        atoms_remaining,
        final_geometry: geometry,
        stop,
    })
}

fn remove_step(dir: &Path) -> Result<(), EngineError> {
    fs::remove_dir_all(dir).map_err(|source| EngineError::Io {
        path: dir.to_path_buf(),
        source,
    })
}
