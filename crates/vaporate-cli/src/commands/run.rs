use crate::cli::RunArgs;
use crate::config::build_run_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use tracing::info;
use vaporate::engine::progress::ProgressReporter;
use vaporate::engine::solvers::ProcessSolvers;
use vaporate::workflows;

pub fn run(args: RunArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app = build_run_config(&args)?;
    let solvers = ProcessSolvers::from_config(&app.core_config);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Starting evaporation run in {}...", app.workdir.display());
    let summary = workflows::run::run(&app.workdir, &app.core_config, &solvers, &reporter)?;

    let lost: usize = summary.cycles.iter().map(|c| c.lost).sum();
    println!(
        "Run finished after {} cycle(s): {}.",
        summary.cycles.len(),
        summary.stop
    );
    println!(
        "  Evaporated {} of {} atoms (budget {}), {} lost during relaxation, {} remaining.",
        summary.total_removed, summary.initial_atoms, summary.budget, lost, summary.atoms_remaining
    );
    println!("  Final geometry: {}", summary.final_geometry.display());
    Ok(())
}
