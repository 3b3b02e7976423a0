use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Vaporate developers",
    version,
    about = "Vaporate - iterative field-evaporation simulations alternating an evaporation solver (TAPSim) with atomistic relaxation (LAMMPS).",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full evaporate/relax loop.
    Run(RunArgs),
    /// Apply evaporation result files to a mesh.
    Reduce(ReduceArgs),
    /// Convert a mesh's atoms into a LAMMPS data file and a fixed-atom list.
    ToLammps(ToLammpsArgs),
    /// Merge a relaxed LAMMPS dump back into a mesh.
    FromLammps(FromLammpsArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the setup file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Directory that receives the step directories and the history.
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    pub workdir: PathBuf,

    /// Stop after this many cycles even if the event budget is not spent.
    #[arg(long, value_name = "INT")]
    pub max_cycles: Option<usize>,

    /// Delete each step directory once the next step has consumed it, overriding the config file.
    #[arg(long)]
    pub cleanup: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S evaporation.events-per-step=5%
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `reduce` subcommand.
#[derive(Args, Debug)]
pub struct ReduceArgs {
    /// Mesh file the events refer to.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub mesh: PathBuf,

    /// One or more evaporation result files.
    #[arg(short, long, required = true, num_args(1..), value_name = "PATH")]
    pub results: Vec<PathBuf>,

    /// Path for the reduced mesh.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

/// Arguments for the `to-lammps` subcommand.
#[derive(Args, Debug)]
pub struct ToLammpsArgs {
    /// Path to the setup file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Mesh file to convert.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub mesh: PathBuf,

    /// Surface classification file; without it every atom is free to move.
    #[arg(short, long, value_name = "PATH")]
    pub surface: Option<PathBuf>,

    /// Path for the LAMMPS data file.
    #[arg(short, long, default_value = "data.emitter", value_name = "PATH")]
    pub output: PathBuf,

    /// Path for the fixed-atom list.
    #[arg(long, default_value = "fixed_indices.txt", value_name = "PATH")]
    pub fixed: PathBuf,

    /// Also write the relaxation input script to this path.
    #[arg(long, value_name = "PATH")]
    pub script: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `from-lammps` subcommand.
#[derive(Args, Debug)]
pub struct FromLammpsArgs {
    /// Path to the setup file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// The mesh the dump was converted from.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub mesh: PathBuf,

    /// Relaxed LAMMPS dump.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub dump: PathBuf,

    /// Path for the merged mesh.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Keep every atom's species instead of reassigning by coordination number.
    #[arg(long)]
    pub no_reassign: bool,

    /// Treat the dump as already reassigned: its type column holds category codes,
    /// with an `x` suffix on lost atoms.
    #[arg(long, conflicts_with_all = ["no_reassign", "reclassified"])]
    pub reclassified_input: bool,

    /// Also write the reassigned dump to this path.
    #[arg(long, value_name = "PATH")]
    pub reclassified: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
