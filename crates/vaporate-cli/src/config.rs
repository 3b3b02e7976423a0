//! Setup-file loading and the merge of file values, `-S` overrides, CLI flags and defaults.

mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{
    build_coordination_policy, build_minimize_config, build_run_config, build_species,
    load_file_config, resolve_file_path,
};
pub use defaults::DefaultsConfig;
