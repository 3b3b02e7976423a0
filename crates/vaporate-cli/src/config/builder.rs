use super::defaults::DefaultsConfig;
use super::file::{
    FileBandAction, FileConfig, FileCoordinationConfig, FileElementConfig, FileEventBudget,
    FileMinimizeConfig,
};
use super::models::AppConfig;
use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use vaporate::core::species::registry::ElementSpec;
use vaporate::engine::config::{EventBudget, MinimizeConfig, SimulationConfigBuilder};
use vaporate::engine::coordination::{CoordinationAction, CoordinationBand, CoordinationPolicy};

pub fn build_run_config(args: &RunArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();
    let file_config = FileConfig::from_file(&args.config)?;
    let file_config = apply_set_values(file_config, &args.set_values)?;

    let emitter = file_config.emitter.as_ref();
    let node_file = emitter
        .and_then(|e| e.node_file.as_deref())
        .ok_or_else(|| CliError::Config("`emitter.node-file` is required.".to_string()))?;
    let elements = build_species(&file_config, &defaults);

    let evaporation = file_config.evaporation.as_ref();
    let tapsim_bin = evaporation
        .and_then(|e| e.tapsim_bin.as_deref())
        .unwrap_or(&defaults.tapsim_bin);
    let meshgen_bin = evaporation
        .and_then(|e| e.meshgen_bin.as_deref())
        .unwrap_or(&defaults.meshgen_bin);
    let meshgen_ini = evaporation
        .and_then(|e| e.meshgen_ini.as_deref())
        .map(resolve_file_path)
        .transpose()?;
    let total_events = parse_budget(
        evaporation.and_then(|e| e.total_events.as_ref()),
        &defaults.total_events,
        "evaporation.total-events",
    )?;
    let events_per_step = parse_budget(
        evaporation.and_then(|e| e.events_per_step.as_ref()),
        &defaults.events_per_step,
        "evaporation.events-per-step",
    )?;

    let relaxation = file_config.relaxation.as_ref();
    let lammps_bin = relaxation
        .and_then(|r| r.lammps_bin.as_deref())
        .unwrap_or(&defaults.lammps_bin);
    let potentials = relaxation
        .and_then(|r| r.potentials.as_deref())
        .unwrap_or(&defaults.potentials);
    let coordination_cutoff = relaxation
        .and_then(|r| r.coordination_cutoff)
        .unwrap_or(defaults.coordination_cutoff);
    let minimize = build_minimize_config(relaxation.and_then(|r| r.minimize.as_ref()), &defaults);
    let coordination = build_coordination_policy(
        relaxation.and_then(|r| r.coordination.as_ref()),
        &defaults,
    )?;

    let cleanup = args.cleanup || file_config.cleanup.unwrap_or(defaults.cleanup);
    let max_cycles = args.max_cycles.or(file_config.max_cycles);

    let core_config = SimulationConfigBuilder::new()
        .node_file(resolve_file_path(node_file)?)
        .elements(elements)
        .tapsim_bin(resolve_program(tapsim_bin)?)
        .meshgen_bin(resolve_program(meshgen_bin)?)
        .meshgen_ini(meshgen_ini)
        .total_events(total_events)
        .events_per_step(events_per_step)
        .lammps_bin(resolve_program(lammps_bin)?)
        .potentials_path(resolve_file_path(potentials)?)
        .coordination_cutoff(coordination_cutoff)
        .minimize(minimize)
        .coordination_policy(coordination)
        .max_cycles(max_cycles)
        .cleanup(cleanup)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        workdir: args.workdir.clone(),
        core_config,
    })
}

/// The configured elements, or the default element when the file lists none.
pub fn build_species(file_config: &FileConfig, defaults: &DefaultsConfig) -> Vec<ElementSpec> {
    let elements = file_config
        .emitter
        .as_ref()
        .map(|e| e.elements.as_slice())
        .unwrap_or_default();
    if elements.is_empty() {
        let d = &defaults.element;
        return vec![element_spec(&d.label, d.mass, d.charge, &d.e_fields)];
    }
    elements
        .iter()
        .map(|FileElementConfig { label, mass, charge, e_fields }| {
            element_spec(label, *mass, *charge, e_fields)
        })
        .collect()
}

fn element_spec(label: &str, mass: f64, charge: i32, e_fields: &[f64]) -> ElementSpec {
    ElementSpec {
        label: label.to_string(),
        mass,
        charge,
        field_bins: e_fields
            .iter()
            .enumerate()
            .map(|(bin, &field)| (bin as u32, field))
            .collect(),
    }
}

pub fn build_minimize_config(
    file_val: Option<&FileMinimizeConfig>,
    defaults: &DefaultsConfig,
) -> MinimizeConfig {
    let empty = FileMinimizeConfig::default();
    let file_val = file_val.unwrap_or(&empty);
    MinimizeConfig {
        surface_only: file_val.surface_only.unwrap_or(defaults.surface_only),
        etol: file_val.etol.unwrap_or(defaults.etol),
        ftol: file_val.ftol.unwrap_or(defaults.ftol),
        maxiter: file_val.maxiter.unwrap_or(defaults.maxiter),
        maxeval: file_val.maxeval.unwrap_or(defaults.maxeval),
        temperature: file_val.temperature.unwrap_or(defaults.temperature),
    }
}

pub fn build_coordination_policy(
    file_val: Option<&FileCoordinationConfig>,
    defaults: &DefaultsConfig,
) -> Result<CoordinationPolicy> {
    let Some(file_val) = file_val else {
        return Ok(CoordinationPolicy::bulk_cutoff(defaults.bulk_coordination));
    };
    let chosen = [
        file_val.bulk.is_some(),
        file_val.bands.is_some(),
        file_val.untouched == Some(true),
    ]
    .iter()
    .filter(|set| **set)
    .count();
    if chosen > 1 {
        return Err(CliError::Config(
            "`relaxation.coordination` accepts only one of `bulk`, `bands` or `untouched`."
                .to_string(),
        ));
    }

    if file_val.untouched == Some(true) {
        return Ok(CoordinationPolicy::untouched());
    }
    if let Some(bands) = &file_val.bands {
        let mut converted = Vec::with_capacity(bands.len());
        for band in bands {
            let action = match band.action {
                FileBandAction::Lost => CoordinationAction::Lost,
                FileBandAction::MatchCoordination => CoordinationAction::MatchCoordination,
                FileBandAction::Bin => CoordinationAction::Bin(band.bin.ok_or_else(|| {
                    CliError::Config(format!(
                        "coordination band starting at {} has `action = \"bin\"` but no `bin`",
                        band.min
                    ))
                })?),
            };
            converted.push(CoordinationBand {
                min: band.min,
                max: band.max,
                action,
            });
        }
        return CoordinationPolicy::new(converted).map_err(|e| CliError::Config(e.to_string()));
    }
    Ok(CoordinationPolicy::bulk_cutoff(
        file_val.bulk.unwrap_or(defaults.bulk_coordination),
    ))
}

fn parse_budget(
    file_val: Option<&FileEventBudget>,
    default_val: &str,
    key: &str,
) -> Result<EventBudget> {
    let text = file_val
        .map(FileEventBudget::as_text)
        .unwrap_or_else(|| default_val.to_string());
    EventBudget::from_str(&text).map_err(|e| CliError::Config(format!("{}: {}", key, e)))
}

/// Expands a leading `~` to the user's home directory.
fn expand_home(raw: &str) -> Result<PathBuf> {
    expand_home_with(raw, dirs::home_dir)
}

fn expand_home_with(raw: &str, home_dir: impl FnOnce() -> Option<PathBuf>) -> Result<PathBuf> {
    match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            let home = home_dir().ok_or_else(|| {
                CliError::Config(format!(
                    "cannot expand '{}': home directory could not be determined",
                    raw
                ))
            })?;
            Ok(home.join(rest.trim_start_matches('/')))
        }
        _ => Ok(PathBuf::from(raw)),
    }
}

/// Data files are read from inside the step directories, so relative paths are anchored
/// to the current directory.
pub fn resolve_file_path(raw: &str) -> Result<PathBuf> {
    let path = expand_home(raw)?;
    if path.is_absolute() {
        return Ok(path);
    }
    Ok(std::env::current_dir()?.join(path))
}

/// Bare program names are left for `PATH` lookup; anything with a directory part is anchored.
fn resolve_program(raw: &str) -> Result<PathBuf> {
    let path = expand_home(raw)?;
    if path.is_absolute() || path.components().count() == 1 {
        return Ok(path);
    }
    Ok(std::env::current_dir()?.join(path))
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value))
    })
}

pub fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        match key {
            "cleanup" => config.cleanup = Some(parse_value(key, value)?),
            "max-cycles" => config.max_cycles = Some(parse_value(key, value)?),
            "emitter.node-file" => {
                config.emitter.get_or_insert_with(Default::default).node_file =
                    Some(value.to_string());
            }
            "evaporation.tapsim-bin"
            | "evaporation.meshgen-bin"
            | "evaporation.meshgen-ini"
            | "evaporation.total-events"
            | "evaporation.events-per-step" => {
                let evaporation = config.evaporation.get_or_insert_with(Default::default);
                let text = Some(value.to_string());
                match key {
                    "evaporation.tapsim-bin" => evaporation.tapsim_bin = text,
                    "evaporation.meshgen-bin" => evaporation.meshgen_bin = text,
                    "evaporation.meshgen-ini" => evaporation.meshgen_ini = text,
                    "evaporation.total-events" => {
                        evaporation.total_events = Some(FileEventBudget::Text(value.to_string()))
                    }
                    _ => {
                        evaporation.events_per_step = Some(FileEventBudget::Text(value.to_string()))
                    }
                }
            }
            "relaxation.lammps-bin" => {
                config.relaxation.get_or_insert_with(Default::default).lammps_bin =
                    Some(value.to_string());
            }
            "relaxation.potentials" => {
                config.relaxation.get_or_insert_with(Default::default).potentials =
                    Some(value.to_string());
            }
            "relaxation.coordination-cutoff" => {
                config
                    .relaxation
                    .get_or_insert_with(Default::default)
                    .coordination_cutoff = Some(parse_value(key, value)?);
            }
            "relaxation.coordination.bulk" => {
                config
                    .relaxation
                    .get_or_insert_with(Default::default)
                    .coordination
                    .get_or_insert_with(Default::default)
                    .bulk = Some(parse_value(key, value)?);
            }
            _ if key.starts_with("relaxation.minimize.") => {
                let minimize = config
                    .relaxation
                    .get_or_insert_with(Default::default)
                    .minimize
                    .get_or_insert_with(Default::default);
                match &key["relaxation.minimize.".len()..] {
                    "surface-only" => minimize.surface_only = Some(parse_value(key, value)?),
                    "etol" => minimize.etol = Some(parse_value(key, value)?),
                    "ftol" => minimize.ftol = Some(parse_value(key, value)?),
                    "maxiter" => minimize.maxiter = Some(parse_value(key, value)?),
                    "maxeval" => minimize.maxeval = Some(parse_value(key, value)?),
                    "temperature" => minimize.temperature = Some(parse_value(key, value)?),
                    _ => return Err(unsupported_key(key)),
                }
            }
            _ => return Err(unsupported_key(key)),
        }
    }
    Ok(config)
}

fn unsupported_key(key: &str) -> CliError {
    CliError::Config(format!("Unsupported configuration key for --set: '{}'", key))
}

/// Loads a setup file and applies `-S` overrides on top of it.
pub fn load_file_config(path: &Path, set_values: &[String]) -> Result<FileConfig> {
    apply_set_values(FileConfig::from_file(path)?, set_values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn run_args(config: PathBuf) -> RunArgs {
        RunArgs {
            config,
            workdir: PathBuf::from("work"),
            max_cycles: None,
            cleanup: false,
            set_values: vec![],
        }
    }

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("setup.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn build_config_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            [emitter]
            node-file = "/data/emitter.txt"
            "#,
        );

        let app = build_run_config(&run_args(path)).expect("build ok");
        let cfg = app.core_config;
        let defaults = DefaultsConfig::default();

        assert_eq!(app.workdir, PathBuf::from("work"));
        assert_eq!(cfg.emitter.node_file, PathBuf::from("/data/emitter.txt"));
        assert_eq!(cfg.emitter.elements.len(), 1);
        assert_eq!(cfg.emitter.elements[0].label, "W");
        assert_eq!(cfg.emitter.elements[0].field_bins.len(), 10);
        assert_eq!(cfg.evaporation.total_events, EventBudget::Percent(100.0));
        assert_eq!(cfg.evaporation.events_per_step, EventBudget::Percent(10.0));
        assert_eq!(cfg.relaxation.coordination_cutoff, defaults.coordination_cutoff);
        assert_eq!(cfg.relaxation.minimize.maxiter, defaults.maxiter);
        assert!(cfg.relaxation.minimize.surface_only);
        assert_eq!(cfg.relaxation.coordination, CoordinationPolicy::default());
        assert!(!cfg.run.cleanup);
        assert_eq!(cfg.run.max_cycles, None);
    }

    #[test]
    fn file_values_and_cli_flags_merge() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            cleanup = false
            max-cycles = 4

            [emitter]
            node-file = "/data/emitter.txt"
            [[emitter.elements]]
            label = "Mo"
            mass = 95.95
            charge = 2
            e-fields = [40e-9, 30e-9, 20e-9]

            [evaporation]
            tapsim-bin = "/opt/tapsim"
            total-events = 300
            events-per-step = "5%"

            [relaxation]
            lammps-bin = "lmp_serial"
            potentials = "/pot/library.meam"
            [relaxation.minimize]
            temperature = 10.0
            [relaxation.coordination]
            untouched = true
            "#,
        );
        let mut args = run_args(path);
        args.max_cycles = Some(2);
        args.cleanup = true;

        let cfg = build_run_config(&args).expect("build ok").core_config;

        assert_eq!(cfg.emitter.elements[0].label, "Mo");
        assert_eq!(cfg.emitter.elements[0].field_bins.get(&2), Some(&20e-9));
        assert_eq!(cfg.evaporation.tapsim_bin, PathBuf::from("/opt/tapsim"));
        assert_eq!(cfg.evaporation.total_events, EventBudget::Count(300));
        assert_eq!(cfg.evaporation.events_per_step, EventBudget::Percent(5.0));
        assert_eq!(cfg.relaxation.lammps_bin, PathBuf::from("lmp_serial"));
        assert_eq!(cfg.relaxation.potentials_path, PathBuf::from("/pot/library.meam"));
        assert_eq!(cfg.relaxation.minimize.temperature, 10.0);
        assert!(cfg.relaxation.coordination.is_untouched());
        assert_eq!(cfg.run.max_cycles, Some(2));
        assert!(cfg.run.cleanup);
    }

    #[test]
    fn set_values_override_file() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "[emitter]\nnode-file = \"/data/emitter.txt\"\n[evaporation]\nevents-per-step = 3\n",
        );
        let mut args = run_args(path);
        args.set_values = vec![
            "evaporation.events-per-step=20%".to_string(),
            "relaxation.minimize.surface-only=false".to_string(),
            "relaxation.minimize.etol=1e-6".to_string(),
            "relaxation.coordination.bulk=12".to_string(),
            "relaxation.coordination-cutoff=3.5".to_string(),
            "max-cycles=9".to_string(),
        ];

        let cfg = build_run_config(&args).expect("build ok").core_config;

        assert_eq!(cfg.evaporation.events_per_step, EventBudget::Percent(20.0));
        assert!(!cfg.relaxation.minimize.surface_only);
        assert!((cfg.relaxation.minimize.etol - 1e-6).abs() < 1e-18);
        assert_eq!(cfg.relaxation.coordination, CoordinationPolicy::bulk_cutoff(12));
        assert_eq!(cfg.relaxation.coordination_cutoff, 3.5);
        assert_eq!(cfg.run.max_cycles, Some(9));
    }

    #[test]
    fn invalid_set_values_are_rejected() {
        let config = FileConfig::default();
        assert!(apply_set_values(FileConfig::default(), &["nokey".into()]).is_err());
        assert!(apply_set_values(config, &["emitter.radius=5".into()]).is_err());
        assert!(
            apply_set_values(FileConfig::default(), &["relaxation.minimize.maxiter=x".into()])
                .is_err()
        );
        assert!(
            apply_set_values(FileConfig::default(), &["relaxation.minimize.steps=1".into()])
                .is_err()
        );
    }

    #[test]
    fn missing_node_file_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), "cleanup = true\n");
        let result = build_run_config(&run_args(path));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn bad_budget_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "[emitter]\nnode-file = \"/e.txt\"\n[evaporation]\ntotal-events = \"lots\"\n",
        );
        let result = build_run_config(&run_args(path));
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("total-events")));
    }

    #[test]
    fn coordination_bands_are_converted() {
        let file = FileConfig::from_toml(
            r#"
            [relaxation.coordination]
            bands = [
                { min = 0, max = 1, action = "lost" },
                { min = 2, max = 5, action = "match-coordination" },
                { min = 6, max = 7, action = "bin", bin = 9 },
            ]
            "#,
        )
        .unwrap();
        let policy = build_coordination_policy(
            file.relaxation.as_ref().and_then(|r| r.coordination.as_ref()),
            &DefaultsConfig::default(),
        )
        .unwrap();
        assert_eq!(policy.classify(1), Some(CoordinationAction::Lost));
        assert_eq!(policy.classify(4), Some(CoordinationAction::MatchCoordination));
        assert_eq!(policy.classify(7), Some(CoordinationAction::Bin(9)));
        assert_eq!(policy.classify(8), None);
    }

    #[test]
    fn conflicting_coordination_settings_are_rejected() {
        let file = FileConfig::from_toml(
            "[relaxation.coordination]\nbulk = 8\nuntouched = true\n",
        )
        .unwrap();
        let result = build_coordination_policy(
            file.relaxation.as_ref().and_then(|r| r.coordination.as_ref()),
            &DefaultsConfig::default(),
        );
        assert!(result.is_err());

        let missing_bin = FileConfig::from_toml(
            "[relaxation.coordination]\nbands = [{ min = 0, action = \"bin\" }]\n",
        )
        .unwrap();
        let result = build_coordination_policy(
            missing_bin.relaxation.as_ref().and_then(|r| r.coordination.as_ref()),
            &DefaultsConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn home_and_relative_paths_are_resolved() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/bin/lmp").unwrap(), home.join("bin/lmp"));
            assert_eq!(expand_home("~").unwrap(), home);
        }
        assert_eq!(expand_home("/abs/~x").unwrap(), PathBuf::from("/abs/~x"));
        assert_eq!(resolve_program("lmp").unwrap(), PathBuf::from("lmp"));
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(resolve_program("bin/lmp").unwrap(), cwd.join("bin/lmp"));
        assert_eq!(resolve_file_path("library.meam").unwrap(), cwd.join("library.meam"));
    }

    #[test]
    fn home_expansion_uses_the_resolved_home_directory() {
        let home = || Some(PathBuf::from("/home/alice"));
        assert_eq!(
            expand_home_with("~/bin/tapsim", home).unwrap(),
            PathBuf::from("/home/alice/bin/tapsim")
        );
        assert_eq!(
            expand_home_with("~user/bin", home).unwrap(),
            PathBuf::from("~user/bin")
        );

        let err = expand_home_with("~/bin/lmp", || None).unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("~/bin/lmp")));
        assert_eq!(
            expand_home_with("/opt/lmp", || None).unwrap(),
            PathBuf::from("/opt/lmp")
        );
    }
}
