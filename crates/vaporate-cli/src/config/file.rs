use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// An event budget as written in the setup file: `250` or `"10%"`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum FileEventBudget {
    Count(usize),
    Text(String),
}

impl FileEventBudget {
    pub fn as_text(&self) -> String {
        match self {
            FileEventBudget::Count(n) => n.to_string(),
            FileEventBudget::Text(s) => s.clone(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileElementConfig {
    pub label: String,
    pub mass: f64,
    pub charge: i32,
    /// Evaporation field threshold per field bin, bin 0 first.
    pub e_fields: Vec<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileEmitterConfig {
    pub node_file: Option<String>,
    #[serde(default)]
    pub elements: Vec<FileElementConfig>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileEvaporationConfig {
    pub tapsim_bin: Option<String>,
    pub meshgen_bin: Option<String>,
    pub meshgen_ini: Option<String>,
    pub total_events: Option<FileEventBudget>,
    pub events_per_step: Option<FileEventBudget>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileMinimizeConfig {
    pub surface_only: Option<bool>,
    pub etol: Option<f64>,
    pub ftol: Option<f64>,
    pub maxiter: Option<usize>,
    pub maxeval: Option<usize>,
    pub temperature: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FileBandAction {
    Lost,
    Bin,
    MatchCoordination,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileCoordinationBand {
    pub min: u32,
    pub max: Option<u32>,
    pub action: FileBandAction,
    /// Target field bin, required when `action = "bin"`.
    pub bin: Option<u32>,
}

/// Either a bulk coordination number or an explicit band list; `untouched` disables reassignment.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileCoordinationConfig {
    pub bulk: Option<u32>,
    pub bands: Option<Vec<FileCoordinationBand>>,
    pub untouched: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileRelaxationConfig {
    pub lammps_bin: Option<String>,
    pub potentials: Option<String>,
    pub coordination_cutoff: Option<f64>,
    pub minimize: Option<FileMinimizeConfig>,
    pub coordination: Option<FileCoordinationConfig>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub cleanup: Option<bool>,
    pub max_cycles: Option<usize>,
    pub emitter: Option<FileEmitterConfig>,
    pub evaporation: Option<FileEvaporationConfig>,
    pub relaxation: Option<FileRelaxationConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
