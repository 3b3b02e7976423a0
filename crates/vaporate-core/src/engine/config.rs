use super::coordination::CoordinationPolicy;
use crate::core::species::registry::ElementSpec;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for {parameter}: {reason}")]
    Invalid {
        parameter: &'static str,
        reason: String,
    },
}

/// A number of evaporation events, either absolute or relative to the emitter's atom count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventBudget {
    Count(usize),
    Percent(f64),
}

impl EventBudget {
    /// Resolves the budget against the number of atoms in the emitter.
    pub fn resolve(self, atom_count: usize) -> usize {
        match self {
            EventBudget::Count(n) => n,
            EventBudget::Percent(p) => (atom_count as f64 * p / 100.0).ceil() as usize,
        }
    }
}

impl FromStr for EventBudget {
    type Err = ConfigError;

    /// Parses `"250"` as an absolute count and `"10%"` as a share of the atom count.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: &str| ConfigError::Invalid {
            parameter: "event budget",
            reason: format!("'{}': {}", s, reason),
        };
        if let Some(percent) = s.strip_suffix('%') {
            let value: f64 = percent
                .trim()
                .parse()
                .map_err(|_| invalid("expected a number before '%'"))?;
            if !(value > 0.0 && value <= 100.0) {
                return Err(invalid("percentage must be in (0, 100]"));
            }
            Ok(EventBudget::Percent(value))
        } else {
            let value: usize = s
                .parse()
                .map_err(|_| invalid("expected an integer count or a percentage"))?;
            if value == 0 {
                return Err(invalid("count must be positive"));
            }
            Ok(EventBudget::Count(value))
        }
    }
}

impl fmt::Display for EventBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventBudget::Count(n) => write!(f, "{}", n),
            EventBudget::Percent(p) => write!(f, "{}%", p),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmitterConfig {
    /// Initial node file handed to the mesh generator.
    pub node_file: PathBuf,
    pub elements: Vec<ElementSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaporationConfig {
    pub tapsim_bin: PathBuf,
    pub meshgen_bin: PathBuf,
    /// Optional `meshgen.ini` copied into the setup directory so the mesh generator never prompts.
    pub meshgen_ini: Option<PathBuf>,
    pub total_events: EventBudget,
    pub events_per_step: EventBudget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinimizeConfig {
    /// Hold every non-surface atom static during minimization.
    pub surface_only: bool,
    pub etol: f64,
    pub ftol: f64,
    pub maxiter: usize,
    pub maxeval: usize,
    pub temperature: f64,
}

impl Default for MinimizeConfig {
    fn default() -> Self {
        Self {
            surface_only: true,
            etol: 1e-8,
            ftol: 1e-8,
            maxiter: 1000,
            maxeval: 1000,
            temperature: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelaxationConfig {
    pub lammps_bin: PathBuf,
    pub potentials_path: PathBuf,
    /// Neighbor cutoff of the coordination compute, in Ångström.
    pub coordination_cutoff: f64,
    pub minimize: MinimizeConfig,
    pub coordination: CoordinationPolicy,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunConfig {
    pub max_cycles: Option<usize>,
    /// Remove cycle directories once the following cycle has consumed them.
    pub cleanup: bool,
}

/// The complete, immutable configuration of a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub emitter: EmitterConfig,
    pub evaporation: EvaporationConfig,
    pub relaxation: RelaxationConfig,
    pub run: RunConfig,
}

pub const DEFAULT_COORDINATION_CUTOFF: f64 = 3.0;

#[derive(Default)]
pub struct SimulationConfigBuilder {
    node_file: Option<PathBuf>,
    elements: Option<Vec<ElementSpec>>,
    tapsim_bin: Option<PathBuf>,
    meshgen_bin: Option<PathBuf>,
    meshgen_ini: Option<PathBuf>,
    total_events: Option<EventBudget>,
    events_per_step: Option<EventBudget>,
    lammps_bin: Option<PathBuf>,
    potentials_path: Option<PathBuf>,
    coordination_cutoff: Option<f64>,
    minimize: Option<MinimizeConfig>,
    coordination: Option<CoordinationPolicy>,
    max_cycles: Option<usize>,
    cleanup: Option<bool>,
}

impl SimulationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_file(mut self, path: PathBuf) -> Self {
        self.node_file = Some(path);
        self
    }
    pub fn elements(mut self, elements: Vec<ElementSpec>) -> Self {
        self.elements = Some(elements);
        self
    }
    pub fn tapsim_bin(mut self, path: PathBuf) -> Self {
        self.tapsim_bin = Some(path);
        self
    }
    pub fn meshgen_bin(mut self, path: PathBuf) -> Self {
        self.meshgen_bin = Some(path);
        self
    }
    pub fn meshgen_ini(mut self, path: Option<PathBuf>) -> Self {
        self.meshgen_ini = path;
        self
    }
    pub fn total_events(mut self, budget: EventBudget) -> Self {
        self.total_events = Some(budget);
        self
    }
    pub fn events_per_step(mut self, budget: EventBudget) -> Self {
        self.events_per_step = Some(budget);
        self
    }
    pub fn lammps_bin(mut self, path: PathBuf) -> Self {
        self.lammps_bin = Some(path);
        self
    }
    pub fn potentials_path(mut self, path: PathBuf) -> Self {
        self.potentials_path = Some(path);
        self
    }
    pub fn coordination_cutoff(mut self, cutoff: f64) -> Self {
        self.coordination_cutoff = Some(cutoff);
        self
    }
    pub fn minimize(mut self, minimize: MinimizeConfig) -> Self {
        self.minimize = Some(minimize);
        self
    }
    pub fn coordination_policy(mut self, policy: CoordinationPolicy) -> Self {
        self.coordination = Some(policy);
        self
    }
    pub fn max_cycles(mut self, cycles: Option<usize>) -> Self {
        self.max_cycles = cycles;
        self
    }
    pub fn cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = Some(cleanup);
        self
    }

    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let elements = self
            .elements
            .ok_or(ConfigError::MissingParameter("elements"))?;
        if elements.is_empty() {
            return Err(ConfigError::Invalid {
                parameter: "elements",
                reason: "at least one element is required".to_string(),
            });
        }
        let coordination_cutoff = self
            .coordination_cutoff
            .unwrap_or(DEFAULT_COORDINATION_CUTOFF);
        if !(coordination_cutoff > 0.0) {
            return Err(ConfigError::Invalid {
                parameter: "coordination_cutoff",
                reason: format!("must be positive, got {}", coordination_cutoff),
            });
        }
        if self.max_cycles == Some(0) {
            return Err(ConfigError::Invalid {
                parameter: "max_cycles",
                reason: "must be at least 1".to_string(),
            });
        }

        let emitter = EmitterConfig {
            node_file: self
                .node_file
                .ok_or(ConfigError::MissingParameter("node_file"))?,
            elements,
        };
        let evaporation = EvaporationConfig {
            tapsim_bin: self
                .tapsim_bin
                .ok_or(ConfigError::MissingParameter("tapsim_bin"))?,
            meshgen_bin: self
                .meshgen_bin
                .ok_or(ConfigError::MissingParameter("meshgen_bin"))?,
            meshgen_ini: self.meshgen_ini,
            total_events: self
                .total_events
                .ok_or(ConfigError::MissingParameter("total_events"))?,
            events_per_step: self
                .events_per_step
                .ok_or(ConfigError::MissingParameter("events_per_step"))?,
        };
        let relaxation = RelaxationConfig {
            lammps_bin: self
                .lammps_bin
                .ok_or(ConfigError::MissingParameter("lammps_bin"))?,
            potentials_path: self
                .potentials_path
                .ok_or(ConfigError::MissingParameter("potentials_path"))?,
            coordination_cutoff,
            minimize: self.minimize.unwrap_or_default(),
            coordination: self.coordination.unwrap_or_default(),
        };
        Ok(SimulationConfig {
            emitter,
            evaporation,
            relaxation,
            run: RunConfig {
                max_cycles: self.max_cycles,
                cleanup: self.cleanup.unwrap_or(false),
            },
        })
    }
}
