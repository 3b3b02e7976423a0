use std::path::PathBuf;
use vaporate::engine::config::SimulationConfig;

pub struct AppConfig {
    pub workdir: PathBuf,
    pub core_config: SimulationConfig,
}
