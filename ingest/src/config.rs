use serde::Deserialize;
use service_core::config as core_config;

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_service_name() -> String {
    "ingest".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl IngestConfig {
    pub fn load() -> anyhow::Result<Self> {
        let common = core_config::Config::load().map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok(Self {
            common,
            service_name: default_service_name(),
            log_level: default_log_level(),
        })
    }
}
