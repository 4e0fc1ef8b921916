use paylane_order::GatewaySettings;
use serde::Deserialize;
use std::env;

/// Top-level configuration for a paylane deployment.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub gateway: GatewaySettings,
    pub api: ApiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    pub fn load_from(dir: &str) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name(&format!("{}/default", dir)))
            // Add in the current environment file, optional
            .add_source(
                config::File::with_name(&format!("{}/{}", dir, run_mode)).required(false),
            )
            // Add in a local configuration file, not checked in
            .add_source(config::File::with_name(&format!("{}/local", dir)).required(false))
            // Add in settings from the environment (with a prefix of PAYLANE)
            .add_source(config::Environment::with_prefix("PAYLANE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
