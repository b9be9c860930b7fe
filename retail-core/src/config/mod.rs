use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Settings every service binary shares.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

/// Load a service configuration from the optional `configuration.*`
/// file plus `<prefix>__`-separated environment variables.
pub fn load<T: DeserializeOwned>(env_prefix: &str) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let config = Cfg::builder()
        .add_source(File::with_name("configuration").required(false))
        .add_source(config::Environment::with_prefix(env_prefix).separator("__"))
        .build()?;

    Ok(config.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_when_nothing_is_configured() {
        let config: Config = load("RETAIL_CORE_CONFIG_TEST").unwrap();
        assert_eq!(config.port, 8080);
    }
}
