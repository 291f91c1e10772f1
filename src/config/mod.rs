mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Loads the configuration once at startup: YAML file first, then environment overrides.
pub async fn load() -> Result<Config> {
    let explicit_path = env::var("CONFIG_PATH").ok();
    let mut config = load_file(explicit_path.as_deref()).await?;
    apply_env_overrides(&mut config, |key| env::var(key).ok())?;
    Ok(config)
}

/// Reads the YAML file at `path`, or `config.yaml` when no path is given.
///
/// A missing default file yields the built-in defaults; a missing explicit file is an error.
pub async fn load_file(path: Option<&str>) -> Result<Config> {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    debug!("Loading configuration from: {}", config_path);

    let config_str = match tokio::fs::read_to_string(config_path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && path.is_none() => {
            debug!("No {} found, using defaults", config_path);
            return Ok(Config::default());
        }
        Err(e) => {
            return Err(Error::config(format!(
                "Cannot read config file '{}': {}",
                config_path, e
            )));
        }
    };

    let config: Config = serde_yaml::from_str(&config_str)?;

    Ok(config)
}

/// Applies `DEEPSEEK_API_KEY` and `PORT` on top of the file configuration.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(api_key) = lookup("DEEPSEEK_API_KEY") {
        config.reasoning.api_key = api_key;
    }

    if let Some(port) = lookup("PORT") {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|_| Error::config(format!("Invalid PORT value: '{}'", port)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.reasoning.base_url, "https://api.deepseek.com");
        assert_eq!(config.reasoning.model, "deepseek-reasoner");
        assert_eq!(config.ocr.command, "tesseract");
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            lookup_from(&[("DEEPSEEK_API_KEY", "sk-test"), ("PORT", "8081")]),
        )
        .unwrap();

        assert_eq!(config.reasoning.api_key, "sk-test");
        assert_eq!(config.server.port, 8081);
        assert!(config.has_api_key());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut config = Config::default();
        let result = apply_env_overrides(&mut config, lookup_from(&[("PORT", "eighty")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str(
            r#"
reasoning:
  api_key: sk-yaml
server:
  port: 9000
"#,
        )
        .unwrap();

        assert_eq!(config.reasoning.api_key, "sk-yaml");
        assert_eq!(config.reasoning.model, "deepseek-reasoner");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.logs.level, "info");
    }
}
