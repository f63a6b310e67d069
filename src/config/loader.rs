//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load the optional TOML file, apply process environment overrides, validate.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    load_with_env(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an injectable environment lookup.
pub fn load_with_env<F>(path: Option<&Path>, env: F) -> Result<ServiceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ServiceConfig::default(),
    };

    apply_env_overrides(&mut config, env);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Environment variables of the container deployment win over the file.
///
/// `PORT` only replaces the port, binding on all interfaces.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| env(key).filter(|v| !v.is_empty());

    if let Some(v) = var("CONFIG_FILE") {
        config.storage.config_file = v;
    }
    if let Some(v) = var("SUB_FILE") {
        config.storage.sub_file = v;
    }
    if let Some(v) = var("TOKEN") {
        config.auth.token = v;
    }
    if let Some(v) = var("PORT") {
        config.listener.bind_address = format!("0.0.0.0:{}", v.trim());
    }
    if let Some(v) = var("TITLE") {
        config.subscription.title = v;
    }
    if let Some(v) = var("XRAY_NAME") {
        config.reload.service_name = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_only() {
        let config = load_with_env(
            None,
            env_of(&[
                ("CONFIG_FILE", "/etc/xray/config.json"),
                ("SUB_FILE", "/etc/xray/sub.txt"),
                ("TOKEN", "secret"),
                ("PORT", "5000"),
            ]),
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:5000");
        assert_eq!(config.auth.token, "secret");
        assert_eq!(config.subscription.title, "Xray Pult");
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pult.toml");
        std::fs::write(
            &path,
            r#"
            [storage]
            config_file = "/srv/config.json"
            sub_file = "/srv/sub.txt"

            [auth]
            token = "from-file"

            [subscription]
            title = "File Title"
            "#,
        )
        .unwrap();

        let config = load_with_env(
            Some(&path),
            env_of(&[("TOKEN", "from-env"), ("TITLE", ""), ("XRAY_NAME", "xray-2")]),
        )
        .unwrap();
        assert_eq!(config.auth.token, "from-env");
        // empty TITLE does not clobber the file value
        assert_eq!(config.subscription.title, "File Title");
        assert_eq!(config.reload.service_name, "xray-2");
        assert_eq!(config.storage.config_file, "/srv/config.json");
    }

    #[test]
    fn test_missing_required_values() {
        let err = load_with_env(None, env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 3));
        assert!(err.to_string().contains("auth.token"));
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pult.toml");
        std::fs::write(&path, "[auth\ntoken = ").unwrap();
        assert!(matches!(load_with_env(Some(&path), env_of(&[])), Err(ConfigError::Parse(_))));
    }
}
