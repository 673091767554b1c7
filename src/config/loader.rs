//! Configuration loading from disk and environment.

use std::path::Path;
use std::fs;
use crate::config::schema::NotesConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, message: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, message } => write!(f, "Invalid {}: {}", var, message),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load, apply environment overrides, and validate.
///
/// Without a path the built-in defaults are used as the base.
pub fn load_config(path: Option<&Path>) -> Result<NotesConfig, ConfigError> {
    load_config_with(path, |_| {})
}

/// Like [`load_config`], with `adjust` applied after the environment
/// overrides and before validation (command-line flags go here).
pub fn load_config_with<F>(path: Option<&Path>, adjust: F) -> Result<NotesConfig, ConfigError>
where
    F: FnOnce(&mut NotesConfig),
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => NotesConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    adjust(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay secrets and deployment knobs from the environment.
///
/// | Variable | Field |
/// |---|---|
/// | `GEMINI_API_KEY` | `summarizer.api_key` |
/// | `IDENTITY_API_KEY` | `auth.api_key` |
/// | `PORT` | port of `listener.bind_address` |
/// | `NOTES_ENV` | `environment` |
pub fn apply_env_overrides<F>(config: &mut NotesConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup("GEMINI_API_KEY").filter(|v| !v.trim().is_empty()) {
        config.summarizer.api_key = Some(key.trim().to_string());
    }

    if let Some(key) = lookup("IDENTITY_API_KEY").filter(|v| !v.trim().is_empty()) {
        config.auth.api_key = Some(key.trim().to_string());
    }

    if let Some(port) = lookup("PORT") {
        let port: u16 = port.trim().parse().map_err(|e: std::num::ParseIntError| ConfigError::Env {
            var: "PORT",
            message: e.to_string(),
        })?;
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{}:{}", host, port);
    }

    if let Some(env) = lookup("NOTES_ENV") {
        config.environment = env
            .parse()
            .map_err(|message| ConfigError::Env { var: "NOTES_ENV", message })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Environment;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let mut config = NotesConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("GEMINI_API_KEY", " secret "),
                ("PORT", "8088"),
                ("NOTES_ENV", "development"),
            ]),
        )
        .unwrap();

        assert_eq!(config.summarizer.api_key.as_deref(), Some("secret"));
        assert_eq!(config.listener.bind_address, "0.0.0.0:8088");
        assert_eq!(config.environment, Environment::Development);
        assert!(config.auth.api_key.is_none());
    }

    #[test]
    fn test_blank_key_is_ignored() {
        let mut config = NotesConfig::default();
        apply_env_overrides(&mut config, env(&[("GEMINI_API_KEY", "   ")])).unwrap();
        assert!(config.summarizer.api_key.is_none());
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let mut config = NotesConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("notes-config-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"
            [auth]
            provider = "static"
            static_tokens = { "a" = "alice" }
            "#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.auth.static_tokens.len(), 1);

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_adjustments_are_validated() {
        let err = load_config_with(None, |config| {
            config.listener.bind_address = "not-an-address".into();
        })
        .unwrap_err();

        match err {
            ConfigError::Validation(errors) => {
                assert!(errors.iter().any(|e| e.field == "listener.bind_address"));
            }
            other => panic!("expected validation error, got {}", other),
        }
    }
}
