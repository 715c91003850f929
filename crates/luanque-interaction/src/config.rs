//! Configuration file management for LuanQue.
//!
//! Supports reading secrets from `~/.config/luanque/secret.json`.

use luanque_core::{LuanqueError, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Root configuration structure for secret.json
#[derive(Debug, Clone, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Loads the secret configuration file from ~/.config/luanque/secret.json
pub fn load_secret_config() -> Result<SecretConfig> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        return Err(LuanqueError::config(format!(
            "Configuration file not found at: {}",
            config_path.display()
        )));
    }

    let content = fs::read_to_string(&config_path).map_err(|e| {
        LuanqueError::config(format!(
            "Failed to read configuration file at {}: {}",
            config_path.display(),
            e
        ))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        LuanqueError::config(format!(
            "Failed to parse configuration file at {}: {}",
            config_path.display(),
            e
        ))
    })
}

/// Returns the path to the configuration file: ~/.config/luanque/secret.json
fn get_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LuanqueError::config("Could not determine home directory"))?;
    Ok(home.join(".config").join("luanque").join("secret.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_secret_config() {
        let config: SecretConfig = serde_json::from_str(
            r#"{"gemini": {"api_key": "key-123", "model_name": "gemini-2.5-pro"}}"#,
        )
        .unwrap();

        let gemini = config.gemini.unwrap();
        assert_eq!(gemini.api_key, "key-123");
        assert_eq!(gemini.model_name.as_deref(), Some("gemini-2.5-pro"));
    }

    #[test]
    fn test_model_name_is_optional() {
        let config: SecretConfig =
            serde_json::from_str(r#"{"gemini": {"api_key": "key-123"}}"#).unwrap();
        assert!(config.gemini.unwrap().model_name.is_none());
    }
}
