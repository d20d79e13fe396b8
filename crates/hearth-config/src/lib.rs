//! Hearth configuration system.
//!
//! TOML-based configuration with validation. All sections use defaults so
//! partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hearth_config::{load_config, config_to_json};
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{HearthConfig, CONFIG_SCHEMA_VERSION};

use std::path::Path;

use hearth_common::ConfigError;

/// Load and validate the config.
///
/// With `path`, that file must exist. Without it, `hearth.toml` is read from
/// the OS config directory and a commented default is created if missing.
pub fn load_config(path: Option<&Path>) -> Result<HearthConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };

    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &HearthConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_to_json_contains_all_sections() {
        let json = config_to_json(&HearthConfig::default());
        assert!(json.contains("\"server\""));
        assert!(json.contains("\"presence\""));
        assert!(json.contains("\"logging\""));
        assert!(json.contains("\"stale_threshold\": 75"));
    }

    #[test]
    fn config_schema_version_is_1() {
        assert_eq!(CONFIG_SCHEMA_VERSION, 1);
    }

    #[test]
    fn load_config_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hearth.toml");
        std::fs::write(&path, "[presence]\nheartbeat_interval_hint = 60\nstale_threshold = 30\n")
            .unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn load_config_with_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hearth.toml");
        std::fs::write(&path, "[server]\nport = 4000\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn load_config_missing_explicit_path_fails() {
        let err = load_config(Some(Path::new("/tmp/hearth_missing_dir/hearth.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn default_config_round_trips_through_json() {
        let json = config_to_json(&HearthConfig::default());
        let parsed: HearthConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.server.port, 8080);
        assert_eq!(parsed.presence.outbound_buffer, 256);
    }
}
