use super::schemas::Config;
/// Configuration utilities - loading and saving
///
/// Configuration is loaded into a value owned by the caller and passed
/// explicitly to the components that need it.
use crate::errors::ConfigError;
use crate::logger::{ self, LogTag };
use std::path::Path;

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "data/config.toml";

/// Load configuration from a specific file path
///
/// A missing file yields the defaults; an unreadable or malformed file is an
/// error. The loaded configuration is validated before it is returned.
pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let config = if path.exists() {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;

        let config = toml::from_str::<Config>(&contents).map_err(|source| ConfigError::Parse {
            path: display.clone(),
            source,
        })?;

        logger::debug(LogTag::Config, &format!("Loaded config from {}", display));
        config
    } else {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", display)
        );
        Config::default()
    };

    config.validate()?;
    Ok(config)
}

/// Write a configuration to disk as pretty TOML
pub fn save_config(config: &Config, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let contents = toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidConfig {
        field: "<root>".to_string(),
        reason: format!("Failed to serialize config: {}", e),
    })?;

    std::fs::write(path, contents).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from_path(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[metrics]\ndefault_block_time_ms = 13150\n\n[batch]\nworker_threads = 4").unwrap();

        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.metrics.default_block_time_ms, 13_150);
        assert_eq!(config.batch.worker_threads, 4);
        assert_eq!(config.metrics.seconds_per_year, 31_536_000);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[metrics\nseconds_per_year = ").unwrap();

        let err = load_config_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_invalid_values_rejected_on_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[metrics]\nseconds_per_year = 0").unwrap();

        let err = load_config_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig { .. }));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.output.decimal_places = 6;
        save_config(&config, &path).unwrap();

        assert_eq!(load_config_from_path(&path).unwrap(), config);
    }
}
