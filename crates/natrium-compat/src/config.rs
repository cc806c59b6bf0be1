//! Configuration for the compat layer and the CLI.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use natrium_crypto::pwhash;

use crate::backend::BackendPreference;
use crate::error::CompatError;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "NATRIUM_CONFIG";

/// Environment variable overriding `backend.preference`.
pub const BACKEND_ENV: &str = "NATRIUM_BACKEND";

/// Natrium configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompatConfig {
    /// Backend selection
    #[serde(default)]
    pub backend: BackendConfig,
    /// Password hashing defaults
    #[serde(default)]
    pub pwhash: PwhashConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BackendConfig {
    /// auto | pure | native
    #[serde(default)]
    pub preference: BackendPreference,
}

/// Password hashing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PwhashConfig {
    /// Argon2 passes
    #[serde(default = "default_opslimit")]
    pub opslimit: u64,
    /// Argon2 memory in bytes
    #[serde(default = "default_memlimit")]
    pub memlimit: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values

fn default_opslimit() -> u64 {
    pwhash::OPSLIMIT_INTERACTIVE
}

fn default_memlimit() -> usize {
    pwhash::MEMLIMIT_INTERACTIVE // 64 MiB
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PwhashConfig {
    fn default() -> Self {
        Self {
            opslimit: default_opslimit(),
            memlimit: default_memlimit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl CompatConfig {
    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CompatError> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CompatError> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, contents)?;
        Ok(())
    }

    /// Get default config path
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("natrium/config.toml")
    }

    /// Load from `path`, or from `NATRIUM_CONFIG`, or from the default path
    /// if it exists, otherwise defaults. `NATRIUM_BACKEND` is applied last.
    ///
    /// # Errors
    ///
    /// Returns an error if a named file cannot be read or parsed, or if
    /// `NATRIUM_BACKEND` holds an unknown backend.
    pub fn from_env(path: Option<&Path>) -> Result<Self, CompatError> {
        let from_var = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match path.map(Path::to_path_buf).or(from_var) {
            Some(explicit) => Self::load(explicit)?,
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::load(default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_backend_override(std::env::var(BACKEND_ENV).ok().as_deref())?;
        Ok(config)
    }

    /// Replace `backend.preference` with `value` when present.
    ///
    /// # Errors
    ///
    /// Returns [`CompatError::UnknownBackend`] for an unrecognised name.
    pub fn apply_backend_override(&mut self, value: Option<&str>) -> Result<(), CompatError> {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            let preference = value.parse()?;
            tracing::debug!(%preference, "backend preference overridden");
            self.backend.preference = preference;
        }
        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid.
    pub fn validate(&self) -> Result<(), CompatError> {
        if self.pwhash.opslimit < pwhash::OPSLIMIT_MIN || self.pwhash.opslimit > pwhash::OPSLIMIT_MAX
        {
            return Err(CompatError::InvalidConfig(format!(
                "pwhash.opslimit must be between {} and {}",
                pwhash::OPSLIMIT_MIN,
                pwhash::OPSLIMIT_MAX
            )));
        }
        if self.pwhash.memlimit < pwhash::MEMLIMIT_MIN {
            return Err(CompatError::InvalidConfig(format!(
                "pwhash.memlimit must be at least {}",
                pwhash::MEMLIMIT_MIN
            )));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(CompatError::InvalidConfig(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompatConfig::default();
        assert_eq!(config.backend.preference, BackendPreference::Auto);
        assert_eq!(config.pwhash.opslimit, 2);
        assert_eq!(config.pwhash.memlimit, 67_108_864);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_validation() {
        let mut config = CompatConfig::default();
        assert!(config.validate().is_ok());

        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "DEBUG".to_string();
        config.pwhash.memlimit = 1024;
        assert!(config.validate().is_err());

        config.pwhash.memlimit = pwhash::MEMLIMIT_MIN;
        config.pwhash.opslimit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_serialization() {
        let config = CompatConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: CompatConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.backend.preference, deserialized.backend.preference);
        assert_eq!(config.pwhash.memlimit, deserialized.pwhash.memlimit);
    }

    #[test]
    fn test_partial_toml() {
        let config: CompatConfig = toml::from_str(
            r#"
            [backend]
            preference = "pure"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.preference, BackendPreference::Pure);
        assert_eq!(config.pwhash.opslimit, 2);
        assert_eq!(config.logging.level, "info");

        assert!(toml::from_str::<CompatConfig>("[backend]\npreference = \"turbo\"").is_err());
    }

    #[test]
    fn test_backend_override() {
        let mut config = CompatConfig::default();
        config.apply_backend_override(None).unwrap();
        assert_eq!(config.backend.preference, BackendPreference::Auto);

        config.apply_backend_override(Some("native")).unwrap();
        assert_eq!(config.backend.preference, BackendPreference::Native);

        config.apply_backend_override(Some("  ")).unwrap();
        assert_eq!(config.backend.preference, BackendPreference::Native);

        assert!(config.apply_backend_override(Some("gpu")).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = CompatConfig::default();
        config.backend.preference = BackendPreference::Pure;
        config.pwhash.opslimit = 3;
        config.save(&path).unwrap();

        let loaded = CompatConfig::load(&path).unwrap();
        assert_eq!(loaded.backend.preference, BackendPreference::Pure);
        assert_eq!(loaded.pwhash.opslimit, 3);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            CompatConfig::load(dir.path().join("absent.toml")),
            Err(CompatError::Io(_))
        ));
    }
}
