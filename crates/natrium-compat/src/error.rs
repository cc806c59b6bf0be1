//! Compat layer error types.

use natrium_crypto::CryptoError;
use thiserror::Error;

use crate::backend::BackendPreference;

/// Errors raised by backend resolution, configuration and the non-sentinel
/// half of the legacy API.
#[derive(Debug, Error)]
pub enum CompatError {
    /// The configured backend is not linked into this build
    #[error("{0} backend is not available in this build")]
    Unavailable(BackendPreference),

    /// Unrecognised backend name (config file or `NATRIUM_BACKEND`)
    #[error("unknown backend: {0}")]
    UnknownBackend(String),

    /// Configuration failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reading or writing the configuration file failed
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML for [`CompatConfig`](crate::CompatConfig)
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration could not be serialised
    #[error("config serialise error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Error from the primitive engine
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
