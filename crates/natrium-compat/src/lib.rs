//! # Natrium Compat
//!
//! The legacy face of the Natrium engine.
//!
//! - [`install`] picks a [`Backend`] once per process from a
//!   [`CompatConfig`] (`auto`, `pure` or `native`).
//! - [`Sodium`] exposes the engine under libsodium's function names, with
//!   legacy `false`-style sentinels on the open/decrypt/verify paths.
//! - [`CompatConfig`] is the TOML configuration shared with the CLI.
//!
//! ```no_run
//! use natrium_compat::{CompatConfig, Sodium, install};
//!
//! # fn main() -> Result<(), natrium_compat::CompatError> {
//! let config = CompatConfig::from_env(None)?;
//! install(&config)?;
//!
//! let sodium = Sodium::new();
//! let key = sodium.crypto_secretbox_keygen()?;
//! let nonce = sodium.randombytes_buf(24)?;
//! let boxed = sodium.crypto_secretbox(b"hello", &nonce, &key)?;
//! assert_eq!(sodium.crypto_secretbox_open(&boxed, &nonce, &key).as_deref(), Some(&b"hello"[..]));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod error;
pub mod sodium;

pub use backend::{Backend, BackendPreference, PureBackend, backend, install, resolve};
pub use config::CompatConfig;
pub use error::CompatError;
pub use sodium::Sodium;
