// Path: crates/vladiator-types/src/error/mod.rs
//! Shared error enums used across the Vladiator workspace.
//!
//! Each crate that needs a more specific error type defines its own enum and
//! wraps these where appropriate; this module only holds errors that are
//! genuinely shared (config parsing, message decode) so that downstream
//! crates are not forced to depend on each other's internals.

use thiserror::Error;

/// Errors raised while loading or validating node configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read from disk.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was attempted.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file did not parse as valid TOML.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path that was attempted.
        path: String,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
    /// A required environment variable was absent.
    #[error("required environment variable {0} is not set")]
    MissingEnv(&'static str),
    /// An environment variable's value could not be decoded (e.g. invalid hex).
    #[error("environment variable {name} has an invalid value: {reason}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Human-readable reason.
        reason: String,
    },
}

/// Errors raised while decoding an inbound gossip frame.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The frame was not valid UTF-8 JSON for the `Message` schema.
    #[error("malformed message frame: {0}")]
    Malformed(#[from] serde_json::Error),
}
