#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the scraper crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Two layers live here. [`Error`] is returned by operations that can abort a
//! whole run (configuration, search, output). [`FetchError`] is returned by
//! individual host calls and is always absorbed by the per-repository
//! pipeline, never propagated to the batch.

use std::path::{Path, PathBuf};

/// Unified error type returned by configuration loading, the runner and the
/// CLI.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors that occur while reading configuration files.
    #[error("failed to read configuration from {path:?}: {source}")]
    Io {
        /// Location of the configuration file.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Returned when the configuration or a CLI argument violates invariants.
    #[error("invalid configuration: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Wraps serialization errors when writing the output databases.
    #[error("failed to serialize database: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    },
    /// Wraps I/O errors that occur while writing the output databases.
    #[error("failed to write database at {path:?}: {source}")]
    OutputIo {
        /// Location of the database being produced.
        path:   PathBuf,
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    },
    /// Service errors when the search collaborator is unavailable.
    #[error("service error: {message}")]
    Service {
        /// Human readable message describing the service error.
        message: String
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a service error from the provided displayable value.
    pub fn service<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Service {
            message: message.into()
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// Intended for CLI contexts where the variant name does not add value
    /// to end users. The returned string matches the [`std::fmt::Display`]
    /// implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

impl From<FetchError> for Error {
    fn from(error: FetchError) -> Self {
        Self::Service {
            message: error.to_string()
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

/// Creates an [`Error::OutputIo`] variant capturing the failing path and
/// source.
pub fn output_io_error(path: &Path, source: std::io::Error) -> Error {
    Error::OutputIo {
        path: path.to_path_buf(),
        source
    }
}

/// Failure reported by a single call to a remote collaborator.
///
/// `NotFound` is the expected outcome for optional repository files and maps
/// onto a named rejection. `Transient` covers transport failures and server
/// errors; it is logged with detail and then handled exactly like
/// `NotFound`. Calls are never retried within a pass.
#[derive(Debug, Clone, PartialEq, Eq, masterror::Error)]
pub enum FetchError {
    /// The requested file, directory, repository or release does not exist.
    #[error("{resource} was not found")]
    NotFound {
        /// URL or API route that was requested.
        resource: String
    },
    /// Network failure, unexpected status or undecodable payload.
    #[error("request for {resource} failed: {message}")]
    Transient {
        /// URL or API route that was requested.
        resource: String,
        /// Human readable failure detail.
        message:  String
    }
}

impl FetchError {
    /// Constructs a [`FetchError::NotFound`] for the given resource.
    pub fn not_found<R>(resource: R) -> Self
    where
        R: Into<String>
    {
        Self::NotFound {
            resource: resource.into()
        }
    }

    /// Constructs a [`FetchError::Transient`] for the given resource.
    pub fn transient<R, M>(resource: R, message: M) -> Self
    where
        R: Into<String>,
        M: Into<String>
    {
        Self::Transient {
            resource: resource.into(),
            message:  message.into()
        }
    }

    /// Returns `true` for the expected "does not exist" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
