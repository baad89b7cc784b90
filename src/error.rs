//! Typed errors for loading and projection.
//!
//! A missing result file is deliberately NOT represented here: the loader
//! substitutes the synthetic counterpart and records the substitution in the
//! artifact manifest. Only files that exist and fail validation surface as
//! errors, so the demo fallback can never mask a data-quality problem.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the result loader.
#[derive(Error, Debug)]
pub enum LoadError {
    /// A result file exists but fails schema validation: wrong header,
    /// wrong column count, unparseable field, or a violated table invariant.
    #[error("malformed result file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// A result file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Errors from the business-impact calculator. Domain violations fail
/// loudly instead of clamping: a silently clamped slider would present
/// misleading revenue numbers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImpactError {
    #[error("invalid parameter {name}={value}: expected {expected}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },
}
