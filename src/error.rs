//! Error types and result aliases for paramscan.
//!
//! Every failure is fatal for the input being scanned. The variants carry the
//! offending specification (or source label) so the binary can report which
//! input broke and which file patterns were expected.

use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;

/// Errors raised while locating, decoding or parsing a configuration source.
#[derive(Debug, Error)]
pub enum ScanError {
    /// No file or archive member under `spec` matched the include patterns.
    #[error("no file matching [{patterns}] found in {spec}")]
    NotFound { spec: String, patterns: String },

    /// A plain file was given that matches none of the include patterns.
    #[error("{spec} does not match any of [{patterns}]")]
    UnsupportedSource { spec: String, patterns: String },

    /// Source bytes are not valid UTF-8.
    #[error("{label} is not valid UTF-8 text: {source}")]
    Decode {
        label: String,
        #[source]
        source: FromUtf8Error,
    },

    /// Grammar violation in a parameter doc, e.g. `=` while a value is expected.
    #[error("{label}:{line}: unexpected token {token:?} ({reason})")]
    UnexpectedToken {
        label: String,
        token: String,
        line: usize,
        reason: &'static str,
    },

    /// A scope-close token with no open scope.
    #[error("{label}:{line}: scope close {token:?} without a matching open")]
    UnbalancedScope {
        label: String,
        token: String,
        line: usize,
    },

    /// A quoted literal ran to the end of the input.
    #[error("{label}:{line}: unterminated quoted literal")]
    UnterminatedQuote { label: String, line: usize },

    /// A glob pattern from the command line or config could not be compiled.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Underlying I/O failure on a path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
