//! Source location and decoding.
//!
//! A loose input specification (a file, a directory tree or an archive) is
//! resolved by [`SourceLocator`] into one readable [`ResolvedSource`]:
//! - [`locate`]: Directory walk and include/ignore pattern selection
//! - [`archive`]: Tar (optionally gzipped) member listing and extraction
//!
//! [`ResolvedSource::read_text`] then decodes the bytes into a [`SourceText`],
//! the input to every parser.

pub mod archive;
pub mod locate;

use std::io::Read;
use std::time::SystemTime;

use crate::error::{Result, ScanError};

pub use locate::{resolve, SourceLocator};

/// An open byte stream plus where it came from
pub struct ResolvedSource {
    pub reader: Box<dyn Read>,
    /// `path` for plain files, `archive(member)` for archive members
    pub label: String,
    pub modified: SystemTime,
}

impl std::fmt::Debug for ResolvedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSource")
            .field("label", &self.label)
            .field("modified", &self.modified)
            .finish_non_exhaustive()
    }
}

impl ResolvedSource {
    /// Read the whole stream and decode it as UTF-8
    pub fn read_text(mut self) -> Result<SourceText> {
        let mut bytes = Vec::new();
        self.reader
            .read_to_end(&mut bytes)
            .map_err(|e| ScanError::io(&self.label, e))?;
        let text = String::from_utf8(bytes).map_err(|source| ScanError::Decode {
            label: self.label.clone(),
            source,
        })?;
        Ok(SourceText {
            text,
            label: self.label,
            modified: self.modified,
        })
    }
}

/// Decoded text of one resolved source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub text: String,
    pub label: String,
    pub modified: SystemTime,
}

impl SourceText {
    /// Text that did not come from disk; its timestamp is the Unix epoch
    #[must_use]
    pub fn inline(text: &str, label: &str) -> Self {
        Self {
            text: text.to_string(),
            label: label.to_string(),
            modified: SystemTime::UNIX_EPOCH,
        }
    }
}
