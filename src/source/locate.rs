//! Resolve an input specification into a readable source.
//!
//! - A plain file must match one of the include patterns.
//! - An archive yields its first matching member (see [`archive::select_member`]).
//! - A directory is walked depth-first with children in name order; the first
//!   directory containing a candidate (a matching file or any archive) wins, and
//!   its lexically first candidate is resolved in turn.

use std::fs::{self, File};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use super::archive;
use super::ResolvedSource;
use crate::error::{Result, ScanError};
use crate::parser::PatternSet;

/// Upper bound on directory nesting, guards against pathological trees
const MAX_WALK_DEPTH: usize = 256;

/// Resolve `spec` using the given include (priority order) and ignore patterns
pub fn resolve(spec: &Path, include: &[String], ignore: &[String]) -> Result<ResolvedSource> {
    SourceLocator::new(PatternSet::new(include)?, PatternSet::new(ignore)?).resolve(spec)
}

#[derive(Debug, Clone)]
pub struct SourceLocator {
    include: PatternSet,
    ignore: PatternSet,
}

impl SourceLocator {
    #[must_use]
    pub fn new(include: PatternSet, ignore: PatternSet) -> Self {
        Self { include, ignore }
    }

    pub fn resolve(&self, spec: &Path) -> Result<ResolvedSource> {
        let metadata = fs::metadata(spec).map_err(|e| ScanError::io(spec, e))?;

        if metadata.is_dir() {
            return match self.find_in_tree(spec) {
                Some(candidate) => {
                    debug!("{}: resolved to {}", spec.display(), candidate.display());
                    self.resolve(&candidate)
                }
                None => Err(self.not_found(spec)),
            };
        }

        let modified = metadata.modified().map_err(|e| ScanError::io(spec, e))?;

        if archive::is_archive(spec) {
            let names = archive::member_names(spec)?;
            let Some(member) = archive::select_member(&names, &self.include, &self.ignore) else {
                return Err(self.not_found(spec));
            };
            debug!("{}: found member {member}", spec.display());
            let bytes = archive::read_member(spec, &member)?;
            return Ok(ResolvedSource {
                reader: Box::new(Cursor::new(bytes)),
                label: format!("{}({member})", spec.display()),
                modified,
            });
        }

        if self.include.matches(spec) {
            debug!("{}: opening", spec.display());
            let file = File::open(spec).map_err(|e| ScanError::io(spec, e))?;
            return Ok(ResolvedSource {
                reader: Box::new(file),
                label: spec.display().to_string(),
                modified,
            });
        }

        Err(ScanError::UnsupportedSource {
            spec: spec.display().to_string(),
            patterns: self.include.describe(),
        })
    }

    /// First candidate in walk order, or `None` if no directory has one
    #[must_use]
    pub fn find_in_tree(&self, root: &Path) -> Option<PathBuf> {
        WalkDir::new(root)
            .follow_links(true)
            .max_depth(MAX_WALK_DEPTH)
            .sort_by_file_name()
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_dir())
            .find_map(|entry| self.candidates_in(entry.path()).into_iter().next())
    }

    /// Candidates directly inside `dir`, sorted
    fn candidates_in(&self, dir: &Path) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| archive::is_archive(path) || self.include.matches(path))
            .filter(|path| !self.ignore.matches(path))
            .collect();
        candidates.sort();
        candidates
    }

    fn not_found(&self, spec: &Path) -> ScanError {
        ScanError::NotFound {
            spec: spec.display().to_string(),
            patterns: self.include.describe(),
        }
    }
}
