//! Tar archive access for the source locator.
//!
//! Archives are opened twice: once to list member names, once to extract the
//! selected member. Members carry no timestamp of their own here; callers use
//! the archive's modification time.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use log::debug;
use tar::Archive;

use crate::error::{Result, ScanError};
use crate::parser::PatternSet;

const ARCHIVE_SUFFIXES: &[&str] = &[".tar", ".tar.gz", ".tgz"];

/// Check if a path names a supported archive
#[must_use]
pub fn is_archive(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .is_some_and(|name| ARCHIVE_SUFFIXES.iter().any(|s| name.ends_with(s)))
}

fn is_gzipped(path: &Path) -> bool {
    let name = path.to_string_lossy();
    name.ends_with(".gz") || name.ends_with(".tgz")
}

fn open(path: &Path) -> Result<Archive<Box<dyn Read>>> {
    let file = File::open(path).map_err(|e| ScanError::io(path, e))?;
    let reader: Box<dyn Read> = if is_gzipped(path) {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(Archive::new(reader))
}

/// Names of the regular-file members of an archive, in archive order
pub fn member_names(path: &Path) -> Result<Vec<String>> {
    let mut archive = open(path)?;
    let mut names = Vec::new();
    for entry in archive.entries().map_err(|e| ScanError::io(path, e))? {
        let entry = entry.map_err(|e| ScanError::io(path, e))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let name = entry.path().map_err(|e| ScanError::io(path, e))?;
        names.push(name.to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Pick the member to read.
///
/// Include patterns are tried in priority order; within one pattern the
/// first surviving name in sorted order wins.
#[must_use]
pub fn select_member(names: &[String], include: &PatternSet, ignore: &PatternSet) -> Option<String> {
    let mut sorted: Vec<&String> = names.iter().collect();
    sorted.sort();

    for pattern in include.iter() {
        let found = sorted.iter().find(|name| {
            let member = Path::new(name.as_str());
            PatternSet::pattern_matches(pattern, member) && !ignore.matches(member)
        });
        if let Some(name) = found {
            return Some((*name).clone());
        }
    }
    None
}

/// Extract one member's bytes
pub fn read_member(path: &Path, member: &str) -> Result<Vec<u8>> {
    let mut archive = open(path)?;
    for entry in archive.entries().map_err(|e| ScanError::io(path, e))? {
        let mut entry = entry.map_err(|e| ScanError::io(path, e))?;
        let name = entry.path().map_err(|e| ScanError::io(path, e))?;
        if name.to_string_lossy() != member {
            continue;
        }
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| ScanError::io(path, e))?;
        debug!("{}: extracted {member} ({} bytes)", path.display(), bytes.len());
        return Ok(bytes);
    }
    Err(ScanError::NotFound {
        spec: path.display().to_string(),
        patterns: member.to_string(),
    })
}
