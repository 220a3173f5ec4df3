//! Configuration management for paramscan.
//!
//! This module provides the [`ScanConfig`] struct which controls what is scanned
//! and how results are reported. Configuration can be loaded from:
//! - TOML files (`paramscan.toml`)
//! - CLI arguments (which override file settings)
//!
//! Config files are auto-discovered by searching from the filesystem root down
//! to the working directory, after the user's home directory.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Config file names to search for (in order of priority, later overrides earlier)
const CONFIG_FILE_NAMES: &[&str] = &["paramscan.toml"];

const PARAMETER_DOC_FILES: &[&str] = &["*MOM_parameter_doc.all", "*MOM_parameter_doc.short"];
const NAMELIST_FILES: &[&str] = &["*.logfile.000000.out", "*logfile.*", "input.nml", "*.nml"];
const LOG_FILES: &[&str] = &["*logfile.*"];
/// Root-PE log, skipped by default in `Mom6Namelist` mode
const ROOT_PE_LOG: &[&str] = &["*.000000.out"];

/// Get the user's home directory
fn dirs_home() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }
    if let Ok(userprofile) = std::env::var("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }
    None
}

/// What kind of configuration to scan for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanMode {
    /// `MOM_parameter_doc.{all,short}`
    #[default]
    ParameterDoc,
    /// Fortran namelists in `input.nml` or log files
    Namelist,
    /// As `Namelist`, skipping the root-PE log unless ignore patterns are given
    Mom6Namelist,
    /// Upper-case namelist echoes in model log files
    Log,
}

impl ScanMode {
    /// Include patterns, highest priority first
    #[must_use]
    pub fn default_include(self) -> &'static [&'static str] {
        match self {
            ScanMode::ParameterDoc => PARAMETER_DOC_FILES,
            ScanMode::Namelist | ScanMode::Mom6Namelist => NAMELIST_FILES,
            ScanMode::Log => LOG_FILES,
        }
    }

    /// Ignore patterns used when none are configured
    #[must_use]
    pub fn default_ignore(self) -> &'static [&'static str] {
        match self {
            ScanMode::Mom6Namelist => ROOT_PE_LOG,
            _ => &[],
        }
    }
}

/// Output serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Html,
}

/// Main configuration struct for paramscan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Scan mode (default: parameter-doc)
    #[serde(default)]
    pub mode: ScanMode,

    /// Include patterns replacing the mode defaults (empty: use defaults)
    #[serde(default)]
    pub include: Vec<String>,

    /// File patterns to skip when searching directories and archives
    #[serde(default)]
    pub ignore_files: Vec<String>,

    /// Keys to leave out of the record.
    /// Exact names for parameter docs, glob patterns for namelists.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Prefix for parameter-doc keys (`<model_name>%KEY`)
    #[serde(default)]
    pub model_name: Option<String>,

    /// Treat each input as a parameter doc whatever its name (default: false)
    #[serde(default)]
    pub assume_parameter_file: bool,

    /// Output format (default: json)
    #[serde(default)]
    pub format: OutputFormat,

    /// Sources as rows instead of columns in HTML tables (default: false)
    #[serde(default)]
    pub transpose: bool,

    /// Debug logging (default: false)
    #[serde(default)]
    pub debug: bool,
}

/// Partial configuration for TOML parsing
///
/// Scalar fields are `Option<T>` so we can distinguish between
/// "explicitly set" and "not specified" when merging configs.
#[derive(Debug, Clone, Default, Deserialize)]
struct PartialConfig {
    pub mode: Option<ScanMode>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub ignore_files: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub model_name: Option<String>,
    pub assume_parameter_file: Option<bool>,
    pub format: Option<OutputFormat>,
    pub transpose: Option<bool>,
    pub debug: Option<bool>,
}

impl ScanConfig {
    /// Include patterns for one input spec, in priority order
    #[must_use]
    pub fn include_patterns(&self, spec: &Path) -> Vec<String> {
        if !self.include.is_empty() {
            return self.include.clone();
        }
        if self.mode == ScanMode::ParameterDoc && self.assume_parameter_file {
            return vec![format!("*{}", spec.display())];
        }
        self.mode
            .default_include()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Ignore patterns, falling back to the mode default when none are set
    #[must_use]
    pub fn ignore_patterns(&self) -> Vec<String> {
        if self.ignore_files.is_empty() {
            self.mode
                .default_ignore()
                .iter()
                .map(ToString::to_string)
                .collect()
        } else {
            self.ignore_files.clone()
        }
    }

    /// Validate configuration values
    ///
    /// Returns an error message if validation fails, None if valid.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        if let Some(pattern) = self
            .include
            .iter()
            .chain(&self.ignore_files)
            .find(|p| p.trim().is_empty())
        {
            return Some(format!("file pattern {pattern:?} is empty"));
        }
        if let Some(model) = &self.model_name {
            if model.is_empty() || model.contains(char::is_whitespace) || model.contains('%') {
                return Some(format!(
                    "model_name {model:?} must be non-empty without whitespace or '%'"
                ));
            }
        }
        None
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let partial: PartialConfig = toml::from_str(&contents)?;
        let mut config = Self::default();
        config.apply_partial(partial);
        Ok(config)
    }

    /// Apply a partial config, only overriding fields that are explicitly set
    fn apply_partial(&mut self, partial: PartialConfig) {
        if let Some(v) = partial.mode {
            self.mode = v;
        }
        if let Some(v) = partial.model_name {
            self.model_name = Some(v);
        }
        if let Some(v) = partial.assume_parameter_file {
            self.assume_parameter_file = v;
        }
        if let Some(v) = partial.format {
            self.format = v;
        }
        if let Some(v) = partial.transpose {
            self.transpose = v;
        }
        if let Some(v) = partial.debug {
            self.debug = v;
        }
        // Lists accumulate across files
        self.include.extend(partial.include);
        self.ignore_files.extend(partial.ignore_files);
        self.exclude.extend(partial.exclude);
    }

    /// Discover config files for a starting directory
    ///
    /// Home directory config first, then every ancestor from the root down.
    /// Returns list of config file paths in order of priority (least specific first).
    #[must_use]
    pub fn discover_config_files(start_path: &Path) -> Vec<PathBuf> {
        let mut config_files = Vec::new();

        if let Some(home) = dirs_home() {
            for config_name in CONFIG_FILE_NAMES {
                let home_config = home.join(config_name);
                if home_config.is_file() {
                    config_files.push(home_config);
                }
            }
        }

        let start_dir = if start_path.is_file() {
            start_path.parent().map(Path::to_path_buf)
        } else if start_path.is_dir() {
            Some(start_path.to_path_buf())
        } else {
            std::env::current_dir().ok()
        };

        if let Some(dir) = start_dir {
            let mut ancestors: Vec<PathBuf> = dir.ancestors().map(Path::to_path_buf).collect();
            ancestors.reverse();

            for ancestor in ancestors {
                for config_name in CONFIG_FILE_NAMES {
                    let config_path = ancestor.join(config_name);
                    if config_path.is_file() && !config_files.contains(&config_path) {
                        config_files.push(config_path);
                    }
                }
            }
        }

        config_files
    }

    /// Load and merge configuration from discovered config files
    ///
    /// Later files override earlier ones (only explicitly set values).
    /// Returns default config if no files found.
    #[must_use]
    pub fn from_discovered_files(start_path: &Path) -> Self {
        let mut config = Self::default();
        for path in Self::discover_config_files(start_path) {
            debug!("reading config {}", path.display());
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<PartialConfig>(&contents) {
                    Ok(partial) => config.apply_partial(partial),
                    Err(e) => warn!("failed to parse {}: {e}", path.display()),
                },
                Err(e) => warn!("failed to read {}: {e}", path.display()),
            }
        }
        config
    }
}
