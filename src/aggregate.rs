//! Multi-source scanning and comparison.
//!
//! [`Scanner`] resolves and parses each input in order. One input yields its
//! [`Record`]; several inputs yield a [`ComparisonTable`] restricted to the keys
//! that differ somewhere along the chain of consecutive sources.

use std::collections::BTreeSet;
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, warn};
use serde::Serialize;

use crate::config::{ScanConfig, ScanMode};
use crate::error::Result;
use crate::parser::{KeyFilter, NamelistParser, ParameterDocParser, PatternSet};
use crate::record::Record;
use crate::source::SourceLocator;

/// The parser a scan mode uses
#[derive(Debug, Clone)]
enum ModeParser {
    ParameterDoc(ParameterDocParser),
    Namelist(NamelistParser),
}

/// Key/value rows for several sources over a shared, sorted key set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ComparisonTable {
    #[serde(skip)]
    keys: Vec<String>,
    rows: IndexMap<String, IndexMap<String, String>>,
}

impl ComparisonTable {
    /// Build a table over `keys` with one row per record.
    ///
    /// Rows are keyed by source label. A label seen before gets a ` #N`
    /// suffix, so every record keeps its own row.
    #[must_use]
    pub fn build(records: &[Record], keys: Vec<String>) -> Self {
        let mut rows = IndexMap::new();
        for record in records {
            let row: IndexMap<String, String> = keys
                .iter()
                .map(|k| (k.clone(), record.get_or_placeholder(k).to_string()))
                .collect();
            let label = unique_label(&rows, record.label());
            rows.insert(label, row);
        }
        Self { keys, rows }
    }

    /// Interesting keys, sorted
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Source labels in input order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &IndexMap<String, String>)> {
        self.rows.iter().map(|(label, row)| (label.as_str(), row))
    }

    /// Cell for a source label and key
    #[must_use]
    pub fn cell(&self, label: &str, key: &str) -> Option<&str> {
        self.rows
            .get(label)
            .and_then(|row| row.get(key))
            .map(String::as_str)
    }
}

fn unique_label(rows: &IndexMap<String, IndexMap<String, String>>, label: &str) -> String {
    if !rows.contains_key(label) {
        return label.to_string();
    }
    let mut n = 2;
    let mut candidate = format!("{label} #{n}");
    while rows.contains_key(&candidate) {
        n += 1;
        candidate = format!("{label} #{n}");
    }
    warn!("{label} appears more than once; its row is labelled {candidate}");
    candidate
}

/// Result of scanning one or many inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ScanOutput {
    Single(Record),
    Table(ComparisonTable),
}

impl ScanOutput {
    /// One record stands alone; several are reduced to their differences
    #[must_use]
    pub fn from_records(mut records: Vec<Record>) -> Self {
        if records.len() == 1 {
            if let Some(record) = records.pop() {
                return ScanOutput::Single(record);
            }
        }
        let keys = interesting_keys(&records);
        ScanOutput::Table(ComparisonTable::build(&records, keys))
    }
}

/// Sorted union of the keys of every consecutive-pair diff
#[must_use]
pub fn interesting_keys(records: &[Record]) -> Vec<String> {
    let mut keys = BTreeSet::new();
    for pair in records.windows(2) {
        debug!("comparing {} <--> {}", pair[0].label(), pair[1].label());
        keys.extend(pair[0].compare(&pair[1]).into_keys());
    }
    keys.into_iter().collect()
}

/// Drives resolution and parsing for a list of inputs
#[derive(Debug, Clone)]
pub struct Scanner {
    config: ScanConfig,
    parser: ModeParser,
    ignore: PatternSet,
}

impl Scanner {
    /// Prepare a scanner; exclude and ignore patterns are compiled once here
    pub fn new(config: ScanConfig) -> Result<Self> {
        let parser = match config.mode {
            ScanMode::ParameterDoc => ModeParser::ParameterDoc(ParameterDocParser::new(
                config.exclude.iter().cloned(),
                config.model_name.clone(),
            )),
            ScanMode::Namelist | ScanMode::Mom6Namelist => {
                ModeParser::Namelist(NamelistParser::new(KeyFilter::new(&config.exclude)?))
            }
            ScanMode::Log => ModeParser::Namelist(NamelistParser::log(KeyFilter::new(
                &config.exclude,
            )?)),
        };
        let ignore = PatternSet::new(&config.ignore_patterns())?;
        Ok(Self {
            config,
            parser,
            ignore,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Resolve and parse one input
    pub fn scan_one(&self, spec: &Path) -> Result<Record> {
        let include = PatternSet::new(&self.config.include_patterns(spec))?;
        let locator = SourceLocator::new(include, self.ignore.clone());
        let source = locator.resolve(spec)?.read_text()?;
        debug!("{}: scanning {} ({:?})", spec.display(), source.label, self.config.mode);

        match &self.parser {
            ModeParser::ParameterDoc(parser) => parser.parse(&source),
            ModeParser::Namelist(parser) => parser.parse(&source),
        }
    }

    /// Scan every input in order; the first failure aborts the scan
    pub fn scan_all<P: AsRef<Path>>(&self, specs: &[P]) -> Result<ScanOutput> {
        let mut records = Vec::with_capacity(specs.len());
        for spec in specs {
            records.push(self.scan_one(spec.as_ref())?);
        }
        Ok(ScanOutput::from_records(records))
    }
}
