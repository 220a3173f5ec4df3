//! paramscan - Summarize and compare MOM6 run configurations
//!
//! Scans `MOM_parameter_doc` files, Fortran namelists and FMS log files, found
//! directly, inside directory trees or inside tar archives, and reports either
//! one source's parameters or the parameters that differ across sources.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod record;
pub mod report;
pub mod source;

// Re-export commonly used types
pub use aggregate::{interesting_keys, ComparisonTable, ScanOutput, Scanner};
pub use cli::{build_cli, parse_args, parse_args_from, CliArgs};
pub use config::{OutputFormat, ScanConfig, ScanMode};
pub use error::{Result, ScanError};
pub use parser::{NamelistParser, ParameterDocParser};
pub use record::{Diff, Record, ABSENT};
pub use source::{resolve, SourceText};
