//! Configuration text parsing.
//!
//! This module turns raw configuration text into a [`Record`](crate::record::Record):
//! - [`Lexer`]: Shared tokenizer, configured per input format by a [`Dialect`]
//! - [`ParameterDocParser`]: `MOM_parameter_doc` dumps with `GROUP%` ... `%GROUP` nesting
//! - [`NamelistParser`]: Fortran `&name ... /` namelists, with an upper-case-only
//!   variant for namelist echoes in model logs
//! - [`patterns`]: Glob translation and matching for file selection and key exclusion

pub mod lexer;
pub mod namelist;
pub mod parameter_doc;
pub mod patterns;

pub use lexer::{Dialect, Lexer, Token};
pub use namelist::NamelistParser;
pub use parameter_doc::ParameterDocParser;
pub use patterns::{glob_to_regex, KeyFilter, PatternSet};
