//! Rendering of scan results.
//!
//! - [`json`]: Pretty-printed JSON, a record's entries or label-to-row objects
//! - [`html`]: A standalone HTML document with one table

pub mod html;
pub mod json;

pub use html::{split_path, to_html};
pub use json::to_json;
