//! HTML tables for scan results.
//!
//! A single record becomes a Parameter/Value table under a heading naming its
//! source. A comparison table puts sources in columns and keys in rows, or the
//! other way round when transposed. Markup is built with `maud`, so every
//! interpolated label, key and value is escaped.

use maud::{html, Markup, DOCTYPE};

use crate::aggregate::{ComparisonTable, ScanOutput};
use crate::record::Record;

/// Break a path before each `/` so long source labels wrap in column headers.
///
/// Segments are escaped; an absolute path starts with `/`, not a line break.
#[must_use]
pub fn split_path(path: &str) -> Markup {
    html! {
        @for (i, segment) in path.split('/').enumerate() {
            @if i > 0 {
                @if i > 1 || !path.starts_with('/') {
                    br;
                }
                "/"
            }
            (segment)
        }
    }
}

/// Render a complete HTML document
#[must_use]
pub fn to_html(output: &ScanOutput, title: &str, transpose: bool) -> String {
    html! {
        (DOCTYPE)
        html {
            head {
                meta http-equiv="content-type" content="text/html; charset=UTF-8";
                title { (title) }
            }
            body {
                @match output {
                    ScanOutput::Single(record) => { (record_table(record)) }
                    ScanOutput::Table(table) => {
                        @if transpose {
                            (sources_as_rows(table))
                        } @else {
                            (sources_as_columns(table))
                        }
                    }
                }
            }
        }
    }
    .into_string()
}

fn record_table(record: &Record) -> Markup {
    html! {
        h1 { (record.label()) }
        table {
            tr {
                th { "Parameter" }
                th { "Value" }
            }
            @for (key, value) in record {
                tr {
                    td { (key) }
                    td { (value) }
                }
            }
        }
    }
}

/// Keys down the side, one column per source
fn sources_as_columns(table: &ComparisonTable) -> Markup {
    html! {
        table {
            tr {
                th { "Parameter" }
                @for label in table.labels() {
                    th { div { (split_path(label)) } }
                }
            }
            @for key in table.keys() {
                tr {
                    td { (key) }
                    @for (_, row) in table.rows() {
                        td { (row.get(key).map_or("", String::as_str)) }
                    }
                }
            }
        }
    }
}

/// Sources down the side, one column per key
fn sources_as_rows(table: &ComparisonTable) -> Markup {
    html! {
        table {
            tr {
                th { "Source" }
                @for key in table.keys() {
                    th { div { (key) } }
                }
            }
            @for (label, row) in table.rows() {
                tr {
                    td { (label) }
                    @for key in table.keys() {
                        td { (row.get(key).map_or("", String::as_str)) }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::aggregate::interesting_keys;

    fn table() -> ComparisonTable {
        let mut a = Record::new("/work/run1/MOM_parameter_doc.all", SystemTime::UNIX_EPOCH);
        a.set("DT", "900.0");
        a.set("NK", "75");
        let mut b = Record::new("/work/run2/MOM_parameter_doc.all", SystemTime::UNIX_EPOCH);
        b.set("DT", "1800.0");
        b.set("NK", "75");
        let records = vec![a, b];
        ComparisonTable::build(&records, interesting_keys(&records))
    }

    #[test]
    fn test_split_path_absolute() {
        assert_eq!(
            split_path("/work/run1/doc").into_string(),
            "/work<br>/run1<br>/doc"
        );
    }

    #[test]
    fn test_split_path_relative() {
        assert_eq!(split_path("run1/doc").into_string(), "run1<br>/doc");
        assert_eq!(split_path("doc").into_string(), "doc");
    }

    #[test]
    fn test_split_path_escapes_segments() {
        assert_eq!(split_path("a&b/<c>").into_string(), "a&amp;b<br>/&lt;c&gt;");
    }

    #[test]
    fn test_single_record() {
        let mut record = Record::new("input.nml", SystemTime::UNIX_EPOCH);
        record.set("mode%flag", "\"<on>\" & off");

        let html = to_html(&ScanOutput::Single(record), "MOM6 parameters", false);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>MOM6 parameters</title>"));
        assert!(html.contains("<h1>input.nml</h1>"));
        assert!(html.contains("<td>mode%flag</td><td>&quot;&lt;on&gt;&quot; &amp; off</td>"));
        assert!(html.ends_with("</html>"));
    }

    #[test]
    fn test_table_sources_as_columns() {
        let html = to_html(&ScanOutput::Table(table()), "t", false);
        assert!(html.contains("<th><div>/work<br>/run1<br>/MOM_parameter_doc.all</div></th>"));
        assert!(html.contains("<tr><td>DT</td><td>900.0</td><td>1800.0</td></tr>"));
        assert!(!html.contains("<td>NK</td>"));
    }

    #[test]
    fn test_table_transposed() {
        let html = to_html(&ScanOutput::Table(table()), "t", true);
        assert!(html.contains("<th><div>DT</div></th>"));
        assert!(html.contains("<tr><td>/work/run1/MOM_parameter_doc.all</td><td>900.0</td></tr>"));
    }
}
