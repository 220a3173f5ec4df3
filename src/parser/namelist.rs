/// `NamelistParser` - Extracts Fortran namelists from `input.nml` or model logs
///
/// A block opens with `&name` and closes with a bare `/`. Inside a block each
/// `key = value[, value...]` becomes `name%key`. Text outside blocks is
/// ignored, which lets the same parser read namelist echoes out of a log.
use log::debug;

use super::lexer::{Dialect, Lexer};
use super::patterns::KeyFilter;
use crate::error::Result;
use crate::record::Record;
use crate::source::SourceText;

const BLOCK_OPEN: char = '&';
const BLOCK_CLOSE: &str = "/";
const KEY_SEPARATOR: &str = "%";

/// Fortran logical literals that look like identifiers
const LOGICAL_LITERALS: [&str; 2] = ["F", "T"];

fn looks_like_identifier(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
}

fn is_upper_case(name: &str) -> bool {
    name.to_uppercase() == name
}

#[derive(Debug, Clone, Default)]
pub struct NamelistParser {
    exclude: KeyFilter,
    /// Only blocks whose name is written in upper case are recorded
    uppercase_only: bool,
}

impl NamelistParser {
    #[must_use]
    pub fn new(exclude: KeyFilter) -> Self {
        Self {
            exclude,
            uppercase_only: false,
        }
    }

    /// Parser for model log files, where the namelists echoed by the
    /// model are written in upper case
    #[must_use]
    pub fn log(exclude: KeyFilter) -> Self {
        Self {
            exclude,
            uppercase_only: true,
        }
    }

    fn qualify(scopes: &[String], leaf: &str) -> String {
        let leaf = leaf.to_lowercase();
        if scopes.is_empty() {
            leaf
        } else {
            format!("{}{KEY_SEPARATOR}{leaf}", scopes.join(KEY_SEPARATOR))
        }
    }

    /// Parse namelist text into a [`Record`]
    pub fn parse(&self, source: &SourceText) -> Result<Record> {
        let mut record = Record::new(source.label.clone(), source.modified);
        let mut scopes: Vec<String> = Vec::new();
        let mut values: Vec<String> = Vec::new();
        let mut key: Option<String> = None;
        let mut in_block = false;
        // Set by '=' until the first value arrives; identifiers are values then
        let mut awaiting_value = false;

        for token in Lexer::new(&source.text, Dialect::NAMELIST, &source.label) {
            let token = token?;
            let t = token.as_str();

            if t.len() > 1 && t.starts_with(BLOCK_OPEN) {
                let name = &t[1..];
                if !self.uppercase_only {
                    scopes.push(name.to_lowercase());
                    in_block = true;
                } else if is_upper_case(name) {
                    scopes.push(name.to_uppercase());
                    in_block = true;
                } else {
                    debug!("{}:{}: skipping block {t}", source.label, token.line);
                }
                continue;
            }
            if !in_block {
                continue;
            }

            if t == BLOCK_CLOSE {
                scopes.pop();
                in_block = false;
            } else if t == "=" {
                values.clear();
                awaiting_value = true;
            } else if looks_like_identifier(t) && !awaiting_value && !LOGICAL_LITERALS.contains(&t)
            {
                key = Some(Self::qualify(&scopes, t));
            } else if t == "," {
                // list separator; the next value extends the current key
            } else {
                values.push(t.to_string());
                awaiting_value = false;
                match key.as_deref() {
                    Some(current) if !self.exclude.is_excluded(current) => {
                        record.set(current, values.join(","));
                    }
                    Some(_) => {}
                    None => debug!(
                        "{}:{}: value {t} before any key",
                        source.label, token.line
                    ),
                }
            }
        }

        debug!("{}: {} namelist entries", source.label, record.len());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(parser: &NamelistParser, text: &str) -> Record {
        parser
            .parse(&SourceText::inline(text, "input.nml"))
            .unwrap()
    }

    #[test]
    fn test_single_block() {
        let record = parse(&NamelistParser::default(), "&mode\n flag = T\n/\n");
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("mode%flag"), Some("T"));
    }

    #[test]
    fn test_lowercase_block_skipped_in_log_mode() {
        let record = parse(&NamelistParser::log(KeyFilter::default()), "&mode\n flag = T\n/\n");
        assert!(record.is_empty());
    }

    #[test]
    fn test_log_echo() {
        let log = "\
 Starting to initialize ocean model
 &COUPLER_NML
 CURRENT_DATE=1900,1,1,0,0,0,
 CALENDAR=\"noleap\"                        ,
 DT_CPLD=3600,
 DO_ENDPOINT_CHKSUM=F,
 /
 &ocean_nml echo of defaults /
 done = 1
";
        let record = parse(&NamelistParser::log(KeyFilter::default()), log);
        assert_eq!(record.get("COUPLER_NML%current_date"), Some("1900,1,1,0,0,0"));
        assert_eq!(record.get("COUPLER_NML%calendar"), Some("'noleap'"));
        assert_eq!(record.get("COUPLER_NML%dt_cpld"), Some("3600"));
        assert_eq!(record.get("COUPLER_NML%do_endpoint_chksum"), Some("F"));
        assert_eq!(record.len(), 4);
    }

    #[test]
    fn test_keys_lowercased() {
        let record = parse(&NamelistParser::default(), "&Ocean_NML\n Layout = 2, 4\n/\n");
        assert_eq!(record.get("ocean_nml%layout"), Some("2,4"));
    }

    #[test]
    fn test_several_assignments_on_one_line() {
        let text = "&fms_nml clock_grain='ROUTINE', domains_stack_size = 955296, print_memory_usage=.false. /";
        let record = parse(&NamelistParser::default(), text);
        assert_eq!(record.get("fms_nml%clock_grain"), Some("'ROUTINE'"));
        assert_eq!(record.get("fms_nml%domains_stack_size"), Some("955296"));
        assert_eq!(record.get("fms_nml%print_memory_usage"), Some(".false."));
    }

    #[test]
    fn test_identifier_value_after_equals() {
        let text = "&nml\n mode = fast\n next = T\n/";
        let record = parse(&NamelistParser::default(), text);
        assert_eq!(record.get("nml%mode"), Some("fast"));
        assert_eq!(record.get("nml%next"), Some("T"));
    }

    #[test]
    fn test_logical_literals_are_values() {
        let text = "&nml\n flags = T, F, T\n/";
        let record = parse(&NamelistParser::default(), text);
        assert_eq!(record.get("nml%flags"), Some("T,F,T"));
    }

    #[test]
    fn test_double_quotes_normalized() {
        let a = parse(&NamelistParser::default(), "&n\n s = \"x\"\n/");
        let b = parse(&NamelistParser::default(), "&n\n s = 'x'\n/");
        assert_eq!(a.get("n%s"), b.get("n%s"));
    }

    #[test]
    fn test_text_outside_blocks_ignored() {
        let text = "stray = 1\n&a\n x = 1\n/\nother = 2\n/\n&b\n y = 2\n/\n";
        let record = parse(&NamelistParser::default(), text);
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["a%x", "b%y"]);
    }

    #[test]
    fn test_comments_ignored() {
        let text = "&a ! the a block\n x = 1 ! one\n! y = 2\n/\n";
        let record = parse(&NamelistParser::default(), text);
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("a%x"), Some("1"));
    }

    #[test]
    fn test_exclude_globs() {
        let exclude = KeyFilter::new(&["*%layout".to_string(), "b%*".to_string()]).unwrap();
        let text = "&a\n layout = 1, 2\n x = 1\n layout = 3\n/\n&b\n y = 2\n/\n";
        let record = parse(&NamelistParser::new(exclude), text);
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["a%x"]);
    }

    #[test]
    fn test_continued_string_collapsed() {
        let text = "&a\n title = 'first\n     second'\n/\n";
        let record = parse(&NamelistParser::default(), text);
        assert_eq!(record.get("a%title"), Some("'firstsecond'"));
    }

    #[test]
    fn test_close_outside_block_does_not_underflow() {
        let text = "/\n/\n&a\n x = 1\n/\n/\n";
        let record = parse(&NamelistParser::default(), text);
        assert_eq!(record.get("a%x"), Some("1"));
    }

    #[test]
    fn test_nested_open_qualifies_with_both_names() {
        let text = "&outer\n&inner\n x = 1\n/\n";
        let record = parse(&NamelistParser::default(), text);
        assert_eq!(record.get("outer%inner%x"), Some("1"));
    }
}
