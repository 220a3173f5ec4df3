/// `ParameterDocParser` - Reads `MOM_parameter_doc.{all,short}` dumps
///
/// The file is a sequence of `KEY = value[, value...]` assignments with `!`
/// comments. Named groups are opened by a token ending in `%` (`KPP%`) and
/// closed by a token starting with `%` (`%KPP`); keys inside a group are
/// prefixed with the open token itself, giving `KPP%N_SMOOTH`.
use std::collections::HashSet;

use log::debug;

use super::lexer::{Dialect, Lexer};
use crate::error::{Result, ScanError};
use crate::record::Record;
use crate::source::SourceText;

const SCOPE_MARKER: char = '%';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    ExpectingKey,
    ExpectingValue,
}

#[derive(Debug, Clone, Default)]
pub struct ParameterDocParser {
    /// Exact qualified keys to parse but not store
    exclude: HashSet<String>,
    /// Prepended to every key as `<model_name>%`
    model_name: Option<String>,
}

impl ParameterDocParser {
    #[must_use]
    pub fn new<I, S>(exclude: I, model_name: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exclude: exclude.into_iter().map(Into::into).collect(),
            model_name,
        }
    }

    fn qualify(&self, scopes: &[String], leaf: &str) -> String {
        // The open token already ends in '%', so plain concatenation is enough
        let key = format!("{}{leaf}", scopes.concat());
        match &self.model_name {
            Some(model) => format!("{model}{SCOPE_MARKER}{key}"),
            None => key,
        }
    }

    /// Parse one parameter doc into a [`Record`]
    ///
    /// Each value element re-commits the joined list so far, so the last
    /// commit for a key holds the full list.
    pub fn parse(&self, source: &SourceText) -> Result<Record> {
        let mut record = Record::new(source.label.clone(), source.modified);
        let mut scopes: Vec<String> = Vec::new();
        let mut values: Vec<String> = Vec::new();
        let mut key: Option<String> = None;
        let mut mode = Mode::ExpectingKey;
        let mut append = false;
        // A ',' straight after a commit continues the same list
        let mut just_committed = false;

        for token in Lexer::new(&source.text, Dialect::PARAMETER_DOC, &source.label) {
            let token = token?;
            let t = token.as_str();

            if t.ends_with(SCOPE_MARKER) {
                scopes.push(t.to_string());
                mode = Mode::ExpectingKey;
                just_committed = false;
                continue;
            }
            if t.starts_with(SCOPE_MARKER) {
                if scopes.pop().is_none() {
                    return Err(ScanError::UnbalancedScope {
                        label: source.label.clone(),
                        token: t.to_string(),
                        line: token.line,
                    });
                }
                mode = Mode::ExpectingKey;
                just_committed = false;
                continue;
            }

            match (mode, t) {
                (Mode::ExpectingKey, "=") => {
                    values.clear();
                    append = false;
                    mode = Mode::ExpectingValue;
                }
                (Mode::ExpectingValue, "=") => {
                    return Err(ScanError::UnexpectedToken {
                        label: source.label.clone(),
                        token: t.to_string(),
                        line: token.line,
                        reason: "already expecting a value",
                    });
                }
                (Mode::ExpectingKey, ",") if just_committed => {
                    append = true;
                    mode = Mode::ExpectingValue;
                }
                (Mode::ExpectingKey, _) => {
                    key = Some(self.qualify(&scopes, t));
                    just_committed = false;
                }
                (Mode::ExpectingValue, ",") => append = true,
                (Mode::ExpectingValue, _) => {
                    let Some(current) = key.as_deref() else {
                        return Err(ScanError::UnexpectedToken {
                            label: source.label.clone(),
                            token: t.to_string(),
                            line: token.line,
                            reason: "value before any key",
                        });
                    };
                    values.push(t.to_string());
                    if !self.exclude.contains(current) {
                        record.set(current, values.join(","));
                    }
                    if append {
                        debug!("{}: {current} extended to {} elements", source.label, values.len());
                    }
                    append = false;
                    just_committed = true;
                    mode = Mode::ExpectingKey;
                }
            }
        }

        debug!("{}: {} parameters", source.label, record.len());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Record> {
        ParameterDocParser::default().parse(&SourceText::inline(text, "MOM_parameter_doc.all"))
    }

    fn entries(record: &Record) -> Vec<(String, String)> {
        record
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_flat_assignments() {
        let record = parse("A = 1\nB = 2, 3\n").unwrap();
        assert_eq!(
            entries(&record),
            vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), "2,3".to_string())
            ]
        );
    }

    #[test]
    fn test_nested_scope() {
        let record = parse("GROUP% \n X = 5 \n %GROUP \n").unwrap();
        assert_eq!(record.get("GROUP%X"), Some("5"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_two_level_scope() {
        let input = "OUTER%\nINNER%\nX = 1\n%INNER\nY = 2\n%OUTER\nZ = 3\n";
        let record = parse(input).unwrap();
        assert_eq!(record.get("OUTER%INNER%X"), Some("1"));
        assert_eq!(record.get("OUTER%Y"), Some("2"));
        assert_eq!(record.get("Z"), Some("3"));
    }

    #[test]
    fn test_realistic_doc() {
        let input = "\
! This file was written by the model and records the non-default parameters used at run-time.

! === module MOM ===
SPLIT = True                    !   [Boolean] default = True
DT = 1800.0                     !   [s]
NK = 75                         !   [nondim]
HYCOM_CFL_FILE = \"cfl.nc\"       !
DIAG_COORDS = \"z Z ZSTAR\", \"rho2 RHO2 RHO\" ! default = \"z Z ZSTAR\"
KPP%
N_SMOOTH = 2                    !   [nondim] default = 0
%KPP
";
        let record = parse(input).unwrap();
        assert_eq!(record.get("SPLIT"), Some("True"));
        assert_eq!(record.get("DT"), Some("1800.0"));
        assert_eq!(record.get("HYCOM_CFL_FILE"), Some("\"cfl.nc\""));
        assert_eq!(
            record.get("DIAG_COORDS"),
            Some("\"z Z ZSTAR\",\"rho2 RHO2 RHO\"")
        );
        assert_eq!(record.get("KPP%N_SMOOTH"), Some("2"));
        assert_eq!(record.len(), 6);
    }

    #[test]
    fn test_long_list() {
        let record = parse("LAYOUT = 1, 2, 3, 4\nNEXT = 5\n").unwrap();
        assert_eq!(record.get("LAYOUT"), Some("1,2,3,4"));
        assert_eq!(record.get("NEXT"), Some("5"));
    }

    #[test]
    fn test_reassignment_updates_in_place() {
        let record = parse("A = 1\nB = 2\nA = 3\n").unwrap();
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(record.get("A"), Some("3"));
    }

    #[test]
    fn test_double_equals_is_error() {
        let result = parse("A = = 1\n");
        assert!(matches!(
            result,
            Err(ScanError::UnexpectedToken { line: 1, .. })
        ));
    }

    #[test]
    fn test_value_before_key_is_error() {
        let result = parse("= 1\n");
        assert!(matches!(result, Err(ScanError::UnexpectedToken { .. })));
    }

    #[test]
    fn test_unbalanced_close_is_error() {
        let result = parse("A = 1\n%GROUP\n");
        assert!(matches!(
            result,
            Err(ScanError::UnbalancedScope { line: 2, .. })
        ));
    }

    #[test]
    fn test_exclude_exact_keys() {
        let parser = ParameterDocParser::new(["DT", "KPP%N_SMOOTH"], None);
        let text = "DT = 1\nDT = 2, 3\nKPP%\nN_SMOOTH = 2\n%KPP\nN_SMOOTH = 4\n";
        let record = parser.parse(&SourceText::inline(text, "doc")).unwrap();
        assert_eq!(record.get("DT"), None);
        assert_eq!(record.get("KPP%N_SMOOTH"), None);
        assert_eq!(record.get("N_SMOOTH"), Some("4"));
    }

    #[test]
    fn test_model_name_prefix() {
        let parser = ParameterDocParser::new(Vec::<String>::new(), Some("MOM".to_string()));
        let text = "DT = 1\nKPP%\nN = 2\n%KPP\n";
        let record = parser.parse(&SourceText::inline(text, "doc")).unwrap();
        assert_eq!(record.get("MOM%DT"), Some("1"));
        assert_eq!(record.get("MOM%KPP%N"), Some("2"));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = "A = 1\nG%\nB = 2, 3\n%G\n";
        let source = SourceText::inline(text, "doc");
        let parser = ParameterDocParser::default();
        assert_eq!(parser.parse(&source).unwrap(), parser.parse(&source).unwrap());
    }
}
