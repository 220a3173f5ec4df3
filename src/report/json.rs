use crate::aggregate::ScanOutput;

/// Serialize a scan result with two-space indentation
pub fn to_json(output: &ScanOutput) -> serde_json::Result<String> {
    serde_json::to_string_pretty(output)
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::aggregate::{interesting_keys, ComparisonTable};
    use crate::record::Record;

    #[test]
    fn test_single_record_keeps_insertion_order() {
        let mut record = Record::new("doc", SystemTime::UNIX_EPOCH);
        record.set("NK", "75");
        record.set("DT", "1800.0");

        let json = to_json(&ScanOutput::Single(record)).unwrap();
        assert_eq!(json, "{\n  \"NK\": \"75\",\n  \"DT\": \"1800.0\"\n}");
    }

    #[test]
    fn test_table() {
        let mut a = Record::new("run1", SystemTime::UNIX_EPOCH);
        a.set("DT", "1");
        let mut b = Record::new("run2", SystemTime::UNIX_EPOCH);
        b.set("DT", "2");
        let records = vec![a, b];
        let table = ComparisonTable::build(&records, interesting_keys(&records));

        let value: serde_json::Value =
            serde_json::from_str(&to_json(&ScanOutput::Table(table)).unwrap()).unwrap();
        assert_eq!(value["run1"]["DT"], "1");
        assert_eq!(value["run2"]["DT"], "2");
    }
}
