// ============================================================
// RECORD TYPES
// ============================================================
// Ordered key-value rows produced by the record decoder

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// One decoded row, keyed by column name.
///
/// Keys are shared with every other record of the same sequence, so the
/// key set and key order are identical across a sequence by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    columns: Arc<[String]>,
    values: Vec<String>,
}

impl Record {
    /// Caller guarantees `values.len() == columns.len()`
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<String>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Look up a cell by column name
    pub fn get(&self, key: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|column| column == key)
            .map(|idx| self.values[idx].as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    /// Iterate `(key, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keys().zip(self.values())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Full ordered decode result for one file.
///
/// Immutable once produced; the pipeline swaps whole sequences rather
/// than editing one in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSequence {
    columns: Arc<[String]>,
    records: Vec<Record>,
}

impl RecordSequence {
    /// Sequence with no columns and no rows (empty input)
    pub fn empty() -> Self {
        Self {
            columns: Arc::from(Vec::new()),
            records: Vec::new(),
        }
    }

    pub(crate) fn new(columns: Arc<[String]>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    /// Header columns in source order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// JSON array of objects, keys in column order
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Default for RecordSequence {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a> IntoIterator for &'a RecordSequence {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl Serialize for RecordSequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for record in &self.records {
            seq.serialize_element(record)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RecordSequence {
        let columns: Arc<[String]> = Arc::from(vec!["name".to_string(), "age".to_string()]);
        let records = vec![
            Record::new(columns.clone(), vec!["Alice".into(), "30".into()]),
            Record::new(columns.clone(), vec!["Bob".into(), "25".into()]),
        ];
        RecordSequence::new(columns, records)
    }

    #[test]
    fn test_record_lookup() {
        let seq = sample();
        let bob = seq.get(1).unwrap();
        assert_eq!(bob.get("name"), Some("Bob"));
        assert_eq!(bob.get("age"), Some("25"));
        assert_eq!(bob.get("city"), None);
    }

    #[test]
    fn test_json_keeps_column_order() {
        // "name" sorts after "age", so a sorted map would flip them
        let json = sample().to_json_string().unwrap();
        assert_eq!(
            json,
            r#"[{"name":"Alice","age":"30"},{"name":"Bob","age":"25"}]"#
        );
    }

    #[test]
    fn test_empty_sequence() {
        let seq = RecordSequence::empty();
        assert!(seq.is_empty());
        assert!(seq.columns().is_empty());
        assert_eq!(seq.to_json_string().unwrap(), "[]");
    }
}
