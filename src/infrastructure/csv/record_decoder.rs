// ============================================================
// RECORD DECODER
// ============================================================
// Parse delimited text into an ordered sequence of keyed records

use std::collections::HashSet;
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, warn};

use super::quoting::{check_quoting, delimiter_counts};
use super::text_encoding::decode_text;
use crate::domain::csv::{DecoderConfig, Record, RecordSequence, WidthPolicy};
use crate::domain::error::{AppError, ConversionError};

/// Records sampled when guessing the delimiter
const DETECTION_SAMPLE: usize = 10;

/// Stateless CSV to record decoder
#[derive(Debug, Clone)]
pub struct RecordDecoder {
    config: DecoderConfig,
    delimiter: u8,
}

impl Default for RecordDecoder {
    fn default() -> Self {
        Self {
            config: DecoderConfig::default(),
            delimiter: b',',
        }
    }
}

impl RecordDecoder {
    /// Create a decoder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder from a config, rejecting unusable delimiters
    pub fn with_config(config: DecoderConfig) -> Result<Self, AppError> {
        let delimiter = config.delimiter_byte().map_err(AppError::ValidationError)?;
        Ok(Self { config, delimiter })
    }

    /// Set custom delimiter; must be ASCII and not a quote or line break
    pub fn with_delimiter(mut self, delimiter: char) -> Result<Self, AppError> {
        self.config.delimiter = delimiter;
        self.delimiter = self
            .config
            .delimiter_byte()
            .map_err(AppError::ValidationError)?;
        Ok(self)
    }

    /// Set whether to trim whitespace
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.config.trim = trim;
        self
    }

    /// Set the row width mismatch policy
    pub fn with_width_policy(mut self, policy: WidthPolicy) -> Self {
        self.config.width_policy = policy;
        self
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode raw file bytes
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<RecordSequence, ConversionError> {
        let text = decode_text(bytes)?;
        self.decode(&text)
    }

    /// Decode CSV text; the first row is the header
    pub fn decode(&self, text: &str) -> Result<RecordSequence, ConversionError> {
        if text.trim().is_empty() {
            return Ok(RecordSequence::empty());
        }

        let delimiter = if self.config.auto_detect_delimiter {
            detect_delimiter(text)
        } else {
            self.delimiter
        };

        check_quoting(text, delimiter)?;

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(if self.config.trim { Trim::All } else { Trim::None })
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| ConversionError::malformed(format!("failed to read header row: {}", e)))?
            .clone();
        let columns: Arc<[String]> = Arc::from(normalize_headers(&headers));

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result
                .map_err(|e| ConversionError::malformed(format!("failed to parse row: {}", e)))?;

            if is_blank_line(&row) {
                continue;
            }
            if let Some(values) = self.fit_row(&row, columns.len())? {
                records.push(Record::new(columns.clone(), values));
            }
        }

        debug!(
            columns = columns.len(),
            rows = records.len(),
            delimiter = %char::from(delimiter),
            "Decoded CSV text"
        );

        Ok(RecordSequence::new(columns, records))
    }

    /// Apply the width policy; `None` means the row is skipped
    fn fit_row(
        &self,
        row: &StringRecord,
        width: usize,
    ) -> Result<Option<Vec<String>>, ConversionError> {
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        if row.len() != width {
            match self.config.width_policy {
                WidthPolicy::PadOrTruncate => {
                    debug!(line, expected = width, found = row.len(), "Fitting row to header width");
                }
                WidthPolicy::SkipRow => {
                    warn!(line, expected = width, found = row.len(), "Skipping row with mismatched width");
                    return Ok(None);
                }
                WidthPolicy::Reject => {
                    return Err(ConversionError::RowWidthMismatch {
                        line,
                        expected: width,
                        found: row.len(),
                    });
                }
            }
        }

        let values = (0..width)
            .map(|idx| row.get(idx).unwrap_or("").to_string())
            .collect();
        Ok(Some(values))
    }
}

/// Column keys from the header row.
///
/// Empty cells become `field{n}` (1-based) and repeated names get `_2`, `_3`, ...
/// so every column keeps its own key.
fn normalize_headers(headers: &StringRecord) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(headers.len());

    for (idx, header) in headers.iter().enumerate() {
        let base = if header.is_empty() {
            format!("field{}", idx + 1)
        } else {
            header.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 2;
        while seen.contains(&name) {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        if name != base {
            warn!(column = idx + 1, header = %base, renamed = %name, "Duplicate CSV header renamed");
        }

        seen.insert(name.clone());
        columns.push(name);
    }

    columns
}

/// A whitespace-only line reads as a single blank field; the csv reader
/// only skips lines that are completely empty.
fn is_blank_line(row: &StringRecord) -> bool {
    row.len() == 1 && row[0].trim().is_empty()
}

/// Guess the delimiter (comma, semicolon, tab, pipe) from the first records.
///
/// Only delimiters outside quoted fields count. The candidate whose header
/// count is matched by the most sampled records wins, then the one splitting
/// the header into more fields. Candidates that break quoting are skipped.
pub fn detect_delimiter(content: &str) -> u8 {
    let mut best = (b',', (0, 0));

    for candidate in [b',', b';', b'\t', b'|'] {
        let counts = match delimiter_counts(content, candidate, DETECTION_SAMPLE) {
            Ok(counts) => counts,
            Err(_) => continue,
        };
        let header = match counts.first() {
            Some(&header) if header > 0 => header,
            _ => continue,
        };

        let agreeing = counts.iter().filter(|&&count| count == header).count();
        if (agreeing, header) > best.1 {
            best = (candidate, (agreeing, header));
        }
    }

    best.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(seq: &RecordSequence, idx: usize) -> Vec<&str> {
        seq.get(idx).unwrap().keys().collect()
    }

    #[test]
    fn test_decode_simple_csv() {
        let seq = RecordDecoder::new()
            .decode("name,age\nAlice,30\nBob,25\n")
            .unwrap();

        assert_eq!(seq.len(), 2);
        assert_eq!(seq.columns(), ["name", "age"]);
        assert_eq!(keys(&seq, 0), ["name", "age"]);
        assert_eq!(seq.get(0).unwrap().get("name"), Some("Alice"));
        assert_eq!(seq.get(1).unwrap().get("age"), Some("25"));
    }

    #[test]
    fn test_every_record_shares_header_keys() {
        let text = "id,city,zip\n1,Oslo,0150\n2,Bergen,5003\n3,Tromso,9008";
        let seq = RecordDecoder::new().decode(text).unwrap();

        assert_eq!(seq.len(), 3);
        for record in &seq {
            assert_eq!(record.keys().collect::<Vec<_>>(), ["id", "city", "zip"]);
        }
    }

    #[test]
    fn test_empty_and_header_only_inputs() {
        let decoder = RecordDecoder::new();
        assert!(decoder.decode("").unwrap().is_empty());
        assert!(decoder.decode("\n\n").unwrap().is_empty());

        let header_only = decoder.decode("col1,col2\n").unwrap();
        assert!(header_only.is_empty());
        assert_eq!(header_only.columns(), ["col1", "col2"]);
    }

    #[test]
    fn test_whitespace_only_lines_are_ignored() {
        let seq = RecordDecoder::new().decode("a,b\n1,2\n   \n\t\n3,4\n").unwrap();
        assert_eq!(
            seq.to_json_string().unwrap(),
            r#"[{"a":"1","b":"2"},{"a":"3","b":"4"}]"#
        );

        let raw = RecordDecoder::new()
            .with_trim(false)
            .decode("a,b\n1,2\n  \n")
            .unwrap();
        assert_eq!(raw.len(), 1);

        // An intentionally empty row of cells is kept
        let empty_cells = RecordDecoder::new().decode("a,b\n,\n").unwrap();
        assert_eq!(empty_cells.len(), 1);
    }

    #[test]
    fn test_quoted_fields_keep_delimiters_and_newlines() {
        let text = "name,note\n\"Smith, J\",\"line one\nline two\"\n\"O\"\"Neil\",ok\n";
        let seq = RecordDecoder::new().decode(text).unwrap();

        assert_eq!(seq.len(), 2);
        assert_eq!(seq.get(0).unwrap().get("name"), Some("Smith, J"));
        assert_eq!(seq.get(0).unwrap().get("note"), Some("line one\nline two"));
        assert_eq!(seq.get(1).unwrap().get("name"), Some("O\"Neil"));
    }

    #[test]
    fn test_unterminated_quote_is_error() {
        let err = RecordDecoder::new()
            .decode("a,b\n\"unclosed,1\n")
            .unwrap_err();
        assert!(matches!(err, ConversionError::MalformedInput { .. }));
        assert!(err.cause().starts_with("malformed quoting"));
    }

    #[test]
    fn test_short_and_long_rows_are_fitted_by_default() {
        let seq = RecordDecoder::new().decode("a,b,c\n1\n1,2,3,4\n").unwrap();

        let short = seq.get(0).unwrap();
        assert_eq!(short.values().collect::<Vec<_>>(), ["1", "", ""]);

        let long = seq.get(1).unwrap();
        assert_eq!(long.values().collect::<Vec<_>>(), ["1", "2", "3"]);
    }

    #[test]
    fn test_skip_row_policy() {
        let seq = RecordDecoder::new()
            .with_width_policy(WidthPolicy::SkipRow)
            .decode("a,b\n1,2\n3\n4,5\n")
            .unwrap();

        assert_eq!(seq.len(), 2);
        assert_eq!(seq.get(1).unwrap().get("a"), Some("4"));
    }

    #[test]
    fn test_reject_policy_reports_line() {
        let err = RecordDecoder::new()
            .with_width_policy(WidthPolicy::Reject)
            .decode("a,b\n1,2\n3,4,5\n")
            .unwrap_err();

        assert_eq!(
            err,
            ConversionError::RowWidthMismatch {
                line: 3,
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn test_trim_is_configurable() {
        let text = "name , age\n Alice , 30 \n";

        let trimmed = RecordDecoder::new().decode(text).unwrap();
        assert_eq!(trimmed.get(0).unwrap().get("name"), Some("Alice"));

        let raw = RecordDecoder::new().with_trim(false).decode(text).unwrap();
        assert_eq!(raw.columns(), ["name ", " age"]);
        assert_eq!(raw.get(0).unwrap().get("name "), Some(" Alice "));
    }

    #[test]
    fn test_blank_and_duplicate_headers() {
        let seq = RecordDecoder::new().decode("id,,id\n1,2,3\n").unwrap();
        assert_eq!(seq.columns(), ["id", "field2", "id_2"]);
        assert_eq!(seq.get(0).unwrap().get("id_2"), Some("3"));
    }

    #[test]
    fn test_custom_and_detected_delimiters() {
        let text = "a;b\n1;2\n";

        let fixed = RecordDecoder::new()
            .with_delimiter(';')
            .unwrap()
            .decode(text)
            .unwrap();
        assert_eq!(fixed.get(0).unwrap().get("b"), Some("2"));

        let config = DecoderConfig {
            auto_detect_delimiter: true,
            ..Default::default()
        };
        let detected = RecordDecoder::with_config(config)
            .unwrap()
            .decode(text)
            .unwrap();
        assert_eq!(detected.get(0).unwrap().get("b"), Some("2"));
    }

    #[test]
    fn test_non_ascii_delimiter_is_rejected() {
        let err = RecordDecoder::new().with_delimiter('\u{140}').unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let config = DecoderConfig {
            delimiter: '\u{140}',
            ..Default::default()
        };
        assert!(RecordDecoder::with_config(config).is_err());
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\nd,e,f"), b',');
        assert_eq!(detect_delimiter("a;b;c\nd;e;f"), b';');
        assert_eq!(detect_delimiter("a\tb\nc\td"), b'\t');
        assert_eq!(detect_delimiter(""), b',');
        assert_eq!(detect_delimiter("single\nvalue"), b',');
    }

    #[test]
    fn test_detect_delimiter_ignores_quoted_commas() {
        let text = "id;digits\n1;\"1,2,3,4,5,6,7,8,9\"\n2;\"1,2,3,4,5,6,7,8,9\"\n";
        assert_eq!(detect_delimiter(text), b';');
    }

    #[test]
    fn test_decode_bytes_rejects_invalid_utf8() {
        let err = RecordDecoder::new()
            .decode_bytes(b"name\n\xff\xfe\xfd\n")
            .unwrap_err();
        assert!(matches!(err, ConversionError::MalformedInput { .. }));
    }

    #[test]
    fn test_crlf_line_endings() {
        let seq = RecordDecoder::new().decode("name,age\r\nAlice,30\r\n").unwrap();
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.get(0).unwrap().get("age"), Some("30"));
    }
}
