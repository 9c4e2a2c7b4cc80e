// ============================================================
// DECODER CONFIGURATION
// ============================================================
// Dialect and row-width settings for the record decoder

use serde::{Deserialize, Serialize};

/// What to do with a row whose field count differs from the header's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidthPolicy {
    /// Missing cells become empty strings, extra cells are dropped
    #[default]
    PadOrTruncate,

    /// The row is left out of the sequence
    SkipRow,

    /// The whole conversion fails with a row width mismatch
    Reject,
}

/// Configuration for the record decoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Field delimiter (default: comma)
    pub delimiter: char,

    /// Guess the delimiter from the first lines instead of using `delimiter`
    pub auto_detect_delimiter: bool,

    /// Trim surrounding whitespace from headers and values (default: true)
    pub trim: bool,

    /// Row/header width mismatch handling
    pub width_policy: WidthPolicy,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            auto_detect_delimiter: false,
            trim: true,
            width_policy: WidthPolicy::default(),
        }
    }
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delimiter as the single byte the csv reader expects
    pub fn delimiter_byte(&self) -> Result<u8, String> {
        let byte = u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                format!(
                    "delimiter must be a single ASCII character, got {:?}",
                    self.delimiter
                )
            })?;

        if matches!(byte, b'"' | b'\n' | b'\r') {
            return Err(format!(
                "delimiter cannot be a quote or line break, got {:?}",
                self.delimiter
            ));
        }
        Ok(byte)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        self.delimiter_byte().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DecoderConfig::default();
        assert_eq!(config.delimiter_byte(), Ok(b','));
        assert!(config.trim);
        assert_eq!(config.width_policy, WidthPolicy::PadOrTruncate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_unusable_delimiters() {
        for delimiter in ['"', '\n', 'é', '\u{140}'] {
            let config = DecoderConfig {
                delimiter,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{:?} accepted", delimiter);
            assert!(config.delimiter_byte().is_err(), "{:?} truncated", delimiter);
        }
    }
}
