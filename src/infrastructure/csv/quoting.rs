// ============================================================
// QUOTE BALANCE CHECK
// ============================================================
// The csv reader accepts unterminated quotes by reading to EOF, so
// quoting is checked up front against basic RFC 4180 rules.

use crate::domain::error::ConversionError;

const QUOTE: u8 = b'"';

#[derive(Clone, Copy)]
enum Scan {
    FieldStart,
    Unquoted,
    Quoted { opened_at: u64 },
    QuoteInQuoted { opened_at: u64 },
    AfterClosingQuote,
}

/// Reject unterminated quoted fields and stray characters after a closing quote.
///
/// Quotes inside an unquoted field are literal, as the csv reader treats them.
/// Spaces and tabs between a closing quote and the next delimiter are allowed.
pub fn check_quoting(text: &str, delimiter: u8) -> Result<(), ConversionError> {
    scan(text, delimiter, |_| true)
}

/// Delimiters outside quoted fields for each of the first `limit` non-blank
/// records. A record may span several lines when a quoted field does.
pub fn delimiter_counts(
    text: &str,
    delimiter: u8,
    limit: usize,
) -> Result<Vec<usize>, ConversionError> {
    let mut counts = Vec::new();
    scan(text, delimiter, |count| {
        counts.push(count);
        counts.len() < limit
    })?;
    Ok(counts)
}

/// Walk `text` record by record. `on_record` receives the delimiter count of
/// every non-blank record and returns `false` to stop early.
fn scan(
    text: &str,
    delimiter: u8,
    mut on_record: impl FnMut(usize) -> bool,
) -> Result<(), ConversionError> {
    let mut line: u64 = 1;
    let mut state = Scan::FieldStart;
    let mut delimiters = 0;
    let mut has_content = false;

    for &byte in text.as_bytes() {
        let is_line_break = byte == b'\n' || byte == b'\r';
        let mut record_ended = false;

        state = match state {
            Scan::FieldStart | Scan::Unquoted => {
                if byte == QUOTE && matches!(state, Scan::FieldStart) {
                    Scan::Quoted { opened_at: line }
                } else if byte == delimiter {
                    delimiters += 1;
                    Scan::FieldStart
                } else if is_line_break {
                    record_ended = true;
                    Scan::FieldStart
                } else {
                    Scan::Unquoted
                }
            }
            Scan::Quoted { opened_at } => {
                if byte == QUOTE {
                    Scan::QuoteInQuoted { opened_at }
                } else {
                    Scan::Quoted { opened_at }
                }
            }
            Scan::QuoteInQuoted { opened_at } => {
                if byte == QUOTE {
                    // "" is an escaped quote
                    Scan::Quoted { opened_at }
                } else if byte == delimiter {
                    delimiters += 1;
                    Scan::FieldStart
                } else if is_line_break {
                    record_ended = true;
                    Scan::FieldStart
                } else if byte == b' ' || byte == b'\t' {
                    Scan::AfterClosingQuote
                } else {
                    return Err(stray_after_quote(line));
                }
            }
            Scan::AfterClosingQuote => {
                if byte == delimiter {
                    delimiters += 1;
                    Scan::FieldStart
                } else if is_line_break {
                    record_ended = true;
                    Scan::FieldStart
                } else if byte == b' ' || byte == b'\t' {
                    Scan::AfterClosingQuote
                } else {
                    return Err(stray_after_quote(line));
                }
            }
        };

        if record_ended {
            if has_content && !on_record(delimiters) {
                return Ok(());
            }
            delimiters = 0;
            has_content = false;
        } else if !byte.is_ascii_whitespace() {
            has_content = true;
        }

        if byte == b'\n' {
            line += 1;
        }
    }

    if let Scan::Quoted { opened_at } = state {
        return Err(ConversionError::malformed(format!(
            "malformed quoting: unterminated quoted field starting on line {}",
            opened_at
        )));
    }

    if has_content {
        on_record(delimiters);
    }

    Ok(())
}

fn stray_after_quote(line: u64) -> ConversionError {
    ConversionError::malformed(format!(
        "malformed quoting: unexpected character after closing quote on line {}",
        line
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_quotes_pass() {
        let text = "name,quote\n\"Smith, J\",\"said \"\"hi\"\"\"\n\"multi\nline\",x\n";
        assert!(check_quoting(text, b',').is_ok());
    }

    #[test]
    fn test_unterminated_quote_fails() {
        let err = check_quoting("a,b\n1,\"open\n2,3\n", b',').unwrap_err();
        let cause = err.cause();
        assert!(cause.starts_with("malformed quoting"), "{}", cause);
        assert!(cause.contains("line 2"), "{}", cause);
    }

    #[test]
    fn test_text_after_closing_quote_fails() {
        let err = check_quoting("a,b\n\"x\"y,1\n", b',').unwrap_err();
        assert!(err.cause().contains("after closing quote on line 2"));
    }

    #[test]
    fn test_whitespace_after_closing_quote_passes() {
        assert!(check_quoting("a,b\n\"x\"  ,1\n", b',').is_ok());
    }

    #[test]
    fn test_quote_inside_unquoted_field_is_literal() {
        assert!(check_quoting("a,b\n5'11\",1\n", b',').is_ok());
    }

    #[test]
    fn test_delimiter_counts_skip_quoted_and_blank_records() {
        let text = "a,b,c\n\n\"x,y\",2,3\n   \n\"multi\nline, here\",5,6";
        assert_eq!(delimiter_counts(text, b',', 10).unwrap(), [2, 2, 2]);
        assert_eq!(delimiter_counts(text, b',', 2).unwrap(), [2, 2]);
        // `"x,y",` reads as a stray character after a closing quote under `;`
        assert!(delimiter_counts(text, b';', 10).is_err());
    }

    #[test]
    fn test_respects_custom_delimiter() {
        assert!(check_quoting("a;b\n\"x;y\";1\n", b';').is_ok());
        assert!(check_quoting("a;b\n\"x\",1\n", b';').is_err());
    }
}
