// ============================================================
// TEXT DECODING
// ============================================================
// Turn raw file bytes into text before CSV parsing

use encoding_rs::{Encoding, UTF_8};

use crate::domain::error::ConversionError;

/// Decode file bytes as text.
///
/// A byte-order mark selects the encoding (UTF-8, UTF-16LE, UTF-16BE) and is
/// stripped. Without one the content must be valid UTF-8; nothing is replaced
/// silently.
pub fn decode_text(bytes: &[u8]) -> Result<String, ConversionError> {
    let (encoding, bom_len) = Encoding::for_bom(bytes).unwrap_or((UTF_8, 0));
    let body = &bytes[bom_len..];

    if encoding == UTF_8 {
        return UTF_8
            .decode_without_bom_handling_and_without_replacement(body)
            .map(|text| text.into_owned())
            .ok_or_else(|| ConversionError::malformed("content is not valid UTF-8 text"));
    }

    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        return Err(ConversionError::malformed(format!(
            "content is not valid {} text",
            encoding.name()
        )));
    }
    Ok(text.into_owned())
}
