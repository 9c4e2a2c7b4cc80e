// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// Text decoding, quote validation and record decoding

mod quoting;
mod record_decoder;
mod text_encoding;

pub use quoting::{check_quoting, delimiter_counts};
pub use record_decoder::{detect_delimiter, RecordDecoder};
pub use text_encoding::decode_text;
