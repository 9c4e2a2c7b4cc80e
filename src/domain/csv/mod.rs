// ============================================================
// CSV DOMAIN LAYER
// ============================================================
// Core types and value objects for CSV decoding
// No I/O, no async

mod decoder_config;
mod record;

pub use decoder_config::{DecoderConfig, WidthPolicy};
pub use record::{Record, RecordSequence};
