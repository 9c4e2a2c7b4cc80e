//! CSV ingestion and analysis alerting.
//!
//! A selected file is read and decoded into an ordered [`RecordSequence`]
//! by the [`ConversionPipeline`]; an external analysis lifecycle signal
//! drives the [`AlertNotifier`]. [`Session`] ties both together for a
//! presentation layer.

mod app;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

pub use app::{init_tracing, run};
pub use application::{
    AlertMachine, AlertNotifier, ConversionOutcome, ConversionPipeline, ConversionSnapshot,
    DismissTimer, LifecycleDispatcher, TimerAction,
};
pub use domain::config::{AlertConfig, AppConfig};
pub use domain::csv::{DecoderConfig, Record, RecordSequence, WidthPolicy};
pub use domain::error::{AppError, ConversionError, Result};
pub use domain::lifecycle::{AlertGlyph, AlertView, AlertVisibility, LifecycleState};
pub use domain::page::Page;
pub use infrastructure::config::ConfigService;
pub use infrastructure::csv::RecordDecoder;
pub use infrastructure::storage::{InMemoryFile, LocalFile, RawFile};
pub use interfaces::Session;
