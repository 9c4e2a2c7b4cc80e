// ============================================================
// CONVERSION PIPELINE USE CASE
// ============================================================
// Raw file in, structured records out. Every file replacement gets a
// request id; only the outcome of the latest request is ever applied.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::domain::csv::RecordSequence;
use crate::domain::error::ConversionError;
use crate::infrastructure::csv::RecordDecoder;
use crate::infrastructure::storage::RawFile;

/// Terminal outcome currently shown to observers
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConversionOutcome {
    /// No file selected, or the selection was cleared
    #[default]
    Empty,
    Records(Arc<RecordSequence>),
    Failed(ConversionError),
}

/// Published pipeline state
#[derive(Debug, Clone, Default)]
pub struct ConversionSnapshot {
    /// Id of the most recent file replacement
    pub requested: u64,

    /// Id of the request whose outcome is shown
    pub applied: u64,

    /// Name of the file behind `outcome`
    pub file_name: Option<String>,

    pub outcome: ConversionOutcome,

    pub completed_at: Option<DateTime<Utc>>,
}

impl ConversionSnapshot {
    pub fn records(&self) -> Option<&Arc<RecordSequence>> {
        match &self.outcome {
            ConversionOutcome::Records(records) => Some(records),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ConversionError> {
        match &self.outcome {
            ConversionOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// A newer request has not produced its outcome yet
    pub fn is_pending(&self) -> bool {
        self.requested != self.applied
    }
}

/// Owns the "file in, records out" lifecycle
#[derive(Clone)]
pub struct ConversionPipeline {
    decoder: Arc<RecordDecoder>,
    state: Arc<watch::Sender<ConversionSnapshot>>,
}

impl ConversionPipeline {
    pub fn new(decoder: RecordDecoder) -> Self {
        let (state, _) = watch::channel(ConversionSnapshot::default());
        Self {
            decoder: Arc::new(decoder),
            state: Arc::new(state),
        }
    }

    /// Observe published snapshots
    pub fn subscribe(&self) -> watch::Receiver<ConversionSnapshot> {
        self.state.subscribe()
    }

    /// Current snapshot
    pub fn snapshot(&self) -> ConversionSnapshot {
        self.state.borrow().clone()
    }

    /// React to a file selection event.
    ///
    /// The request id is taken synchronously, so ordering follows the order
    /// of calls. `None` clears the published state immediately and returns no
    /// task; otherwise the read and decode run on a spawned task.
    pub fn on_file_replaced(&self, file: Option<Arc<dyn RawFile>>) -> Option<JoinHandle<()>> {
        let id = self.begin(file.as_deref());
        let file = file?;

        let pipeline = self.clone();
        Some(tokio::spawn(async move {
            pipeline.run_attempt(id, file).await;
        }))
    }

    /// Same as [`Self::on_file_replaced`] but runs the attempt inline.
    ///
    /// Returns whether this request's outcome was applied (it is not when a
    /// newer replacement arrived while it was reading).
    pub async fn replace_file(&self, file: Option<Arc<dyn RawFile>>) -> bool {
        let id = self.begin(file.as_deref());
        match file {
            Some(file) => self.run_attempt(id, file).await,
            None => true,
        }
    }

    /// Register a new request and return its id
    fn begin(&self, file: Option<&dyn RawFile>) -> u64 {
        let mut id = 0;
        self.state.send_if_modified(|snapshot| {
            snapshot.requested += 1;
            id = snapshot.requested;

            if file.is_some() {
                return false;
            }

            snapshot.applied = id;
            snapshot.file_name = None;
            snapshot.outcome = ConversionOutcome::Empty;
            snapshot.completed_at = Some(Utc::now());
            true
        });

        match file {
            Some(file) => info!(request = id, file = file.name(), "File selected"),
            None => info!(request = id, "No file provided, cleared records"),
        }
        id
    }

    async fn run_attempt(&self, id: u64, file: Arc<dyn RawFile>) -> bool {
        let outcome = match file.read_bytes().await {
            Ok(bytes) => match self.decoder.decode_bytes(&bytes) {
                Ok(records) => {
                    info!(request = id, file = file.name(), rows = records.len(), "CSV conversion successful");
                    ConversionOutcome::Records(Arc::new(records))
                }
                Err(err) => {
                    error!(request = id, file = file.name(), error = %err, "Error converting CSV");
                    ConversionOutcome::Failed(err)
                }
            },
            Err(err) => {
                error!(request = id, file = file.name(), error = %err, "Error reading file");
                ConversionOutcome::Failed(err)
            }
        };

        self.publish(id, file.name(), outcome)
    }

    /// Apply an outcome if `id` is still the latest request
    fn publish(&self, id: u64, file_name: &str, outcome: ConversionOutcome) -> bool {
        let applied = self.state.send_if_modified(|snapshot| {
            if snapshot.requested != id {
                return false;
            }
            snapshot.applied = id;
            snapshot.file_name = Some(file_name.to_string());
            snapshot.outcome = outcome;
            snapshot.completed_at = Some(Utc::now());
            true
        });

        if !applied {
            debug!(request = id, file = file_name, "Discarded superseded conversion result");
        }
        applied
    }
}

impl Default for ConversionPipeline {
    fn default() -> Self {
        Self::new(RecordDecoder::default())
    }
}
