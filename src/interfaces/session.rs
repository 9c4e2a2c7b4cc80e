//! Session facade for the presentation layer.
//!
//! Holds one conversion pipeline, the lifecycle signal, the alert notifier
//! and the active page. Views only read from it.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::application::use_cases::alert_notifier::{AlertNotifier, LifecycleDispatcher};
use crate::application::use_cases::conversion_pipeline::{ConversionPipeline, ConversionSnapshot};
use crate::domain::config::AppConfig;
use crate::domain::csv::RecordSequence;
use crate::domain::error::{AppError, Result};
use crate::domain::lifecycle::{AlertView, LifecycleState};
use crate::domain::page::Page;
use crate::infrastructure::csv::RecordDecoder;
use crate::infrastructure::storage::RawFile;

pub struct Session {
    pipeline: ConversionPipeline,
    lifecycle: LifecycleDispatcher,
    notifier: AlertNotifier,
    page: Page,
}

impl Session {
    /// Build a session from a config. Must be called within a tokio runtime.
    pub fn new(config: &AppConfig) -> Result<Self> {
        config.validate().map_err(AppError::ValidationError)?;

        let pipeline = ConversionPipeline::new(RecordDecoder::with_config(config.decoder.clone())?);
        let lifecycle = LifecycleDispatcher::new();
        let notifier = AlertNotifier::spawn(lifecycle.subscribe(), &config.alert);

        Ok(Self {
            pipeline,
            lifecycle,
            notifier,
            page: Page::default(),
        })
    }

    /// File selection event; `None` clears the current data
    pub fn select_file(&self, file: Option<Arc<dyn RawFile>>) -> Option<JoinHandle<()>> {
        self.pipeline.on_file_replaced(file)
    }

    /// Switch views by selector (`0` input, `1` dashboard, `2` table)
    pub fn select_page(&mut self, selector: u8) -> Result<Page> {
        let page = Page::try_from(selector)?;
        if page != self.page {
            info!(from = ?self.page, to = ?page, "Page selected");
        }
        self.page = page;
        Ok(page)
    }

    pub fn active_page(&self) -> Page {
        self.page
    }

    /// Forward an analysis lifecycle value from the external store
    pub fn dispatch(&self, state: impl Into<LifecycleState>) {
        self.lifecycle.dispatch(state);
    }

    pub fn lifecycle(&self) -> &LifecycleDispatcher {
        &self.lifecycle
    }

    /// Records handed to whichever view is active
    pub fn records(&self) -> Option<Arc<RecordSequence>> {
        self.pipeline.snapshot().records().cloned()
    }

    pub fn conversion(&self) -> ConversionSnapshot {
        self.pipeline.snapshot()
    }

    pub fn subscribe_conversion(&self) -> watch::Receiver<ConversionSnapshot> {
        self.pipeline.subscribe()
    }

    pub fn alert(&self) -> AlertView {
        self.notifier.view()
    }

    pub fn subscribe_alert(&self) -> watch::Receiver<AlertView> {
        self.notifier.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryFile;

    #[tokio::test]
    async fn test_page_selection() {
        let mut session = Session::new(&AppConfig::default()).unwrap();
        assert_eq!(session.active_page(), Page::Input);

        assert_eq!(session.select_page(2).unwrap(), Page::Table);
        assert!(session.select_page(7).is_err());
        assert_eq!(session.active_page(), Page::Table);
    }

    #[tokio::test]
    async fn test_records_follow_selected_file() {
        let session = Session::new(&AppConfig::default()).unwrap();
        assert!(session.records().is_none());

        let file: Arc<dyn RawFile> = Arc::new(InMemoryFile::new("p.csv", "name\nAda\n"));
        session.select_file(Some(file)).unwrap().await.unwrap();

        let records = session.records().expect("records");
        assert_eq!(records.get(0).unwrap().get("name"), Some("Ada"));
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let mut config = AppConfig::default();
        config.decoder.delimiter = '\u{140}';
        assert!(matches!(
            Session::new(&config),
            Err(AppError::ValidationError(_))
        ));

        let mut config = AppConfig::default();
        config.alert.dismiss_after_ms = 0;
        assert!(Session::new(&config).is_err());
    }
}
