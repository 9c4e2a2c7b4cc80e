pub mod alert_notifier;
pub mod conversion_pipeline;
