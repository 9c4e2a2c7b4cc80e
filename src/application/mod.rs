pub mod use_cases;

pub use use_cases::alert_notifier::{
    AlertMachine, AlertNotifier, DismissTimer, LifecycleDispatcher, TimerAction,
};
pub use use_cases::conversion_pipeline::{ConversionOutcome, ConversionPipeline, ConversionSnapshot};
