//! Alert notifier
//!
//! Maps the external analysis lifecycle signal onto the visibility of a
//! transient alert:
//! - `response_waiting`, `analyzing`, `analyzed` show the alert
//! - `analyzed`, `analyzed_error` (re)arm a single dismissal timer
//! - every other change cancels a pending dismissal and leaves visibility alone
//!
//! [`AlertMachine`] is the pure reducer, [`DismissTimer`] the cancellable
//! timer handle it is paired with, and [`AlertNotifier`] the task that
//! drives both from a lifecycle watch channel.

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::domain::config::AlertConfig;
use crate::domain::lifecycle::{AlertView, AlertVisibility, LifecycleState};

/// What the dismissal timer should do after an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Leave any pending dismissal as it is
    Keep,
    /// Drop the pending dismissal
    Cancel,
    /// Replace any pending dismissal with one due after the given delay
    Arm(Duration),
}

/// Pure alert reducer
#[derive(Debug, Clone)]
pub struct AlertMachine {
    visibility: AlertVisibility,
    state: LifecycleState,
    dismiss_after: Duration,
}

impl AlertMachine {
    pub fn new(dismiss_after: Duration) -> Self {
        Self {
            visibility: AlertVisibility::Hidden,
            state: LifecycleState::Idle,
            dismiss_after,
        }
    }

    /// Observe a lifecycle value.
    ///
    /// Any change of value ends the previous value's dismissal; terminal
    /// values start a new one. Re-observing the current value is a no-op.
    pub fn observe(&mut self, state: LifecycleState) -> TimerAction {
        if state == self.state {
            return TimerAction::Keep;
        }
        self.state = state;

        if self.state.shows_alert() {
            self.visibility = AlertVisibility::Visible;
        }

        if self.state.is_terminal() {
            TimerAction::Arm(self.dismiss_after)
        } else {
            TimerAction::Cancel
        }
    }

    /// The dismissal timer fired without being cancelled
    pub fn dismiss(&mut self) {
        self.visibility = AlertVisibility::Hidden;
    }

    pub fn visibility(&self) -> AlertVisibility {
        self.visibility
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    pub fn view(&self) -> AlertView {
        AlertView::new(self.visibility, self.state.clone())
    }
}

/// At most one pending dismissal; arming again replaces the deadline
#[derive(Debug, Default)]
pub struct DismissTimer {
    deadline: Option<Instant>,
}

impl DismissTimer {
    pub fn arm(&mut self, after: Duration) {
        self.deadline = Some(Instant::now() + after);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Resolves when the armed deadline passes; never resolves while disarmed.
    /// Disarms itself on completion.
    pub async fn fired(&mut self) {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
            }
            None => pending::<()>().await,
        }
    }
}

/// Sending half of the lifecycle signal, held by whatever produces
/// analysis state transitions
#[derive(Debug, Clone)]
pub struct LifecycleDispatcher {
    tx: Arc<watch::Sender<LifecycleState>>,
}

impl LifecycleDispatcher {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LifecycleState::Idle);
        Self {
            tx: Arc::new(tx),
        }
    }

    /// Set the current lifecycle value; observers are only woken by a change
    pub fn dispatch(&self, state: impl Into<LifecycleState>) {
        let state = state.into();
        self.tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
    }

    pub fn current(&self) -> LifecycleState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.tx.subscribe()
    }
}

impl Default for LifecycleDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Running alert controller.
///
/// Dropping it (or calling [`AlertNotifier::detach`]) stops the task; a
/// pending dismissal never fires afterwards.
pub struct AlertNotifier {
    view: watch::Receiver<AlertView>,
    task: JoinHandle<()>,
}

impl AlertNotifier {
    /// Start observing `lifecycle`. Must be called within a tokio runtime.
    pub fn spawn(lifecycle: watch::Receiver<LifecycleState>, config: &AlertConfig) -> Self {
        let machine = AlertMachine::new(config.dismiss_after());
        let (view_tx, view) = watch::channel(machine.view());
        let task = tokio::spawn(run(machine, lifecycle, view_tx));
        Self { view, task }
    }

    pub fn subscribe(&self) -> watch::Receiver<AlertView> {
        self.view.clone()
    }

    pub fn view(&self) -> AlertView {
        self.view.borrow().clone()
    }

    /// Stop observing; same as dropping the notifier, which aborts the task
    pub fn detach(self) {
        drop(self);
    }
}

impl Drop for AlertNotifier {
    fn drop(&mut self) {
        self.task.abort();
        debug!("Alert notifier detached");
    }
}

async fn run(
    mut machine: AlertMachine,
    mut lifecycle: watch::Receiver<LifecycleState>,
    view_tx: watch::Sender<AlertView>,
) {
    let mut timer = DismissTimer::default();

    let initial = lifecycle.borrow_and_update().clone();
    apply(&mut machine, &mut timer, initial, &view_tx);

    loop {
        tokio::select! {
            changed = lifecycle.changed() => {
                if changed.is_err() {
                    debug!("Lifecycle channel closed, stopping alert notifier");
                    timer.cancel();
                    break;
                }
                let state = lifecycle.borrow_and_update().clone();
                apply(&mut machine, &mut timer, state, &view_tx);
            }
            _ = timer.fired() => {
                machine.dismiss();
                info!(state = %machine.state(), "Alert dismissed");
                publish(&machine, &view_tx);
            }
        }
    }
}

fn apply(
    machine: &mut AlertMachine,
    timer: &mut DismissTimer,
    state: LifecycleState,
    view_tx: &watch::Sender<AlertView>,
) {
    let was_visible = machine.visibility() == AlertVisibility::Visible;

    match machine.observe(state) {
        TimerAction::Arm(after) => {
            if timer.is_armed() {
                debug!("Restarting pending alert dismissal");
            }
            timer.arm(after);
            debug!(after_ms = after.as_millis() as u64, state = %machine.state(), "Alert dismissal armed");
        }
        TimerAction::Cancel if timer.is_armed() => {
            timer.cancel();
            debug!(state = %machine.state(), "Pending alert dismissal cancelled");
        }
        TimerAction::Cancel | TimerAction::Keep => {}
    }

    if !was_visible && machine.visibility() == AlertVisibility::Visible {
        info!(state = %machine.state(), "Alert shown");
    }
    publish(machine, view_tx);
}

fn publish(machine: &AlertMachine, view_tx: &watch::Sender<AlertView>) {
    let next = machine.view();
    view_tx.send_if_modified(|view| {
        if *view == next {
            return false;
        }
        *view = next;
        true
    });
}
