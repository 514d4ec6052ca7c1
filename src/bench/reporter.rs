//! Progress reporting sinks
//!
//! A reporter observes a run: zero to four progress percentages in
//! increasing order, then exactly one terminal outcome.

use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::models::RunOutcome;

/// Observer of a benchmark run
pub trait ProgressReporter: Send + Sync {
    /// A progress checkpoint in [0, 100]
    fn on_progress(&self, percent: u8);

    /// The terminal outcome, delivered once per run
    fn on_complete(&self, outcome: RunOutcome);
}

/// Message forwarded by [`ChannelReporter`]
#[derive(Debug, Clone, PartialEq)]
pub enum RunMessage {
    Progress(u8),
    Complete(RunOutcome),
}

/// Forwards every event into a tokio channel so async callers can await them
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<RunMessage>,
}

impl ChannelReporter {
    pub fn new(tx: mpsc::UnboundedSender<RunMessage>) -> Self {
        Self { tx }
    }

    /// Reporter plus the receiving end of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RunMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl ProgressReporter for ChannelReporter {
    fn on_progress(&self, percent: u8) {
        // Receiver dropped means nobody is listening any more
        let _ = self.tx.send(RunMessage::Progress(percent));
    }

    fn on_complete(&self, outcome: RunOutcome) {
        let _ = self.tx.send(RunMessage::Complete(outcome));
    }
}

/// Keeps every event in memory, for synchronous callers
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<RunMessage>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events so far
    pub fn events(&self) -> Vec<RunMessage> {
        self.lock().clone()
    }

    /// Progress percentages received so far
    pub fn progress(&self) -> Vec<u8> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                RunMessage::Progress(p) => Some(*p),
                RunMessage::Complete(_) => None,
            })
            .collect()
    }

    /// Terminal outcomes received so far
    pub fn outcomes(&self) -> Vec<RunOutcome> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                RunMessage::Complete(outcome) => Some(outcome.clone()),
                RunMessage::Progress(_) => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<RunMessage>> {
        // A poisoned lock still holds valid events
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ProgressReporter for RecordingReporter {
    fn on_progress(&self, percent: u8) {
        self.lock().push(RunMessage::Progress(percent));
    }

    fn on_complete(&self, outcome: RunOutcome) {
        self.lock().push(RunMessage::Complete(outcome));
    }
}
