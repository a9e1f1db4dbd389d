//! User-facing confirmations and errors

use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Validation,
    Permission,
    Capture,
    Persist,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub title: String,
    pub message: String,
}

impl Feedback {
    pub fn new(kind: FeedbackKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind != FeedbackKind::Success
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// Shows a modal alert. Returns once the user has seen it.
pub trait FeedbackChannel: Send + Sync {
    fn alert(&self, feedback: &Feedback);
}

/// Routes alerts to the `log` facade
pub struct LogFeedback;

impl FeedbackChannel for LogFeedback {
    fn alert(&self, feedback: &Feedback) {
        if feedback.is_error() {
            log::warn!("feedback: {}", feedback);
        } else {
            log::info!("feedback: {}", feedback);
        }
    }
}

/// Prints alerts for the command line
pub struct ConsoleFeedback;

impl FeedbackChannel for ConsoleFeedback {
    fn alert(&self, feedback: &Feedback) {
        if feedback.is_error() {
            eprintln!("{}", feedback);
        } else {
            println!("{}", feedback);
        }
    }
}

/// Keeps every alert in memory
#[derive(Default)]
pub struct RecordingFeedback {
    alerts: Mutex<Vec<Feedback>>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Feedback> {
        match self.alerts.lock() {
            Ok(a) => a.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn last(&self) -> Option<Feedback> {
        self.alerts().pop()
    }
}

impl FeedbackChannel for RecordingFeedback {
    fn alert(&self, feedback: &Feedback) {
        match self.alerts.lock() {
            Ok(mut a) => a.push(feedback.clone()),
            Err(poisoned) => poisoned.into_inner().push(feedback.clone()),
        }
    }
}
