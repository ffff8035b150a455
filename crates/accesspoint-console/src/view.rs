//! View model shared by the grant and revoke forms.
//!
//! Both forms render the same three pieces: a feedback banner, a results
//! panel with one row per target, and a busy indicator on the control that
//! triggered the request.

use serde::Serialize;
use tokio::sync::watch;

use crate::TargetOutcome;

/// Style of the feedback banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Info,
    Success,
    Error,
}

impl FeedbackKind {
    /// CSS modifier class of the banner.
    pub fn as_class(&self) -> &'static str {
        match self {
            FeedbackKind::Info => "info",
            FeedbackKind::Success => "success",
            FeedbackKind::Error => "error",
        }
    }
}

/// The feedback banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub message: String,
    pub kind: FeedbackKind,
}

impl Feedback {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: FeedbackKind::Info,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: FeedbackKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: FeedbackKind::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == FeedbackKind::Error
    }
}

/// One row of the results panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub target: String,
    pub success: bool,
    pub message: String,
}

impl ResultRow {
    /// CSS class of the status marker.
    pub fn status_class(&self) -> &'static str {
        if self.success {
            "status-success"
        } else {
            "status-failure"
        }
    }
}

impl From<&TargetOutcome> for ResultRow {
    fn from(outcome: &TargetOutcome) -> Self {
        let message = match &outcome.message {
            Some(m) if !m.is_empty() => m.clone(),
            _ if outcome.success => "Success".to_string(),
            _ => "Failure".to_string(),
        };
        Self {
            target: outcome.target.clone(),
            success: outcome.success,
            message,
        }
    }
}

/// Feedback banner plus per-target results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormView {
    feedback: Option<Feedback>,
    results: Vec<ResultRow>,
    results_visible: bool,
}

impl FormView {
    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    /// Rows of the results panel, empty while the panel is hidden.
    pub fn results(&self) -> &[ResultRow] {
        if self.results_visible {
            &self.results
        } else {
            &[]
        }
    }

    pub fn results_visible(&self) -> bool {
        self.results_visible
    }

    /// Show a banner. Any results panel is hidden.
    pub fn show_feedback(&mut self, feedback: Feedback) {
        self.feedback = Some(feedback);
        self.results_visible = false;
    }

    pub fn clear_feedback(&mut self) {
        self.feedback = None;
    }

    /// Hide and empty the results panel.
    pub fn clear_results(&mut self) {
        self.results.clear();
        self.results_visible = false;
    }

    /// Replace the results panel with `outcomes`; shown only if non-empty.
    pub fn show_results(&mut self, outcomes: &[TargetOutcome]) {
        self.results = outcomes.iter().map(ResultRow::from).collect();
        self.results_visible = !self.results.is_empty();
    }

    /// Clear both banner and results.
    pub fn reset(&mut self) {
        self.clear_feedback();
        self.clear_results();
    }
}

/// Busy state of a triggering control.
///
/// While busy the control is disabled and its spinner is shown. Renderers
/// can follow changes through [`BusyIndicator::subscribe`].
#[derive(Debug)]
pub struct BusyIndicator {
    state: watch::Sender<bool>,
}

impl Default for BusyIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl BusyIndicator {
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self { state }
    }

    pub fn is_busy(&self) -> bool {
        *self.state.borrow()
    }

    /// Watch busy transitions.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    /// Mark the control busy until the returned guard is dropped.
    pub fn begin(&self) -> BusyGuard<'_> {
        self.state.send_replace(true);
        BusyGuard { indicator: self }
    }
}

/// Clears the busy state on drop, including when a request future is
/// dropped mid-flight.
#[must_use = "the control is re-enabled as soon as the guard is dropped"]
#[derive(Debug)]
pub struct BusyGuard<'a> {
    indicator: &'a BusyIndicator,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.indicator.state.send_replace(false);
    }
}
