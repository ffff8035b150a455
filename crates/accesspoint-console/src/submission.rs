//! Rendering of grant and removal responses.

use tracing::{info, warn};

use crate::types::text_field;
use crate::{ActionReport, ConsoleError, Feedback, FormView, JsonReply};

/// Wording that differs between the grant and removal forms.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SubmissionText {
    /// Summary shown when a 2xx response has no message.
    pub default_message: &'static str,
    /// Prefix of the banner for transport or parse failures.
    pub network_prefix: &'static str,
}

/// Render the result of a submission into `view`.
///
/// Returns the parsed report for 2xx responses so the caller can apply its
/// post-submit policy.
pub(crate) fn render_submission(
    view: &mut FormView,
    reply: Result<JsonReply, ConsoleError>,
    text: SubmissionText,
) -> Option<ActionReport> {
    match reply {
        Ok(reply) if reply.is_ok() => {
            let report = ActionReport::from_json(&reply.body);
            let message = report
                .message
                .clone()
                .unwrap_or_else(|| text.default_message.to_string());

            view.show_feedback(if report.all_success {
                Feedback::success(message)
            } else {
                Feedback::info(message)
            });
            view.show_results(report.outcomes());

            for failure in report.failures() {
                warn!(
                    target_ip = %failure.target,
                    reason = failure.message.as_deref().unwrap_or_default(),
                    "target failed"
                );
            }
            info!(
                status = reply.status,
                all_success = report.all_success,
                targets = report.outcomes().len(),
                "submission processed"
            );
            Some(report)
        }
        Ok(reply) => {
            let reason = text_field(&reply.body, "error")
                .or_else(|| Some(reply.status_text.clone()).filter(|s| !s.is_empty()))
                .unwrap_or_else(|| "Unknown error".to_string());
            warn!(status = reply.status, error = %reason, "submission rejected");
            view.show_feedback(Feedback::error(format!("Error: {}", reason)));
            None
        }
        Err(e) => {
            warn!(error = %e, "submission failed");
            view.show_feedback(Feedback::error(format!("{}{}", text.network_prefix, e)));
            None
        }
    }
}
