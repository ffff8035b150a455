//! Terminal rendering of the form view.

use accesspoint_console::{Feedback, FeedbackKind, FormView, IpSelection, ResultRow};
use miette::Result;

/// One-line banner for the feedback area.
pub fn banner(feedback: &Feedback) -> String {
    let label = match feedback.kind {
        FeedbackKind::Info => "info",
        FeedbackKind::Success => "ok",
        FeedbackKind::Error => "error",
    };
    format!("[{}] {}", label, feedback.message)
}

/// Results panel as aligned rows.
pub fn results(rows: &[ResultRow]) -> String {
    let width = rows.iter().map(|r| r.target.len()).max().unwrap_or(0);
    rows.iter()
        .map(|row| {
            let status = if row.success { "ok" } else { "FAILED" };
            format!(
                "  {:<width$}  {:<6}  {}",
                row.target,
                status,
                row.message,
                width = width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Checkbox list of the IP selection stage, visible rows only.
pub fn selection(selection: &IpSelection) -> String {
    selection
        .visible_rows()
        .map(|row| format!("  [{}] {}", if row.checked { "x" } else { " " }, row.ip))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print the view and turn an error banner into a failed exit.
pub fn finish(view: &FormView) -> Result<()> {
    if let Some(feedback) = view.feedback() {
        if feedback.is_error() {
            miette::bail!("{}", feedback.message);
        }
        println!("{}", banner(feedback));
    }
    if view.results_visible() {
        println!("{}", results(view.results()));
    }
    Ok(())
}
