//! Revoke-access form controller.
//!
//! Two stages:
//!
//! 1. **Search form**: the operator enters a username and looks up the
//!    servers that user can reach.
//! 2. **IP selection**: one checkbox per server, a free-text filter and a
//!    tri-state "select all". Submitting posts the checked IPs for removal.
//!
//! A 2xx response closes the selection stage. Errors keep it open so the
//! operator can retry without looking the user up again.
//!
//! Handlers take `&mut self`, so lookup and removal never overlap; the busy
//! indicators only reflect an in-flight request to renderers.

use tracing::{debug, info, warn};

use crate::submission::{SubmissionText, render_submission};
use crate::types::text_field;
use crate::{
    Backend, BusyIndicator, ConsoleConfig, ConsoleError, Feedback, FormView, LookupResponse,
    RevokeRequest,
};

const REVOKE_TEXT: SubmissionText = SubmissionText {
    default_message: "Removal request processed.",
    network_prefix: "Network or client-side error during removal: ",
};

/// Derived state of the "select all" checkbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectAll {
    #[default]
    Unchecked,
    Checked,
    /// Some but not all rows are checked.
    Indeterminate,
}

/// One server row of the selection list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpRow {
    pub ip: String,
    pub checked: bool,
    /// False while hidden by the search filter.
    pub visible: bool,
}

impl IpRow {
    fn new(ip: String) -> Self {
        Self {
            ip,
            checked: false,
            visible: true,
        }
    }

    /// DOM id of the row's checkbox.
    pub fn element_id(&self) -> String {
        format!("ip-{}", self.ip.replace('.', "-"))
    }
}

/// The IP selection stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpSelection {
    /// Username the list was looked up for.
    username: String,
    rows: Vec<IpRow>,
    select_all: SelectAll,
}

impl IpSelection {
    /// Build the list. Duplicate IPs are rendered once.
    pub fn new<I, S>(username: impl Into<String>, ips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rows: Vec<IpRow> = Vec::new();
        for ip in ips {
            let ip = ip.into();
            if !rows.iter().any(|r| r.ip == ip) {
                rows.push(IpRow::new(ip));
            }
        }
        Self {
            username: username.into(),
            rows,
            select_all: SelectAll::Unchecked,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn rows(&self) -> &[IpRow] {
        &self.rows
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &IpRow> {
        self.rows.iter().filter(|r| r.visible)
    }

    pub fn select_all(&self) -> SelectAll {
        self.select_all
    }

    /// Checked IPs in list order, including rows hidden by the filter.
    pub fn checked_ips(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter(|r| r.checked)
            .map(|r| r.ip.clone())
            .collect()
    }

    /// Set every row, visible or not, to `checked`.
    pub fn set_all(&mut self, checked: bool) {
        for row in &mut self.rows {
            row.checked = checked;
        }
        self.select_all = if checked {
            SelectAll::Checked
        } else {
            SelectAll::Unchecked
        };
    }

    /// Toggle one row. Returns `false` if `ip` is not listed.
    pub fn set_checked(&mut self, ip: &str, checked: bool) -> bool {
        let Some(row) = self.rows.iter_mut().find(|r| r.ip == ip) else {
            return false;
        };
        row.checked = checked;
        self.recompute_select_all();
        true
    }

    /// Show rows whose IP contains `term` (case-insensitive, trimmed).
    /// Returns the number of visible rows.
    pub fn apply_filter(&mut self, term: &str) -> usize {
        let term = term.trim().to_lowercase();
        let mut visible = 0;
        for row in &mut self.rows {
            row.visible = row.ip.to_lowercase().contains(&term);
            if row.visible {
                visible += 1;
            }
        }
        visible
    }

    fn recompute_select_all(&mut self) {
        let checked = self.rows.iter().filter(|r| r.checked).count();
        self.select_all = if checked == self.rows.len() {
            SelectAll::Checked
        } else if checked == 0 {
            SelectAll::Unchecked
        } else {
            SelectAll::Indeterminate
        };
    }
}

/// Current stage of the revoke form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RevokeStage {
    #[default]
    SearchForm,
    IpSelection(IpSelection),
}

/// User actions on the revoke form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevokeEvent {
    Username(String),
    FindServers,
    Filter(String),
    SelectAll(bool),
    Check { ip: String, checked: bool },
    Submit,
    Reset,
}

/// State and handlers of the revoke form.
pub struct RevokeController<B> {
    backend: B,
    config: ConsoleConfig,
    username: String,
    filter: String,
    stage: RevokeStage,
    view: FormView,
    find_busy: BusyIndicator,
    remove_busy: BusyIndicator,
}

impl<B: Backend> RevokeController<B> {
    pub fn new(backend: B, config: ConsoleConfig) -> Self {
        Self {
            backend,
            config,
            username: String::new(),
            filter: String::new(),
            stage: RevokeStage::SearchForm,
            view: FormView::default(),
            find_busy: BusyIndicator::new(),
            remove_busy: BusyIndicator::new(),
        }
    }

    /// Dispatch one user action.
    pub async fn handle(&mut self, event: RevokeEvent) {
        match event {
            RevokeEvent::Username(value) => self.username = value,
            RevokeEvent::FindServers => self.find_servers().await,
            RevokeEvent::Filter(value) => self.set_filter(value),
            RevokeEvent::SelectAll(checked) => {
                if let RevokeStage::IpSelection(selection) = &mut self.stage {
                    selection.set_all(checked);
                }
            }
            RevokeEvent::Check { ip, checked } => {
                if let RevokeStage::IpSelection(selection) = &mut self.stage {
                    if !selection.set_checked(&ip, checked) {
                        debug!(%ip, "checkbox event for unknown IP");
                    }
                }
            }
            RevokeEvent::Submit => self.submit().await,
            RevokeEvent::Reset => self.reset(),
        }
    }

    /// Look up the servers of the entered username.
    pub async fn find_servers(&mut self) {
        let username = self.username.trim().to_string();
        self.view.reset();
        self.filter.clear();
        self.stage = RevokeStage::SearchForm;

        if username.is_empty() {
            self.view
                .show_feedback(Feedback::error("Please enter a username."));
            return;
        }

        let reply = {
            let _busy = self.find_busy.begin();
            self.backend.lookup_user_ips(&username).await
        };

        match reply {
            Ok(reply) if reply.is_ok() => {
                let lookup = match serde_json::from_value::<LookupResponse>(reply.body) {
                    Ok(lookup) => lookup,
                    Err(e) => {
                        self.show_lookup_failure(ConsoleError::Json(e));
                        return;
                    }
                };

                if lookup.ips().is_empty() {
                    info!(%username, "no servers found");
                    self.view.show_feedback(Feedback::info(format!(
                        "No active servers found for username \"{}\".",
                        username
                    )));
                    return;
                }

                info!(%username, servers = lookup.ips().len(), "servers found");
                self.stage =
                    RevokeStage::IpSelection(IpSelection::new(username, lookup.ips().iter().cloned()));
                self.apply_filter();
            }
            Ok(reply) => {
                let message = text_field(&reply.body, "error")
                    .or_else(|| text_field(&reply.body, "message"))
                    .unwrap_or_else(|| {
                        format!("Error {}: Could not fetch server list.", reply.status)
                    });
                warn!(status = reply.status, error = %message, "lookup rejected");
                self.view.show_feedback(Feedback::error(message));
            }
            Err(e) => self.show_lookup_failure(e),
        }
    }

    fn show_lookup_failure(&mut self, error: ConsoleError) {
        warn!(error = %error, "lookup failed");
        self.view.show_feedback(Feedback::error(format!(
            "Network error fetching server list: {}",
            error
        )));
    }

    /// Update the search filter and re-filter the list.
    pub fn set_filter(&mut self, value: String) {
        self.filter = value;
        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        let RevokeStage::IpSelection(selection) = &mut self.stage else {
            return;
        };
        let visible = selection.apply_filter(&self.filter);
        let term = self.filter.trim().to_lowercase();
        if !selection.rows().is_empty() && visible == 0 && !term.is_empty() {
            self.view.show_feedback(Feedback::info(format!(
                "No IP addresses match \"{}\".",
                term
            )));
        }
    }

    /// Submit the checked IPs for removal.
    pub async fn submit(&mut self) {
        self.view.reset();

        let username = self.username.trim().to_string();
        let ips = match &self.stage {
            RevokeStage::IpSelection(selection) => selection.checked_ips(),
            RevokeStage::SearchForm => Vec::new(),
        };

        if username.is_empty() {
            self.view.show_feedback(Feedback::error("Username is missing."));
            return;
        }
        if ips.is_empty() {
            self.view.show_feedback(Feedback::error(
                "Please select at least one IP address to remove access from.",
            ));
            return;
        }

        let request = RevokeRequest { username, ips };
        let body = match serde_json::to_value(&request) {
            Ok(body) => body,
            Err(e) => {
                self.view.show_feedback(Feedback::error(format!(
                    "{}{}",
                    REVOKE_TEXT.network_prefix, e
                )));
                return;
            }
        };

        info!(
            username = %request.username,
            ips = ?request.ips,
            "submitting access removal"
        );

        let reply = {
            let _busy = self.remove_busy.begin();
            self.backend.submit(&self.config.revoke_action, &body).await
        };

        if let Some(report) = render_submission(&mut self.view, reply, REVOKE_TEXT) {
            self.stage = RevokeStage::SearchForm;
            self.filter.clear();
            if report.all_success && self.config.reset_on_success {
                self.username.clear();
            }
        }
    }

    /// Return to the empty search form.
    pub fn reset(&mut self) {
        self.username.clear();
        self.filter.clear();
        self.stage = RevokeStage::SearchForm;
        self.view.reset();
    }

    pub fn stage(&self) -> &RevokeStage {
        &self.stage
    }

    /// The selection stage, if the list is shown.
    pub fn selection(&self) -> Option<&IpSelection> {
        match &self.stage {
            RevokeStage::IpSelection(selection) => Some(selection),
            RevokeStage::SearchForm => None,
        }
    }

    pub fn view(&self) -> &FormView {
        &self.view
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Busy state of the lookup control.
    pub fn find_busy(&self) -> &BusyIndicator {
        &self.find_busy
    }

    /// Busy state of the removal control.
    pub fn remove_busy(&self) -> &BusyIndicator {
        &self.remove_busy
    }
}
