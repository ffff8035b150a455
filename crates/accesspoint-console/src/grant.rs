//! Grant-access form controller.
//!
//! Single-stage form: username, group tags, IP tags, public key and a
//! sudoer flag. Submitting posts the form as JSON to the grant action and
//! renders the per-server results.
//!
//! Handlers take `&mut self`, so a second submit cannot start while one is
//! in flight; the busy indicator only reflects that state to renderers.

use tokio::time::Instant;
use tracing::{debug, info};

use crate::submission::{SubmissionText, render_submission};
use crate::{
    Backend, BusyIndicator, ConsoleConfig, Feedback, FormView, GrantRequest, GroupCatalog,
    TagEvent, TagInput,
};

/// Banner shown when required fields are missing.
pub const MISSING_FIELDS_MESSAGE: &str =
    "Please fill in Username, Public Key, and at least one Group or IP.";

const GRANT_TEXT: SubmissionText = SubmissionText {
    default_message: "Request processed successfully.",
    network_prefix: "Network or client-side error: ",
};

/// User actions on the grant form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantEvent {
    Username(String),
    PubKey(String),
    AddToSudoers(bool),
    Groups(TagEvent),
    Ips(TagEvent),
    Submit,
    Reset,
}

/// State and handlers of the grant form.
pub struct GrantController<B> {
    backend: B,
    config: ConsoleConfig,
    username: String,
    pub_key: String,
    add_to_sudoers: bool,
    groups: TagInput,
    ips: TagInput,
    view: FormView,
    submit_busy: BusyIndicator,
}

impl<B: Backend> GrantController<B> {
    /// Create a controller whose group input autocompletes from `groups`.
    pub fn new(backend: B, config: ConsoleConfig, groups: &GroupCatalog) -> Self {
        Self {
            backend,
            config,
            username: String::new(),
            pub_key: String::new(),
            add_to_sudoers: false,
            groups: groups.tag_input(),
            ips: TagInput::free_form(),
            view: FormView::default(),
            submit_busy: BusyIndicator::new(),
        }
    }

    /// Dispatch one user action.
    pub async fn handle(&mut self, event: GrantEvent) {
        let now = Instant::now();
        match event {
            GrantEvent::Username(value) => self.username = value,
            GrantEvent::PubKey(value) => self.pub_key = value,
            GrantEvent::AddToSudoers(value) => self.add_to_sudoers = value,
            GrantEvent::Groups(event) => {
                if let Some(change) = self.groups.handle(event, now) {
                    debug!(?change, "group tags changed");
                }
            }
            GrantEvent::Ips(event) => {
                if let Some(change) = self.ips.handle(event, now) {
                    debug!(?change, "IP tags changed");
                }
            }
            GrantEvent::Submit => self.submit().await,
            GrantEvent::Reset => self.reset(),
        }
    }

    /// Advance timers of the tag inputs.
    pub fn tick(&mut self, now: Instant) {
        self.groups.tick(now);
        self.ips.tick(now);
    }

    /// The request the form would send right now.
    pub fn request(&self) -> GrantRequest {
        GrantRequest {
            username: self.username.clone(),
            groups: self.groups.hidden_value().to_string(),
            ips: self.ips.hidden_value().to_string(),
            pub_key: self.pub_key.clone(),
            add_to_sudoers: self.add_to_sudoers,
        }
    }

    /// Submit the form.
    ///
    /// Incomplete forms show an inline error and send nothing.
    pub async fn submit(&mut self) {
        self.view.reset();

        let request = self.request();
        if !request.is_complete() {
            self.view.show_feedback(Feedback::error(MISSING_FIELDS_MESSAGE));
            return;
        }

        let body = match serde_json::to_value(&request) {
            Ok(body) => body,
            Err(e) => {
                self.view.show_feedback(Feedback::error(format!(
                    "{}{}",
                    GRANT_TEXT.network_prefix, e
                )));
                return;
            }
        };

        info!(
            username = %request.username,
            groups = %request.groups,
            ips = %request.ips,
            add_to_sudoers = request.add_to_sudoers,
            "submitting access grant"
        );

        let reply = {
            let _busy = self.submit_busy.begin();
            self.backend.submit(&self.config.grant_action, &body).await
        };

        let report = render_submission(&mut self.view, reply, GRANT_TEXT);
        if report.is_some_and(|r| r.all_success) && self.config.reset_on_success {
            self.reset_fields();
        }
    }

    /// Clear every field, tag and banner.
    pub fn reset(&mut self) {
        self.reset_fields();
        self.view.reset();
    }

    fn reset_fields(&mut self) {
        self.username.clear();
        self.pub_key.clear();
        self.add_to_sudoers = false;
        self.groups.clear();
        self.ips.clear();
    }

    pub fn view(&self) -> &FormView {
        &self.view
    }

    pub fn groups(&self) -> &TagInput {
        &self.groups
    }

    pub fn ips(&self) -> &TagInput {
        &self.ips
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Busy state of the submit control.
    pub fn submit_busy(&self) -> &BusyIndicator {
        &self.submit_busy
    }
}
