//! Operator console logic for granting and revoking server access.
//!
//! This crate models the two forms of the access console as explicit state
//! driven by user events:
//!
//! - **Grant**: username, group and IP tag inputs, public key and sudoer
//!   flag, posted as one request
//! - **Revoke**: look up a user's servers, pick some from a filterable
//!   checkbox list, post them for removal
//!
//! The backend is reached through the [`Backend`] trait; [`HttpBackend`] is
//! the `reqwest` implementation.

mod backend;
mod catalog;
mod config;
mod error;
pub mod grant;
pub mod revoke;
mod submission;
pub mod tag_input;
mod types;
mod view;

pub use backend::{Backend, HttpBackend, JsonReply};
pub use catalog::GroupCatalog;
pub use config::{
    ConsoleConfig, DEFAULT_BASE_URL, DEFAULT_GRANT_ACTION, DEFAULT_REVOKE_ACTION, LOOKUP_PATH,
};
pub use error::ConsoleError;
pub use grant::{GrantController, GrantEvent};
pub use revoke::{IpRow, IpSelection, RevokeController, RevokeEvent, RevokeStage, SelectAll};
pub use tag_input::{TagChange, TagEvent, TagInput};
pub use types::{ActionReport, GrantRequest, LookupResponse, RevokeRequest, TargetOutcome};
pub use view::{BusyGuard, BusyIndicator, Feedback, FeedbackKind, FormView, ResultRow};
