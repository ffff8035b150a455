//! Request and response bodies of the access backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of the grant form submission.
///
/// `groups` and `ips` carry the hidden-field values of the two tag inputs,
/// i.e. comma-joined strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRequest {
    pub username: String,
    pub groups: String,
    pub ips: String,
    pub pub_key: String,
    pub add_to_sudoers: bool,
}

impl GrantRequest {
    /// Presence check done before anything is sent.
    ///
    /// Requires a username, a public key and at least one group or IP. The
    /// backend does the real validation.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty()
            && !self.pub_key.is_empty()
            && (!self.groups.is_empty() || !self.ips.is_empty())
    }
}

/// Body of the removal form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeRequest {
    pub username: String,
    pub ips: Vec<String>,
}

/// Response of `GET /api/get-user-ips/{username}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub ips: Option<Vec<String>>,
}

impl LookupResponse {
    /// IPs the user currently has access to.
    pub fn ips(&self) -> &[String] {
        self.ips.as_deref().unwrap_or_default()
    }
}

/// Outcome of the action on one target server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetOutcome {
    pub target: String,
    pub success: bool,
    pub message: Option<String>,
}

/// Successful (2xx) response of a grant or removal submission.
///
/// Two shapes are accepted:
///
/// - the summary form `{message, all_success, results: {ip: {success, message}}}`
/// - a bare `{ip: {success, message}}` map, in which case `all_success` is
///   derived from the entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionReport {
    pub message: Option<String>,
    pub all_success: bool,
    /// Per-target outcomes in response key order; `None` when the response
    /// carried no results object.
    pub results: Option<Vec<TargetOutcome>>,
}

const SUMMARY_KEYS: [&str; 4] = ["message", "all_success", "results", "error"];

impl ActionReport {
    /// Interpret a 2xx response body.
    pub fn from_json(body: &Value) -> Self {
        let Some(object) = body.as_object() else {
            return Self::default();
        };

        if is_bare_result_map(object) {
            let results = outcomes_from_map(object);
            let all_success = results.iter().all(|r| r.success);
            return Self {
                message: None,
                all_success,
                results: Some(results),
            };
        }

        Self {
            message: text_field(body, "message"),
            all_success: object
                .get("all_success")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            results: object
                .get("results")
                .and_then(Value::as_object)
                .map(outcomes_from_map),
        }
    }

    /// Outcomes to render; empty if the response had none.
    pub fn outcomes(&self) -> &[TargetOutcome] {
        self.results.as_deref().unwrap_or_default()
    }

    pub fn failures(&self) -> impl Iterator<Item = &TargetOutcome> {
        self.outcomes().iter().filter(|o| !o.success)
    }
}

fn is_bare_result_map(object: &serde_json::Map<String, Value>) -> bool {
    !object.is_empty()
        && !SUMMARY_KEYS.iter().any(|k| object.contains_key(*k))
        && object
            .values()
            .all(|v| v.as_object().is_some_and(|o| o.contains_key("success")))
}

fn outcomes_from_map(map: &serde_json::Map<String, Value>) -> Vec<TargetOutcome> {
    map.iter()
        .map(|(target, entry)| TargetOutcome {
            target: target.clone(),
            success: entry
                .get("success")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            message: entry
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
        .collect()
}

/// Non-empty string field of a JSON object.
pub(crate) fn text_field(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
