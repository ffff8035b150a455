//! Console configuration.

use serde::{Deserialize, Serialize};

use crate::ConsoleError;

/// Default backend location (the console backend listens on port 5000).
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Default action of the grant form.
pub const DEFAULT_GRANT_ACTION: &str = "/accesspoint/giveaccess";

/// Default action of the removal form.
pub const DEFAULT_REVOKE_ACTION: &str = "/accesspoint/removeaccess";

/// Path prefix of the per-user IP lookup endpoint.
pub const LOOKUP_PATH: &str = "/api/get-user-ips";

/// Configuration shared by the grant and revoke controllers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Base URL that relative form actions are resolved against.
    pub base_url: String,

    /// Action of the grant form. May be relative or absolute.
    #[serde(default = "default_grant_action")]
    pub grant_action: String,

    /// Action of the removal form. May be relative or absolute.
    #[serde(default = "default_revoke_action")]
    pub revoke_action: String,

    /// Reset the form after a response where every target succeeded.
    ///
    /// Off by default: the form keeps its values so the operator can
    /// inspect or resubmit them.
    #[serde(default)]
    pub reset_on_success: bool,
}

fn default_grant_action() -> String {
    DEFAULT_GRANT_ACTION.to_string()
}

fn default_revoke_action() -> String {
    DEFAULT_REVOKE_ACTION.to_string()
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            grant_action: default_grant_action(),
            revoke_action: default_revoke_action(),
            reset_on_success: false,
        }
    }
}

impl ConsoleConfig {
    /// Create a configuration for the given backend with default actions.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Override the grant form action.
    pub fn with_grant_action(mut self, action: impl Into<String>) -> Self {
        self.grant_action = action.into();
        self
    }

    /// Override the removal form action.
    pub fn with_revoke_action(mut self, action: impl Into<String>) -> Self {
        self.revoke_action = action.into();
        self
    }

    /// Set the post-submit reset policy.
    pub fn with_reset_on_success(mut self, reset: bool) -> Self {
        self.reset_on_success = reset;
        self
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<(), ConsoleError> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(ConsoleError::Config("base URL is empty".to_string()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConsoleError::Config(format!(
                "base URL must use http or https: {}",
                base
            )));
        }
        if self.grant_action.trim().is_empty() {
            return Err(ConsoleError::Config("grant action is empty".to_string()));
        }
        if self.revoke_action.trim().is_empty() {
            return Err(ConsoleError::Config("revoke action is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConsoleConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.grant_action, DEFAULT_GRANT_ACTION);
        assert_eq!(config.revoke_action, DEFAULT_REVOKE_ACTION);
        assert!(!config.reset_on_success);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ConsoleConfig::new("https://access.internal")
            .with_grant_action("/create-user")
            .with_revoke_action("/remove-user")
            .with_reset_on_success(true);

        assert_eq!(config.base_url, "https://access.internal");
        assert_eq!(config.grant_action, "/create-user");
        assert_eq!(config.revoke_action, "/remove-user");
        assert!(config.reset_on_success);
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        assert!(matches!(
            ConsoleConfig::new("").validate(),
            Err(ConsoleError::Config(_))
        ));
        assert!(matches!(
            ConsoleConfig::new("ftp://example.com").validate(),
            Err(ConsoleError::Config(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_action() {
        let config = ConsoleConfig::default().with_revoke_action("  ");
        assert!(matches!(config.validate(), Err(ConsoleError::Config(_))));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: ConsoleConfig =
            serde_json::from_str(r#"{"base_url": "http://10.1.2.3:5000"}"#).unwrap();
        assert_eq!(config.base_url, "http://10.1.2.3:5000");
        assert_eq!(config.grant_action, DEFAULT_GRANT_ACTION);
        assert!(!config.reset_on_success);
    }
}
