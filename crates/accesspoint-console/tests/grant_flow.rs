//! Grant form flows against a scripted backend.

mod common;

use std::sync::Arc;

use accesspoint_console::grant::MISSING_FIELDS_MESSAGE;
use accesspoint_console::{
    ConsoleConfig, FeedbackKind, GrantController, GrantEvent, GroupCatalog, HttpBackend, TagEvent,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{Call, FakeBackend};

const KEY: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIOMqqnkVzrm0SdG6UOoqKLsabgH5C9okWi0dh2l9GKJl";

fn catalog() -> GroupCatalog {
    GroupCatalog::new(["web", "db-primary", "staging"])
}

fn controller(backend: &Arc<FakeBackend>, config: ConsoleConfig) -> GrantController<Arc<FakeBackend>> {
    GrantController::new(Arc::clone(backend), config, &catalog())
}

async fn fill_form<B: accesspoint_console::Backend>(grant: &mut GrantController<B>) {
    grant.handle(GrantEvent::Username("alice".into())).await;
    grant.handle(GrantEvent::PubKey(KEY.into())).await;
    grant.handle(GrantEvent::AddToSudoers(true)).await;
    grant.handle(GrantEvent::Groups(TagEvent::Focus)).await;
    grant.handle(GrantEvent::Groups(TagEvent::Input("WE".into()))).await;
    grant
        .handle(GrantEvent::Groups(TagEvent::PickSuggestion("web".into())))
        .await;
    grant.handle(GrantEvent::Ips(TagEvent::Input("10.0.0.1".into()))).await;
    grant.handle(GrantEvent::Ips(TagEvent::Enter)).await;
    grant.handle(GrantEvent::Ips(TagEvent::Input("10.0.0.2".into()))).await;
    grant.handle(GrantEvent::Ips(TagEvent::Enter)).await;
}

#[tokio::test]
async fn test_empty_username_sends_nothing() {
    let backend = Arc::new(FakeBackend::new());
    let mut grant = controller(&backend, ConsoleConfig::default());

    grant.handle(GrantEvent::PubKey(KEY.into())).await;
    grant.handle(GrantEvent::Ips(TagEvent::Input("10.0.0.1".into()))).await;
    grant.handle(GrantEvent::Ips(TagEvent::Enter)).await;
    grant.handle(GrantEvent::Submit).await;

    assert!(backend.calls().is_empty());
    let feedback = grant.view().feedback().unwrap();
    assert_eq!(feedback.kind, FeedbackKind::Error);
    assert_eq!(feedback.message, MISSING_FIELDS_MESSAGE);
    assert!(!grant.submit_busy().is_busy());
}

#[tokio::test]
async fn test_no_groups_or_ips_sends_nothing() {
    let backend = Arc::new(FakeBackend::new());
    let mut grant = controller(&backend, ConsoleConfig::default());

    grant.handle(GrantEvent::Username("alice".into())).await;
    grant.handle(GrantEvent::PubKey(KEY.into())).await;
    grant.handle(GrantEvent::Submit).await;

    assert!(backend.calls().is_empty());
    assert!(grant.view().feedback().unwrap().is_error());
}

#[tokio::test]
async fn test_submit_posts_serialized_tags() {
    let backend = Arc::new(FakeBackend::new());
    backend.respond(200, json!({"message": "Access granted", "all_success": true}));
    let mut grant = controller(&backend, ConsoleConfig::default());

    fill_form(&mut grant).await;
    assert_eq!(grant.groups().hidden_value(), "web");
    assert_eq!(grant.ips().hidden_value(), "10.0.0.1,10.0.0.2");

    grant.handle(GrantEvent::Submit).await;

    assert_eq!(
        backend.calls(),
        vec![Call::Submit {
            action: "/accesspoint/giveaccess".to_string(),
            body: json!({
                "username": "alice",
                "groups": "web",
                "ips": "10.0.0.1,10.0.0.2",
                "pub_key": KEY,
                "add_to_sudoers": true
            }),
        }]
    );

    let feedback = grant.view().feedback().unwrap();
    assert_eq!(feedback.kind, FeedbackKind::Success);
    assert_eq!(feedback.message, "Access granted");
    assert!(!grant.view().results_visible());

    // Default policy keeps the form filled in.
    assert_eq!(grant.username(), "alice");
    assert_eq!(grant.ips().tags().len(), 2);
}

#[tokio::test]
async fn test_partial_success_renders_failure_rows() {
    let backend = Arc::new(FakeBackend::new());
    backend.respond(
        207,
        json!({
            "message": "Access granted on 1 of 2 servers",
            "all_success": false,
            "results": {
                "10.0.0.1": {"success": true, "message": "User 'alice' created on 10.0.0.1"},
                "10.0.0.2": {"success": false, "message": "User 'alice' already exists on 10.0.0.2"}
            }
        }),
    );
    let mut grant = controller(&backend, ConsoleConfig::default());

    fill_form(&mut grant).await;
    grant.handle(GrantEvent::Submit).await;

    let view = grant.view();
    assert_eq!(view.feedback().unwrap().kind, FeedbackKind::Info);
    assert!(view.results_visible());

    let rows = view.results();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].target, "10.0.0.1");
    assert_eq!(rows[0].status_class(), "status-success");
    assert_eq!(rows[1].target, "10.0.0.2");
    assert_eq!(rows[1].status_class(), "status-failure");
    assert_eq!(rows[1].message, "User 'alice' already exists on 10.0.0.2");
}

#[tokio::test]
async fn test_network_failure_clears_busy_and_reports_cause() {
    let backend = Arc::new(FakeBackend::new());
    backend.fail("connection reset by peer");
    let mut grant = controller(&backend, ConsoleConfig::default());
    backend.probe_busy(grant.submit_busy().subscribe());

    fill_form(&mut grant).await;
    grant.handle(GrantEvent::Submit).await;

    assert_eq!(backend.busy_seen(), vec![true]);
    assert!(!grant.submit_busy().is_busy());

    let feedback = grant.view().feedback().unwrap();
    assert!(feedback.is_error());
    assert!(feedback.message.starts_with("Network or client-side error: "));
    assert!(feedback.message.contains("connection reset by peer"));
    assert!(!grant.view().results_visible());
}

#[tokio::test]
async fn test_busy_only_during_each_request() {
    let backend = Arc::new(FakeBackend::new());
    backend.fail("connection reset by peer");
    backend.respond(200, json!({"message": "Access granted", "all_success": true}));
    let mut grant = controller(&backend, ConsoleConfig::default());
    backend.probe_busy(grant.submit_busy().subscribe());

    fill_form(&mut grant).await;
    grant.handle(GrantEvent::Submit).await;
    assert!(!grant.submit_busy().is_busy());

    // The retry goes out once the first request has finished.
    grant.handle(GrantEvent::Submit).await;

    assert_eq!(backend.calls().len(), 2);
    assert_eq!(backend.busy_seen(), vec![true, true]);
    assert!(!grant.submit_busy().is_busy());
    assert_eq!(grant.view().feedback().unwrap().kind, FeedbackKind::Success);
}

#[tokio::test]
async fn test_error_status_uses_server_error() {
    let backend = Arc::new(FakeBackend::new());
    backend.respond(400, json!({"error": "Invalid IP address: 10.0.0.300"}));
    let mut grant = controller(&backend, ConsoleConfig::default());

    fill_form(&mut grant).await;
    grant.handle(GrantEvent::Submit).await;

    assert_eq!(
        grant.view().feedback().unwrap().message,
        "Error: Invalid IP address: 10.0.0.300"
    );
    assert!(!grant.submit_busy().is_busy());
}

#[tokio::test]
async fn test_reset_on_full_success_when_configured() {
    let backend = Arc::new(FakeBackend::new());
    backend.respond(
        200,
        json!({
            "message": "Access granted",
            "all_success": true,
            "results": {"10.0.0.1": {"success": true, "message": "created"}}
        }),
    );
    let mut grant = controller(&backend, ConsoleConfig::default().with_reset_on_success(true));

    fill_form(&mut grant).await;
    grant.handle(GrantEvent::Submit).await;

    assert_eq!(grant.username(), "");
    assert!(grant.groups().is_empty());
    assert_eq!(grant.ips().hidden_value(), "");
    // The outcome stays on screen.
    assert_eq!(grant.view().feedback().unwrap().kind, FeedbackKind::Success);
    assert_eq!(grant.view().results().len(), 1);
}

#[tokio::test]
async fn test_partial_success_never_resets() {
    let backend = Arc::new(FakeBackend::new());
    backend.respond(207, json!({"all_success": false, "results": {}}));
    let mut grant = controller(&backend, ConsoleConfig::default().with_reset_on_success(true));

    fill_form(&mut grant).await;
    grant.handle(GrantEvent::Submit).await;

    assert_eq!(grant.username(), "alice");
}

#[tokio::test]
async fn test_group_suggestions_exclude_selected() {
    let backend = Arc::new(FakeBackend::new());
    let mut grant = controller(&backend, ConsoleConfig::default());

    grant.handle(GrantEvent::Groups(TagEvent::Focus)).await;
    assert!(!grant.groups().suggestions_visible());

    grant.handle(GrantEvent::Groups(TagEvent::Input("a".into()))).await;
    assert_eq!(
        grant.groups().visible_suggestions(),
        ["db-primary", "staging"]
    );

    grant
        .handle(GrantEvent::Groups(TagEvent::PickSuggestion("staging".into())))
        .await;
    assert_eq!(grant.groups().visible_suggestions(), ["db-primary", "web"]);
}

#[tokio::test]
async fn test_grant_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/create-user"))
        .and(body_json(json!({
            "username": "alice",
            "groups": "web",
            "ips": "10.0.0.1,10.0.0.2",
            "pub_key": KEY,
            "add_to_sudoers": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "10.0.0.1": {"success": true, "message": "User 'alice' created on 10.0.0.1"},
            "10.0.0.2": {"success": false, "message": "Authentication failed for 10.0.0.2"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = HttpBackend::new(&mock_server.uri()).unwrap();
    let config = ConsoleConfig::new(mock_server.uri()).with_grant_action("/create-user");
    let mut grant = GrantController::new(backend, config, &catalog());

    fill_form(&mut grant).await;
    grant.handle(GrantEvent::Submit).await;

    let feedback = grant.view().feedback().unwrap();
    assert_eq!(feedback.kind, FeedbackKind::Info);
    assert_eq!(feedback.message, "Request processed successfully.");
    assert_eq!(grant.view().results()[1].message, "Authentication failed for 10.0.0.2");
}
