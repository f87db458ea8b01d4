use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use futures::executor::block_on;

use super::*;
use crate::config::ClientConfig;
use crate::net::api::AuthGateway;
use crate::net::http::TransportError;
use crate::net::scripted::ScriptedHttpClient;
use crate::net::types::User;
use crate::state::auth::SessionContext;
use crate::util::token_store::TokenStore;

fn token_for(id: i64, username: &str) -> String {
    let payload = serde_json::json!({ "user_id": id, "username": username }).to_string();
    format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", URL_SAFE_NO_PAD.encode(payload))
}

fn decision_after_check(token: Option<&str>, client: &ScriptedHttpClient) -> (GuardDecision, TokenStore) {
    let store = TokenStore::in_memory();
    if let Some(token) = token {
        store.save(token);
    }
    let gateway = AuthGateway::new(client.clone(), store.clone(), &ClientConfig::default());
    let ctx = SessionContext::new(gateway);
    ctx.init(|| {});
    let status = block_on(ctx.check());
    (guard_protected(&status), store)
}

// =============================================================
// decision table
// =============================================================

#[test]
fn pending_shows_loading() {
    assert_eq!(guard_protected(&SessionStatus::Pending), GuardDecision::ShowLoading);
}

#[test]
fn authenticated_is_admitted() {
    let status = SessionStatus::Authenticated(User { id: 1, username: "a".to_owned() });
    assert_eq!(guard_protected(&status), GuardDecision::Admit);
}

#[test]
fn anonymous_redirects_to_login_replacing_history() {
    assert_eq!(
        guard_protected(&SessionStatus::Anonymous),
        GuardDecision::Redirect { to: "/login", replace: true }
    );
}

#[test]
fn public_routes_redirect_only_with_usable_token() {
    let alice = SessionStatus::Authenticated(User { id: 1, username: "alice".to_owned() });
    assert_eq!(guard_public(&alice, true), Some("/chat"));
    assert_eq!(guard_public(&SessionStatus::Pending, true), Some("/chat"));
    assert_eq!(guard_public(&SessionStatus::Anonymous, true), None);
    assert_eq!(guard_public(&SessionStatus::Pending, false), None);
    assert_eq!(guard_public(&SessionStatus::Anonymous, false), None);
}

#[test]
fn replace_options_replace_history() {
    assert!(replace_options().replace);
}

// =============================================================
// end to end through the session context
// =============================================================

#[test]
fn fresh_visit_without_token_redirects_without_request() {
    let client = ScriptedHttpClient::new();

    let (decision, _) = decision_after_check(None, &client);

    assert_eq!(decision, GuardDecision::Redirect { to: LOGIN_PATH, replace: true });
    assert_eq!(client.request_count(), 0);
}

#[test]
fn valid_token_is_admitted_after_one_request() {
    let client = ScriptedHttpClient::new();
    client.reply(200, "[]");

    let (decision, store) = decision_after_check(Some(&token_for(7, "alice")), &client);

    assert_eq!(decision, GuardDecision::Admit);
    assert_eq!(client.request_count(), 1);
    assert!(store.is_present());
}

#[test]
fn expired_token_redirects_and_is_cleared() {
    let client = ScriptedHttpClient::new();
    client.reply(401, r#"{"error":"Token has expired"}"#);

    let (decision, store) = decision_after_check(Some(&token_for(7, "alice")), &client);

    assert_eq!(decision, GuardDecision::Redirect { to: LOGIN_PATH, replace: true });
    assert_eq!(store.get(), None);
}

#[test]
fn unreachable_backend_redirects() {
    let client = ScriptedHttpClient::new();
    client.fail(TransportError::Network("connection refused".to_owned()));

    let (decision, store) = decision_after_check(Some(&token_for(7, "alice")), &client);

    assert_eq!(decision, GuardDecision::Redirect { to: LOGIN_PATH, replace: true });
    assert!(!store.is_present());
}

#[test]
fn server_error_does_not_bounce_between_chat_and_login() {
    let client = ScriptedHttpClient::new();
    client.reply(500, "").reply(500, "");
    let store = TokenStore::in_memory();
    store.save(&token_for(7, "alice"));
    let gateway = AuthGateway::new(client.clone(), store.clone(), &ClientConfig::default());
    let ctx = SessionContext::new(gateway);
    ctx.init(|| {});

    // /chat mounts: the check fails with 500 and the token is kept.
    let status = block_on(ctx.ensure_checked());
    assert_eq!(guard_protected(&status), GuardDecision::Redirect { to: "/login", replace: true });
    assert!(store.is_present());

    // /login stays put instead of sending the visitor back to /chat.
    assert_eq!(guard_public(&status, store.is_present()), None);

    // Remounting /chat resolves from state without another request.
    let again = block_on(ctx.ensure_checked());
    assert_eq!(again, SessionStatus::Anonymous);
    assert_eq!(client.request_count(), 1);
}
