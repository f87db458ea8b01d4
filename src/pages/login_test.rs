use futures::executor::block_on;

use super::*;
use crate::config::ClientConfig;
use crate::net::api::AuthGateway;
use crate::net::scripted::ScriptedHttpClient;
use crate::state::auth::SessionContext;
use crate::util::token_store::TokenStore;

#[test]
fn validate_login_input_trims_username_and_keeps_password() {
    assert_eq!(
        validate_login_input("  alice  ", " secret "),
        Ok(("alice".to_owned(), " secret ".to_owned()))
    );
}

#[test]
fn validate_login_input_requires_username() {
    assert_eq!(validate_login_input("   ", "secret"), Err("Username is required"));
}

#[test]
fn validate_login_input_requires_password() {
    assert_eq!(validate_login_input("alice", ""), Err("Password is required"));
    assert_eq!(validate_login_input("alice", "   "), Err("Password is required"));
}

#[test]
fn validate_login_input_reports_username_first() {
    assert_eq!(validate_login_input("", ""), Err("Username is required"));
}

#[test]
fn rejected_input_never_reaches_the_backend() {
    let client = ScriptedHttpClient::new();
    let store = TokenStore::in_memory();
    let ctx = SessionContext::new(AuthGateway::new(client.clone(), store.clone(), &ClientConfig::default()));

    let outcome = validate_login_input("bob", "").map(|(u, p)| block_on(ctx.login(&u, &p)));

    assert_eq!(outcome, Err("Password is required"));
    assert_eq!(client.request_count(), 0);
    assert!(!store.is_present());
}
