//! Route admission for protected and public routes.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every route applies the same decision table, so the decision is a pure
//! function of session status and the Leptos helpers only turn it into
//! navigation. Guards read state; they never talk to the backend.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::state::auth::AuthState;
use crate::state::session::SessionStatus;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const CHAT_PATH: &str = "/chat";

/// What a protected route renders for the current session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    ShowLoading,
    Admit,
    Redirect { to: &'static str, replace: bool },
}

pub fn guard_protected(status: &SessionStatus) -> GuardDecision {
    match status {
        SessionStatus::Pending => GuardDecision::ShowLoading,
        SessionStatus::Authenticated(_) => GuardDecision::Admit,
        SessionStatus::Anonymous => GuardDecision::Redirect { to: LOGIN_PATH, replace: true },
    }
}

/// Login and register bounce straight to the chat when a token is stored,
/// unless the session already resolved that token to `Anonymous`; the chat
/// would only send the visitor back here.
pub fn guard_public(status: &SessionStatus, token_present: bool) -> Option<&'static str> {
    (token_present && !matches!(status, SessionStatus::Anonymous)).then_some(CHAT_PATH)
}

/// Navigation options that replace the current history entry.
pub fn replace_options() -> NavigateOptions {
    NavigateOptions { replace: true, ..NavigateOptions::default() }
}

/// Navigate away whenever the protected-route decision becomes a redirect.
pub fn install_protected_redirect<F>(auth: RwSignal<AuthState>, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        if let GuardDecision::Redirect { to, replace } = guard_protected(&auth.get().status) {
            navigate(to, NavigateOptions { replace, ..NavigateOptions::default() });
        }
    });
}

/// Send an already signed-in visitor from a public page to the chat.
///
/// `token_present` is read whenever the session status changes.
pub fn install_public_redirect<T, F>(auth: RwSignal<AuthState>, token_present: T, navigate: F)
where
    T: Fn() -> bool + 'static,
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        let status = auth.with(|state| state.status.clone());
        if let Some(to) = guard_public(&status, token_present()) {
            navigate(to, replace_options());
        }
    });
}
