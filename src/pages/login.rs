//! Login page exchanging username + password for a bearer token.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use crate::app::{SessionHandle, spawn_session_task};
use crate::state::auth::AuthState;
use crate::util::auth::{CHAT_PATH, REGISTER_PATH, install_public_redirect, replace_options};

/// Trim the username and require both fields. Nothing is sent on failure.
pub fn validate_login_input(username: &str, password: &str) -> Result<(String, String), &'static str> {
    let username = username.trim();
    if username.is_empty() {
        return Err("Username is required");
    }
    if password.trim().is_empty() {
        return Err("Password is required");
    }
    Ok((username.to_owned(), password.to_owned()))
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let session = expect_context::<SessionHandle>();
    let navigate = use_navigate();
    let auth = expect_context::<RwSignal<AuthState>>();
    install_public_redirect(auth, move || session.with_value(|s| s.store().is_present()), navigate.clone());

    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let error = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        error.set(String::new());
        let (username_value, password_value) = match validate_login_input(&username.get(), &password.get()) {
            Ok(input) => input,
            Err(msg) => {
                error.set(msg.to_owned());
                return;
            }
        };
        let navigate = navigate.clone();
        let scheduled = spawn_session_task(session.get_value(), move |s| async move {
            match s.login(&username_value, &password_value).await {
                Ok(()) => navigate(CHAT_PATH, replace_options()),
                Err(e) => error.set(e.to_string()),
            }
            busy.set(false);
        });
        busy.set(scheduled);
    };

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h1>"Secure Chat"</h1>
                <p class="auth-card__subtitle">"Sign in to your account"</p>
                <form class="auth-form" on:submit=on_submit>
                    <input
                        class="auth-input"
                        type="text"
                        placeholder="Username"
                        autocomplete="username"
                        prop:value=move || username.get()
                        on:input=move |ev| username.set(event_target_value(&ev))
                        disabled=move || busy.get()
                    />
                    <input
                        class="auth-input"
                        type="password"
                        placeholder="Password"
                        autocomplete="current-password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                        disabled=move || busy.get()
                    />
                    <Show when=move || !error.get().is_empty()>
                        <p class="auth-error">{move || error.get()}</p>
                    </Show>
                    <button class="auth-button" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Signing in..." } else { "Sign In" }}
                    </button>
                </form>
                <p class="auth-card__footer">
                    "Don't have an account? "
                    <A href=REGISTER_PATH>"Sign up"</A>
                </p>
            </div>
        </div>
    }
}
