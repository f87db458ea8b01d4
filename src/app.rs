//! Root application component with routing and context providers.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` builds the one [`SessionContext`] for the page, mirrors its status
//! into an `RwSignal<AuthState>` for rendering, and provides both through
//! Leptos context. Everything below reads the signal; only pages that act on
//! the session (sign in, sign out) reach for the handle.

use std::future::Future;
use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::hooks::use_navigate;
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::components::protected_route::ProtectedRoute;
use crate::config::ClientConfig;
use crate::net::api::AuthGateway;
use crate::net::http::BrowserHttpClient;
use crate::pages::{chat::ChatPage, login::LoginPage, register::RegisterPage};
use crate::state::auth::{AuthState, SessionContext};
use crate::util::auth::{CHAT_PATH, replace_options};
use crate::util::token_store::TokenStore;

#[cfg(all(test, not(feature = "csr")))]
#[path = "app_test.rs"]
mod app_test;

pub type AppSession = SessionContext<BrowserHttpClient>;

/// Context handle to the page's session. The session is single-threaded, so
/// it lives in local arena storage.
pub type SessionHandle = StoredValue<Rc<AppSession>, LocalStorage>;

/// Run `task` on the browser event loop. Returns whether it was scheduled:
/// native builds have no event loop and drop the task, so callers must not
/// wait on it there.
pub fn spawn_session_task<F, Fut>(session: Rc<AppSession>, task: F) -> bool
where
    F: FnOnce(Rc<AppSession>) -> Fut + 'static,
    Fut: Future<Output = ()> + 'static,
{
    #[cfg(feature = "csr")]
    {
        leptos::task::spawn_local(task(session));
        true
    }

    #[cfg(not(feature = "csr"))]
    {
        let _ = (session, task);
        false
    }
}

fn build_session() -> Rc<AppSession> {
    let config = ClientConfig::from_build_env_or_default();
    log::debug!("api base url: {}", config.api_base_url);
    let store = TokenStore::browser();
    let gateway = AuthGateway::new(BrowserHttpClient::default(), store, &config);
    SessionContext::new(gateway)
}

/// Root application component.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let session = build_session();
    let auth = RwSignal::new(AuthState::default());
    session.subscribe(move |status| auth.set(AuthState { status: status.clone() }));

    let weak = Rc::downgrade(&session);
    session.init(move || {
        if let Some(session) = weak.upgrade() {
            spawn_session_task(session, |s| async move {
                s.check().await;
            });
        }
    });

    // Dropping the listener detaches it, so it is owned by the root's arena.
    #[cfg(feature = "csr")]
    let _storage_listener = StoredValue::new_local(crate::util::token_store::install_storage_listener(session.store()));

    spawn_session_task(Rc::clone(&session), |s| async move {
        s.check().await;
    });

    let handle: SessionHandle = StoredValue::new_local(session);
    on_cleanup(move || {
        if let Some(session) = handle.try_get_value() {
            session.teardown();
        }
    });

    provide_context(auth);
    provide_context(handle);

    view! {
        <Title text="Secure Chat"/>

        <Router>
            <Routes fallback=|| view! { <RedirectToChat/> }>
                <Route path=StaticSegment("login") view=LoginPage/>
                <Route path=StaticSegment("register") view=RegisterPage/>
                <Route
                    path=StaticSegment("chat")
                    view=|| view! { <ProtectedRoute><ChatPage/></ProtectedRoute> }
                />
                <Route path=StaticSegment("") view=RedirectToChat/>
            </Routes>
        </Router>
    }
}

/// `/` and unknown paths land on the chat, replacing the history entry.
#[component]
fn RedirectToChat() -> impl IntoView {
    let navigate = use_navigate();
    Effect::new(move || navigate(CHAT_PATH, replace_options()));
}
