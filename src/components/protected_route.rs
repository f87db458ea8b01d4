//! Wrapper that admits children only for an authenticated session.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::app::{SessionHandle, spawn_session_task};
use crate::state::auth::AuthState;
use crate::util::auth::{GuardDecision, guard_protected, install_protected_redirect};

/// Renders `children` once the session is authenticated, a loading
/// placeholder while it is pending, and redirects to `/login` otherwise.
///
/// On mount the session is re-derived from storage if the two disagree;
/// a check already in flight is joined rather than repeated.
#[component]
pub fn ProtectedRoute(children: ChildrenFn) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let session = expect_context::<SessionHandle>();

    spawn_session_task(session.get_value(), |s| async move {
        s.ensure_checked().await;
    });
    install_protected_redirect(auth, use_navigate());

    let admitted = move || auth.with(|state| guard_protected(&state.status) == GuardDecision::Admit);

    view! {
        <Show
            when=admitted
            fallback=|| view! { <div class="route-loading">"Loading..."</div> }
        >
            {children()}
        </Show>
    }
}
