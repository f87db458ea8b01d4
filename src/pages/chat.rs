//! Chat page: signed-in header, encryption-method picker, conversation,
//! composer and user directory.
//!
//! Only reachable through `ProtectedRoute`, so the session is authenticated
//! whenever this renders.

use leptos::prelude::*;

use crate::app::{SessionHandle, spawn_session_task};
use crate::components::message_list::MessageList;
use crate::components::method_list::MethodList;
use crate::net::types::User;
use crate::state::auth::AuthState;
use crate::state::chat::ChatState;
use crate::state::methods::MethodState;

/// (Re)load the conversation.
fn load_messages(session: SessionHandle, chat: RwSignal<ChatState>) {
    let scheduled = spawn_session_task(session.get_value(), move |s| async move {
        match s.gateway().fetch_messages().await {
            Ok(list) => chat.update(|c| c.loaded(list)),
            Err(e) => {
                log::warn!("loading messages failed: {e}");
                chat.update(|c| c.failed(e.to_string()));
            }
        }
    });
    chat.update(|c| c.loading = scheduled);
}

#[component]
pub fn ChatPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let session = expect_context::<SessionHandle>();

    let methods = RwSignal::new(MethodState::default());
    let chat = RwSignal::new(ChatState::default());
    let users = RwSignal::new(Vec::<User>::new());
    let users_error = RwSignal::new(None::<String>);

    let scheduled = spawn_session_task(session.get_value(), move |s| async move {
        match s.gateway().fetch_encryption_methods().await {
            Ok(list) => methods.update(|m| m.loaded(list)),
            Err(e) => methods.update(|m| m.failed(e.to_string())),
        }
    });
    methods.update(|m| m.loading = scheduled);
    spawn_session_task(session.get_value(), move |s| async move {
        match s.gateway().fetch_users().await {
            Ok(list) => {
                chat.update(|c| c.default_recipient(&list));
                users.set(list);
            }
            Err(e) => {
                log::warn!("loading users failed: {e}");
                users_error.set(Some(e.to_string()));
            }
        }
    });
    load_messages(session, chat);

    let username = move || auth.with(|state| state.user().map(|u| u.username.clone()).unwrap_or_default());
    let on_logout = move |_| session.with_value(|s| s.logout());

    view! {
        <div class="chat-page">
            <header class="chat-page__header">
                <h1>"Secure Chat"</h1>
                <span class="chat-page__user">{username}</span>
                <button class="btn" on:click=on_logout>"Log out"</button>
            </header>

            <Show
                when=move || !methods.with(|m| m.loading)
                fallback=|| view! { <p class="chat-page__status">"Loading encryption methods..."</p> }
            >
                <Show
                    when=move || methods.with(|m| m.error.is_none())
                    fallback=move || {
                        view! {
                            <div class="chat-page__error">
                                <p>{move || methods.with(|m| m.error.clone().unwrap_or_default())}</p>
                                <p>"Please check your connection and try again"</p>
                            </div>
                        }
                    }
                >
                    <div class="chat-page__body">
                        <MethodList methods=methods/>
                        <KeyPanel methods=methods/>
                        <section class="chat-page__conversation">
                            <div class="chat-page__conversation-header">
                                <h2>"Messages"</h2>
                                <button
                                    class="btn"
                                    on:click=move |_| load_messages(session, chat)
                                    disabled=move || chat.with(|c| c.loading)
                                >
                                    "Refresh"
                                </button>
                            </div>
                            {move || chat.with(|c| c.error.clone()).map(|e| view! { <p class="chat-page__error">{e}</p> })}
                            <MessageList chat=chat users=users/>
                            <Composer methods=methods chat=chat users=users/>
                        </section>
                    </div>
                </Show>
            </Show>

            <aside class="chat-page__users">
                <h2>"Users"</h2>
                {move || users_error.get().map(|e| view! { <p class="chat-page__error">{e}</p> })}
                <ul>
                    {move || {
                        users
                            .get()
                            .into_iter()
                            .map(|u| view! { <li>{u.username}</li> })
                            .collect::<Vec<_>>()
                    }}
                </ul>
            </aside>
        </div>
    }
}

/// Key entry for the selected method.
#[component]
fn KeyPanel(methods: RwSignal<MethodState>) -> impl IntoView {
    let requires_key = move || methods.with(|m| m.selected().is_some_and(|sel| sel.requires_key));
    let label = move || methods.with(|m| m.selected().map(|sel| sel.label.clone()).unwrap_or_default());

    view! {
        <section class="key-panel">
            <h2 class="key-panel__method">{label}</h2>
            {move || methods.with(|m| m.hint().map(str::to_owned)).map(|hint| view! { <p class="key-panel__hint">{hint}</p> })}
            <Show when=requires_key>
                <input
                    class="key-panel__input"
                    type="text"
                    placeholder="Key"
                    prop:value=move || methods.with(|m| m.key().to_owned())
                    on:input=move |ev| methods.update(|m| m.set_key(event_target_value(&ev)))
                />
            </Show>
        </section>
    }
}

/// Draft, recipient and send button. Sending is disabled while the draft
/// can't be composed, and the reason is shown instead.
#[component]
fn Composer(methods: RwSignal<MethodState>, chat: RwSignal<ChatState>, users: RwSignal<Vec<User>>) -> impl IntoView {
    let session = expect_context::<SessionHandle>();

    let blocker = move || methods.with(|m| chat.with(|c| c.compose(m).err()));
    let on_send = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if chat.with(|c| c.sending) {
            return;
        }
        let outgoing = match methods.with(|m| chat.with(|c| c.compose(m))) {
            Ok(outgoing) => outgoing,
            Err(msg) => {
                chat.update(|c| c.send_error = Some(msg.to_owned()));
                return;
            }
        };
        let scheduled = spawn_session_task(session.get_value(), move |s| async move {
            match s.gateway().send_message(&outgoing).await {
                Ok(stored) => chat.update(|c| c.sent(stored)),
                Err(e) => chat.update(|c| c.send_failed(e.to_string())),
            }
        });
        chat.update(|c| {
            c.sending = scheduled;
            c.send_error = None;
        });
    };

    view! {
        <form class="composer" on:submit=on_send>
            <select
                class="composer__recipient"
                on:change=move |ev| chat.update(|c| c.recipient = event_target_value(&ev).parse().ok())
                prop:value=move || chat.with(|c| c.recipient.map(|id| id.to_string()).unwrap_or_default())
            >
                {move || {
                    users
                        .get()
                        .into_iter()
                        .map(|u| view! { <option value=u.id.to_string()>{u.username}</option> })
                        .collect::<Vec<_>>()
                }}
            </select>
            <textarea
                class="composer__draft"
                placeholder="Message"
                prop:value=move || chat.with(|c| c.draft.clone())
                on:input=move |ev| chat.update(|c| c.draft = event_target_value(&ev))
                disabled=move || chat.with(|c| c.sending)
            ></textarea>
            <p class="composer__status">{move || blocker().unwrap_or("Ready to send")}</p>
            {move || chat.with(|c| c.send_error.clone()).map(|e| view! { <p class="composer__error">{e}</p> })}
            <button
                class="btn"
                type="submit"
                disabled=move || blocker().is_some() || chat.with(|c| c.sending)
            >
                {move || if chat.with(|c| c.sending) { "Sending..." } else { "Send" }}
            </button>
        </form>
    }
}
