//! Conversation list with per-message decryption.
//!
//! Messages arrive as ciphertext. Each row carries its own key field; the
//! plaintext comes back from the backend and is kept in [`ChatState`] only.

use leptos::prelude::*;

use crate::app::{SessionHandle, spawn_session_task};
use crate::net::types::{Message, User};
use crate::state::auth::AuthState;
use crate::state::chat::{ChatState, sender_label, validate_decrypt_key};

#[component]
pub fn MessageList(chat: RwSignal<ChatState>, users: RwSignal<Vec<User>>) -> impl IntoView {
    view! {
        <Show
            when=move || chat.with(|c| !c.messages().is_empty())
            fallback=|| view! { <p class="message-list__empty">"No messages yet"</p> }
        >
            <ul class="message-list">
                {move || {
                    chat.with(|c| c.messages().to_vec())
                        .into_iter()
                        .map(|message| view! { <MessageRow message=message chat=chat users=users/> })
                        .collect::<Vec<_>>()
                }}
            </ul>
        </Show>
    }
}

#[component]
fn MessageRow(message: Message, chat: RwSignal<ChatState>, users: RwSignal<Vec<User>>) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let session = expect_context::<SessionHandle>();

    let id = message.id;
    let sender_id = message.sender_id;
    let key = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let sender = move || auth.with(|a| users.with(|u| sender_label(sender_id, a.user(), u)));
    let revealed = move || chat.with(|c| c.decrypted_text(id).is_some());
    let shown = {
        let message = message.clone();
        move || chat.with(|c| c.display_text(&message).to_owned())
    };

    let encrypted = message.encrypted_content.clone();
    let method = message.method.clone();
    let on_unlock = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let key_value = match validate_decrypt_key(&key.get()) {
            Ok(k) => k.to_owned(),
            Err(msg) => {
                chat.update(|c| c.decrypt_failed(id, msg));
                return;
            }
        };
        let encrypted = encrypted.clone();
        let method = method.clone();
        let scheduled = spawn_session_task(session.get_value(), move |s| async move {
            match s.gateway().decrypt_message(&encrypted, &method, &key_value).await {
                Ok(plaintext) => chat.update(|c| c.reveal(id, plaintext)),
                Err(e) => chat.update(|c| c.decrypt_failed(id, e.to_string())),
            }
            busy.set(false);
        });
        busy.set(scheduled);
    };

    view! {
        <li class="message" class:message--revealed=revealed>
            <div class="message__meta">
                <span class="message__sender">{sender}</span>
                <span class="message__method">{message.method.clone()}</span>
                <span class="message__time">{message.created_at.clone()}</span>
            </div>
            <p class="message__text">{shown}</p>
            <Show when=move || !revealed()>
                <form class="message__unlock" on:submit=on_unlock.clone()>
                    <input
                        class="message__key"
                        type="text"
                        placeholder="Key"
                        prop:value=move || key.get()
                        on:input=move |ev| key.set(event_target_value(&ev))
                        disabled=move || busy.get()
                    />
                    <button class="btn" type="submit" disabled=move || busy.get()>
                        "Decrypt"
                    </button>
                </form>
            </Show>
            {move || chat.with(|c| c.decrypt_error(id).map(str::to_owned)).map(|e| view! { <p class="message__error">{e}</p> })}
        </li>
    }
}
