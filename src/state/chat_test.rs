use futures::executor::block_on;

use super::*;
use crate::config::ClientConfig;
use crate::net::api::AuthGateway;
use crate::net::scripted::ScriptedHttpClient;
use crate::net::types::EncryptionMethod;
use crate::util::token_store::TokenStore;

fn method(id: &str, requires_key: bool) -> EncryptionMethod {
    EncryptionMethod { id: id.to_owned(), label: id.to_owned(), requires_key, hint: String::new() }
}

fn methods() -> MethodState {
    let mut state = MethodState::fetching();
    state.loaded(vec![method("caesar", false), method("vigenere", true)]);
    state
}

fn message(id: i64, ciphertext: &str) -> Message {
    Message {
        id,
        encrypted_content: ciphertext.to_owned(),
        method: "vigenere".to_owned(),
        created_at: "2025-01-10T21:00:00Z".to_owned(),
        sender_id: 1,
        receiver_id: 2,
    }
}

fn ready_draft() -> ChatState {
    ChatState { draft: "  HELLO  ".to_owned(), recipient: Some(2), ..ChatState::default() }
}

// =============================================================
// list
// =============================================================

#[test]
fn fetching_state_is_loading_and_empty() {
    let state = ChatState::fetching();
    assert!(state.loading);
    assert!(state.messages().is_empty());
}

#[test]
fn reload_keeps_plaintext_only_for_remaining_messages() {
    let mut state = ChatState::fetching();
    state.loaded(vec![message(1, "RIJVS"), message(2, "XYZ")]);
    state.reveal(1, "HELLO".to_owned());
    state.reveal(2, "ABC".to_owned());

    state.loaded(vec![message(1, "RIJVS")]);

    assert_eq!(state.decrypted_text(1), Some("HELLO"));
    assert_eq!(state.decrypted_text(2), None);
    assert!(!state.loading);
}

#[test]
fn failed_reload_keeps_previous_messages() {
    let mut state = ChatState::fetching();
    state.loaded(vec![message(1, "RIJVS")]);

    state.failed("HTTP error! status: 500");

    assert_eq!(state.messages().len(), 1);
    assert_eq!(state.error.as_deref(), Some("HTTP error! status: 500"));
}

// =============================================================
// composer
// =============================================================

#[test]
fn compose_trims_text_and_uses_selected_method() {
    let outgoing = ready_draft().compose(&methods()).unwrap();

    assert_eq!(
        outgoing,
        OutgoingMessage { receiver_id: 2, text: "HELLO".to_owned(), method: "caesar".to_owned(), key: None }
    );
}

#[test]
fn compose_requires_text_then_recipient() {
    let state = ChatState { draft: "   ".to_owned(), recipient: Some(2), ..ChatState::default() };
    assert_eq!(state.compose(&methods()), Err(EMPTY_DRAFT));

    let state = ChatState { draft: "hi".to_owned(), ..ChatState::default() };
    assert_eq!(state.compose(&methods()), Err(NO_RECIPIENT));
}

#[test]
fn compose_is_blocked_until_keyed_method_has_key() {
    let mut methods = methods();
    methods.select("vigenere");
    let state = ready_draft();

    assert_eq!(state.compose(&methods), Err(crate::state::methods::KEY_REQUIRED));

    methods.set_key(" KEY ");
    let outgoing = state.compose(&methods).unwrap();
    assert_eq!(outgoing.method, "vigenere");
    assert_eq!(outgoing.key.as_deref(), Some("KEY"));
}

#[test]
fn compose_without_methods_is_blocked() {
    assert_eq!(ready_draft().compose(&MethodState::fetching()), Err(crate::state::methods::NO_METHOD_SELECTED));
}

#[test]
fn sent_message_is_appended_and_draft_cleared() {
    let mut state = ready_draft();
    state.sending = true;
    state.send_error = Some("earlier".to_owned());

    state.sent(message(11, "RIJVS"));

    assert_eq!(state.messages().last().map(|m| m.id), Some(11));
    assert!(state.draft.is_empty());
    assert!(!state.sending);
    assert!(state.send_error.is_none());
    assert_eq!(state.recipient, Some(2));
}

#[test]
fn failed_send_keeps_draft() {
    let mut state = ready_draft();
    state.sending = true;

    state.send_failed("Key is required for vigenere");

    assert_eq!(state.draft, "  HELLO  ");
    assert!(!state.sending);
    assert_eq!(state.send_error.as_deref(), Some("Key is required for vigenere"));
}

#[test]
fn composed_message_round_trips_through_gateway() {
    let client = ScriptedHttpClient::new();
    let store = TokenStore::in_memory();
    store.save("abc.def.ghi");
    let gateway = AuthGateway::new(client.clone(), store, &ClientConfig::default());
    client.reply(
        201,
        r#"{"id":11,"encrypted_content":"KHOOR","method":"caesar","created_at":"2025-01-10T21:00:00Z","sender_id":1,"receiver_id":2}"#,
    );
    let mut state = ready_draft();

    let outgoing = state.compose(&methods()).unwrap();
    let stored = block_on(gateway.send_message(&outgoing)).unwrap();
    state.sent(stored);

    assert_eq!(state.messages()[0].encrypted_content, "KHOOR");
    assert_eq!(client.request_count(), 1);
}

// =============================================================
// decrypt
// =============================================================

#[test]
fn display_text_switches_to_plaintext_once_revealed() {
    let mut state = ChatState::default();
    state.loaded(vec![message(1, "RIJVS")]);
    let shown = state.messages()[0].clone();
    assert_eq!(state.display_text(&shown), "RIJVS");

    state.reveal(1, "HELLO".to_owned());

    assert_eq!(state.display_text(&shown), "HELLO");
}

#[test]
fn decrypt_error_is_cleared_by_later_success() {
    let mut state = ChatState::default();
    state.loaded(vec![message(1, "RIJVS")]);

    state.decrypt_failed(1, "Decryption failed: invalid key");
    assert_eq!(state.decrypt_error(1), Some("Decryption failed: invalid key"));
    assert_eq!(state.decrypted_text(1), None);

    state.reveal(1, "HELLO".to_owned());
    assert_eq!(state.decrypt_error(1), None);
}

#[test]
fn decrypt_key_must_not_be_blank() {
    assert_eq!(validate_decrypt_key("   "), Err(EMPTY_DECRYPT_KEY));
    assert_eq!(validate_decrypt_key(" KEY "), Ok("KEY"));
}

// =============================================================
// people
// =============================================================

fn user(id: i64, name: &str) -> User {
    User { id, username: name.to_owned() }
}

#[test]
fn default_recipient_is_first_user_unless_chosen() {
    let users = vec![user(2, "bob"), user(3, "carol")];
    let mut state = ChatState::default();
    state.default_recipient(&users);
    assert_eq!(state.recipient, Some(2));

    state.recipient = Some(3);
    state.default_recipient(&users);
    assert_eq!(state.recipient, Some(3));

    let mut empty = ChatState::default();
    empty.default_recipient(&[]);
    assert_eq!(empty.recipient, None);
}

#[test]
fn sender_label_names_self_known_and_unknown_users() {
    let me = user(1, "alice");
    let users = vec![user(2, "bob")];
    assert_eq!(sender_label(1, Some(&me), &users), "You");
    assert_eq!(sender_label(2, Some(&me), &users), "bob");
    assert_eq!(sender_label(9, None, &users), "User 9");
}
