//! Message list, composer and per-message decrypt results for the chat page.
//!
//! DESIGN
//! ======
//! The backend encrypts on send and decrypts on request; this state only
//! holds ciphertexts, the plaintexts the user chose to reveal, and the draft.
//! Revealed plaintext lives in memory for the page's lifetime and is never
//! persisted.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use std::collections::HashMap;

use super::methods::MethodState;
use crate::net::types::{Message, OutgoingMessage, User};

pub const EMPTY_DRAFT: &str = "Type a message";
pub const NO_RECIPIENT: &str = "Select a recipient";
pub const EMPTY_DECRYPT_KEY: &str = "Please enter a key";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatState {
    messages: Vec<Message>,
    decrypted: HashMap<i64, String>,
    decrypt_errors: HashMap<i64, String>,
    pub loading: bool,
    pub error: Option<String>,
    pub draft: String,
    pub recipient: Option<i64>,
    pub sending: bool,
    pub send_error: Option<String>,
}

impl ChatState {
    pub fn fetching() -> Self {
        Self { loading: true, ..Self::default() }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Replace the list. Revealed plaintexts survive for messages still present.
    pub fn loaded(&mut self, messages: Vec<Message>) {
        self.decrypted.retain(|id, _| messages.iter().any(|m| m.id == *id));
        self.decrypt_errors.clear();
        self.messages = messages;
        self.loading = false;
        self.error = None;
    }

    pub fn failed(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    /// Build the request for the current draft, or say why it can't be sent.
    pub fn compose(&self, methods: &MethodState) -> Result<OutgoingMessage, &'static str> {
        let text = self.draft.trim();
        if text.is_empty() {
            return Err(EMPTY_DRAFT);
        }
        let Some(receiver_id) = self.recipient else {
            return Err(NO_RECIPIENT);
        };
        if let Some(blocker) = methods.send_blocker() {
            return Err(blocker);
        }
        let Some(method) = methods.selected() else {
            return Err(super::methods::NO_METHOD_SELECTED);
        };
        let key = Some(methods.key().trim()).filter(|k| !k.is_empty()).map(str::to_owned);
        Ok(OutgoingMessage { receiver_id, text: text.to_owned(), method: method.id.clone(), key })
    }

    /// Pick the first user as recipient unless one is already chosen.
    pub fn default_recipient(&mut self, users: &[User]) {
        if self.recipient.is_none() {
            self.recipient = users.first().map(|u| u.id);
        }
    }

    pub fn sent(&mut self, message: Message) {
        self.messages.push(message);
        self.draft.clear();
        self.sending = false;
        self.send_error = None;
    }

    pub fn send_failed(&mut self, message: impl Into<String>) {
        self.sending = false;
        self.send_error = Some(message.into());
    }

    pub fn decrypted_text(&self, id: i64) -> Option<&str> {
        self.decrypted.get(&id).map(String::as_str)
    }

    pub fn decrypt_error(&self, id: i64) -> Option<&str> {
        self.decrypt_errors.get(&id).map(String::as_str)
    }

    pub fn reveal(&mut self, id: i64, plaintext: String) {
        self.decrypt_errors.remove(&id);
        self.decrypted.insert(id, plaintext);
    }

    pub fn decrypt_failed(&mut self, id: i64, message: impl Into<String>) {
        self.decrypt_errors.insert(id, message.into());
    }

    /// Plaintext when revealed, ciphertext otherwise.
    pub fn display_text<'a>(&'a self, message: &'a Message) -> &'a str {
        self.decrypted_text(message.id).unwrap_or(&message.encrypted_content)
    }
}

/// Who sent `sender_id`, as shown above a message.
pub fn sender_label(sender_id: i64, me: Option<&User>, users: &[User]) -> String {
    if me.is_some_and(|me| me.id == sender_id) {
        return "You".to_owned();
    }
    users
        .iter()
        .find(|u| u.id == sender_id)
        .map_or_else(|| format!("User {sender_id}"), |u| u.username.clone())
}

/// Keys are required for every decrypt request.
pub fn validate_decrypt_key(key: &str) -> Result<&str, &'static str> {
    let key = key.trim();
    if key.is_empty() {
        return Err(EMPTY_DECRYPT_KEY);
    }
    Ok(key)
}
