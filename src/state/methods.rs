//! Encryption-method selection for the chat page.
//!
//! DESIGN
//! ======
//! The backend advertises the methods; the client only remembers which one is
//! selected and what key the user typed for each. Keys are kept per method so
//! switching back restores what was entered. A method that needs a key blocks
//! sending until its key is non-blank.

#[cfg(test)]
#[path = "methods_test.rs"]
mod methods_test;

use std::collections::HashMap;

use crate::net::types::EncryptionMethod;

pub const NO_METHOD_SELECTED: &str = "Select an encryption method";
pub const KEY_REQUIRED: &str = "Enter a key for this method";
pub const LOAD_FAILED: &str = "Failed to load encryption methods";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MethodState {
    methods: Vec<EncryptionMethod>,
    selected: Option<String>,
    keys: HashMap<String, String>,
    pub loading: bool,
    pub error: Option<String>,
}

impl MethodState {
    pub fn fetching() -> Self {
        Self { loading: true, ..Self::default() }
    }

    /// Install a fresh method list. Keeps the selection when it still exists,
    /// otherwise selects the first method.
    pub fn loaded(&mut self, methods: Vec<EncryptionMethod>) {
        let keep = self
            .selected
            .as_deref()
            .is_some_and(|id| methods.iter().any(|m| m.id == id));
        if !keep {
            self.selected = methods.first().map(|m| m.id.clone());
        }
        self.keys.retain(|id, _| methods.iter().any(|m| &m.id == id));
        self.error = if methods.is_empty() { Some(LOAD_FAILED.to_owned()) } else { None };
        self.methods = methods;
        self.loading = false;
    }

    pub fn failed(&mut self, message: impl Into<String>) {
        log::warn!("loading encryption methods failed");
        self.methods.clear();
        self.selected = None;
        self.error = Some(message.into());
        self.loading = false;
    }

    pub fn methods(&self) -> &[EncryptionMethod] {
        &self.methods
    }

    /// Select a method by id. Unknown ids leave the selection unchanged.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.methods.iter().any(|m| m.id == id) {
            return false;
        }
        self.selected = Some(id.to_owned());
        true
    }

    pub fn selected(&self) -> Option<&EncryptionMethod> {
        let id = self.selected.as_deref()?;
        self.methods.iter().find(|m| m.id == id)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    /// Key typed for the selected method.
    pub fn key(&self) -> &str {
        self.selected
            .as_deref()
            .and_then(|id| self.keys.get(id))
            .map_or("", String::as_str)
    }

    pub fn set_key(&mut self, key: impl Into<String>) {
        if let Some(id) = self.selected.clone() {
            self.keys.insert(id, key.into());
        }
    }

    pub fn hint(&self) -> Option<&str> {
        self.selected()
            .map(|m| m.hint.as_str())
            .filter(|hint| !hint.trim().is_empty())
    }

    /// Why sending is not possible right now, if it isn't.
    pub fn send_blocker(&self) -> Option<&'static str> {
        let Some(method) = self.selected() else {
            return Some(NO_METHOD_SELECTED);
        };
        if method.requires_key && self.key().trim().is_empty() {
            return Some(KEY_REQUIRED);
        }
        None
    }
}
