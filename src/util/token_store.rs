//! Persisted bearer token with a same-context change feed.
//!
//! SYSTEM CONTEXT
//! ==============
//! The token lives under one `localStorage` key scoped to the page origin.
//! Other tabs learn about mutations through the browser `storage` event; the
//! current tab never receives that event for its own writes, so every
//! mutation here is also published to in-process subscribers. Session code
//! reacts to one feed regardless of where the change came from.
//!
//! TRADE-OFFS
//! ==========
//! Reads and writes are last-writer-wins with no transactional discipline.
//! Cross-tab consistency is best-effort and bounded only by event delivery.

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;

use std::cell::RefCell;
use std::rc::Rc;

use super::observers::{ListenerId, Observers};

/// Storage key holding the raw bearer token.
pub const TOKEN_STORAGE_KEY: &str = "access_token";

/// What happened to the stored token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenChange {
    /// This context wrote a token.
    Saved,
    /// This context removed the token.
    Removed,
    /// Another tab touched the storage key; re-read to learn the new value.
    External,
}

/// Durable slot for one token string.
pub trait TokenBackend {
    fn read(&self) -> Option<String>;
    fn write(&self, token: &str);
    fn clear(&self);
}

/// Shared backends model several tabs over one origin's storage.
impl<B: TokenBackend> TokenBackend for Rc<B> {
    fn read(&self) -> Option<String> {
        (**self).read()
    }

    fn write(&self, token: &str) {
        (**self).write(token);
    }

    fn clear(&self) {
        (**self).clear();
    }
}

/// Process-local backend for native builds and tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slot: RefCell<Option<String>>,
}

impl TokenBackend for MemoryBackend {
    fn read(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    fn write(&self, token: &str) {
        *self.slot.borrow_mut() = Some(token.to_owned());
    }

    fn clear(&self) {
        *self.slot.borrow_mut() = None;
    }
}

/// Browser `localStorage` backend.
#[cfg(feature = "csr")]
#[derive(Debug, Default)]
pub struct LocalStorageBackend;

#[cfg(feature = "csr")]
impl LocalStorageBackend {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

#[cfg(feature = "csr")]
impl TokenBackend for LocalStorageBackend {
    fn read(&self) -> Option<String> {
        Self::storage()?.get_item(TOKEN_STORAGE_KEY).ok().flatten()
    }

    fn write(&self, token: &str) {
        let Some(storage) = Self::storage() else {
            log::warn!("localStorage unavailable; token not persisted");
            return;
        };
        if storage.set_item(TOKEN_STORAGE_KEY, token).is_err() {
            log::warn!("failed to persist token to localStorage");
        }
    }

    fn clear(&self) {
        let Some(storage) = Self::storage() else {
            log::warn!("localStorage unavailable; token not removed");
            return;
        };
        if storage.remove_item(TOKEN_STORAGE_KEY).is_err() {
            log::warn!("failed to remove token from localStorage");
        }
    }
}

/// Shared handle to the persisted token. Clones observe the same slot and feed.
#[derive(Clone)]
pub struct TokenStore {
    backend: Rc<dyn TokenBackend>,
    changes: Rc<Observers<TokenChange>>,
}

impl TokenStore {
    pub fn new(backend: impl TokenBackend + 'static) -> Self {
        Self { backend: Rc::new(backend), changes: Rc::new(Observers::new()) }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::default())
    }

    /// `localStorage` in the browser, memory everywhere else.
    pub fn browser() -> Self {
        #[cfg(feature = "csr")]
        {
            Self::new(LocalStorageBackend)
        }
        #[cfg(not(feature = "csr"))]
        {
            Self::in_memory()
        }
    }

    /// Current token; an empty stored string counts as absent.
    pub fn get(&self) -> Option<String> {
        self.backend.read().filter(|token| !token.is_empty())
    }

    pub fn is_present(&self) -> bool {
        self.get().is_some()
    }

    pub fn save(&self, token: &str) {
        self.backend.write(token);
        self.changes.notify(&TokenChange::Saved);
    }

    /// Remove the token. Publishes only when something was actually removed.
    pub fn remove(&self) {
        let had_token = self.backend.read().is_some();
        self.backend.clear();
        if had_token {
            self.changes.notify(&TokenChange::Removed);
        }
    }

    /// Remove the token only if it still equals `token`.
    ///
    /// Guards against discarding a newer token written while a request for
    /// the older one was in flight.
    pub fn remove_if_current(&self, token: &str) -> bool {
        if self.get().as_deref() != Some(token) {
            return false;
        }
        self.remove();
        true
    }

    /// Publish a change observed outside this context (another tab).
    pub fn notify_external(&self) {
        self.changes.notify(&TokenChange::External);
    }

    pub fn subscribe(&self, listener: impl Fn(&TokenChange) + 'static) -> ListenerId {
        self.changes.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.changes.unsubscribe(id)
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("present", &self.is_present())
            .field("subscribers", &self.changes.len())
            .finish()
    }
}

/// Whether a `storage` event for `key` concerns the token.
///
/// A `None` key means the whole storage area was cleared.
pub fn is_token_storage_event(key: Option<&str>) -> bool {
    key.map_or(true, |key| key == TOKEN_STORAGE_KEY)
}

/// Registered `storage` event listener; detaches itself on drop.
#[cfg(feature = "csr")]
pub struct StorageListener {
    closure: wasm_bindgen::closure::Closure<dyn FnMut(web_sys::StorageEvent)>,
}

#[cfg(feature = "csr")]
impl Drop for StorageListener {
    fn drop(&mut self) {
        use wasm_bindgen::JsCast;
        if let Some(window) = web_sys::window() {
            let _ = window.remove_event_listener_with_callback("storage", self.closure.as_ref().unchecked_ref());
        }
    }
}

/// Forward cross-tab `storage` events for the token key into `store`'s feed.
#[cfg(feature = "csr")]
pub fn install_storage_listener(store: &TokenStore) -> Option<StorageListener> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;

    let window = web_sys::window()?;
    let store = store.clone();
    let closure = Closure::<dyn FnMut(web_sys::StorageEvent)>::new(move |event: web_sys::StorageEvent| {
        if is_token_storage_event(event.key().as_deref()) {
            log::debug!("token changed in another tab");
            store.notify_external();
        }
    });
    if window.add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref()).is_err() {
        log::warn!("failed to register storage listener");
        return None;
    }
    Some(StorageListener { closure })
}
