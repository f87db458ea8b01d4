//! Auth-session context for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SessionContext` is built once when the app mounts and injected into the
//! tree through Leptos context. It owns the token store (via the gateway) and
//! the session machine, runs validation round-trips, and publishes every
//! distinct status change. Route guards and pages only read [`AuthState`],
//! the signal-friendly mirror of that status.
//!
//! LIFECYCLE
//! =========
//! `init` subscribes to the token change feed; `teardown` detaches it and
//! stops in-flight checks from applying their results.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::session::{CheckResolution, CheckStart, SessionState, SessionStatus};
use crate::net::api::{AuthError, AuthGateway};
use crate::net::http::HttpClient;
use crate::net::types::User;
use crate::util::observers::{ListenerId, Observers};
use crate::util::token_store::{TokenChange, TokenStore};

/// Render-facing snapshot of the session, held in an `RwSignal`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub status: SessionStatus,
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        self.status.user()
    }

    pub fn loading(&self) -> bool {
        self.status.is_pending()
    }
}

pub struct SessionContext<C> {
    gateway: AuthGateway<C>,
    state: RefCell<SessionState>,
    changes: Observers<SessionStatus>,
    last_published: RefCell<Option<SessionStatus>>,
    feed: Cell<Option<ListenerId>>,
    torn_down: Cell<bool>,
}

impl<C: HttpClient + 'static> SessionContext<C> {
    pub fn new(gateway: AuthGateway<C>) -> Rc<Self> {
        Rc::new(Self {
            gateway,
            state: RefCell::new(SessionState::new()),
            changes: Observers::new(),
            last_published: RefCell::new(None),
            feed: Cell::new(None),
            torn_down: Cell::new(false),
        })
    }

    pub fn gateway(&self) -> &AuthGateway<C> {
        &self.gateway
    }

    pub fn store(&self) -> &TokenStore {
        self.gateway.store()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status().clone()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.get()
    }

    /// Subscribe to the token change feed.
    ///
    /// `on_revalidate` runs whenever storage now holds a token the session
    /// was not derived from; the caller schedules [`SessionContext::check`].
    /// Calling `init` twice is a no-op.
    pub fn init(self: &Rc<Self>, on_revalidate: impl Fn() + 'static) {
        if self.feed.get().is_some() || self.is_torn_down() {
            return;
        }
        let weak: Weak<Self> = Rc::downgrade(self);
        let id = self.store().subscribe(move |change| {
            let Some(ctx) = weak.upgrade() else {
                return;
            };
            if ctx.handle_token_change(*change) {
                on_revalidate();
            }
        });
        self.feed.set(Some(id));
    }

    /// Detach from the change feed. Results of checks still in flight are dropped.
    pub fn teardown(&self) {
        self.torn_down.set(true);
        if let Some(id) = self.feed.take() {
            self.store().unsubscribe(id);
        }
        log::debug!("session context torn down");
    }

    pub fn subscribe(&self, listener: impl Fn(&SessionStatus) + 'static) -> ListenerId {
        self.changes.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.changes.unsubscribe(id)
    }

    /// React to a token mutation. Returns `true` if a new check is needed.
    pub fn handle_token_change(&self, change: TokenChange) -> bool {
        if self.is_torn_down() {
            return false;
        }
        let Some(token) = self.store().get() else {
            log::debug!("token gone after {change:?}");
            let changed = self.state.borrow_mut().token_observed(false);
            if changed {
                self.publish();
            }
            return false;
        };
        self.state.borrow().needs_check(Some(&token))
    }

    /// Derive the session from storage, validating any token with the backend.
    ///
    /// Resolves to the status after this call. A call that joins a check
    /// already in flight returns `Pending`; the owning call publishes the
    /// final status.
    pub async fn check(&self) -> SessionStatus {
        loop {
            if self.is_torn_down() {
                return self.status();
            }

            let token = self.store().get();
            let start = self.state.borrow_mut().begin_check(token.as_deref());
            let ticket = match start {
                CheckStart::Resolved => {
                    self.publish();
                    return self.status();
                }
                CheckStart::Joined(_) => return self.status(),
                CheckStart::Validate(ticket) => ticket,
            };
            self.publish();

            let valid = self.gateway.validate().await;
            if self.is_torn_down() {
                log::debug!("dropping validation result after teardown");
                return self.status();
            }

            let current = self.store().get();
            let resolution = self.state.borrow_mut().finish_check(ticket, valid, current.as_deref());
            match resolution {
                CheckResolution::Stale => return self.status(),
                CheckResolution::Recheck => continue,
                CheckResolution::Applied => {}
                CheckResolution::DiscardToken => {
                    if let Some(token) = current {
                        self.store().remove_if_current(&token);
                    }
                }
            }
            self.publish();
            return self.status();
        }
    }

    /// Run [`SessionContext::check`] only if storage differs from the status.
    pub async fn ensure_checked(&self) -> SessionStatus {
        let token = self.store().get();
        let needed = self.state.borrow().needs_check(token.as_deref());
        if needed {
            return self.check().await;
        }
        self.status()
    }

    /// Exchange credentials and store the token. Validation happens on the
    /// next check (the protected route runs one on mount).
    ///
    /// # Errors
    ///
    /// Propagates [`AuthError`] from the gateway; nothing is stored then.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let token = self.gateway.login(username, password).await?;
        self.store().save(&token);
        log::info!("signed in as {username}");
        Ok(())
    }

    /// Create an account and store the token it comes with.
    ///
    /// # Errors
    ///
    /// Propagates [`AuthError`] from the gateway; nothing is stored then.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let token = self.gateway.register(username, password).await?;
        self.store().save(&token);
        log::info!("registered {username}");
        Ok(())
    }

    pub fn logout(&self) {
        self.state.borrow_mut().logout();
        self.store().remove();
        self.publish();
        log::info!("signed out");
    }

    fn publish(&self) {
        let status = self.status();
        if self.last_published.borrow().as_ref() == Some(&status) {
            return;
        }
        *self.last_published.borrow_mut() = Some(status.clone());
        self.changes.notify(&status);
    }
}
