//! Session derivation as a pure transition machine.
//!
//! DESIGN
//! ======
//! The machine never touches storage or the network. Callers feed it what
//! they read from the token store and what the validation request returned;
//! it answers with the next status and, when needed, asks for the token to
//! be discarded.
//!
//! Every check gets a [`CheckTicket`]. A result is applied only if its ticket
//! is still the in-flight one, so overlapping triggers (mount, login, another
//! tab) cannot apply a stale result after a newer check started. A check for
//! the same token as the in-flight one joins it instead of issuing a second
//! request.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use crate::net::token::decode_identity;
use crate::net::types::User;

/// Logical session derived from the stored token and the backend's verdict.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionStatus {
    /// A check is running or has not started yet.
    #[default]
    Pending,
    Authenticated(User),
    Anonymous,
}

impl SessionStatus {
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Pending | Self::Anonymous => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Identifies one validation round-trip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckTicket(u64);

/// What the caller must do after [`SessionState::begin_check`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckStart {
    /// No token stored: already resolved to `Anonymous`, nothing to send.
    Resolved,
    /// Send the validation request and report back with this ticket.
    Validate(CheckTicket),
    /// A check for the same token is already in flight; wait for it.
    Joined(CheckTicket),
}

/// How a finished check was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckResolution {
    /// A newer check superseded this one; nothing changed.
    Stale,
    Applied,
    /// Applied as `Anonymous`; the stored token is unusable and must be removed.
    DiscardToken,
    /// The stored token changed during the check; run a new check.
    Recheck,
}

#[derive(Clone, Debug)]
struct InFlight {
    ticket: CheckTicket,
    token: String,
}

#[derive(Clone, Debug, Default)]
pub struct SessionState {
    status: SessionStatus,
    next_ticket: u64,
    in_flight: Option<InFlight>,
    /// Token the current `Authenticated` status was derived from.
    authenticated_token: Option<String>,
    /// Stored token the backend refused without revoking it (non-401 error).
    /// The status stays `Anonymous` for it until storage changes.
    rejected_token: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn in_flight(&self) -> Option<CheckTicket> {
        self.in_flight.as_ref().map(|f| f.ticket)
    }

    /// Whether `token` (the store's current content) differs from what the
    /// status was derived from, i.e. whether a new check is warranted.
    ///
    /// A token the backend already refused is not re-sent until it is
    /// replaced; an explicit [`SessionState::begin_check`] still retries it.
    pub fn needs_check(&self, token: Option<&str>) -> bool {
        match (&self.status, token) {
            (SessionStatus::Anonymous, None) => false,
            (SessionStatus::Anonymous, Some(token)) => self.rejected_token.as_deref() != Some(token),
            (SessionStatus::Authenticated(_), Some(token)) => self.authenticated_token.as_deref() != Some(token),
            (SessionStatus::Pending, Some(token)) => self.in_flight.as_ref().map_or(true, |f| f.token != token),
            _ => true,
        }
    }

    /// Start deriving the session from the token currently in storage.
    pub fn begin_check(&mut self, token: Option<&str>) -> CheckStart {
        let Some(token) = token else {
            self.set_anonymous();
            return CheckStart::Resolved;
        };

        if let Some(flight) = &self.in_flight {
            if flight.token == token {
                return CheckStart::Joined(flight.ticket);
            }
        }

        let ticket = CheckTicket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight = Some(InFlight { ticket, token: token.to_owned() });
        self.authenticated_token = None;
        self.rejected_token = None;
        self.status = SessionStatus::Pending;
        CheckStart::Validate(ticket)
    }

    /// Apply the result of the request issued for `ticket`.
    ///
    /// `token` is the store's content re-read after the request resolved.
    pub fn finish_check(&mut self, ticket: CheckTicket, valid: bool, token: Option<&str>) -> CheckResolution {
        let Some(flight) = self.in_flight.take_if(|f| f.ticket == ticket) else {
            return CheckResolution::Stale;
        };

        if token.is_some_and(|current| current != flight.token) {
            // Replaced while the request was in flight; the verdict is for the old token.
            self.status = SessionStatus::Pending;
            return CheckResolution::Recheck;
        }
        if !valid || token.is_none() {
            self.set_anonymous();
            if token.is_some() {
                self.rejected_token = Some(flight.token);
            }
            return CheckResolution::Applied;
        }

        match decode_identity(&flight.token) {
            Ok(user) => {
                self.status = SessionStatus::Authenticated(user);
                self.authenticated_token = Some(flight.token);
                CheckResolution::Applied
            }
            Err(err) => {
                log::warn!("accepted token has an unreadable payload: {err}");
                self.set_anonymous();
                CheckResolution::DiscardToken
            }
        }
    }

    /// Reconcile with a token-presence observation (change feed, poll).
    ///
    /// Returns `true` if the status changed. Repeated observations that
    /// already match the status are no-ops.
    pub fn token_observed(&mut self, present: bool) -> bool {
        if present || matches!(self.status, SessionStatus::Anonymous) {
            return false;
        }
        self.set_anonymous();
        true
    }

    /// Drop to `Anonymous` and forget any in-flight check.
    pub fn logout(&mut self) {
        self.set_anonymous();
    }

    fn set_anonymous(&mut self) {
        self.in_flight = None;
        self.authenticated_token = None;
        self.rejected_token = None;
        self.status = SessionStatus::Anonymous;
    }
}
