//! Application state modules.
//!
//! ARCHITECTURE
//! ============
//! `session` is the pure transition machine, `auth` the context object that
//! drives it against storage and the network; `methods` and `chat` hold the
//! chat page's method selection, message list and composer.

pub mod auth;
pub mod chat;
pub mod methods;
pub mod session;
