//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration (validation, session calls,
//! navigation) and delegates rendering details to `components`.

pub mod chat;
pub mod login;
pub mod register;
