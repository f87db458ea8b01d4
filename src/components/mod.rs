//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read shared session state from Leptos context providers. The
//! few that call the backend do it through the session handle, the same way
//! pages do.

pub mod message_list;
pub mod method_list;
pub mod protected_route;
