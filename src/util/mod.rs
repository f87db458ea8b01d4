//! Utility helpers shared across client UI modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser storage and route admission from page and
//! component logic so both can be tested without a browser.

pub mod auth;
pub mod observers;
pub mod token_store;
