//! Networking modules for the REST backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` holds the auth gateway, `http` the transport seam, `token` the
//! bearer payload decoder, and `types` the shared wire schema.

pub mod api;
pub mod http;
pub mod token;
pub mod types;

#[cfg(test)]
pub(crate) mod scripted;
