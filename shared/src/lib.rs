//! Shared types for the restaurant backend
//!
//! Error system, domain models and small utilities used by the server and
//! by API clients.

pub mod error;
pub mod models;
pub mod util;
