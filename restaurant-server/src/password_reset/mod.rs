//! Password reset by emailed one-time code
//!
//! Codes are six digits, stored only as argon2 hashes, expire after a
//! configurable TTL and are consumed atomically together with the password
//! change.

pub mod error;
pub mod service;
pub mod store;

#[cfg(test)]
pub mod memory;

pub use error::ResetError;
pub use service::PasswordResetService;
