//! Order lifecycle
//!
//! - [`pricing`]: unit price snapshots, subtotals and order totals
//! - [`status`]: which status changes are accepted
//! - [`invoice`]: which invoice an order should have for its status
//! - [`pdf`]: printable invoice rendering
//! - [`store`]: persistence seam ([`store::OrderStore`])
//! - [`service`]: the operations exposed to the API layer

pub mod error;
pub mod invoice;
pub mod pdf;
pub mod pricing;
pub mod service;
pub mod status;
pub mod store;

#[cfg(test)]
pub mod memory;

pub use error::OrderError;
pub use service::OrderService;
pub use status::TransitionPolicy;
