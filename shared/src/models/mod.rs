//! Data models
//!
//! Shared between restaurant-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64`, all timestamps Unix millis, money is `Decimal`.

pub mod dining_table;
pub mod food;
pub mod invoice;
pub mod menu;
pub mod note;
pub mod order;
pub mod restaurant;
pub mod user;

// Re-exports
pub use dining_table::*;
pub use food::*;
pub use invoice::*;
pub use menu::*;
pub use note::*;
pub use order::*;
pub use restaurant::*;
pub use user::*;
