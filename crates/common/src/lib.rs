//! Shared types used across the order platform.
//!
//! Identifier newtypes keep UUIDs from different entities from being mixed
//! up at compile time; [`Principal`] carries the pre-validated identity fact
//! handed in by the authentication layer.

pub mod principal;
pub mod types;

pub use principal::{Principal, Role};
pub use types::{EventId, OrderId, ProductId, UserId};
