//! Order domain for the order platform.
//!
//! This crate owns the order aggregate and its lifecycle:
//! - [`OrderStatus`]: the legal transition graph
//! - [`Order`] and [`OrderItem`]: the aggregate with immutable item snapshots
//! - [`Money`]: integer-cents value object
//! - [`OrderRepository`]: the persistence contract (orders are stored by an
//!   external collaborator; an in-memory implementation ships for tests and
//!   single-process wiring)

pub mod error;
pub mod money;
pub mod order;
pub mod repository;
pub mod status;

pub use error::{OrderError, RepositoryError};
pub use money::Money;
pub use order::{Order, OrderItem};
pub use repository::{InMemoryOrderRepository, OrderRepository};
pub use status::OrderStatus;
