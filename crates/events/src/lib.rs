//! Integration events emitted after a saga step commits locally.
//!
//! Events are best-effort notifications for downstream consumers (the
//! notification service); the local state change is the system of record.
//! Publishing never blocks or fails the triggering request.

pub mod event;
pub mod publisher;

pub use event::{EventEnvelope, EventItem, IntegrationEvent};
pub use publisher::{ChannelPublisher, EventPublisher, NoopPublisher, RecordingPublisher};
