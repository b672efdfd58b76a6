//! `campus-events` — event contracts and distribution plumbing.
//!
//! Events are stored first (event store), then published (bus). Consumers
//! must be idempotent; delivery is at-least-once.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::InMemoryEventBus;
