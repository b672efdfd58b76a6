//! Read model storage abstractions (the repository seam).

pub mod store;

pub use store::{InMemoryReadStore, ReadStore};
