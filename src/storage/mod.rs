//! Store implementations for different backends

#[cfg(feature = "http")]
pub mod http;
pub mod in_memory;

#[cfg(feature = "http")]
pub use http::HttpStore;
pub use in_memory::{InMemoryResourceStore, InMemoryStore, StoreOperation};
