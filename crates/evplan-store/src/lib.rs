//! Event plan data model and client-side persistence.
//!
//! - [`models`]: the persisted [`EventPlan`] entity and [`Gender`].
//! - [`kv`]: string key-value substrates (file-backed and in-memory).
//! - [`store`]: the adapter that (de)serializes the whole collection.
//! - [`collection`]: the in-memory list with write-through on mutation.

pub mod collection;
pub mod config;
pub mod error;
pub mod kv;
pub mod models;
pub mod store;

pub use collection::EventList;
pub use config::StoreConfig;
pub use error::StoreError;
pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
pub use models::{EventPlan, Gender, GenderParseError};
pub use store::PlanStore;
