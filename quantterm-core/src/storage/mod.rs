//! SQLite persistence layer.

pub mod store;

pub use store::{BarStore, StorageError};
