//! Storage backends for hashlink.
//!
//! [`InMemoryStorage`] keeps links in a process-local concurrent map and
//! loses them on restart. [`PostgresStorage`] persists them in the `links`
//! table through a connection pool.

pub mod memory;
pub mod postgres;

pub use hashlink_core::{Storage, StorageError};
pub use memory::InMemoryStorage;
pub use postgres::{PoolSettings, PostgresStorage};
