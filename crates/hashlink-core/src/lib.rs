//! Core types and traits for the hashlink URL shortener.
//!
//! This crate provides the content-derived [`ShortKey`], the [`LinkRecord`]
//! pairing a key with its original URL, and the [`Storage`] contract every
//! backend implements.

pub mod error;
pub mod record;
pub mod short_key;
pub mod storage;

pub use error::{Result, StorageError};
pub use record::LinkRecord;
pub use short_key::ShortKey;
pub use storage::Storage;
