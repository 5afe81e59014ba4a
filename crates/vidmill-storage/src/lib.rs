//! Vidmill Storage Library
//!
//! File-store abstraction and the local filesystem implementation.
//!
//! # Storage key format
//!
//! Keys are owner-scoped: `media/{owner_id}/{filename}`. Derived artifacts
//! live next to their source under the same owner prefix
//! (`media/{owner_id}/{stem}_thumb.jpg`). Keys must not contain `..` or a
//! leading `/`; generation is centralized in the `keys` module so every
//! caller stays consistent.

pub mod factory;
pub mod keys;
pub mod local;
pub mod traits;

pub use factory::create_storage;
pub use keys::{derived_key, generate_storage_key};
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
