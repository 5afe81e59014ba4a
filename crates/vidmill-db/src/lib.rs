//! Vidmill DB Library
//!
//! Document-store abstraction for video records. The [`VideoStore`] trait is
//! the seam; [`PgVideoStore`] persists records in Postgres with JSONB columns
//! for the nested documents (metadata, options, outputs), and
//! [`InMemoryVideoStore`] backs tests and embedded use.

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::InMemoryVideoStore;
pub use postgres::PgVideoStore;
pub use store::VideoStore;
