//! Audio processing: silence cutting and enhancement.

pub mod enhance;
pub mod silence;

pub use enhance::filter_chain;
pub use silence::{chunk_dbfs, cut_silence, SilenceConfig};
