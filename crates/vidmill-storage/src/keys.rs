//! Shared key generation for storage backends.
//!
//! Key format: `media/{owner_id}/{filename}`. Derived artifacts reuse the
//! source key's stem with a suffix and their own extension.

use uuid::Uuid;

/// Generate a storage key for the given owner and filename.
pub fn generate_storage_key(owner_id: Uuid, filename: &str) -> String {
    format!("media/{}/{}", owner_id, filename)
}

/// Key for a derived artifact, next to its source.
///
/// `derived_key("media/o/talk.mp4", "_thumb", "jpg")` yields
/// `media/o/talk_thumb.jpg`.
pub fn derived_key(source_key: &str, suffix: &str, extension: &str) -> String {
    let stem = match source_key.rfind('.') {
        Some(dot) if dot > source_key.rfind('/').map_or(0, |s| s + 1) => &source_key[..dot],
        _ => source_key,
    };
    format!("{}{}.{}", stem, suffix, extension)
}
