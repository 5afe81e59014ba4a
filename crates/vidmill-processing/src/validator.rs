use std::path::Path;

use vidmill_core::UploadConfig;

/// Upload validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Not a video file: detected content type {0}")]
    NotAVideo(String),

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyFile,
}

/// Upload validator
///
/// Decides whether an upload is a real video: content sniff of the leading
/// bytes first, falling back to the extension allow-list when the bytes
/// match no known signature. Also enforces the size cap and sanitizes the
/// filename.
pub struct UploadValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
}

impl UploadValidator {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            max_file_size: config.max_file_size_bytes,
            allowed_extensions: config.allowed_extensions.clone(),
        }
    }

    /// Validate size and content, returning the content type to record.
    ///
    /// A sniffed non-video type is rejected even when the extension looks
    /// right; an unrecognized signature defers to the extension allow-list.
    pub fn validate(&self, filename: &str, data: &[u8]) -> Result<String, ValidationError> {
        if data.is_empty() {
            return Err(ValidationError::EmptyFile);
        }
        if data.len() > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size: data.len(),
                max: self.max_file_size,
            });
        }

        match infer::get(data) {
            Some(kind) if kind.mime_type().starts_with("video/") => {
                Ok(kind.mime_type().to_string())
            }
            Some(kind) => Err(ValidationError::NotAVideo(kind.mime_type().to_string())),
            None => {
                let extension = self.validate_extension(filename)?;
                Ok(content_type_for_extension(&extension))
            }
        }
    }

    /// Validate the file extension against the allow-list.
    pub fn validate_extension(&self, filename: &str) -> Result<String, ValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::InvalidFilename(filename.to_string()))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(extension)
    }
}

fn content_type_for_extension(extension: &str) -> String {
    match extension {
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Sanitize an uploaded filename for storage.
///
/// Strips any path components, replaces whitespace with underscores, drops
/// characters outside `[A-Za-z0-9._-]`, and refuses to produce a hidden or
/// empty name.
pub fn sanitize_filename(filename: &str) -> Result<String, ValidationError> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let mut sanitized: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    while sanitized.starts_with(['.', '-']) {
        sanitized.remove(0);
    }

    if sanitized.is_empty() {
        return Err(ValidationError::InvalidFilename(filename.to_string()));
    }

    Ok(sanitized)
}
