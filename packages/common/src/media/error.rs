use thiserror::Error;

/// Errors raised while storing uploaded media.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The upload is not an accepted image type.
    #[error("unsupported media type: {0}")]
    UnsupportedType(String),

    /// The upload exceeds the configured size limit.
    #[error("media exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },

    #[error("media IO error: {0}")]
    Io(#[from] std::io::Error),
}
