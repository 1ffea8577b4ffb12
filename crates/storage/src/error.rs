/// All errors that can be returned by a Marquee store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A raw prompt record failed validation at the catalog boundary.
    #[error("invalid prompt record: {message}")]
    InvalidRecord { message: String },

    /// A backend-specific storage error (connection, serialization, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}
