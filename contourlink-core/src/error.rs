//! Error types for contourlink-core

/// Result type alias for core protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Frame or record does not match the required structure
    #[error("Malformed ASTM data: {0}")]
    Format(String),

    /// Checksum verification failed
    #[error("Checksum mismatch: {received} in frame, computed {computed}")]
    ChecksumMismatch {
        computed: String,
        received: String,
    },

    /// Unknown record type code
    #[error("Unknown record type code: {0:?}")]
    UnknownRecordType(char),

    /// Record has the wrong number of fields for its type
    #[error("{record} record has {actual} fields, expected {expected}")]
    FieldCount {
        record: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl Error {
    /// Whether the error indicates transport corruption rather than a
    /// structural problem in the data
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::ChecksumMismatch { .. })
    }
}
