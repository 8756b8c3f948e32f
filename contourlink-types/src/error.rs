//! Error types for contourlink-types

/// Result type alias for domain type operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A record field does not match its expected shape
    #[error("Malformed field: {0}")]
    Format(String),

    /// No conversion path between the units
    #[error("Don't know how to convert from {from} to {to}")]
    UnknownConversion { from: String, to: String },

    /// A value that should be numeric is not
    #[error("Non-numeric value {0:?}")]
    BadValue(String),
}
