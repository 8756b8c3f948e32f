//! High-level error types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Protocol error: {0}")]
    Core(#[from] contourlink_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] contourlink_transport::Error),

    #[error("Conversion error: {0}")]
    Types(#[from] contourlink_types::Error),

    #[error("Expected control byte 0x{expected:02X}, received {received:02X?}")]
    UnexpectedControl { expected: u8, received: Vec<u8> },

    #[error("Meter is busy - unplug it, wait for it to settle, and retry")]
    DeviceBusy,

    #[error("Unsupported product ID '{0}'")]
    UnsupportedProduct(String),

    #[error("Invalid processing ID '{0}'")]
    InvalidProcessingId(String),

    #[error("Expected a {expected} record, got a '{found}' record")]
    UnexpectedRecord { expected: &'static str, found: char },

    #[error("Abnormal termination (code '{0}'), data might be bad")]
    AbnormalTermination(String),

    #[error("Cannot {operation} in session state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: crate::meter::SessionState,
    },

    #[error("Output error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short category used when reporting the error to the user
    pub fn category(&self) -> &'static str {
        use contourlink_types::Error as TypesError;

        match self {
            Self::Core(core) if core.is_corruption() => "bad checksum",
            Self::Core(_) => "bad data from meter",
            Self::Types(TypesError::Format(_)) => "bad data from meter",
            Self::Types(_) => "internal error",
            _ => "IO or protocol error",
        }
    }

    /// Whether a diagnostic frame dump would help diagnose this error
    pub fn wants_bug_report(&self) -> bool {
        matches!(self.category(), "bad data from meter")
    }
}
