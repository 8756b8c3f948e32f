//! Normalized output records

use std::fmt;

use crate::markers::GlucoseAnnotations;

/// Insulin kind, discriminated by the result record's unit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsulinKind {
    Unknown,
    FastActing,
    LongActing,
    Mixed,
}

/// Measurement type of a normalized record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Glucose,
    Carb,
    Insulin(InsulinKind),
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Glucose => "Glucose",
            Self::Carb => "Carb",
            Self::Insulin(InsulinKind::Unknown) => "UnknownInsulin",
            Self::Insulin(InsulinKind::FastActing) => "FastActingInsulin",
            Self::Insulin(InsulinKind::LongActing) => "LongActingInsulin",
            Self::Insulin(InsulinKind::Mixed) => "MixedInsulin",
        };
        f.write_str(label)
    }
}

/// A unit-converted, flag-annotated measurement ready for serialization
///
/// Only derived from result records; control-solution results are
/// suppressed before one of these is ever built.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    /// Position of the result in the transfer
    pub sequence: String,

    /// `YYYY-MM-DD HH:MM`
    pub timestamp: String,

    pub kind: ResultKind,

    /// Converted value, or the meter's own formatting when no
    /// conversion was needed
    pub value: String,

    /// Marker-derived annotations; glucose results only
    pub glucose: Option<GlucoseAnnotations>,
}
