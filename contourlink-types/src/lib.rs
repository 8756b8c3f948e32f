//! Type definitions for contourlink
//!
//! Domain types independent of the wire protocol: unit preferences and
//! conversions, glucose marker flags, timestamp normalization, meter
//! identity and the normalized output record.

pub mod error;
pub mod markers;
pub mod meter_info;
pub mod normalized;
pub mod timestamp;
pub mod units;

pub use error::{Error, Result};
pub use markers::{GlucoseAnnotations, GlucoseMarkers};
pub use meter_info::MeterInfo;
pub use normalized::{InsulinKind, NormalizedRecord, ResultKind};
pub use units::{CarbUnit, GlucoseUnit, Preferences};
