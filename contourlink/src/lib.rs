//! # contourlink
//!
//! Read stored measurement records from Contour Next USB blood glucose
//! meters.
//!
//! The meter speaks a line-oriented ASTM-style serial protocol tunneled
//! through fixed-size HID reports. This crate drives one full session:
//! wake, header exchange, acknowledged frame-by-frame transfer,
//! termination - then converts each result into a unit-normalized
//! record for CSV output.
//!
//! ## Quick start
//!
//! ```no_run
//! use contourlink::{normalize, CsvOutput, Meter, Preferences};
//! use contourlink_transport::HidTransport;
//!
//! fn main() -> contourlink::Result<()> {
//!     let mut meter = Meter::new(HidTransport::open()?);
//!     let prefs = Preferences::default();
//!     let mut out = CsvOutput::new(std::io::stdout())?;
//!
//!     let info = meter.handshake()?;
//!     eprintln!("{info}");
//!
//!     meter.stream_results(|result| {
//!         if let Some(record) = normalize(&result, &prefs)? {
//!             out.write_record(&record)?;
//!         }
//!         Ok(())
//!     })?;
//!     out.flush()
//! }
//! ```
//!
//! This tool is experimental software, not developed or supported by
//! the meter's manufacturer. It might damage your meter or render it
//! unreliable.

pub mod error;
pub mod meter;
pub mod normalize;
pub mod output;

// Re-exports
pub use error::{Error, Result};
pub use meter::{Meter, Mode, SessionState};
pub use normalize::normalize;
pub use output::CsvOutput;

// Re-export types
pub use contourlink_core::{Frame, FrameKind, Record, ResultRecord};
pub use contourlink_types::{MeterInfo, NormalizedRecord, Preferences};
