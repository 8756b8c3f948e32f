//! Transport layer for Contour Next USB meters
//!
//! The meter tunnels its serial protocol through fixed-size HID
//! reports. Each report wraps a chunk of protocol data as:
//!
//! ```text
//! ┌───────────┬─────────────┬──────────────────┐
//! │  marker   │   length    │       data       │
//! │  b"ABC"   │   1 byte    │   length bytes   │
//! └───────────┴─────────────┴──────────────────┘
//! ```
//!
//! The transport strips the marker and length on read and adds them on
//! write; callers only ever see the data bytes. The protocol is
//! half-duplex and strictly sequential, so all I/O here is blocking.

pub mod error;
pub mod hid;

pub use error::{Error, Result};
pub use hid::HidTransport;

use bytes::Bytes;

/// Marker bytes at the start of every report
pub const REPORT_MARKER: &[u8] = b"ABC";

/// Maximum data bytes a single report can carry
pub const MAX_REPORT_DATA: usize = 60;

/// Full report size: marker, length byte, data
pub const REPORT_SIZE: usize = REPORT_MARKER.len() + 1 + MAX_REPORT_DATA;

/// Blocking report-level transport to the meter
///
/// One `read_report` call returns the data bytes of exactly one report;
/// one `write_report` call sends exactly one. Transport-level timeouts
/// are surfaced as [`Error::ReadTimeout`]; the protocol layer above adds
/// none of its own.
pub trait Transport {
    /// Read one report, returning its data bytes with marker and length
    /// stripped
    fn read_report(&mut self) -> Result<Bytes>;

    /// Write one report carrying the given data bytes
    ///
    /// Fails with [`Error::ReportTooLarge`] if `data` exceeds
    /// [`MAX_REPORT_DATA`]; splitting across reports is not supported.
    fn write_report(&mut self, data: &[u8]) -> Result<()>;
}
