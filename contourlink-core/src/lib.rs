//! # contourlink-core
//!
//! Core ASTM protocol implementation for Contour Next USB meters.
//!
//! The meter speaks a line-oriented ASTM-E1381/E1394-style protocol
//! tunneled through fixed-size HID reports. This crate provides the
//! low-level primitives:
//! - Frame structure and decoding
//! - Checksum calculation
//! - Record parsing
//! - Control character constants

pub mod checksum;
pub mod controlchars;
pub mod error;
pub mod frame;
pub mod record;

pub use error::{Error, Result};
pub use frame::{Frame, FrameKind};
pub use record::{HeaderRecord, PatientRecord, Record, ResultRecord, TerminatorRecord};

/// Field delimiter inside record payloads
pub const FIELD_DELIMITER: char = '|';

/// Frame terminator sequence (every frame ends with CRLF)
pub const FRAME_TERMINATOR: &[u8] = b"\r\n";
