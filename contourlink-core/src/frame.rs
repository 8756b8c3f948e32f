//! ASTM frame structure and decoding

use bytes::Bytes;
use std::fmt;

use crate::{
    checksum,
    controlchars::{ETB, ETX, STX},
    error::{Error, Result},
};

/// Frame classification, taken from the frame-kind byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// ETB - more frames follow
    Intermediate,

    /// ETX - last frame of the transfer
    Terminal,
}

/// A single ASTM frame
///
/// # Wire structure
///
/// ```text
/// ┌──────┬───────────┬──────────┬───────────┬────────────┬──────┐
/// │ STX  │ sequence  │ payload  │ ETX|ETB   │ checksum   │ CRLF │
/// │ 0x02 │ '0'..'7'  │ N bytes  │ 1 byte    │ 2 hex chars│      │
/// └──────┴───────────┴──────────┴───────────┴────────────┴──────┘
/// ```
///
/// The sequence number starts at 1 and wraps to 0 after 7. The payload
/// never contains ETX or ETB, so the first occurrence of either byte
/// ends it. The checksum is the 8-bit sum of every byte from the
/// sequence digit through the frame-kind byte inclusive.
///
/// # Examples
///
/// ```
/// use contourlink_core::{Frame, FrameKind};
///
/// let frame = Frame::parse(&b"\x021P|1\r\x1752\r\n"[..]).unwrap();
/// assert_eq!(frame.sequence, 1);
/// assert_eq!(frame.kind, FrameKind::Intermediate);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame sequence number (0-7, cyclic)
    pub sequence: u8,

    /// Payload bytes between the sequence digit and the frame-kind byte
    pub payload: Bytes,

    /// Intermediate or terminal
    pub kind: FrameKind,

    /// The exact bytes of the matched frame, for diagnostic dumps
    pub raw: Bytes,

    /// Bytes after the matched frame, to be replayed by the caller
    pub trailer: Bytes,
}

impl Frame {
    /// Bytes of frame structure surrounding the payload:
    /// STX, sequence digit, kind byte, two checksum digits, CRLF
    pub const OVERHEAD: usize = 7;

    /// Decode a frame from a raw buffer
    ///
    /// The buffer must begin with a complete frame; any bytes after it
    /// are returned untouched in [`Frame::trailer`]. The checksum is
    /// verified unconditionally before the frame is returned - the HID
    /// transport underneath has no integrity guarantee of its own.
    ///
    /// # Errors
    ///
    /// - [`Error::Format`] if the buffer does not match the structure
    /// - [`Error::ChecksumMismatch`] if the transmitted checksum
    ///   disagrees with the computed one
    pub fn parse(buf: impl Into<Bytes>) -> Result<Self> {
        let buf: Bytes = buf.into();

        if buf.len() < Self::OVERHEAD {
            return Err(Error::Format(format!(
                "frame too short: {} bytes",
                buf.len()
            )));
        }
        if buf[0] != STX {
            return Err(Error::Format("frame does not start with STX".into()));
        }
        let sequence = match buf[1] {
            digit @ b'0'..=b'7' => digit - b'0',
            other => {
                return Err(Error::Format(format!(
                    "invalid frame sequence byte 0x{other:02X}"
                )));
            }
        };

        // The payload may contain anything except the two frame-kind
        // bytes, so the first ETX/ETB ends it.
        let kind_pos = buf[2..]
            .iter()
            .position(|&b| b == ETX || b == ETB)
            .map(|p| p + 2)
            .ok_or_else(|| Error::Format("frame has no ETX or ETB".into()))?;
        let kind = if buf[kind_pos] == ETX {
            FrameKind::Terminal
        } else {
            FrameKind::Intermediate
        };

        let end = kind_pos + 5;
        if buf.len() < end {
            return Err(Error::Format("frame truncated after kind byte".into()));
        }
        if &buf[kind_pos + 3..end] != b"\r\n" {
            return Err(Error::Format("frame does not end with CRLF".into()));
        }

        let transmitted = [buf[kind_pos + 1], buf[kind_pos + 2]];
        let covered = &buf[1..=kind_pos];
        match checksum::verify(covered, &transmitted) {
            None => {
                return Err(Error::Format(format!(
                    "invalid checksum digits {:?}",
                    String::from_utf8_lossy(&transmitted)
                )));
            }
            Some(false) => {
                let computed = checksum::render(checksum::compute(covered));
                return Err(Error::ChecksumMismatch {
                    computed: String::from_utf8_lossy(&computed).into_owned(),
                    received: String::from_utf8_lossy(&transmitted).into_owned(),
                });
            }
            Some(true) => {}
        }

        Ok(Self {
            sequence,
            payload: buf.slice(2..kind_pos),
            kind,
            raw: buf.slice(..end),
            trailer: buf.slice(end..),
        })
    }

    /// Whether this is the last frame of the transfer
    pub fn is_terminal(&self) -> bool {
        self.kind == FrameKind::Terminal
    }

    /// Parse the frame payload into a typed record
    pub fn record(&self) -> Result<crate::Record> {
        crate::Record::parse(&self.payload)
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self
            .payload
            .iter()
            .take(6)
            .map(|&b| b as char)
            .collect();
        f.debug_struct("Frame")
            .field("kind", &self.kind)
            .field("sequence", &self.sequence)
            .field("payload", &format!("{preview}..."))
            .field("trailer_len", &self.trailer.len())
            .finish()
    }
}
