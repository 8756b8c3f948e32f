//! Meter session driver
//!
//! Owns the full request/acknowledge handshake for one transfer:
//! wake the meter, validate its header, then read acknowledged frames
//! until the terminator record closes the session.

use std::collections::VecDeque;
use std::io::Write;

use bytes::{Bytes, BytesMut};
use tracing::{debug, info, trace};

use contourlink_core::{
    controlchars::{ACK, CAN, ENQ, EOT, STX},
    Frame, Record, ResultRecord, FRAME_TERMINATOR,
};
use contourlink_transport::Transport;
use contourlink_types::MeterInfo;

use crate::error::{Error, Result};

/// Session handshake state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing sent yet
    Idle,

    /// Wake byte acknowledged
    Awake,

    /// Header frame validated, transfer acknowledged
    HeaderReceived,

    /// Reading acknowledged data frames
    Streaming,

    /// Terminator confirmed, final EOT seen
    Terminated,
}

/// Meter communication mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    DataTransfer,
    Command,
}

/// Session driver for one meter transfer
///
/// The transport delivers fixed-size reports, so one frame may span
/// several reports and one report may carry the tail of one frame plus
/// the head of the next. The driver accumulates reports until a frame
/// terminator appears, and keeps leftover bytes in a read-ahead queue
/// that is drained before the transport is touched again - no byte is
/// ever dropped or duplicated across a report boundary.
///
/// # Examples
///
/// ```no_run
/// use contourlink::Meter;
/// use contourlink_transport::HidTransport;
///
/// fn main() -> contourlink::Result<()> {
///     let transport = HidTransport::open()?;
///     let mut meter = Meter::new(transport);
///
///     let info = meter.handshake()?;
///     eprintln!("{info}");
///
///     meter.stream_results(|result| {
///         println!("{result}");
///         Ok(())
///     })
/// }
/// ```
pub struct Meter<T: Transport> {
    transport: T,
    state: SessionState,
    mode: Mode,
    /// Unconsumed byte chunks, most recently unread first
    readahead: VecDeque<Bytes>,
    /// Sequence number of the last frame read; gaps are logged, never
    /// enforced
    last_sequence: Option<u8>,
    /// Optional sink receiving every raw frame, for bug reports
    frame_dump: Option<Box<dyn Write>>,
}

impl<T: Transport> Meter<T> {
    /// Byte that wakes the meter and starts a transfer
    const WAKE: &'static [u8] = b"X";

    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: SessionState::Idle,
            mode: Mode::DataTransfer,
            readahead: VecDeque::new(),
            last_sequence: None,
            frame_dump: None,
        }
    }

    /// Copy every complete raw frame to the given sink
    pub fn with_frame_dump(mut self, sink: Box<dyn Write>) -> Self {
        self.frame_dump = Some(sink);
        self
    }

    /// Current handshake state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Return the next chunk of protocol data, draining the read-ahead
    /// queue before fetching a new report
    fn read(&mut self) -> Result<Bytes> {
        if let Some(chunk) = self.readahead.pop_front() {
            trace!(chunk = ?chunk, "Replaying unread data");
            return Ok(chunk);
        }
        Ok(self.transport.read_report()?)
    }

    /// Push unconsumed bytes back; they are returned by the next `read`
    fn unread(&mut self, data: Bytes) {
        if !data.is_empty() {
            trace!(chunk = ?data, "Unreading data");
            self.readahead.push_front(data);
        }
    }

    /// Send an acknowledge control byte
    fn acknowledge(&mut self) -> Result<()> {
        self.transport.write_report(&[ACK])?;
        Ok(())
    }

    /// Read data and require it to begin with the given control byte;
    /// anything after it is unread
    fn expect(&mut self, control: u8) -> Result<()> {
        trace!(control = format!("0x{control:02X}"), "Expecting control byte");
        let data = self.read()?;
        if data.first() == Some(&control) {
            self.unread(data.slice(1..));
            Ok(())
        } else {
            Err(Error::UnexpectedControl {
                expected: control,
                received: data.to_vec(),
            })
        }
    }

    /// Read one complete frame, reassembling it across report
    /// boundaries and unreading whatever follows it
    fn read_frame(&mut self) -> Result<Frame> {
        let mut buf = BytesMut::from(&self.read()?[..]);
        while !buf.ends_with(FRAME_TERMINATOR) {
            buf.extend_from_slice(&self.read()?);
        }
        if buf.first() != Some(&STX) {
            return Err(Error::UnexpectedControl {
                expected: STX,
                received: buf.to_vec(),
            });
        }

        let frame = Frame::parse(buf.freeze())?;
        debug!(frame = ?frame, "Got complete frame");

        if let Some(last) = self.last_sequence {
            let expected = (last + 1) % 8;
            if frame.sequence != expected {
                debug!(expected, got = frame.sequence, "Frame sequence gap");
            }
        }
        self.last_sequence = Some(frame.sequence);

        if let Some(sink) = self.frame_dump.as_mut() {
            sink.write_all(&frame.raw)?;
        }

        self.unread(frame.trailer.clone());
        Ok(frame)
    }

    fn require_state(&self, expected: SessionState, operation: &'static str) -> Result<()> {
        if self.state != expected {
            return Err(Error::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Wake the meter so it starts a transfer
    ///
    /// A healthy meter answers the wake byte with EOT. A meter that
    /// answers ENQ is busy; retrying against it risks leaving it in an
    /// inconsistent mode, so that is reported as [`Error::DeviceBusy`]
    /// rather than retried.
    pub fn wake(&mut self) -> Result<()> {
        self.require_state(SessionState::Idle, "wake the meter")?;
        debug!("Waking meter");

        self.transport.write_report(Self::WAKE)?;
        let data = self.read()?;
        match data.first() {
            Some(&EOT) => {
                self.unread(data.slice(1..));
                self.state = SessionState::Awake;
                Ok(())
            }
            Some(&ENQ) => Err(Error::DeviceBusy),
            _ => Err(Error::UnexpectedControl {
                expected: EOT,
                received: data.to_vec(),
            }),
        }
    }

    /// Perform the header exchange and acknowledge the transfer
    ///
    /// Wakes the meter if it has not been woken yet, reads the header
    /// frame, and validates the meter's identity before any data frame
    /// is read. Returns the parsed meter identity.
    pub fn handshake(&mut self) -> Result<MeterInfo> {
        if self.state == SessionState::Idle {
            self.wake()?;
        }
        self.require_state(SessionState::Awake, "perform the header exchange")?;

        let frame = self.read_frame()?;
        let record = frame.record()?;
        let Record::Header(header) = record else {
            return Err(Error::UnexpectedRecord {
                expected: "header",
                found: record.type_code(),
            });
        };

        let meter_info = MeterInfo::parse(&header.sender_id, &header.nr_results)?;
        if !meter_info.is_supported() {
            return Err(Error::UnsupportedProduct(meter_info.product));
        }
        if header.processing_id != "P" {
            return Err(Error::InvalidProcessingId(header.processing_id));
        }

        self.expect(ENQ)?;
        self.acknowledge()?;
        self.state = SessionState::HeaderReceived;

        info!(meter = %meter_info, "Header exchange complete");
        Ok(meter_info)
    }

    /// Run the acknowledged transfer loop
    ///
    /// Every frame is acknowledged regardless of kind. Result records
    /// are passed to `on_result`; header, patient and non-terminal
    /// terminator records are discarded. The loop ends when a terminal
    /// frame carries a terminator record with the normal completion
    /// code and the meter sends its final EOT; anything else fails the
    /// session.
    pub fn stream_results(
        &mut self,
        mut on_result: impl FnMut(ResultRecord) -> Result<()>,
    ) -> Result<()> {
        self.require_state(SessionState::HeaderReceived, "stream results")?;
        self.state = SessionState::Streaming;

        loop {
            let frame = self.read_frame()?;
            let record = frame.record()?;
            let record_code = record.type_code();

            let terminator = match record {
                Record::Result(result) => {
                    on_result(result)?;
                    None
                }
                Record::Terminator(terminator) => Some(terminator),
                other => {
                    debug!(record = %other, "Discarding record");
                    None
                }
            };

            self.acknowledge()?;

            if frame.is_terminal() {
                let terminator = terminator.ok_or(Error::UnexpectedRecord {
                    expected: "terminator",
                    found: record_code,
                })?;
                if !terminator.is_normal() {
                    return Err(Error::AbnormalTermination(
                        terminator.termination_code,
                    ));
                }
                self.expect(EOT)?;
                self.state = SessionState::Terminated;
                info!("Transfer complete");
                return Ok(());
            }
        }
    }

    /// Switch the meter between data-transfer and command mode
    ///
    /// Best effort only: the command-mode handshake is unverified on
    /// real hardware and has never been observed to work reliably. The
    /// streaming path never calls this.
    pub fn enter_mode(&mut self, mode: Mode) -> Result<()> {
        if self.mode == mode {
            return Ok(());
        }
        debug!(from = ?self.mode, to = ?mode, "Switching meter mode");

        match mode {
            Mode::Command => {
                self.transport.write_report(&[ENQ])?;
                self.expect(ACK)?;
            }
            Mode::DataTransfer => {
                self.transport.write_report(&[CAN])?;
            }
        }
        self.mode = mode;
        Ok(())
    }

    /// Ask the meter to power off
    ///
    /// Best effort only, like [`Meter::enter_mode`].
    pub fn power_off(&mut self) -> Result<()> {
        self.enter_mode(Mode::Command)?;
        self.transport.write_report(b"E|")?;
        self.expect(ACK)?;
        Ok(())
    }
}
