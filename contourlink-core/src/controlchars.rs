//! ASTM control characters used in the meter handshake

/// Start of frame
pub const STX: u8 = 0x02;

/// End of text - marks a terminal frame
pub const ETX: u8 = 0x03;

/// End of transmission
pub const EOT: u8 = 0x04;

/// Enquiry
pub const ENQ: u8 = 0x05;

/// Acknowledge
pub const ACK: u8 = 0x06;

/// End of transmission block - marks an intermediate frame
pub const ETB: u8 = 0x17;

/// Cancel
pub const CAN: u8 = 0x18;
