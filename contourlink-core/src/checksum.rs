//! ASTM frame checksum
//!
//! The checksum covers every byte from the sequence-number digit through
//! the frame-kind byte inclusive:
//! 1. Sum the raw byte values
//! 2. Truncate to 8 bits (modulo 256)
//! 3. Transmit as two uppercase hex digits

use tracing::trace;

/// Calculate the 8-bit checksum over the covered byte range
pub fn compute(data: &[u8]) -> u8 {
    let sum = data
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b));

    trace!(
        covered_len = data.len(),
        checksum = format!("{:02X}", sum),
        "Calculated checksum"
    );

    sum
}

/// Render a checksum as the two uppercase hex digits sent on the wire
pub fn render(checksum: u8) -> [u8; 2] {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    [HEX[(checksum >> 4) as usize], HEX[(checksum & 0x0F) as usize]]
}

/// Verify a checksum against its transmitted hex digits
///
/// Hex digits are accepted in either case, matching what the meter may
/// send. Returns `None` if the digits are not valid hex.
pub fn verify(data: &[u8], transmitted: &[u8; 2]) -> Option<bool> {
    let hi = (transmitted[0] as char).to_digit(16)?;
    let lo = (transmitted[1] as char).to_digit(16)?;
    let received = ((hi << 4) | lo) as u8;
    Some(compute(data) == received)
}
