//! Transport errors

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No HID device with vendor=0x{vendor:04x} and product=0x{product:04x}")]
    DeviceNotFound { vendor: u16, product: u16 },

    #[error("Report data too large to fit in one report: {size} bytes (max: {max} bytes)")]
    ReportTooLarge { size: usize, max: usize },

    #[error("Report does not start with the expected marker: {0:02X?}")]
    BadReportMarker(Vec<u8>),

    #[error("Report length byte {length} exceeds the {available} bytes received")]
    BadReportLength { length: usize, available: usize },

    #[error("Read timed out waiting for the device")]
    ReadTimeout,

    #[error("HID error: {0}")]
    Hid(#[from] hidapi::HidError),
}
