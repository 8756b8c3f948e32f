//! HID transport

use std::time::Duration;

use bytes::Bytes;
use hidapi::{HidApi, HidDevice};
use tracing::{debug, trace};

use crate::{error::*, Transport, MAX_REPORT_DATA, REPORT_MARKER, REPORT_SIZE};

/// USB vendor id (Bayer)
pub const VENDOR_ID: u16 = 0x1A79;

/// USB product id (Contour Next USB)
pub const PRODUCT_ID: u16 = 0x7410;

/// HID transport for Contour Next USB meters
///
/// Opens the meter's HID interface and exchanges interrupt reports with
/// it. The meter also exposes a mass-storage interface carrying its
/// bundled software; hidapi only ever binds the HID one.
pub struct HidTransport {
    device: HidDevice,
    read_timeout: Duration,
}

impl HidTransport {
    /// Open the first attached meter
    ///
    /// # Errors
    ///
    /// [`Error::DeviceNotFound`] if no meter is attached,
    /// [`Error::Hid`] if the interface cannot be claimed.
    pub fn open() -> Result<Self> {
        let api = HidApi::new()?;

        let attached = api
            .device_list()
            .any(|info| info.vendor_id() == VENDOR_ID && info.product_id() == PRODUCT_ID);
        if !attached {
            return Err(Error::DeviceNotFound {
                vendor: VENDOR_ID,
                product: PRODUCT_ID,
            });
        }

        let device = api.open(VENDOR_ID, PRODUCT_ID)?;
        debug!(
            vendor = format!("0x{VENDOR_ID:04x}"),
            product = format!("0x{PRODUCT_ID:04x}"),
            "Opened meter HID interface"
        );

        Ok(Self {
            device,
            read_timeout: Duration::from_secs(5),
        })
    }

    /// Set the per-report read timeout (default 5s)
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

impl Transport for HidTransport {
    fn read_report(&mut self) -> Result<Bytes> {
        let mut buf = [0u8; REPORT_SIZE];
        let n = self
            .device
            .read_timeout(&mut buf, self.read_timeout.as_millis() as i32)?;
        if n == 0 {
            return Err(Error::ReadTimeout);
        }

        trace!(raw = hex::encode(&buf[..n]), "HID read");
        let data = unpack_report(&buf[..n])?;
        trace!(data = hex::encode(&data), "Read");
        Ok(data)
    }

    fn write_report(&mut self, data: &[u8]) -> Result<()> {
        let report = pack_report(data)?;
        trace!(raw = hex::encode(&report[1..]), "HID write");

        self.device.write(&report)?;
        Ok(())
    }
}

/// Strip the marker and length byte from a received report
fn unpack_report(report: &[u8]) -> Result<Bytes> {
    // Reports always start with ABC. The meaning of the marker is not
    // documented anywhere; rejecting anything else at least catches
    // talking to the wrong interface.
    let header_len = REPORT_MARKER.len() + 1;
    if report.len() < header_len || !report.starts_with(REPORT_MARKER) {
        return Err(Error::BadReportMarker(
            report[..report.len().min(4)].to_vec(),
        ));
    }

    let length = report[REPORT_MARKER.len()] as usize;
    let available = report.len() - header_len;
    if length > available {
        return Err(Error::BadReportLength { length, available });
    }

    Ok(Bytes::copy_from_slice(
        &report[header_len..header_len + length],
    ))
}

/// Wrap data bytes in a report: report id, marker, length, data
///
/// The meter uses unnumbered reports, so the leading report id byte is
/// zero and is consumed by hidapi rather than sent on the wire.
fn pack_report(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() > MAX_REPORT_DATA {
        return Err(Error::ReportTooLarge {
            size: data.len(),
            max: MAX_REPORT_DATA,
        });
    }

    let mut report = Vec::with_capacity(1 + REPORT_MARKER.len() + 1 + data.len());
    report.push(0x00);
    report.extend_from_slice(REPORT_MARKER);
    report.push(data.len() as u8);
    report.extend_from_slice(data);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unpack_report() {
        let data = unpack_report(b"ABC\x05hello").unwrap();
        assert_eq!(data.as_ref(), b"hello");
    }

    #[test]
    fn test_unpack_report_ignores_padding() {
        // Reports are fixed-size; bytes past the declared length are
        // padding and must not leak through.
        let data = unpack_report(b"ABC\x02hi\x00\x00\x00garbage").unwrap();
        assert_eq!(data.as_ref(), b"hi");
    }

    #[test]
    fn test_unpack_report_bad_marker() {
        assert!(matches!(
            unpack_report(b"XYZ\x02hi"),
            Err(Error::BadReportMarker(_))
        ));
    }

    #[test]
    fn test_unpack_report_too_short() {
        assert!(matches!(
            unpack_report(b"AB"),
            Err(Error::BadReportMarker(_))
        ));
    }

    #[test]
    fn test_unpack_report_length_overruns_data() {
        assert!(matches!(
            unpack_report(b"ABC\x10hi"),
            Err(Error::BadReportLength { length: 16, available: 2 })
        ));
    }

    #[test]
    fn test_pack_report() {
        let report = pack_report(b"X").unwrap();
        assert_eq!(report, b"\x00ABC\x01X");
    }

    #[test]
    fn test_pack_report_max_size() {
        let data = vec![0xAA; MAX_REPORT_DATA];
        let report = pack_report(&data).unwrap();
        assert_eq!(report.len(), 1 + REPORT_MARKER.len() + 1 + MAX_REPORT_DATA);
    }

    #[test]
    fn test_pack_report_too_large() {
        let data = vec![0xAA; MAX_REPORT_DATA + 1];
        assert!(matches!(
            pack_report(&data),
            Err(Error::ReportTooLarge { size: 61, max: 60 })
        ));
    }

    #[test]
    fn test_pack_unpack_roundtrip() {
        let report = pack_report(b"\x021P|1\r\x1752\r\n").unwrap();
        // Skip the report id byte hidapi consumes
        let data = unpack_report(&report[1..]).unwrap();
        assert_eq!(data.as_ref(), b"\x021P|1\r\x1752\r\n");
    }
}
