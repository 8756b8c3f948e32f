//! Meter identity, parsed from the header record

use std::fmt;

use crate::error::{Error, Result};

/// The only product id this implementation has been tested against
pub const SUPPORTED_PRODUCT: &str = "Bayer7410";

/// Meter identity and transfer size, from the header's sender-id field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeterInfo {
    /// Product id, e.g. `Bayer7410`
    pub product: String,

    /// Firmware/software version strings
    pub versions: [String; 3],

    /// Device serial number
    pub serial: String,

    /// Stock-keeping unit code
    pub sku: String,

    /// Number of stored results the meter reports
    pub nr_results: u32,
}

impl MeterInfo {
    /// Parse the caret-separated sender-id field plus the result count
    ///
    /// The sender-id looks like
    /// `Bayer7410^7.00\1.00\1.00^SERIAL123^8000`: product, three
    /// backslash-separated versions, serial, SKU.
    pub fn parse(sender_id: &str, nr_results: &str) -> Result<Self> {
        let [product, versions, serial, sku]: [&str; 4] = sender_id
            .split('^')
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|_| {
                Error::Format(format!("malformed sender-id field '{sender_id}'"))
            })?;

        let versions: [&str; 3] = versions
            .split('\\')
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|_| {
                Error::Format(format!("malformed versions field '{versions}'"))
            })?;

        let nr_results = nr_results.parse().map_err(|_| {
            Error::Format(format!("malformed result count '{nr_results}'"))
        })?;

        Ok(Self {
            product: product.to_owned(),
            versions: versions.map(str::to_owned),
            serial: serial.to_owned(),
            sku: sku.to_owned(),
            nr_results,
        })
    }

    /// Whether this is a product the implementation supports
    pub fn is_supported(&self) -> bool {
        self.product == SUPPORTED_PRODUCT
    }
}

impl fmt::Display for MeterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [SN: {}, SKU: {}, versions: {}, {}, {}], {} results",
            self.product,
            self.serial,
            self.sku,
            self.versions[0],
            self.versions[1],
            self.versions[2],
            self.nr_results
        )
    }
}
