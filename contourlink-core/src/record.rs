//! Typed records carried in frame payloads
//!
//! A record is a pipe-delimited line whose first field is a one-letter
//! type code. The meter sends four record types during a transfer:
//! header (`H`), patient (`P`), result (`R`) and terminator (`L`). Each
//! has a fixed field list; several fields have never been observed
//! carrying data and are kept under `unknown` names.

use std::fmt;

use crate::error::{Error, Result};

/// A typed view of a frame payload
///
/// # Examples
///
/// ```
/// use contourlink_core::Record;
///
/// match Record::parse(b"P|1\r").unwrap() {
///     Record::Patient(patient) => assert_eq!(patient.sequence, "1"),
///     other => panic!("unexpected record {other}"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Header(HeaderRecord),
    Patient(PatientRecord),
    Result(ResultRecord),
    Terminator(TerminatorRecord),
}

/// Header record (`H`) - opens the transfer and identifies the meter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRecord {
    /// Delimiter declaration, e.g. `\^&`
    pub delimiters: String,
    pub unknown1: String,
    pub unknown2: String,
    /// Caret-separated product, versions, serial and SKU
    pub sender_id: String,
    /// Caret-separated device configuration blob
    pub info: String,
    /// Number of stored results the meter is about to send
    pub nr_results: String,
    pub unknown3: String,
    pub unknown4: String,
    pub unknown5: String,
    pub unknown6: String,
    /// `P` for patient data
    pub processing_id: String,
    pub spec_version: String,
    pub timestamp: String,
}

/// Patient record (`P`) - sent once, carries no useful data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientRecord {
    pub sequence: String,
}

/// Result record (`R`) - one stored measurement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    /// Position of the result in the transfer, starting at 1
    pub sequence: String,
    /// Measurement type with a `^^^` prefix, e.g. `^^^Glucose`
    pub record_id: String,
    /// Measured value, formatted by the meter
    pub value: String,
    /// Caret-separated unit code and reference method
    pub units_ref: String,
    pub unknown1: String,
    /// Slash-separated marker codes
    pub markers: String,
    pub unknown2: String,
    /// 12-digit measurement timestamp, `YYYYMMDDHHMM`
    pub timestamp: String,
}

/// Terminator record (`L`) - closes the transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminatorRecord {
    pub sequence: String,
    pub read_key: String,
    /// `N` for normal completion
    pub termination_code: String,
}

impl TerminatorRecord {
    /// Termination code the meter sends on a clean transfer
    pub const NORMAL_COMPLETION: &'static str = "N";

    /// Whether the transfer completed normally
    pub fn is_normal(&self) -> bool {
        self.termination_code == Self::NORMAL_COMPLETION
    }
}

impl Record {
    /// Parse a frame payload into a typed record
    ///
    /// The payload the meter sends always ends with a CR that is not
    /// part of the record; it is stripped before splitting. Fields are
    /// split on `|` with no escaping, matching the transmitted format.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownRecordType`] if the leading type code is not one
    /// of `H`, `P`, `R`, `L`; [`Error::FieldCount`] if the field count
    /// does not match that record type's arity.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let payload = payload.strip_suffix(b"\r").unwrap_or(payload);
        let text = String::from_utf8_lossy(payload);

        let mut fields: Vec<String> = text
            .split(crate::FIELD_DELIMITER)
            .map(str::to_owned)
            .collect();
        let type_code = fields[0].chars().next().ok_or_else(|| {
            Error::Format("empty record payload".into())
        })?;

        match type_code {
            'H' => {
                let [_, delimiters, unknown1, unknown2, sender_id, info, nr_results, unknown3, unknown4, unknown5, unknown6, processing_id, spec_version, timestamp] =
                    take_fields("header", &mut fields)?;
                Ok(Self::Header(HeaderRecord {
                    delimiters,
                    unknown1,
                    unknown2,
                    sender_id,
                    info,
                    nr_results,
                    unknown3,
                    unknown4,
                    unknown5,
                    unknown6,
                    processing_id,
                    spec_version,
                    timestamp,
                }))
            }
            'P' => {
                let [_, sequence] = take_fields("patient", &mut fields)?;
                Ok(Self::Patient(PatientRecord { sequence }))
            }
            'R' => {
                let [_, sequence, record_id, value, units_ref, unknown1, markers, unknown2, timestamp] =
                    take_fields("result", &mut fields)?;
                Ok(Self::Result(ResultRecord {
                    sequence,
                    record_id,
                    value,
                    units_ref,
                    unknown1,
                    markers,
                    unknown2,
                    timestamp,
                }))
            }
            'L' => {
                let [_, sequence, read_key, termination_code] =
                    take_fields("terminator", &mut fields)?;
                Ok(Self::Terminator(TerminatorRecord {
                    sequence,
                    read_key,
                    termination_code,
                }))
            }
            other => Err(Error::UnknownRecordType(other)),
        }
    }

    /// One-letter type code of this record
    pub fn type_code(&self) -> char {
        match self {
            Self::Header(_) => 'H',
            Self::Patient(_) => 'P',
            Self::Result(_) => 'R',
            Self::Terminator(_) => 'L',
        }
    }
}

/// Move exactly `N` fields out of the split payload, or fail with the
/// record type's arity
fn take_fields<const N: usize>(
    record: &'static str,
    fields: &mut Vec<String>,
) -> Result<[String; N]> {
    let actual = fields.len();
    <[String; N]>::try_from(std::mem::take(fields)).map_err(|_| Error::FieldCount {
        record,
        expected: N,
        actual,
    })
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header(header) => write!(f, "{header}"),
            Self::Patient(patient) => write!(f, "{patient}"),
            Self::Result(result) => write!(f, "{result}"),
            Self::Terminator(terminator) => write!(f, "{terminator}"),
        }
    }
}

impl fmt::Display for HeaderRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "header from {}: {} results on meter",
            self.sender_id, self.nr_results
        )
    }
}

impl fmt::Display for PatientRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "patient record {}", self.sequence)
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "result {}: {} {} at {}",
            self.sequence, self.record_id, self.value, self.timestamp
        )
    }
}

impl fmt::Display for TerminatorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "terminator record (code {})",
            self.termination_code
        )
    }
}
