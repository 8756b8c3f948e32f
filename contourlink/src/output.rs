//! CSV serialization of normalized records
//!
//! Thin collaborator around the `csv` crate with a fixed column order.
//! Glucose rows carry `true`/`false` marker columns and the optional
//! hours-after-meal value; other kinds leave those cells empty.

use std::io::Write;

use contourlink_types::{GlucoseMarkers, NormalizedRecord};

use crate::error::Result;

/// Output columns, in order
pub const COLUMNS: [&str; 14] = [
    "Sequence",
    "Timestamp",
    "Type",
    "Value",
    "BelowScale",
    "AboveScale",
    "BeforeMeal",
    "AfterMeal",
    "DontFeelRight",
    "Fasting",
    "Sick",
    "Stress",
    "Activity",
    "HoursAfterMeal",
];

/// CSV writer for normalized records
pub struct CsvOutput<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvOutput<W> {
    /// Wrap a sink and write the header row
    pub fn new(sink: W) -> Result<Self> {
        let mut writer = csv::Writer::from_writer(sink);
        writer.write_record(COLUMNS)?;
        Ok(Self { writer })
    }

    /// Write one record as a row
    pub fn write_record(&mut self, record: &NormalizedRecord) -> Result<()> {
        let mut row = vec![
            record.sequence.clone(),
            record.timestamp.clone(),
            record.kind.to_string(),
            record.value.clone(),
        ];

        match &record.glucose {
            Some(glucose) => {
                let flags = [
                    GlucoseMarkers::BELOW_SCALE,
                    GlucoseMarkers::ABOVE_SCALE,
                    GlucoseMarkers::BEFORE_MEAL,
                    GlucoseMarkers::AFTER_MEAL,
                    GlucoseMarkers::DONT_FEEL_RIGHT,
                    GlucoseMarkers::FASTING,
                    GlucoseMarkers::SICK,
                    GlucoseMarkers::STRESS,
                    GlucoseMarkers::ACTIVITY,
                ];
                for flag in flags {
                    row.push(glucose.markers.contains(flag).to_string());
                }
                row.push(
                    glucose
                        .hours_after_meal
                        .map(|hours| format!("{hours:?}"))
                        .unwrap_or_default(),
                );
            }
            None => row.extend(std::iter::repeat_n(String::new(), 10)),
        }

        self.writer.write_record(&row)?;
        Ok(())
    }

    /// Flush buffered rows to the sink
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contourlink_types::{GlucoseAnnotations, InsulinKind, ResultKind};
    use pretty_assertions::assert_eq;

    fn render(records: &[NormalizedRecord]) -> String {
        let mut output = CsvOutput::new(Vec::new()).unwrap();
        for record in records {
            output.write_record(record).unwrap();
        }
        output.flush().unwrap();
        String::from_utf8(output.writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_header_row() {
        let rendered = render(&[]);
        assert_eq!(
            rendered,
            "Sequence,Timestamp,Type,Value,BelowScale,AboveScale,BeforeMeal,AfterMeal,\
             DontFeelRight,Fasting,Sick,Stress,Activity,HoursAfterMeal\n"
        );
    }

    #[test]
    fn test_glucose_row() {
        let record = NormalizedRecord {
            sequence: "1".into(),
            timestamp: "2016-01-02 15:30".into(),
            kind: ResultKind::Glucose,
            value: "6.2".into(),
            glucose: Some(GlucoseAnnotations {
                markers: GlucoseMarkers::BEFORE_MEAL | GlucoseMarkers::FASTING,
                hours_after_meal: Some(1.5),
            }),
        };

        let rendered = render(&[record]);
        let row = rendered.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "1,2016-01-02 15:30,Glucose,6.2,false,false,true,false,false,true,false,false,false,1.5"
        );
    }

    #[test]
    fn test_non_glucose_row_leaves_flags_empty() {
        let record = NormalizedRecord {
            sequence: "2".into(),
            timestamp: "2016-01-02 15:30".into(),
            kind: ResultKind::Insulin(InsulinKind::Mixed),
            value: "4.5".into(),
            glucose: None,
        };

        let rendered = render(&[record]);
        let row = rendered.lines().nth(1).unwrap();
        assert_eq!(row, "2,2016-01-02 15:30,MixedInsulin,4.5,,,,,,,,,,");
    }

    #[test]
    fn test_whole_hours_keep_decimal_point() {
        let record = NormalizedRecord {
            sequence: "3".into(),
            timestamp: "2016-01-02 15:30".into(),
            kind: ResultKind::Glucose,
            value: "6.2".into(),
            glucose: Some(GlucoseAnnotations {
                markers: GlucoseMarkers::empty(),
                hours_after_meal: Some(2.0),
            }),
        };

        let rendered = render(&[record]);
        assert!(rendered.lines().nth(1).unwrap().ends_with(",2.0"));
    }
}
