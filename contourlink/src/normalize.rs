//! Result record normalization
//!
//! Turns a raw result record into a unit-converted, flag-annotated
//! output record, or suppresses it entirely when it is a
//! control-solution measurement rather than patient data.

use std::collections::BTreeSet;

use contourlink_core::ResultRecord;
use contourlink_types::{
    markers::CONTROL_SOLUTION, timestamp, units, Error as TypesError, GlucoseAnnotations,
    InsulinKind, NormalizedRecord, Preferences, ResultKind,
};

use crate::error::Result;

/// Normalize one result record according to the unit preferences
///
/// Returns `Ok(None)` for control-solution results, which are QC
/// measurements and never appear in the output.
pub fn normalize(record: &ResultRecord, prefs: &Preferences) -> Result<Option<NormalizedRecord>> {
    let kind_name = parse_record_id(&record.record_id)?;
    let (unit_code, reference) = split_units_ref(&record.units_ref)?;

    let markers: BTreeSet<&str> = record.markers.split('/').collect();
    if markers.contains(CONTROL_SOLUTION) {
        return Ok(None);
    }

    // Glucose results are always referenced against plasma; nothing
    // else carries a reference method at all.
    let reference_ok = if kind_name == "Glucose" {
        reference == "P"
    } else {
        reference.is_empty()
    };
    if !reference_ok {
        return Err(TypesError::Format(format!(
            "Unexpected reference method '{reference}' for result type '{kind_name}'"
        ))
        .into());
    }

    let (kind, value) = match kind_name {
        "Glucose" => (
            ResultKind::Glucose,
            units::convert(&record.value, unit_code, prefs.glucose_unit.code(), prefs)?,
        ),
        "Carb" => (
            ResultKind::Carb,
            units::convert(
                &record.value,
                units::carb_unit_code(unit_code)?,
                prefs.carb_unit.code(),
                prefs,
            )?,
        ),
        "Insulin" => (
            // The unit code identifies the insulin, not its unit; the
            // reading itself is always in fixed 0.1U steps.
            ResultKind::Insulin(insulin_kind(unit_code)?),
            units::convert(&record.value, ".1u", "u", prefs)?,
        ),
        other => {
            return Err(
                TypesError::Format(format!("Unknown result type '{other}'")).into(),
            );
        }
    };

    let glucose = if kind == ResultKind::Glucose {
        Some(GlucoseAnnotations::from_markers(markers.iter().copied())?)
    } else {
        None
    };

    Ok(Some(NormalizedRecord {
        sequence: record.sequence.clone(),
        timestamp: timestamp::normalize(&record.timestamp)?,
        kind,
        value,
        glucose,
    }))
}

/// Strip the `^^^` prefix off a result record id
fn parse_record_id(record_id: &str) -> Result<&str> {
    if record_id.starts_with("^^^") {
        Ok(record_id.trim_start_matches('^'))
    } else {
        Err(TypesError::Format("Bad record ID field in result record".into()).into())
    }
}

/// Split the units/reference field into unit code and reference method
fn split_units_ref(units_ref: &str) -> Result<(&str, &str)> {
    match units_ref.split_once('^') {
        Some((unit_code, reference)) if !reference.contains('^') => {
            Ok((unit_code, reference))
        }
        _ => Err(TypesError::Format(format!(
            "malformed units/reference field '{units_ref}'"
        ))
        .into()),
    }
}

/// Map the insulin unit code digit onto the insulin kind
fn insulin_kind(unit_code: &str) -> Result<InsulinKind> {
    match unit_code {
        "0" => Ok(InsulinKind::Unknown),
        "1" => Ok(InsulinKind::FastActing),
        "2" => Ok(InsulinKind::LongActing),
        "3" => Ok(InsulinKind::Mixed),
        other => {
            Err(TypesError::Format(format!("unknown insulin unit code '{other}'")).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use contourlink_types::{CarbUnit, GlucoseMarkers, GlucoseUnit};
    use pretty_assertions::assert_eq;

    fn result_record(
        record_id: &str,
        value: &str,
        units_ref: &str,
        markers: &str,
    ) -> ResultRecord {
        ResultRecord {
            sequence: "7".into(),
            record_id: record_id.into(),
            value: value.into(),
            units_ref: units_ref.into(),
            unknown1: String::new(),
            markers: markers.into(),
            unknown2: String::new(),
            timestamp: "201601021530".into(),
        }
    }

    fn prefs() -> Preferences {
        Preferences::default()
    }

    #[test]
    fn test_glucose_same_unit_untouched() {
        let record = result_record("^^^Glucose", "6.2", "mmol/L^P", "B");
        let normalized = normalize(&record, &prefs()).unwrap().unwrap();

        assert_eq!(normalized.kind, ResultKind::Glucose);
        assert_eq!(normalized.value, "6.2");
        assert_eq!(normalized.sequence, "7");
        assert_eq!(normalized.timestamp, "2016-01-02 15:30");

        let glucose = normalized.glucose.unwrap();
        assert!(glucose.markers.contains(GlucoseMarkers::BEFORE_MEAL));
        assert_eq!(glucose.hours_after_meal, None);
    }

    #[test]
    fn test_glucose_unit_conversion() {
        let record = result_record("^^^Glucose", "90", "mg/dL^P", "");
        let preferences = Preferences {
            glucose_unit: GlucoseUnit::MmolPerL,
            ..prefs()
        };
        let normalized = normalize(&record, &preferences).unwrap().unwrap();
        assert_eq!(normalized.value, "5.0");
    }

    #[test]
    fn test_control_solution_suppressed() {
        let record = result_record("^^^Glucose", "6.2", "mmol/L^P", "C/B");
        assert!(normalize(&record, &prefs()).unwrap().is_none());
    }

    #[test]
    fn test_glucose_requires_reference_method() {
        let record = result_record("^^^Glucose", "6.2", "mmol/L^", "");
        assert!(matches!(
            normalize(&record, &prefs()),
            Err(Error::Types(TypesError::Format(_)))
        ));
    }

    #[test]
    fn test_carb_rejects_reference_method() {
        let record = result_record("^^^Carb", "30", "1^P", "");
        assert!(matches!(
            normalize(&record, &prefs()),
            Err(Error::Types(TypesError::Format(_)))
        ));
    }

    #[test]
    fn test_carb_conversion() {
        // Unit code 1 is grams; points preference converts with the
        // default 10 g/point factor
        let record = result_record("^^^Carb", "30", "1^", "");
        let preferences = Preferences {
            carb_unit: CarbUnit::Points,
            ..prefs()
        };
        let normalized = normalize(&record, &preferences).unwrap().unwrap();
        assert_eq!(normalized.kind, ResultKind::Carb);
        assert_eq!(normalized.value, "3.0");
        assert_eq!(normalized.glucose, None);
    }

    #[test]
    fn test_insulin_kinds_and_tenths() {
        let record = result_record("^^^Insulin", "45", "1^", "");
        let normalized = normalize(&record, &prefs()).unwrap().unwrap();
        assert_eq!(normalized.kind, ResultKind::Insulin(InsulinKind::FastActing));
        assert_eq!(normalized.kind.to_string(), "FastActingInsulin");
        assert_eq!(normalized.value, "4.5");

        let record = result_record("^^^Insulin", "45", "2^", "");
        let normalized = normalize(&record, &prefs()).unwrap().unwrap();
        assert_eq!(normalized.kind, ResultKind::Insulin(InsulinKind::LongActing));
    }

    #[test]
    fn test_hours_after_meal_marker() {
        let record = result_record("^^^Glucose", "6.2", "mmol/L^P", "A/Z6");
        let normalized = normalize(&record, &prefs()).unwrap().unwrap();
        let glucose = normalized.glucose.unwrap();
        assert!(glucose.markers.contains(GlucoseMarkers::AFTER_MEAL));
        assert_eq!(glucose.hours_after_meal, Some(1.5));
    }

    #[test]
    fn test_conflicting_z_markers() {
        let record = result_record("^^^Glucose", "6.2", "mmol/L^P", "Z4/Z8");
        assert!(normalize(&record, &prefs()).is_err());
    }

    #[test]
    fn test_bad_record_id() {
        let record = result_record("Glucose", "6.2", "mmol/L^P", "");
        assert!(normalize(&record, &prefs()).is_err());

        let record = result_record("^^Glucose", "6.2", "mmol/L^P", "");
        assert!(normalize(&record, &prefs()).is_err());
    }

    #[test]
    fn test_unknown_result_type() {
        let record = result_record("^^^Ketones", "1.1", "mmol/L^", "");
        assert!(matches!(
            normalize(&record, &prefs()),
            Err(Error::Types(TypesError::Format(_)))
        ));
    }

    #[test]
    fn test_malformed_units_ref() {
        let record = result_record("^^^Glucose", "6.2", "mmol/L", "");
        assert!(normalize(&record, &prefs()).is_err());
    }

    #[test]
    fn test_bad_timestamp() {
        let mut record = result_record("^^^Glucose", "6.2", "mmol/L^P", "");
        record.timestamp = "2016010215".into();
        assert!(normalize(&record, &prefs()).is_err());
    }

    #[test]
    fn test_unknown_unit_pair() {
        let record = result_record("^^^Glucose", "6.2", "furlongs^P", "");
        assert!(matches!(
            normalize(&record, &prefs()),
            Err(Error::Types(TypesError::UnknownConversion { .. }))
        ));
    }
}
