//! Measurement units and conversions
//!
//! The meter stores glucose in whichever unit it is configured for,
//! carbs in one of three coded units and insulin always in tenths of a
//! unit. Output units are chosen by the user; conversion happens once,
//! on the way out.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// mg/dl per mmol/l, derived from the molar mass of glucose
pub const MG_DL_PER_MMOL_L: f64 = 18.015768;

/// Preferred glucose output unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlucoseUnit {
    #[default]
    MmolPerL,
    MgPerDl,
}

impl GlucoseUnit {
    /// Lower-case unit code used in the conversion table
    pub fn code(&self) -> &'static str {
        match self {
            Self::MmolPerL => "mmol/l",
            Self::MgPerDl => "mg/dl",
        }
    }
}

impl fmt::Display for GlucoseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for GlucoseUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mmol/l" => Ok(Self::MmolPerL),
            "mg/dl" => Ok(Self::MgPerDl),
            other => Err(Error::Format(format!("unknown glucose unit '{other}'"))),
        }
    }
}

/// Preferred carbohydrate output unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CarbUnit {
    #[default]
    Grams,
    Points,
    Choices,
}

impl CarbUnit {
    /// Lower-case unit code used in the conversion table
    pub fn code(&self) -> &'static str {
        match self {
            Self::Grams => "g",
            Self::Points => "points",
            Self::Choices => "choices",
        }
    }
}

impl fmt::Display for CarbUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CarbUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "g" => Ok(Self::Grams),
            "points" => Ok(Self::Points),
            "choices" => Ok(Self::Choices),
            other => Err(Error::Format(format!("unknown carb unit '{other}'"))),
        }
    }
}

/// User-selected unit preferences, passed immutably into normalization
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub glucose_unit: GlucoseUnit,
    pub carb_unit: CarbUnit,
    /// Grams per carbohydrate point
    pub grams_per_point: f64,
    /// Grams per carbohydrate choice
    pub grams_per_choice: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            glucose_unit: GlucoseUnit::default(),
            carb_unit: CarbUnit::default(),
            grams_per_point: 10.0,
            grams_per_choice: 15.0,
        }
    }
}

/// Map the meter's carb unit code digit to a unit name
pub fn carb_unit_code(code: &str) -> Result<&'static str> {
    match code {
        "0" => Ok("unknown"),
        "1" => Ok("g"),
        "2" => Ok("points"),
        "3" => Ok("choices"),
        other => Err(Error::Format(format!("unknown carb unit code '{other}'"))),
    }
}

/// Convert a value between units, rounding to one decimal place
///
/// Unit codes are compared case-insensitively. Converting between
/// identical units returns the value string untouched - not reformatted -
/// so meter-formatted values survive a matching preference unscathed.
///
/// # Errors
///
/// [`Error::UnknownConversion`] if no conversion path exists,
/// [`Error::BadValue`] if the value does not parse as a number.
pub fn convert(value: &str, from_unit: &str, to_unit: &str, prefs: &Preferences) -> Result<String> {
    let from = from_unit.to_ascii_lowercase();
    let to = to_unit.to_ascii_lowercase();

    if from == to {
        return Ok(value.to_owned());
    }

    let parsed: f64 = value
        .parse()
        .map_err(|_| Error::BadValue(value.to_owned()))?;

    let converted = match (from.as_str(), to.as_str()) {
        ("mmol/l", "mg/dl") => parsed * MG_DL_PER_MMOL_L,
        ("mg/dl", "mmol/l") => parsed / MG_DL_PER_MMOL_L,
        ("points", "g") => parsed * prefs.grams_per_point,
        ("g", "points") => parsed / prefs.grams_per_point,
        ("choices", "g") => parsed * prefs.grams_per_choice,
        ("g", "choices") => parsed / prefs.grams_per_choice,
        (".1u", "u") => parsed / 10.0,
        _ => return Err(Error::UnknownConversion { from, to }),
    };

    Ok(format!("{converted:.1}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn prefs() -> Preferences {
        Preferences::default()
    }

    #[test]
    fn test_same_unit_passthrough_untouched() {
        // Same units must not reformat the meter's value string
        assert_eq!(convert("6.20", "mmol/L", "mmol/l", &prefs()).unwrap(), "6.20");
        assert_eq!(convert("not-a-number", "g", "g", &prefs()).unwrap(), "not-a-number");
    }

    #[test]
    fn test_glucose_conversion() {
        assert_eq!(convert("1", "mmol/L", "mg/dl", &prefs()).unwrap(), "18.0");
        assert_eq!(convert("90", "mg/dL", "mmol/l", &prefs()).unwrap(), "5.0");
    }

    #[test]
    fn test_glucose_roundtrip_within_tolerance() {
        let there = convert("6.2", "mmol/l", "mg/dl", &prefs()).unwrap();
        let back = convert(&there, "mg/dl", "mmol/l", &prefs()).unwrap();
        let back: f64 = back.parse().unwrap();
        assert!((back - 6.2).abs() < 0.1);
    }

    #[test]
    fn test_carb_conversions() {
        assert_eq!(convert("3", "points", "g", &prefs()).unwrap(), "30.0");
        assert_eq!(convert("30", "g", "points", &prefs()).unwrap(), "3.0");
        assert_eq!(convert("2", "choices", "g", &prefs()).unwrap(), "30.0");
        assert_eq!(convert("45", "g", "choices", &prefs()).unwrap(), "3.0");
    }

    #[test]
    fn test_carb_roundtrip_within_tolerance() {
        for (from, to) in [("points", "g"), ("choices", "g")] {
            let there = convert("7", from, to, &prefs()).unwrap();
            let back = convert(&there, to, from, &prefs()).unwrap();
            let back: f64 = back.parse().unwrap();
            assert!((back - 7.0).abs() < 0.1, "{from}->{to}: {back}");
        }
    }

    #[test]
    fn test_carb_factors_configurable() {
        let prefs = Preferences {
            grams_per_point: 12.0,
            ..Preferences::default()
        };
        assert_eq!(convert("2", "points", "g", &prefs).unwrap(), "24.0");
    }

    #[test]
    fn test_insulin_tenths_to_units() {
        assert_eq!(convert("45", ".1u", "u", &prefs()).unwrap(), "4.5");
        assert_eq!(convert("45", ".1U", "u", &prefs()).unwrap(), "4.5");
    }

    #[test]
    fn test_unknown_conversion_pair() {
        assert!(matches!(
            convert("1", "mmol/l", "points", &prefs()),
            Err(Error::UnknownConversion { .. })
        ));
        assert!(matches!(
            convert("1", "unknown", "g", &prefs()),
            Err(Error::UnknownConversion { .. })
        ));
    }

    #[test]
    fn test_non_numeric_value() {
        assert!(matches!(
            convert("six", "mmol/l", "mg/dl", &prefs()),
            Err(Error::BadValue(_))
        ));
    }

    #[test]
    fn test_carb_unit_code() {
        assert_eq!(carb_unit_code("1").unwrap(), "g");
        assert_eq!(carb_unit_code("3").unwrap(), "choices");
        assert!(carb_unit_code("9").is_err());
    }

    #[test]
    fn test_unit_from_str() {
        assert_eq!("mg/dl".parse::<GlucoseUnit>().unwrap(), GlucoseUnit::MgPerDl);
        assert_eq!("MMOL/L".parse::<GlucoseUnit>().unwrap(), GlucoseUnit::MmolPerL);
        assert!("mol/l".parse::<GlucoseUnit>().is_err());
        assert_eq!("choices".parse::<CarbUnit>().unwrap(), CarbUnit::Choices);
    }
}
