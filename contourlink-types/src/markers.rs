//! Glucose result markers
//!
//! Result records carry a slash-separated set of one-letter marker
//! codes, some with a trailing hex digit. Only glucose results use
//! them. The `M` and `T` markers also appear with hex digits attached;
//! their meaning is unknown and they are ignored.

use bitflags::bitflags;

use crate::error::{Error, Result};

/// Marker that flags a control-solution measurement
pub const CONTROL_SOLUTION: &str = "C";

bitflags! {
    /// Boolean markers a glucose result can carry
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct GlucoseMarkers: u16 {
        /// `<` - below the measurable range
        const BELOW_SCALE = 1;
        /// `>` - above the measurable range
        const ABOVE_SCALE = 1 << 1;
        /// `B` - taken before a meal
        const BEFORE_MEAL = 1 << 2;
        /// `A` - taken after a meal
        const AFTER_MEAL = 1 << 3;
        /// `D` - "don't feel right"
        const DONT_FEEL_RIGHT = 1 << 4;
        /// `F` - fasting
        const FASTING = 1 << 5;
        /// `I` - illness
        const SICK = 1 << 6;
        /// `S` - stress
        const STRESS = 1 << 7;
        /// `X` - exercise
        const ACTIVITY = 1 << 8;
    }
}

/// Marker-derived annotations on a glucose result
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlucoseAnnotations {
    pub markers: GlucoseMarkers,
    /// From the `Z` marker, whose hex digit counts quarter hours
    pub hours_after_meal: Option<f64>,
}

impl GlucoseAnnotations {
    /// Derive annotations from a split marker set
    ///
    /// # Errors
    ///
    /// [`Error::Format`] if more than one distinct `Z` marker is
    /// present, or a `Z` marker's suffix is not a single hex digit.
    pub fn from_markers<'a>(markers: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut annotations = Self::default();

        for marker in markers {
            match marker {
                "<" => annotations.markers |= GlucoseMarkers::BELOW_SCALE,
                ">" => annotations.markers |= GlucoseMarkers::ABOVE_SCALE,
                "B" => annotations.markers |= GlucoseMarkers::BEFORE_MEAL,
                "A" => annotations.markers |= GlucoseMarkers::AFTER_MEAL,
                "D" => annotations.markers |= GlucoseMarkers::DONT_FEEL_RIGHT,
                "F" => annotations.markers |= GlucoseMarkers::FASTING,
                "I" => annotations.markers |= GlucoseMarkers::SICK,
                "S" => annotations.markers |= GlucoseMarkers::STRESS,
                "X" => annotations.markers |= GlucoseMarkers::ACTIVITY,
                z if z.starts_with('Z') => {
                    if annotations.hours_after_meal.is_some() {
                        return Err(Error::Format(
                            "Multiple Z markers with different values".into(),
                        ));
                    }
                    let quarter_hours =
                        u32::from_str_radix(&z[1..], 16).map_err(|_| {
                            Error::Format(format!("malformed Z marker '{z}'"))
                        })?;
                    annotations.hours_after_meal = Some(quarter_hours as f64 / 4.0);
                }
                _ => {}
            }
        }

        Ok(annotations)
    }
}
