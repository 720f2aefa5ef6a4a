//! Length and mass units accepted by the planning form, and conversion to
//! canonical units (meters, kilograms).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Meters per centimeter.
const CM_TO_M: f64 = 0.01;
/// Meters per inch.
const INCH_TO_M: f64 = 0.0254;
/// Meters per foot.
const FOOT_TO_M: f64 = 0.3048;
/// Kilograms per pound.
const LB_TO_KG: f64 = 0.453592;

// ---------------------------------------------------------------------------
// Length
// ---------------------------------------------------------------------------

/// Unit a height value is entered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    #[default]
    Cm,
    Inches,
    Feet,
}

impl LengthUnit {
    /// Convert `value` in this unit to meters.
    pub fn to_meters(self, value: f64) -> f64 {
        let factor = match self {
            Self::Cm => CM_TO_M,
            Self::Inches => INCH_TO_M,
            Self::Feet => FOOT_TO_M,
        };
        value * factor
    }

    /// Convert `value` in this unit to centimeters.
    ///
    /// Uses exact per-unit factors rather than going through meters so that
    /// centimeter input is returned unchanged.
    pub fn to_centimeters(self, value: f64) -> f64 {
        match self {
            Self::Cm => value,
            Self::Inches => value * 2.54,
            Self::Feet => value * 30.48,
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Cm => "cm",
            Self::Inches => "inches",
            Self::Feet => "feet",
        };
        f.write_str(s)
    }
}

impl FromStr for LengthUnit {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cm" => Ok(Self::Cm),
            "inches" => Ok(Self::Inches),
            "feet" => Ok(Self::Feet),
            other => Err(UnitParseError::Length(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Mass
// ---------------------------------------------------------------------------

/// Unit a weight value is entered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MassUnit {
    #[default]
    Kg,
    Lbs,
}

impl MassUnit {
    /// Convert `value` in this unit to kilograms.
    pub fn to_kilograms(self, value: f64) -> f64 {
        match self {
            Self::Kg => value,
            Self::Lbs => value * LB_TO_KG,
        }
    }
}

impl fmt::Display for MassUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Kg => "kg",
            Self::Lbs => "lbs",
        };
        f.write_str(s)
    }
}

impl FromStr for MassUnit {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kg" => Ok(Self::Kg),
            "lbs" => Ok(Self::Lbs),
            other => Err(UnitParseError::Mass(other.to_owned())),
        }
    }
}

/// Error returned when a unit tag is not one of the recognized units.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitParseError {
    #[error("unrecognized length unit: {0:?} (expected cm, inches or feet)")]
    Length(String),

    #[error("unrecognized mass unit: {0:?} (expected kg or lbs)")]
    Mass(String),
}

// ---------------------------------------------------------------------------
// Raw-tag conversion
// ---------------------------------------------------------------------------

/// Convert a length given as a raw unit tag to meters.
///
/// Returns `None` when the tag is not a recognized unit. Callers must treat
/// `None` as "unconvertible", never as a zero length.
pub fn length_to_meters(value: f64, unit: &str) -> Option<f64> {
    unit.parse::<LengthUnit>().ok().map(|u| u.to_meters(value))
}

/// Convert a mass given as a raw unit tag to kilograms.
///
/// Returns `None` when the tag is not a recognized unit.
pub fn mass_to_kilograms(value: f64, unit: &str) -> Option<f64> {
    unit.parse::<MassUnit>().ok().map(|u| u.to_kilograms(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn length_factors() {
        assert!(approx(LengthUnit::Cm.to_meters(170.0), 1.7));
        assert!(approx(LengthUnit::Inches.to_meters(10.0), 0.254));
        assert!(approx(LengthUnit::Feet.to_meters(6.0), 1.8288));
    }

    #[test]
    fn centimeters_are_exact_for_cm_input() {
        assert_eq!(LengthUnit::Cm.to_centimeters(250.0), 250.0);
        assert!(approx(LengthUnit::Feet.to_centimeters(1.0), 30.48));
        assert!(approx(LengthUnit::Inches.to_centimeters(1.0), 2.54));
    }

    #[test]
    fn mass_factors() {
        assert_eq!(MassUnit::Kg.to_kilograms(70.0), 70.0);
        assert!(approx(MassUnit::Lbs.to_kilograms(100.0), 45.3592));
    }

    #[test]
    fn unit_strings_roundtrip_through_display() {
        for unit in [LengthUnit::Cm, LengthUnit::Inches, LengthUnit::Feet] {
            assert_eq!(unit.to_string().parse::<LengthUnit>().unwrap(), unit);
        }
        for unit in [MassUnit::Kg, MassUnit::Lbs] {
            assert_eq!(unit.to_string().parse::<MassUnit>().unwrap(), unit);
        }
    }

    #[test]
    fn unrecognized_tags_are_unconvertible() {
        assert_eq!(length_to_meters(170.0, "furlong"), None);
        assert_eq!(mass_to_kilograms(70.0, "stone"), None);
        assert!(approx(length_to_meters(170.0, "cm").unwrap(), 1.7));
        assert!(approx(mass_to_kilograms(70.0, "kg").unwrap(), 70.0));
    }

    #[test]
    fn serde_uses_wire_strings() {
        assert_eq!(serde_json::to_string(&LengthUnit::Inches).unwrap(), "\"inches\"");
        assert_eq!(serde_json::to_string(&MassUnit::Lbs).unwrap(), "\"lbs\"");
    }

    #[test]
    fn parse_error_names_the_tag() {
        let err = "yards".parse::<LengthUnit>().unwrap_err();
        assert!(err.to_string().contains("\"yards\""), "got: {err}");
    }
}
