//! Derived body metrics computed locally from raw form input.

use crate::units::{LengthUnit, MassUnit};

/// Parse user-entered text as a finite, strictly positive real.
pub fn parse_positive_real(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Round to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Body-mass index: `weight_kg / height_m^2`, rounded to two decimals.
///
/// Returns `None` unless both values are finite and positive, and also when
/// the result itself is not finite.
pub fn bmi(height: f64, height_unit: LengthUnit, weight: f64, weight_unit: MassUnit) -> Option<f64> {
    if !(height.is_finite() && weight.is_finite()) || height <= 0.0 || weight <= 0.0 {
        return None;
    }

    let meters = height_unit.to_meters(height);
    let kilograms = weight_unit.to_kilograms(weight);
    if meters <= 0.0 || kilograms <= 0.0 {
        return None;
    }

    let value = kilograms / (meters * meters);
    value.is_finite().then(|| round2(value))
}

/// BMI straight from the raw height/weight text of a form.
pub fn bmi_from_text(
    height: &str,
    height_unit: LengthUnit,
    weight: &str,
    weight_unit: MassUnit,
) -> Option<f64> {
    let height = parse_positive_real(height)?;
    let weight = parse_positive_real(weight)?;
    bmi(height, height_unit, weight, weight_unit)
}
