//! Input validation for the planning form.
//!
//! Rules run in a fixed order and stop at the first failure, so the message
//! a user sees is deterministic for any combination of bad fields.

use crate::form::{FormRecord, Gender};
use crate::metrics::parse_positive_real;
use crate::units::{LengthUnit, MassUnit};

/// Youngest accepted age, in years.
pub const MIN_AGE: u32 = 3;
/// Oldest accepted age, in years.
pub const MAX_AGE: u32 = 130;
/// Shortest accepted height after conversion, in centimeters.
pub const MIN_HEIGHT_CM: f64 = 30.0;
/// Tallest accepted height after conversion, in centimeters.
pub const MAX_HEIGHT_CM: f64 = 250.0;
/// Lightest accepted weight after conversion, in kilograms.
pub const MIN_WEIGHT_KG: f64 = 10.0;
/// Heaviest accepted weight after conversion, in kilograms.
pub const MAX_WEIGHT_KG: f64 = 500.0;

/// The first rule a form violates. `Display` is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Full Name is required.")]
    NameRequired,

    #[error("Mobile Number is required.")]
    MobileRequired,

    #[error("Mobile Number should only contain digits.")]
    MobileNotDigits,

    #[error("Email is required.")]
    EmailRequired,

    #[error("Age must be a valid positive number.")]
    AgeInvalid,

    #[error("How are you even typing?!?💀")]
    AgeTooLow,

    #[error("Bro, you're not that old!")]
    AgeTooHigh,

    #[error("Gender is required.")]
    GenderRequired,

    #[error("Height must be a valid positive number.")]
    HeightInvalid,

    #[error("An elf?!")]
    HeightTooShort,

    #[error("Burj Khalifa?")]
    HeightTooTall,

    #[error("Weight must be a valid positive number.")]
    WeightInvalid,

    #[error("Are you sure you're not a feather?")]
    WeightTooLight,

    #[error("How fat are you?!?")]
    WeightTooHeavy,

    #[error("Daily Calorie Intake must be a valid positive number.")]
    CaloriesInvalid,
}

/// A form that passed every rule, with numeric fields parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInput {
    pub name: String,
    pub mobile: String,
    pub email: String,
    pub age: u32,
    pub gender: Gender,
    pub height_value: f64,
    pub height_unit: LengthUnit,
    pub weight_value: f64,
    pub weight_unit: MassUnit,
    pub calories_intake: u32,
}

fn parse_positive_int(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok().filter(|v| *v > 0)
}

/// Check a form against every rule, in order.
pub fn validate(form: &FormRecord) -> Result<ValidatedInput, ValidationError> {
    let name = form.name().trim();
    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }

    let mobile = form.mobile().trim();
    if mobile.is_empty() {
        return Err(ValidationError::MobileRequired);
    }
    if !mobile.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::MobileNotDigits);
    }

    let email = form.email().trim();
    if email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }

    let age = parse_positive_int(form.age()).ok_or(ValidationError::AgeInvalid)?;
    if age < MIN_AGE {
        return Err(ValidationError::AgeTooLow);
    }
    if age > MAX_AGE {
        return Err(ValidationError::AgeTooHigh);
    }

    let gender = form.gender().ok_or(ValidationError::GenderRequired)?;

    let height_value =
        parse_positive_real(form.height_value()).ok_or(ValidationError::HeightInvalid)?;
    let height_cm = form.height_unit().to_centimeters(height_value);
    if height_cm < MIN_HEIGHT_CM {
        return Err(ValidationError::HeightTooShort);
    }
    if height_cm > MAX_HEIGHT_CM {
        return Err(ValidationError::HeightTooTall);
    }

    let weight_value =
        parse_positive_real(form.weight_value()).ok_or(ValidationError::WeightInvalid)?;
    let weight_kg = form.weight_unit().to_kilograms(weight_value);
    if weight_kg < MIN_WEIGHT_KG {
        return Err(ValidationError::WeightTooLight);
    }
    if weight_kg > MAX_WEIGHT_KG {
        return Err(ValidationError::WeightTooHeavy);
    }

    let calories_intake =
        parse_positive_int(form.calories_intake()).ok_or(ValidationError::CaloriesInvalid)?;

    Ok(ValidatedInput {
        name: form.name().to_owned(),
        mobile: mobile.to_owned(),
        email: email.to_owned(),
        age,
        gender,
        height_value,
        height_unit: form.height_unit(),
        weight_value,
        weight_unit: form.weight_unit(),
        calories_intake,
    })
}
