//! The planning form: raw user input held for one workflow instance.
//!
//! All mutation goes through [`FormRecord::set`] (or the typed unit/gender
//! setters), which applies the BMI recompute rule: a change to height value,
//! height unit, weight value or weight unit re-derives the index; nothing
//! else does.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::metrics;
use crate::units::{LengthUnit, MassUnit, UnitParseError};

/// Gender options offered by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Male => "male",
            Self::Female => "female",
        };
        f.write_str(s)
    }
}

impl FromStr for Gender {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            other => Err(FormError::Gender(other.to_owned())),
        }
    }
}

/// Identifies one editable field of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Mobile,
    Email,
    Age,
    Gender,
    HeightValue,
    HeightUnit,
    WeightValue,
    WeightUnit,
    CaloriesIntake,
}

impl FormField {
    /// Whether a change to this field must re-derive the BMI.
    pub fn affects_bmi(self) -> bool {
        matches!(
            self,
            Self::HeightValue | Self::HeightUnit | Self::WeightValue | Self::WeightUnit
        )
    }
}

/// Error returned when a field value cannot be stored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error(transparent)]
    Unit(#[from] UnitParseError),

    #[error("invalid gender: {0:?} (expected male or female)")]
    Gender(String),
}

/// Raw form state for one planning session.
///
/// Numeric fields are kept as entered; parsing happens in the validator and
/// in the BMI rule. `bmi` is derived and has no setter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormRecord {
    name: String,
    mobile: String,
    email: String,
    age: String,
    gender: Option<Gender>,
    height_value: String,
    height_unit: LengthUnit,
    weight_value: String,
    weight_unit: MassUnit,
    calories_intake: String,
    bmi: Option<f64>,
}

impl FormRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a field from its text representation.
    ///
    /// Unit and gender fields must hold a recognized tag; an empty gender
    /// clears the selection. Unit-only changes re-derive the BMI just like
    /// numeric edits.
    pub fn set(&mut self, field: FormField, value: &str) -> Result<(), FormError> {
        match field {
            FormField::Name => self.name = value.to_owned(),
            FormField::Mobile => self.mobile = value.to_owned(),
            FormField::Email => self.email = value.to_owned(),
            FormField::Age => self.age = value.to_owned(),
            FormField::Gender => {
                self.gender = if value.is_empty() {
                    None
                } else {
                    Some(value.parse()?)
                };
            }
            FormField::HeightValue => self.height_value = value.to_owned(),
            FormField::HeightUnit => self.height_unit = value.parse()?,
            FormField::WeightValue => self.weight_value = value.to_owned(),
            FormField::WeightUnit => self.weight_unit = value.parse()?,
            FormField::CaloriesIntake => self.calories_intake = value.to_owned(),
        }

        if field.affects_bmi() {
            self.recompute_bmi();
        }
        Ok(())
    }

    /// Builder-style [`Self::set`].
    pub fn with(mut self, field: FormField, value: &str) -> Result<Self, FormError> {
        self.set(field, value)?;
        Ok(self)
    }

    pub fn set_gender(&mut self, gender: Option<Gender>) {
        self.gender = gender;
    }

    pub fn set_height_unit(&mut self, unit: LengthUnit) {
        self.height_unit = unit;
        self.recompute_bmi();
    }

    pub fn set_weight_unit(&mut self, unit: MassUnit) {
        self.weight_unit = unit;
        self.recompute_bmi();
    }

    fn recompute_bmi(&mut self) {
        self.bmi = metrics::bmi_from_text(
            &self.height_value,
            self.height_unit,
            &self.weight_value,
            self.weight_unit,
        );
    }

    /// The derived BMI, or `None` while height/weight are missing or invalid.
    pub fn bmi(&self) -> Option<f64> {
        self.bmi
    }

    /// BMI formatted for display, with a placeholder when there is no value.
    pub fn bmi_display(&self) -> String {
        match self.bmi {
            Some(v) => format!("{v:.2}"),
            None => "Auto-calculated".to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mobile(&self) -> &str {
        &self.mobile
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn age(&self) -> &str {
        &self.age
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    pub fn height_value(&self) -> &str {
        &self.height_value
    }

    pub fn height_unit(&self) -> LengthUnit {
        self.height_unit
    }

    pub fn weight_value(&self) -> &str {
        &self.weight_value
    }

    pub fn weight_unit(&self) -> MassUnit {
        self.weight_unit
    }

    pub fn calories_intake(&self) -> &str {
        &self.calories_intake
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_body(height: &str, weight: &str) -> FormRecord {
        let mut form = FormRecord::new();
        form.set(FormField::HeightValue, height).unwrap();
        form.set(FormField::WeightValue, weight).unwrap();
        form
    }

    #[test]
    fn defaults_are_metric_and_empty() {
        let form = FormRecord::new();
        assert_eq!(form.height_unit(), LengthUnit::Cm);
        assert_eq!(form.weight_unit(), MassUnit::Kg);
        assert!(form.gender().is_none());
        assert!(form.bmi().is_none());
        assert_eq!(form.bmi_display(), "Auto-calculated");
    }

    #[test]
    fn bmi_follows_numeric_edits() {
        let mut form = with_body("170", "70");
        assert_eq!(form.bmi(), Some(24.22));
        assert_eq!(form.bmi_display(), "24.22");

        form.set(FormField::WeightValue, "80").unwrap();
        assert_eq!(form.bmi(), Some(27.68));
    }

    #[test]
    fn unit_only_change_rederives_bmi() {
        let mut form = with_body("170", "70");
        let before = form.bmi();

        form.set(FormField::HeightUnit, "feet").unwrap();
        assert_ne!(form.bmi(), before);
        assert_eq!(form.bmi(), Some(0.03));

        form.set_height_unit(LengthUnit::Cm);
        assert_eq!(form.bmi(), before);

        form.set_weight_unit(MassUnit::Lbs);
        assert_eq!(form.bmi(), Some(10.99));
    }

    #[test]
    fn invalid_input_clears_bmi_instead_of_keeping_stale_value() {
        let mut form = with_body("170", "70");
        assert!(form.bmi().is_some());

        form.set(FormField::HeightValue, "").unwrap();
        assert_eq!(form.bmi(), None);

        form.set(FormField::HeightValue, "170").unwrap();
        form.set(FormField::WeightValue, "-5").unwrap();
        assert_eq!(form.bmi(), None);
    }

    #[test]
    fn unrelated_fields_leave_bmi_alone() {
        let mut form = with_body("170", "70");
        form.set(FormField::Name, "Ada Lovelace").unwrap();
        form.set(FormField::Age, "36").unwrap();
        assert_eq!(form.bmi(), Some(24.22));
    }

    #[test]
    fn unknown_unit_is_rejected_and_state_kept() {
        let mut form = with_body("170", "70");
        let err = form.set(FormField::HeightUnit, "yards").unwrap_err();
        assert!(matches!(err, FormError::Unit(_)));
        assert_eq!(form.height_unit(), LengthUnit::Cm);
        assert_eq!(form.bmi(), Some(24.22));
    }

    #[test]
    fn gender_selection() {
        let mut form = FormRecord::new();
        form.set(FormField::Gender, "female").unwrap();
        assert_eq!(form.gender(), Some(Gender::Female));
        form.set(FormField::Gender, "").unwrap();
        assert_eq!(form.gender(), None);
        assert!(form.set(FormField::Gender, "other").is_err());
    }
}
