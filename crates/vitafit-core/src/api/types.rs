//! Request and response bodies exchanged with the planning backend.

use serde::{Deserialize, Serialize};

use crate::form::Gender;
use crate::session::SessionId;
use crate::units::{LengthUnit, MassUnit};
use crate::validate::ValidatedInput;

/// Fixed prompt sent with the one-per-session overview request.
pub const OVERVIEW_PROMPT: &str =
    "Please provide an initial health overview based on my fitness data.";

// ---------------------------------------------------------------------------
// Exercise plan
// ---------------------------------------------------------------------------

/// `POST /predict_exercise` body. Units are passed through unconverted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseRequest {
    pub session_id: SessionId,
    pub age: u32,
    pub gender: Gender,
    pub height_value: f64,
    pub height_unit: LengthUnit,
    pub weight_value: f64,
    pub weight_unit: MassUnit,
    pub calories_intake: u32,
}

impl ExerciseRequest {
    pub fn new(session_id: SessionId, input: &ValidatedInput) -> Self {
        Self {
            session_id,
            age: input.age,
            gender: input.gender,
            height_value: input.height_value,
            height_unit: input.height_unit,
            weight_value: input.weight_value,
            weight_unit: input.weight_unit,
            calories_intake: input.calories_intake,
        }
    }
}

/// Server-derived exercise recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExercisePlan {
    pub exercise_type: String,
    pub intensity_level: String,
    pub frequency_per_week: u32,
    pub duration_minutes: f64,
    pub estimated_calorie_burn: f64,
}

#[derive(Debug, Deserialize)]
pub struct ExerciseEnvelope {
    pub exercise_plan: ExercisePlan,
}

// ---------------------------------------------------------------------------
// Diet plan
// ---------------------------------------------------------------------------

/// `POST /predict_diet` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DietRequest {
    pub session_id: SessionId,
}

/// Macronutrient targets produced by the diet model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DietTargets {
    pub recommended_calories: f64,
    pub protein_grams_per_day: f64,
    pub carbs_grams_per_day: f64,
    pub fats_grams_per_day: f64,
}

/// Outcome of a successful diet-plan call.
///
/// The backend answers either with numeric targets or with an
/// `error`/`message` payload when it declines to produce a plan. Both are
/// successful responses; `Declined` is a business-level non-result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawDietPlan")]
pub enum DietPlan {
    Recommended {
        targets: DietTargets,
        message: Option<String>,
    },
    Declined {
        error: Option<String>,
        message: Option<String>,
    },
}

impl DietPlan {
    pub fn targets(&self) -> Option<&DietTargets> {
        match self {
            Self::Recommended { targets, .. } => Some(targets),
            Self::Declined { .. } => None,
        }
    }

    pub fn is_declined(&self) -> bool {
        matches!(self, Self::Declined { .. })
    }
}

#[derive(Debug, Deserialize)]
struct RawDietPlan {
    recommended_calories: Option<f64>,
    protein_grams_per_day: Option<f64>,
    carbs_grams_per_day: Option<f64>,
    fats_grams_per_day: Option<f64>,
    error: Option<String>,
    message: Option<String>,
}

impl From<RawDietPlan> for DietPlan {
    fn from(raw: RawDietPlan) -> Self {
        // A server-declared error wins over any partial numbers.
        let numbers = (
            raw.recommended_calories,
            raw.protein_grams_per_day,
            raw.carbs_grams_per_day,
            raw.fats_grams_per_day,
        );
        if let (None, (Some(cal), Some(protein), Some(carbs), Some(fats))) = (&raw.error, numbers) {
            return Self::Recommended {
                targets: DietTargets {
                    recommended_calories: cal,
                    protein_grams_per_day: protein,
                    carbs_grams_per_day: carbs,
                    fats_grams_per_day: fats,
                },
                message: raw.message,
            };
        }

        Self::Declined {
            error: raw.error,
            message: raw.message,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DietEnvelope {
    pub diet_plan: DietPlan,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Personal details printed on the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl UserDetails {
    /// Build from a full name, splitting first/last on the first space.
    pub fn from_full_name(full_name: &str, email: &str, phone: &str) -> Self {
        let (first_name, last_name) = split_full_name(full_name);
        Self {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            email: email.to_owned(),
            phone: phone.to_owned(),
        }
    }
}

/// Split `"First Middle Last"` into `("First", "Middle Last")`.
pub fn split_full_name(full_name: &str) -> (&str, &str) {
    let trimmed = full_name.trim();
    match trimmed.split_once(' ') {
        Some((first, rest)) => (first, rest.trim_start()),
        None => (trimmed, ""),
    }
}

/// `POST /generate_report` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRequest {
    pub session_id: SessionId,
    pub user_details: UserDetails,
}

/// Binary report returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    /// Filename suggested by `Content-Disposition`, if any.
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

impl ReportDocument {
    /// The filename to save under: the server's suggestion, else one derived
    /// from the session token.
    pub fn suggested_filename(&self, session_id: SessionId) -> String {
        self.filename
            .clone()
            .unwrap_or_else(|| format!("Fitness_Report_{session_id}.pdf"))
    }
}

/// Extract the `filename` parameter from a `Content-Disposition` value.
///
/// Accepts both quoted (`filename="a.pdf"`) and bare (`filename=a.pdf`)
/// forms.
pub fn filename_from_content_disposition(value: &str) -> Option<String> {
    value.split(';').find_map(|part| {
        let (key, val) = part.trim().split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let val = val.trim().trim_matches('"');
        (!val.is_empty()).then(|| val.to_owned())
    })
}

// ---------------------------------------------------------------------------
// Assistant
// ---------------------------------------------------------------------------

/// Body for both `POST /ai/overview` and `POST /ai/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub session_id: SessionId,
    pub message: String,
}

impl ChatRequest {
    pub fn overview(session_id: SessionId) -> Self {
        Self {
            session_id,
            message: OVERVIEW_PROMPT.to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn exercise_request_wire_shape() {
        let session: SessionId = "8f14e45f-ceea-467f-a0e6-6b2a9c1d3e4f".parse().unwrap();
        let req = ExerciseRequest {
            session_id: session,
            age: 30,
            gender: Gender::Male,
            height_value: 5.9,
            height_unit: LengthUnit::Feet,
            weight_value: 160.0,
            weight_unit: MassUnit::Lbs,
            calories_intake: 2200,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "session_id": "8f14e45f-ceea-467f-a0e6-6b2a9c1d3e4f",
                "age": 30,
                "gender": "male",
                "height_value": 5.9,
                "height_unit": "feet",
                "weight_value": 160.0,
                "weight_unit": "lbs",
                "calories_intake": 2200
            })
        );
    }

    #[test]
    fn diet_plan_with_numbers_is_recommended() {
        let plan: DietPlan = serde_json::from_value(json!({
            "recommended_calories": 2100.5,
            "protein_grams_per_day": 120.0,
            "carbs_grams_per_day": 250.25,
            "fats_grams_per_day": 70.0
        }))
        .unwrap();
        let targets = plan.targets().expect("should carry targets");
        assert_eq!(targets.recommended_calories, 2100.5);
        assert_eq!(targets.carbs_grams_per_day, 250.25);
        assert!(!plan.is_declined());
    }

    #[test]
    fn diet_plan_with_error_is_declined() {
        let plan: DietPlan =
            serde_json::from_value(json!({ "error": "Diet model not fully loaded or available." }))
                .unwrap();
        assert_eq!(
            plan,
            DietPlan::Declined {
                error: Some("Diet model not fully loaded or available.".into()),
                message: None,
            }
        );
    }

    #[test]
    fn diet_plan_error_wins_over_numbers() {
        let plan: DietPlan = serde_json::from_value(json!({
            "recommended_calories": 2000.0,
            "protein_grams_per_day": 100.0,
            "carbs_grams_per_day": 200.0,
            "fats_grams_per_day": 60.0,
            "error": "insufficient data"
        }))
        .unwrap();
        assert!(plan.is_declined());
    }

    #[test]
    fn diet_plan_message_only_is_declined() {
        let plan: DietPlan =
            serde_json::from_value(json!({ "message": "Not enough history yet." })).unwrap();
        assert_eq!(
            plan,
            DietPlan::Declined {
                error: None,
                message: Some("Not enough history yet.".into()),
            }
        );
    }

    #[test]
    fn name_split_on_first_space() {
        assert_eq!(split_full_name("Ada King Lovelace"), ("Ada", "King Lovelace"));
        assert_eq!(split_full_name("Plato"), ("Plato", ""));
        assert_eq!(split_full_name("  Grace Hopper "), ("Grace", "Hopper"));
    }

    #[test]
    fn user_details_wire_shape() {
        let details = UserDetails::from_full_name("Ada Lovelace", "ada@example.com", "5551234");
        assert_eq!(
            serde_json::to_value(&details).unwrap(),
            json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": "ada@example.com",
                "phone": "5551234"
            })
        );
    }

    #[test]
    fn content_disposition_forms() {
        assert_eq!(
            filename_from_content_disposition("attachment; filename=\"report.pdf\""),
            Some("report.pdf".into())
        );
        assert_eq!(
            filename_from_content_disposition("attachment; filename=Fitness_Report_x_2024-01-01.pdf"),
            Some("Fitness_Report_x_2024-01-01.pdf".into())
        );
        assert_eq!(filename_from_content_disposition("inline"), None);
        assert_eq!(filename_from_content_disposition("attachment; filename=\"\""), None);
    }

    #[test]
    fn report_filename_falls_back_to_session() {
        let session: SessionId = "8f14e45f-ceea-467f-a0e6-6b2a9c1d3e4f".parse().unwrap();
        let doc = ReportDocument {
            filename: None,
            bytes: vec![],
        };
        assert_eq!(
            doc.suggested_filename(session),
            "Fitness_Report_8f14e45f-ceea-467f-a0e6-6b2a9c1d3e4f.pdf"
        );
    }

    #[test]
    fn overview_request_uses_fixed_prompt() {
        let session = SessionId::generate();
        let req = ChatRequest::overview(session);
        assert_eq!(req.message, OVERVIEW_PROMPT);
        assert_eq!(req.session_id, session);
    }
}
