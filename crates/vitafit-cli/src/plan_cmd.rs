//! `vitafit plan`: run the exercise -> diet -> report workflow once from
//! command-line flags.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;

use vitafit_core::api::{Backend, DietPlan, ExercisePlan, HttpBackend};
use vitafit_core::form::FormField;
use vitafit_core::planner::{DirectorySink, Planner, StageBlocked};
use vitafit_core::units::{LengthUnit, MassUnit};

use crate::config::VitafitConfig;
use crate::tui;

/// Form fields and follow-up stages for a planning run.
#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Full name (first and last, split on the first space for the report)
    #[arg(long)]
    pub name: String,
    /// Mobile number, digits only
    #[arg(long)]
    pub mobile: String,
    #[arg(long)]
    pub email: String,
    /// Age in whole years
    #[arg(long)]
    pub age: String,
    /// male or female
    #[arg(long)]
    pub gender: String,
    #[arg(long)]
    pub height: String,
    #[arg(long, default_value_t = LengthUnit::Cm)]
    pub height_unit: LengthUnit,
    #[arg(long)]
    pub weight: String,
    #[arg(long, default_value_t = MassUnit::Kg)]
    pub weight_unit: MassUnit,
    /// Daily calorie intake
    #[arg(long)]
    pub calories: String,
    /// Also request the diet plan
    #[arg(long)]
    pub diet: bool,
    /// Also download the PDF report
    #[arg(long)]
    pub report: bool,
    /// Directory for the report (overrides config)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
    /// Open the chat dashboard afterwards
    #[arg(long)]
    pub chat: bool,
}

impl PlanArgs {
    fn fields(&self) -> [(FormField, String); 10] {
        [
            (FormField::Name, self.name.clone()),
            (FormField::Mobile, self.mobile.clone()),
            (FormField::Email, self.email.clone()),
            (FormField::Age, self.age.clone()),
            (FormField::Gender, self.gender.clone()),
            (FormField::HeightValue, self.height.clone()),
            (FormField::HeightUnit, self.height_unit.to_string()),
            (FormField::WeightValue, self.weight.clone()),
            (FormField::WeightUnit, self.weight_unit.to_string()),
            (FormField::CaloriesIntake, self.calories.clone()),
        ]
    }
}

pub async fn run_plan(args: PlanArgs, config: &VitafitConfig) -> Result<()> {
    let backend = Arc::new(HttpBackend::new(config.backend.clone()));
    let mut planner = Planner::new();

    for (field, value) in args.fields() {
        planner
            .set_field(field, &value)
            .with_context(|| format!("invalid value for {field:?}"))?;
    }

    tracing::info!(session = %planner.session(), diet = args.diet, report = args.report, "starting planning run");
    println!("Session: {}", planner.session());
    println!("BMI:     {}", planner.form().bmi_display());
    println!();

    match planner.submit(backend.as_ref()).await {
        Ok(_) => {}
        Err(StageBlocked::Invalid(err)) => bail!("{err}"),
        Err(other) => return Err(other.into()),
    }
    if let Some(err) = planner.exercise_status().error() {
        bail!("exercise plan failed: {err}");
    }
    let Some(plan) = planner.exercise_plan() else {
        bail!("exercise plan missing after a successful call");
    };
    print_exercise_plan(plan);

    if args.diet {
        planner.request_diet(backend.as_ref()).await?;
        match (planner.diet_plan(), planner.diet_status().error()) {
            (Some(diet), _) => print_diet_plan(diet),
            (None, Some(err)) => eprintln!("Diet plan failed: {err}"),
            (None, None) => {}
        }
    }

    if args.report {
        let sink = DirectorySink::new(&config.report_dir);
        planner.download_report(backend.as_ref(), &sink).await?;
        if let Some(path) = planner.last_report() {
            tracing::info!(path = %path.display(), "report saved");
            println!("Report saved to {}", path.display());
        } else if let Some(alert) = planner.report_status().error() {
            eprintln!("{alert}");
        }
    }

    if args.chat {
        let Some(chat) = planner.open_chat() else {
            bail!("chat is only available after an exercise plan");
        };
        let backend: Arc<dyn Backend> = backend;
        tui::run_chat(backend, chat).await?;
    } else {
        println!();
        println!("Continue with: vitafit chat --session-id {}", planner.session());
    }

    Ok(())
}

fn print_exercise_plan(plan: &ExercisePlan) {
    println!("Exercise plan");
    println!("  Type:            {}", plan.exercise_type);
    println!("  Intensity:       {}", plan.intensity_level);
    println!("  Frequency:       {} days/week", plan.frequency_per_week);
    println!("  Duration:        {} min", plan.duration_minutes);
    println!("  Calorie burn:    {} kcal", plan.estimated_calorie_burn);
}

fn print_diet_plan(plan: &DietPlan) {
    println!();
    match plan {
        DietPlan::Recommended { targets, message } => {
            println!("Diet plan");
            println!("  Calories:        {} kcal", targets.recommended_calories);
            println!("  Protein:         {} g/day", targets.protein_grams_per_day);
            println!("  Carbs:           {} g/day", targets.carbs_grams_per_day);
            println!("  Fats:            {} g/day", targets.fats_grams_per_day);
            if let Some(message) = message {
                println!("  Note:            {message}");
            }
        }
        DietPlan::Declined { error, message } => {
            println!("Diet plan unavailable");
            for text in [error, message].into_iter().flatten() {
                println!("  {text}");
            }
        }
    }
}
