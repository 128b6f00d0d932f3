use chrono::NaiveDate;
use clap::Subcommand;
use studyplan_core::career::{create_career, reset_career, summarize, upcoming_exams};
use studyplan_core::{CoreError, ProgramType, ValidationError};

use super::{print_json, today, CmdResult, Context};

#[derive(Subcommand)]
pub enum CareerAction {
    /// Start a new career plan (replaces nothing; use reset first)
    Create {
        #[arg(long)]
        university: String,
        #[arg(long)]
        course: String,
        /// triennale, magistrale, ciclo-unico-5 or ciclo-unico-6
        #[arg(long = "type")]
        program: ProgramType,
    },
    /// Plan details and summary numbers
    Show,
    /// Pending exams with a date from today on
    Upcoming {
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Overrides career.upcoming_limit
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete the plan and every attached file
    Reset {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Available program templates
    Programs,
}

pub fn run(action: CareerAction) -> CmdResult {
    let mut ctx = Context::open()?;

    match action {
        CareerAction::Create {
            university,
            course,
            program,
        } => {
            ctx.planner.update_career(|career| -> Result<(), CoreError> {
                if career.is_some() {
                    return Err(CoreError::Custom(
                        "a career plan already exists; run `career reset --yes` first".into(),
                    ));
                }
                *career = Some(create_career(&university, &course, program)?);
                Ok(())
            })?;
            print_json(&ctx.planner.career())?;
        }
        CareerAction::Show => {
            let career = ctx.planner.career().ok_or(ValidationError::NoCareer)?;
            print_json(&serde_json::json!({
                "universityName": career.university_name,
                "courseName": career.course_name,
                "type": career.program,
                "typeLabel": career.type_label,
                "years": career.program.years(),
                "summary": summarize(career),
            }))?;
        }
        CareerAction::Upcoming { today: day, limit } => {
            let career = ctx.planner.career().ok_or(ValidationError::NoCareer)?;
            let limit = limit.unwrap_or(ctx.config.career.upcoming_limit);
            print_json(&upcoming_exams(career, today(day), limit))?;
        }
        CareerAction::Reset { yes } => {
            if !yes {
                return Err("refusing to reset without --yes".into());
            }
            let files = ctx.attachments();
            ctx.planner
                .update_career(|career| -> Result<(), CoreError> {
                    reset_career(career, &files);
                    Ok(())
                })?;
            println!("career reset");
        }
        CareerAction::Programs => {
            let list: Vec<_> = ProgramType::ALL
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "type": p,
                        "label": p.label(),
                        "totalCfu": p.total_cfu(),
                        "years": p.years(),
                    })
                })
                .collect();
            print_json(&list)?;
        }
    }
    Ok(())
}
