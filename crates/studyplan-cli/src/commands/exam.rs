//! Exam commands of the career plan.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use studyplan_core::career::{
    delete_exam, exam_list, save_exam, stacked_bar, ExamFilter, ExamStatus, Grade, ProgressBand,
};
use studyplan_core::{CoreError, ExamDraft, ValidationError};

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum ExamAction {
    /// Add an exam to the plan
    Add {
        name: String,
        #[command(flatten)]
        fields: ExamFields,
    },
    /// Edit an exam; omitted fields keep their value
    Edit {
        /// Exam ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: ExamFields,
    },
    /// List exams, pending first
    List {
        /// all, passed or pending
        #[arg(long, default_value = "all")]
        filter: ExamFilter,
    },
    /// Show an exam with its page chart
    Show {
        /// Exam ID
        id: String,
    },
    /// Delete an exam and its attached files
    Delete {
        /// Exam ID
        id: String,
    },
}

#[derive(Args)]
pub struct ExamFields {
    #[arg(long)]
    cfu: Option<u32>,
    #[arg(long)]
    year: Option<u8>,
    /// 1 or 2
    #[arg(long)]
    sem: Option<u8>,
    /// pending or passed
    #[arg(long)]
    status: Option<ExamStatus>,
    /// 18 to 30, or 30L
    #[arg(long)]
    grade: Option<Grade>,
    /// Day the exam was passed (YYYY-MM-DD)
    #[arg(long)]
    pass_date: Option<NaiveDate>,
    /// Scheduled sitting (YYYY-MM-DD)
    #[arg(long)]
    exam_date: Option<NaiveDate>,
}

impl ExamFields {
    fn apply(self, draft: &mut ExamDraft) {
        if let Some(cfu) = self.cfu {
            draft.cfu = cfu;
        }
        if let Some(year) = self.year {
            draft.year = year;
        }
        if let Some(sem) = self.sem {
            draft.sem = sem;
        }
        if let Some(status) = self.status {
            draft.status = status;
        }
        if self.grade.is_some() {
            draft.grade = self.grade;
        }
        if self.pass_date.is_some() {
            draft.pass_date = self.pass_date;
        }
        if self.exam_date.is_some() {
            draft.exam_date = self.exam_date;
        }
    }
}

fn not_found(id: &str) -> ValidationError {
    ValidationError::NotFound {
        kind: "exam",
        id: id.to_string(),
    }
}

fn save(ctx: &mut Context, draft: ExamDraft) -> Result<String, CoreError> {
    let commit = ctx.planner.update_career(|career| {
        let career = career.as_mut().ok_or(ValidationError::NoCareer)?;
        save_exam(career, draft)
    })?;
    Ok(commit.value)
}

fn print_exam(ctx: &Context, id: &str) -> CmdResult {
    let career = ctx.planner.career().ok_or(ValidationError::NoCareer)?;
    let exam = career.exam(id).ok_or_else(|| not_found(id))?;
    print_json(&serde_json::json!({
        "exam": exam,
        "band": ProgressBand::of(exam.progress),
        "chart": stacked_bar(&exam.pages),
    }))
}

pub fn run(action: ExamAction) -> CmdResult {
    let mut ctx = Context::open()?;

    match action {
        ExamAction::Add { name, fields } => {
            let mut draft = ExamDraft::new(name);
            fields.apply(&mut draft);
            let id = save(&mut ctx, draft)?;
            println!("Exam added: {id}");
            print_exam(&ctx, &id)?;
        }
        ExamAction::Edit { id, name, fields } => {
            let career = ctx.planner.career().ok_or(ValidationError::NoCareer)?;
            let exam = career.exam(&id).ok_or_else(|| not_found(&id))?;
            let mut draft = ExamDraft::from_exam(exam);
            if let Some(name) = name {
                draft.name = name;
            }
            fields.apply(&mut draft);
            save(&mut ctx, draft)?;
            print_exam(&ctx, &id)?;
        }
        ExamAction::List { filter } => {
            let career = ctx.planner.career().ok_or(ValidationError::NoCareer)?;
            print_json(&exam_list(career, filter))?;
        }
        ExamAction::Show { id } => print_exam(&ctx, &id)?,
        ExamAction::Delete { id } => {
            let files = ctx.attachments();
            let removed = ctx
                .planner
                .update_career(|career| {
                    let career = career.as_mut().ok_or(ValidationError::NoCareer)?;
                    delete_exam(career, &id, &files)
                })?
                .value;
            println!("Exam deleted: {} ({})", removed.name, removed.id);
        }
    }
    Ok(())
}
