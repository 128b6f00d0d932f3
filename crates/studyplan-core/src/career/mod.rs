//! University career plan: exams, credits, and per-file study tracking.

pub mod model;
pub mod progress;
mod summary;
mod tracking;

pub use model::{
    Career, Exam, ExamStatus, Exercise, ExerciseStatus, FileKind, Grade, PageCounts, PageField,
    ProgramType, StudyFile,
};
pub use progress::{
    calc_progress, exam_progress, page_aggregate, stacked_bar, ProgressBand, Segment, StackedBar,
};
pub use summary::{
    exam_list, summarize, upcoming_exams, weighted_average, CareerSummary, ExamFilter,
    UpcomingExam, URGENT_DAYS,
};
pub use tracking::{
    add_exercise, cycle_exercise_status, remove_exercise, rename_exercise, set_exercise_status,
    set_pages, step_pages,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::attachments::{discard_files, Attachments};
use crate::error::ValidationError;

/// Start a new plan. University and course names are required.
pub fn create_career(
    university: &str,
    course: &str,
    program: ProgramType,
) -> Result<Career, ValidationError> {
    for (field, value) in [("university", university), ("course", course)] {
        if value.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: field.into(),
                message: "must not be empty".into(),
            });
        }
    }
    Ok(Career::new(university, course, program))
}

/// Contents of the exam form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamDraft {
    /// `None` adds a new exam.
    pub id: Option<String>,
    pub name: String,
    pub cfu: u32,
    pub year: u8,
    pub sem: u8,
    pub status: ExamStatus,
    pub grade: Option<Grade>,
    pub pass_date: Option<NaiveDate>,
    pub exam_date: Option<NaiveDate>,
    /// Files attached before a new exam was first saved.
    #[serde(default)]
    pub pdfs: Vec<StudyFile>,
}

impl ExamDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            cfu: 6,
            year: 1,
            sem: 1,
            status: ExamStatus::Pending,
            grade: None,
            pass_date: None,
            exam_date: None,
            pdfs: Vec::new(),
        }
    }

    pub fn from_exam(exam: &Exam) -> Self {
        Self {
            id: Some(exam.id.clone()),
            name: exam.name.clone(),
            cfu: exam.cfu,
            year: exam.year,
            sem: exam.sem,
            status: exam.status,
            grade: exam.grade,
            pass_date: exam.pass_date,
            exam_date: exam.exam_date,
            pdfs: Vec::new(),
        }
    }
}

/// Add or update an exam. Status decides which fields survive: grade and
/// pass date only when passed, exam date only when pending. Returns the id.
pub fn save_exam(career: &mut Career, draft: ExamDraft) -> Result<String, ValidationError> {
    let name = draft.name.trim().to_string();
    if name.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "name".into(),
            message: "must not be empty".into(),
        });
    }
    if !(1..=2).contains(&draft.sem) {
        return Err(ValidationError::InvalidValue {
            field: "sem".into(),
            message: format!("semester must be 1 or 2, got {}", draft.sem),
        });
    }
    let passed = draft.status == ExamStatus::Passed;

    let exam = match &draft.id {
        Some(id) => career.exam_mut(id).ok_or_else(|| ValidationError::NotFound {
            kind: "exam",
            id: id.clone(),
        })?,
        None => {
            career.exams.push(Exam {
                id: crate::ids::new_id(),
                name: String::new(),
                cfu: 6,
                year: 1,
                sem: 1,
                status: ExamStatus::Pending,
                grade: None,
                pass_date: None,
                exam_date: None,
                progress: 0,
                pdfs: draft.pdfs,
                pages: PageCounts::default(),
            });
            let last = career.exams.len() - 1;
            &mut career.exams[last]
        }
    };
    exam.name = name;
    exam.cfu = if draft.cfu == 0 { 6 } else { draft.cfu };
    exam.year = draft.year.max(1);
    exam.sem = draft.sem;
    exam.status = draft.status;
    exam.grade = draft.grade.filter(|_| passed);
    exam.pass_date = draft.pass_date.filter(|_| passed);
    exam.exam_date = draft.exam_date.filter(|_| !passed);
    progress::refresh(exam);
    tracing::debug!(exam = %exam.id, progress = exam.progress, "exam saved");
    Ok(exam.id.clone())
}

/// Remove an exam and delete its attached files.
pub fn delete_exam<A: Attachments + ?Sized>(
    career: &mut Career,
    id: &str,
    attachments: &A,
) -> Result<Exam, ValidationError> {
    let pos = career
        .exams
        .iter()
        .position(|e| e.id == id)
        .ok_or_else(|| ValidationError::NotFound {
            kind: "exam",
            id: id.to_string(),
        })?;
    let exam = career.exams.remove(pos);
    discard_files(attachments, &exam.pdfs);
    Ok(exam)
}

/// Drop the whole plan, deleting every attached file.
pub fn reset_career<A: Attachments + ?Sized>(career: &mut Option<Career>, attachments: &A) {
    if let Some(old) = career.take() {
        for exam in &old.exams {
            discard_files(attachments, &exam.pdfs);
        }
        tracing::info!(exams = old.exams.len(), "career reset");
    }
}
