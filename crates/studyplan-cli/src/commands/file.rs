//! Files attached to an exam and their tracking.

use clap::Subcommand;
use std::path::PathBuf;
use studyplan_core::attachments::{attach_file, open_file, remove_file, FixedPicker};
use studyplan_core::career::{
    add_exercise, cycle_exercise_status, remove_exercise, rename_exercise, set_exercise_status,
    set_pages, step_pages, Exam, ExerciseStatus, FileKind, PageField,
};
use studyplan_core::{CoreError, ValidationError};

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum FileAction {
    /// Copy a file into storage and attach it to an exam
    Attach {
        /// Exam ID
        exam: String,
        /// File to import
        path: PathBuf,
        /// appunti (page counters) or esercizi (topic checklist)
        #[arg(long = "type", default_value = "appunti")]
        kind: FileKind,
    },
    /// Detach a file and delete its stored copy
    Remove {
        exam: String,
        /// File position in the exam
        index: usize,
    },
    /// Open a stored file with the system viewer
    Open { exam: String, index: usize },
    /// List the files of an exam
    List { exam: String },
    /// Set or step a page counter of a notes file
    Pages {
        exam: String,
        index: usize,
        /// total, read, studied or repeated
        field: PageField,
        /// New value
        #[arg(conflicts_with_all = ["up", "down"], required_unless_present_any = ["up", "down"])]
        value: Option<u32>,
        #[arg(long, conflicts_with = "down")]
        up: bool,
        #[arg(long)]
        down: bool,
    },
    /// Edit the topic checklist of an exercises file
    Topic {
        exam: String,
        index: usize,
        #[command(subcommand)]
        action: TopicAction,
    },
}

#[derive(Subcommand)]
pub enum TopicAction {
    /// Append a new topic
    Add,
    Rename { topic: usize, name: String },
    /// da-fare, in-corso or fatto
    Status { topic: usize, status: ExerciseStatus },
    /// Advance to the next status
    Cycle { topic: usize },
    Remove { topic: usize },
}

/// Run `edit` on one exam of the plan and persist the result.
fn with_exam<T>(
    ctx: &mut Context,
    id: &str,
    edit: impl FnOnce(&mut Exam) -> Result<T, CoreError>,
) -> Result<T, CoreError> {
    let commit = ctx.planner.update_career(|career| {
        let career = career.as_mut().ok_or(ValidationError::NoCareer)?;
        let exam = career
            .exam_mut(id)
            .ok_or_else(|| ValidationError::NotFound {
                kind: "exam",
                id: id.to_string(),
            })?;
        edit(exam)
    })?;
    Ok(commit.value)
}

fn find_exam<'a>(ctx: &'a Context, id: &str) -> Result<&'a Exam, ValidationError> {
    ctx.planner
        .career()
        .ok_or(ValidationError::NoCareer)?
        .exam(id)
        .ok_or_else(|| ValidationError::NotFound {
            kind: "exam",
            id: id.to_string(),
        })
}

pub fn run(action: FileAction) -> CmdResult {
    let mut ctx = Context::open()?;

    match action {
        FileAction::Attach { exam, path, kind } => {
            let files = ctx.attachments().with_picker(FixedPicker(Some(path)));
            let index = with_exam(&mut ctx, &exam, |e| {
                Ok(attach_file(e, &files, |_, _| Some(kind))?)
            })?;
            if let Some(index) = index {
                let file = find_exam(&ctx, &exam)?.file(index)?;
                print_json(&serde_json::json!({ "index": index, "file": file }))?;
            }
        }
        FileAction::Remove { exam, index } => {
            let files = ctx.attachments();
            let removed = with_exam(&mut ctx, &exam, |e| remove_file(e, index, &files))?;
            println!("File removed: {}", removed.original_name);
        }
        FileAction::Open { exam, index } => {
            let files = ctx.attachments();
            open_file(find_exam(&ctx, &exam)?, index, &files)?;
        }
        FileAction::List { exam } => {
            print_json(&find_exam(&ctx, &exam)?.pdfs)?;
        }
        FileAction::Pages {
            exam,
            index,
            field,
            value,
            up,
            down,
        } => {
            let pages = with_exam(&mut ctx, &exam, |e| {
                let pages = match value {
                    Some(v) => set_pages(e, index, field, v)?,
                    None => step_pages(e, index, field, up && !down)?,
                };
                Ok(pages)
            })?;
            print_json(&pages)?;
        }
        FileAction::Topic {
            exam,
            index,
            action,
        } => {
            with_exam(&mut ctx, &exam, |e| {
                match action {
                    TopicAction::Add => {
                        add_exercise(e, index)?;
                    }
                    TopicAction::Rename { topic, name } => {
                        rename_exercise(e, index, topic, &name)?
                    }
                    TopicAction::Status { topic, status } => {
                        set_exercise_status(e, index, topic, status)?
                    }
                    TopicAction::Cycle { topic } => {
                        cycle_exercise_status(e, index, topic)?;
                    }
                    TopicAction::Remove { topic } => {
                        remove_exercise(e, index, topic)?;
                    }
                }
                Ok(())
            })?;
            let exam = find_exam(&ctx, &exam)?;
            print_json(&serde_json::json!({
                "progress": exam.progress,
                "file": exam.file(index)?,
            }))?;
        }
    }
    Ok(())
}
