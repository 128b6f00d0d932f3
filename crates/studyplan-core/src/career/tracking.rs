//! Per-file tracking edits. Every edit refreshes the exam's derived
//! `progress` and `pages`.

use super::model::{Exam, Exercise, ExerciseStatus, FileKind, PageCounts, PageField, StudyFile};
use super::progress;
use crate::error::ValidationError;

fn expect_kind(file: &StudyFile, kind: FileKind) -> Result<(), ValidationError> {
    if file.kind == kind {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: "type".into(),
            message: format!(
                "'{}' is tracked as {}, not {}",
                file.original_name,
                file.kind.label(),
                kind.label()
            ),
        })
    }
}

fn exercise_mut(file: &mut StudyFile, index: usize) -> Result<&mut Exercise, ValidationError> {
    let len = file.exercises.len();
    file.exercises
        .get_mut(index)
        .ok_or(ValidationError::OutOfBounds {
            collection: "exercises".into(),
            index,
            len,
        })
}

/// Apply `edit` to file `file_index`, then refresh the exam.
fn edit_file<T>(
    exam: &mut Exam,
    file_index: usize,
    kind: FileKind,
    edit: impl FnOnce(&mut StudyFile) -> Result<T, ValidationError>,
) -> Result<T, ValidationError> {
    let file = exam.file_mut(file_index)?;
    expect_kind(file, kind)?;
    let out = edit(file)?;
    progress::refresh(exam);
    tracing::debug!(exam = %exam.id, file = file_index, progress = exam.progress, "tracking updated");
    Ok(out)
}

/// Set a page counter to `value`, clamped into `0..=total`.
pub fn set_pages(
    exam: &mut Exam,
    file_index: usize,
    field: PageField,
    value: u32,
) -> Result<PageCounts, ValidationError> {
    edit_file(exam, file_index, FileKind::Appunti, |f| {
        f.pages.set(field, value);
        Ok(f.pages)
    })
}

/// Step a page counter up or down by one.
pub fn step_pages(
    exam: &mut Exam,
    file_index: usize,
    field: PageField,
    up: bool,
) -> Result<PageCounts, ValidationError> {
    edit_file(exam, file_index, FileKind::Appunti, |f| {
        f.pages.step(field, up);
        Ok(f.pages)
    })
}

/// Append a new todo topic named after its position. Returns its index.
pub fn add_exercise(exam: &mut Exam, file_index: usize) -> Result<usize, ValidationError> {
    edit_file(exam, file_index, FileKind::Esercizi, |f| {
        let n = f.exercises.len() + 1;
        f.exercises.push(Exercise::todo(format!("Argomento {n}")));
        Ok(n - 1)
    })
}

pub fn rename_exercise(
    exam: &mut Exam,
    file_index: usize,
    exercise: usize,
    name: &str,
) -> Result<(), ValidationError> {
    edit_file(exam, file_index, FileKind::Esercizi, |f| {
        exercise_mut(f, exercise)?.name = name.to_string();
        Ok(())
    })
}

pub fn set_exercise_status(
    exam: &mut Exam,
    file_index: usize,
    exercise: usize,
    status: ExerciseStatus,
) -> Result<(), ValidationError> {
    edit_file(exam, file_index, FileKind::Esercizi, |f| {
        exercise_mut(f, exercise)?.status = status;
        Ok(())
    })
}

/// Advance da-fare -> in-corso -> fatto -> da-fare. Returns the new status.
pub fn cycle_exercise_status(
    exam: &mut Exam,
    file_index: usize,
    exercise: usize,
) -> Result<ExerciseStatus, ValidationError> {
    edit_file(exam, file_index, FileKind::Esercizi, |f| {
        let ex = exercise_mut(f, exercise)?;
        ex.status = ex.status.next();
        Ok(ex.status)
    })
}

pub fn remove_exercise(
    exam: &mut Exam,
    file_index: usize,
    exercise: usize,
) -> Result<Exercise, ValidationError> {
    edit_file(exam, file_index, FileKind::Esercizi, |f| {
        exercise_mut(f, exercise)?;
        Ok(f.exercises.remove(exercise))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exam_with_files() -> Exam {
        let mut exam: Exam = serde_json::from_str(r#"{"id":"x","name":"Fisica"}"#).unwrap();
        exam.pdfs = vec![
            StudyFile::new("1_a.pdf".into(), "a.pdf".into(), FileKind::Appunti, 10),
            StudyFile::new("2_b.pdf".into(), "b.pdf".into(), FileKind::Esercizi, 0),
        ];
        exam
    }

    #[test]
    fn page_edits_refresh_progress() {
        let mut exam = exam_with_files();
        set_pages(&mut exam, 0, PageField::Repeated, 10).unwrap();
        // notes 0.5 * 10 pages, one todo topic: 5 / 11.
        assert_eq!(exam.progress, 45);
        assert_eq!(exam.pages.repeated, 10);

        let pages = set_pages(&mut exam, 0, PageField::Read, 99).unwrap();
        assert_eq!(pages.read, 10);
        let pages = step_pages(&mut exam, 0, PageField::Total, false).unwrap();
        assert_eq!((pages.total, pages.read, pages.repeated), (9, 9, 9));
        assert_eq!(exam.pages.total, 9);
    }

    #[test]
    fn exercise_checklist_edits() {
        let mut exam = exam_with_files();
        assert_eq!(add_exercise(&mut exam, 1).unwrap(), 1);
        assert_eq!(exam.pdfs[1].exercises[1].name, "Argomento 2");
        rename_exercise(&mut exam, 1, 0, "Integrali").unwrap();
        set_exercise_status(&mut exam, 1, 0, ExerciseStatus::Fatto).unwrap();
        assert_eq!(
            cycle_exercise_status(&mut exam, 1, 1).unwrap(),
            ExerciseStatus::InCorso
        );
        // 1.5 topic credits against 10 untouched pages + 2 topics.
        assert_eq!(exam.progress, 13);
        let removed = remove_exercise(&mut exam, 1, 0).unwrap();
        assert_eq!(removed.name, "Integrali");
        assert_eq!(exam.progress, 5);
    }

    #[test]
    fn wrong_kind_and_bad_indices_are_rejected() {
        let mut exam = exam_with_files();
        assert!(set_pages(&mut exam, 1, PageField::Read, 1).is_err());
        assert!(add_exercise(&mut exam, 0).is_err());
        assert!(matches!(
            set_pages(&mut exam, 5, PageField::Read, 1),
            Err(ValidationError::OutOfBounds { index: 5, len: 2, .. })
        ));
        assert!(matches!(
            remove_exercise(&mut exam, 1, 3),
            Err(ValidationError::OutOfBounds { .. })
        ));
        assert_eq!(exam.pdfs[1].exercises.len(), 1);
    }
}
