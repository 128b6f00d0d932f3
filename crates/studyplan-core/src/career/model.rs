//! Career, exam and study-file records as stored in `career.json`.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::serde_helpers::{lenient_u32, optional_date};

/// Degree-program template. Each fixes the credits needed to graduate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgramType {
    #[serde(rename = "triennale")]
    Triennale,
    #[serde(rename = "magistrale")]
    Magistrale,
    #[serde(rename = "ciclo-unico-5")]
    CicloUnico5,
    #[serde(rename = "ciclo-unico-6")]
    CicloUnico6,
}

impl ProgramType {
    pub const ALL: [ProgramType; 4] = [
        ProgramType::Triennale,
        ProgramType::Magistrale,
        ProgramType::CicloUnico5,
        ProgramType::CicloUnico6,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ProgramType::Triennale => "triennale",
            ProgramType::Magistrale => "magistrale",
            ProgramType::CicloUnico5 => "ciclo-unico-5",
            ProgramType::CicloUnico6 => "ciclo-unico-6",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProgramType::Triennale => "Triennale",
            ProgramType::Magistrale => "Magistrale",
            ProgramType::CicloUnico5 => "Ciclo Unico 5 anni",
            ProgramType::CicloUnico6 => "Ciclo Unico 6 anni",
        }
    }

    pub fn total_cfu(self) -> u32 {
        match self {
            ProgramType::Triennale => 180,
            ProgramType::Magistrale => 120,
            ProgramType::CicloUnico5 => 300,
            ProgramType::CicloUnico6 => 360,
        }
    }

    pub fn years(self) -> u8 {
        match self {
            ProgramType::Triennale => 3,
            ProgramType::Magistrale => 2,
            ProgramType::CicloUnico5 => 5,
            ProgramType::CicloUnico6 => 6,
        }
    }
}

impl fmt::Display for ProgramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ProgramType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ProgramType::ALL
            .into_iter()
            .find(|p| p.key() == wanted)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "type".into(),
                message: format!("unknown program '{s}'"),
            })
    }
}

/// A university career plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Career {
    #[serde(default, alias = "university")]
    pub university_name: String,
    #[serde(default, alias = "course")]
    pub course_name: String,
    #[serde(rename = "type")]
    pub program: ProgramType,
    #[serde(default)]
    pub type_label: String,
    #[serde(default, deserialize_with = "lenient_u32::deserialize")]
    pub total_cfu: u32,
    #[serde(default)]
    pub exams: Vec<Exam>,
}

impl Career {
    pub fn new(university: &str, course: &str, program: ProgramType) -> Self {
        Self {
            university_name: university.trim().to_string(),
            course_name: course.trim().to_string(),
            program,
            type_label: program.label().to_string(),
            total_cfu: program.total_cfu(),
            exams: Vec::new(),
        }
    }

    /// Fill derived fields that older files left out.
    pub(crate) fn normalize(&mut self) {
        if self.total_cfu == 0 {
            self.total_cfu = self.program.total_cfu();
        }
        if self.type_label.is_empty() {
            self.type_label = self.program.label().to_string();
        }
    }

    pub fn exam(&self, id: &str) -> Option<&Exam> {
        self.exams.iter().find(|e| e.id == id)
    }

    pub fn exam_mut(&mut self, id: &str) -> Option<&mut Exam> {
        self.exams.iter_mut().find(|e| e.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamStatus {
    #[default]
    Pending,
    Passed,
}

impl FromStr for ExamStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ExamStatus::Pending),
            "passed" => Ok(ExamStatus::Passed),
            other => Err(ValidationError::InvalidValue {
                field: "status".into(),
                message: format!("expected pending or passed, got '{other}'"),
            }),
        }
    }
}

/// Italian exam mark. Stored as an integer where 31 means "30 e lode".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Grade {
    Mark(u8),
    WithHonors,
}

impl Grade {
    pub const HONORS_CODE: u8 = 31;

    /// Value used for averaging; honours count as 30.
    pub fn value(self) -> u8 {
        match self {
            Grade::Mark(m) => m,
            Grade::WithHonors => 30,
        }
    }
}

impl TryFrom<u8> for Grade {
    type Error = ValidationError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            18..=30 => Ok(Grade::Mark(code)),
            Grade::HONORS_CODE => Ok(Grade::WithHonors),
            _ => Err(ValidationError::InvalidValue {
                field: "grade".into(),
                message: format!("{code} is not between 18 and 30L"),
            }),
        }
    }
}

impl From<Grade> for u8 {
    fn from(g: Grade) -> Self {
        match g {
            Grade::Mark(m) => m,
            Grade::WithHonors => Grade::HONORS_CODE,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Mark(m) => write!(f, "{m}"),
            Grade::WithHonors => f.write_str("30L"),
        }
    }
}

impl FromStr for Grade {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("30l") || s.eq_ignore_ascii_case("30 e lode") {
            return Ok(Grade::WithHonors);
        }
        let code: u8 = s.parse().map_err(|_| ValidationError::InvalidValue {
            field: "grade".into(),
            message: format!("'{s}' is not a grade"),
        })?;
        Grade::try_from(code)
    }
}

/// Unknown or out-of-range stored grades read as "no grade".
fn deserialize_grade<'de, D>(deserializer: D) -> Result<Option<Grade>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    let code = match raw {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(code
        .and_then(|c| u8::try_from(c).ok())
        .and_then(|c| Grade::try_from(c).ok()))
}

fn default_cfu() -> u32 {
    6
}

fn default_one() -> u8 {
    1
}

/// One exam of the career plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_cfu")]
    pub cfu: u32,
    #[serde(default = "default_one")]
    pub year: u8,
    #[serde(default = "default_one")]
    pub sem: u8,
    #[serde(default)]
    pub status: ExamStatus,
    #[serde(default, deserialize_with = "deserialize_grade")]
    pub grade: Option<Grade>,
    /// Day the exam was passed.
    #[serde(rename = "dateStr", alias = "passDate", default, with = "optional_date")]
    pub pass_date: Option<NaiveDate>,
    /// Scheduled sitting while pending.
    #[serde(default, with = "optional_date")]
    pub exam_date: Option<NaiveDate>,
    /// Derived from `pdfs`, see [`super::progress`].
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub pdfs: Vec<StudyFile>,
    /// Sum of the page counters of all notes files.
    #[serde(default)]
    pub pages: PageCounts,
}

impl Exam {
    pub fn is_passed(&self) -> bool {
        self.status == ExamStatus::Passed
    }

    pub fn file(&self, index: usize) -> Result<&StudyFile, ValidationError> {
        let len = self.pdfs.len();
        self.pdfs.get(index).ok_or(ValidationError::OutOfBounds {
            collection: "pdfs".into(),
            index,
            len,
        })
    }

    pub fn file_mut(&mut self, index: usize) -> Result<&mut StudyFile, ValidationError> {
        let len = self.pdfs.len();
        self.pdfs.get_mut(index).ok_or(ValidationError::OutOfBounds {
            collection: "pdfs".into(),
            index,
            len,
        })
    }
}

/// How a study file is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Notes, tracked by page counters.
    #[default]
    Appunti,
    /// Exercises, tracked by a topic checklist.
    Esercizi,
}

impl FileKind {
    pub fn label(self) -> &'static str {
        match self {
            FileKind::Appunti => "Appunti",
            FileKind::Esercizi => "Esercizi",
        }
    }
}

impl FromStr for FileKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "appunti" | "notes" => Ok(FileKind::Appunti),
            "esercizi" | "exercises" => Ok(FileKind::Esercizi),
            other => Err(ValidationError::InvalidValue {
                field: "type".into(),
                message: format!("expected appunti or esercizi, got '{other}'"),
            }),
        }
    }
}

/// Page counters of a notes file. Each of `read`, `studied` and `repeated`
/// is independent but never exceeds `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageCounts {
    #[serde(default, deserialize_with = "lenient_u32::deserialize")]
    pub total: u32,
    #[serde(default, deserialize_with = "lenient_u32::deserialize")]
    pub read: u32,
    #[serde(default, deserialize_with = "lenient_u32::deserialize")]
    pub studied: u32,
    #[serde(default, deserialize_with = "lenient_u32::deserialize")]
    pub repeated: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageField {
    Total,
    Read,
    Studied,
    Repeated,
}

impl FromStr for PageField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "total" => Ok(PageField::Total),
            "read" => Ok(PageField::Read),
            "studied" => Ok(PageField::Studied),
            "repeated" => Ok(PageField::Repeated),
            other => Err(ValidationError::InvalidValue {
                field: "page field".into(),
                message: format!("unknown counter '{other}'"),
            }),
        }
    }
}

impl PageCounts {
    pub fn with_total(total: u32) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn get(&self, field: PageField) -> u32 {
        match field {
            PageField::Total => self.total,
            PageField::Read => self.read,
            PageField::Studied => self.studied,
            PageField::Repeated => self.repeated,
        }
    }

    /// Set one counter. Progress counters are clamped to `total`; lowering
    /// `total` re-clamps the others.
    pub fn set(&mut self, field: PageField, value: u32) {
        match field {
            PageField::Total => self.total = value,
            PageField::Read => self.read = value,
            PageField::Studied => self.studied = value,
            PageField::Repeated => self.repeated = value,
        }
        self.clamp();
    }

    /// Step a counter by one, never below zero.
    pub fn step(&mut self, field: PageField, up: bool) {
        let current = self.get(field);
        let next = if up {
            current.saturating_add(1)
        } else {
            current.saturating_sub(1)
        };
        self.set(field, next);
    }

    pub fn clamp(&mut self) {
        self.read = self.read.min(self.total);
        self.studied = self.studied.min(self.total);
        self.repeated = self.repeated.min(self.total);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExerciseStatus {
    #[default]
    #[serde(rename = "da-fare")]
    DaFare,
    #[serde(rename = "in-corso")]
    InCorso,
    #[serde(rename = "fatto")]
    Fatto,
}

impl ExerciseStatus {
    /// Completion credit: done 1, in progress 0.5, todo 0.
    pub fn credit(self) -> f64 {
        match self {
            ExerciseStatus::DaFare => 0.0,
            ExerciseStatus::InCorso => 0.5,
            ExerciseStatus::Fatto => 1.0,
        }
    }

    /// da-fare -> in-corso -> fatto -> da-fare.
    pub fn next(self) -> Self {
        match self {
            ExerciseStatus::DaFare => ExerciseStatus::InCorso,
            ExerciseStatus::InCorso => ExerciseStatus::Fatto,
            ExerciseStatus::Fatto => ExerciseStatus::DaFare,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseStatus::DaFare => "da-fare",
            ExerciseStatus::InCorso => "in-corso",
            ExerciseStatus::Fatto => "fatto",
        }
    }
}

impl FromStr for ExerciseStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "da-fare" | "todo" => Ok(ExerciseStatus::DaFare),
            "in-corso" | "doing" => Ok(ExerciseStatus::InCorso),
            "fatto" | "done" => Ok(ExerciseStatus::Fatto),
            other => Err(ValidationError::InvalidValue {
                field: "status".into(),
                message: format!("unknown exercise status '{other}'"),
            }),
        }
    }
}

/// One topic of an exercises file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: ExerciseStatus,
}

impl Exercise {
    pub fn todo(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ExerciseStatus::DaFare,
        }
    }
}

/// A file attached to an exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawStudyFile")]
pub struct StudyFile {
    /// Opaque storage handle.
    pub file_name: String,
    pub original_name: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    pub pages: PageCounts,
    pub exercises: Vec<Exercise>,
}

impl StudyFile {
    /// Fresh tracking record for a just-attached file.
    pub fn new(file_name: String, original_name: String, kind: FileKind, page_count: u32) -> Self {
        let exercises = match kind {
            FileKind::Appunti => Vec::new(),
            FileKind::Esercizi => vec![Exercise::todo("Argomento 1")],
        };
        Self {
            file_name,
            original_name,
            kind,
            pages: PageCounts::with_total(page_count),
            exercises,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStudyFile {
    #[serde(default)]
    file_name: String,
    #[serde(default)]
    original_name: String,
    #[serde(rename = "type", default)]
    kind: FileKind,
    #[serde(default)]
    pages: Option<PageCounts>,
    #[serde(default, deserialize_with = "lenient_u32::deserialize")]
    total_pages: u32,
    #[serde(default)]
    exercises: Option<Vec<Exercise>>,
}

impl From<RawStudyFile> for StudyFile {
    fn from(raw: RawStudyFile) -> Self {
        let mut pages = raw
            .pages
            .unwrap_or_else(|| PageCounts::with_total(raw.total_pages));
        pages.clamp();
        let original_name = if raw.original_name.is_empty() {
            raw.file_name.clone()
        } else {
            raw.original_name
        };
        Self {
            file_name: raw.file_name,
            original_name,
            kind: raw.kind,
            pages,
            exercises: raw.exercises.unwrap_or_default(),
        }
    }
}
