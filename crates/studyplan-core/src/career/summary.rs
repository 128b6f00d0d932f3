//! Read-only career views: headline numbers, upcoming sittings, exam list.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::model::{Career, Exam};
use super::progress::ProgressBand;
use crate::error::ValidationError;
use crate::time::days_until;

/// An exam this close (in days) is flagged as urgent.
pub const URGENT_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerSummary {
    pub cfu_done: u32,
    pub total_cfu: u32,
    pub exams_passed: usize,
    pub exams_total: usize,
    /// `round(100 * cfu_done / total_cfu)`, 0 without a credit target.
    pub completion_pct: u32,
    /// CFU-weighted grade average; honours count as 30.
    pub average: Option<f64>,
}

pub fn summarize(career: &Career) -> CareerSummary {
    let passed: Vec<&Exam> = career.exams.iter().filter(|e| e.is_passed()).collect();
    let cfu_done: u32 = passed.iter().map(|e| e.cfu).sum();
    let completion_pct = if career.total_cfu == 0 {
        0
    } else {
        (cfu_done as f64 * 100.0 / career.total_cfu as f64 + 0.5).floor() as u32
    };
    CareerSummary {
        cfu_done,
        total_cfu: career.total_cfu,
        exams_passed: passed.len(),
        exams_total: career.exams.len(),
        completion_pct,
        average: weighted_average(&career.exams),
    }
}

/// Average over passed exams that carry a grade, weighted by CFU.
pub fn weighted_average(exams: &[Exam]) -> Option<f64> {
    let (sum, cfu) = exams
        .iter()
        .filter(|e| e.is_passed())
        .filter_map(|e| e.grade.map(|g| (g.value() as u64, e.cfu as u64)))
        .fold((0u64, 0u64), |(s, c), (grade, cfu)| (s + grade * cfu, c + cfu));
    (cfu > 0).then(|| sum as f64 / cfu as f64)
}

/// A pending exam with a scheduled date not in the past.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingExam {
    pub id: String,
    pub name: String,
    pub exam_date: NaiveDate,
    pub days_left: i64,
    pub urgent: bool,
    pub progress: u8,
    pub band: ProgressBand,
}

/// Pending exams dated today or later, soonest first, at most `limit`.
pub fn upcoming_exams(career: &Career, today: NaiveDate, limit: usize) -> Vec<UpcomingExam> {
    let mut upcoming: Vec<UpcomingExam> = career
        .exams
        .iter()
        .filter(|e| !e.is_passed())
        .filter_map(|e| {
            let date = e.exam_date.filter(|d| *d >= today)?;
            let days_left = days_until(today, date);
            Some(UpcomingExam {
                id: e.id.clone(),
                name: e.name.clone(),
                exam_date: date,
                days_left,
                urgent: days_left <= URGENT_DAYS,
                progress: e.progress,
                band: ProgressBand::of(e.progress),
            })
        })
        .collect();
    upcoming.sort_by_key(|u| u.exam_date);
    upcoming.truncate(limit);
    upcoming
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamFilter {
    #[default]
    All,
    Passed,
    Pending,
}

impl FromStr for ExamFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ExamFilter::All),
            "passed" => Ok(ExamFilter::Passed),
            "pending" => Ok(ExamFilter::Pending),
            other => Err(ValidationError::InvalidValue {
                field: "filter".into(),
                message: format!("expected all, passed or pending, got '{other}'"),
            }),
        }
    }
}

/// Exams matching `filter`: pending first, then by year and semester.
pub fn exam_list(career: &Career, filter: ExamFilter) -> Vec<&Exam> {
    let mut list: Vec<&Exam> = career
        .exams
        .iter()
        .filter(|e| match filter {
            ExamFilter::All => true,
            ExamFilter::Passed => e.is_passed(),
            ExamFilter::Pending => !e.is_passed(),
        })
        .collect();
    list.sort_by_key(|e| (e.is_passed(), e.year, e.sem));
    list
}
