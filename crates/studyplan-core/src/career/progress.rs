//! Exam preparation score and page aggregates.
//!
//! Notes files weigh by page count, exercise files by topic count:
//!
//! ```text
//! appunti:  score = 0.2*read/total + 0.3*studied/total + 0.5*repeated/total   weight = total
//! esercizi: score = sum(credit)/count                                        weight = count
//! progress = round(100 * sum(score*weight) / sum(weight))
//! ```
//!
//! Files with zero weight contribute nothing; no weight at all means 0.

use serde::{Deserialize, Serialize};

use super::model::{Exam, FileKind, PageCounts, StudyFile};

pub const READ_WEIGHT: f64 = 0.2;
pub const STUDIED_WEIGHT: f64 = 0.3;
pub const REPEATED_WEIGHT: f64 = 0.5;

/// Weighted contribution of one file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// 0.0..=1.0
    pub score: f64,
    pub weight: f64,
}

impl Contribution {
    pub fn mass(&self) -> f64 {
        self.score * self.weight
    }
}

/// Score and weight of a file, `None` when it has nothing to track yet.
pub fn file_contribution(file: &StudyFile) -> Option<Contribution> {
    match file.kind {
        FileKind::Appunti => {
            let p = &file.pages;
            if p.total == 0 {
                return None;
            }
            let total = p.total as f64;
            let frac = |v: u32| v.min(p.total) as f64 / total;
            Some(Contribution {
                score: READ_WEIGHT * frac(p.read)
                    + STUDIED_WEIGHT * frac(p.studied)
                    + REPEATED_WEIGHT * frac(p.repeated),
                weight: total,
            })
        }
        FileKind::Esercizi => {
            if file.exercises.is_empty() {
                return None;
            }
            let count = file.exercises.len() as f64;
            let credit: f64 = file.exercises.iter().map(|e| e.status.credit()).sum();
            Some(Contribution {
                score: credit / count,
                weight: count,
            })
        }
    }
}

pub fn file_score(file: &StudyFile) -> Option<f64> {
    file_contribution(file).map(|c| c.score)
}

/// Weighted preparation percentage across `files`.
pub fn calc_progress(files: &[StudyFile]) -> u8 {
    let (mass, weight) = files
        .iter()
        .filter_map(file_contribution)
        .fold((0.0, 0.0), |(m, w), c| (m + c.mass(), w + c.weight));
    if weight <= 0.0 {
        return 0;
    }
    let pct = ((mass / weight) * 100.0 + 0.5).floor();
    pct.clamp(0.0, 100.0) as u8
}

/// Progress shown for an exam; passed exams are always complete.
pub fn exam_progress(exam: &Exam) -> u8 {
    if exam.is_passed() {
        100
    } else {
        calc_progress(&exam.pdfs)
    }
}

/// Sum of the page counters of every notes file.
pub fn page_aggregate(files: &[StudyFile]) -> PageCounts {
    files
        .iter()
        .filter(|f| f.kind == FileKind::Appunti)
        .fold(PageCounts::default(), |acc, f| PageCounts {
            total: acc.total.saturating_add(f.pages.total),
            read: acc.read.saturating_add(f.pages.read),
            studied: acc.studied.saturating_add(f.pages.studied),
            repeated: acc.repeated.saturating_add(f.pages.repeated),
        })
}

/// Recompute the derived fields of `exam` from its files.
pub fn refresh(exam: &mut Exam) {
    exam.pages = page_aggregate(&exam.pdfs);
    exam.progress = exam_progress(exam);
}

/// One segment of the stacked page chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub pages: u32,
    pub percent: f64,
}

/// Four exclusive segments, innermost "done" first, that always add up to
/// `total`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackedBar {
    pub total: u32,
    pub repeated: Segment,
    pub studied: Segment,
    pub read: Segment,
    pub remaining: Segment,
}

impl StackedBar {
    pub fn segments(&self) -> [Segment; 4] {
        [self.repeated, self.studied, self.read, self.remaining]
    }
}

/// Stacked chart for a set of page counters, `None` when `total` is 0.
///
/// Each outer level covers the inner ones, so a file with more pages
/// repeated than studied still yields non-overlapping segments.
pub fn stacked_bar(pages: &PageCounts) -> Option<StackedBar> {
    let total = pages.total;
    if total == 0 {
        return None;
    }
    let repeated = pages.repeated.min(total);
    let studied = pages.studied.max(repeated).min(total);
    let read = pages.read.max(studied).min(total);
    let seg = |n: u32| Segment {
        pages: n,
        percent: n as f64 * 100.0 / total as f64,
    };
    Some(StackedBar {
        total,
        repeated: seg(repeated),
        studied: seg(studied - repeated),
        read: seg(read - studied),
        remaining: seg(total - read),
    })
}

/// Colour band used for progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressBand {
    Good,
    Fair,
    Low,
}

impl ProgressBand {
    pub fn of(progress: u8) -> Self {
        match progress {
            80.. => ProgressBand::Good,
            50..=79 => ProgressBand::Fair,
            _ => ProgressBand::Low,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ProgressBand::Good => "#34d399",
            ProgressBand::Fair => "#fbbf24",
            ProgressBand::Low => "#f87171",
        }
    }
}
