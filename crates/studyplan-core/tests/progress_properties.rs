//! Property tests for grid arithmetic and exam progress.

use proptest::prelude::*;
use studyplan_core::career::{
    calc_progress, progress::file_score, stacked_bar, Exercise, ExerciseStatus, FileKind,
    PageCounts, PageField, StudyFile,
};
use studyplan_core::grid::{snap_to_grid, SNAP_MINUTES};
use studyplan_core::time::minutes_to_time_of_day;
use studyplan_core::GridGeometry;

fn notes(pages: PageCounts) -> StudyFile {
    let mut f = StudyFile::new("n".into(), "n.pdf".into(), FileKind::Appunti, pages.total);
    f.pages = pages;
    f
}

fn exercises(statuses: Vec<ExerciseStatus>) -> StudyFile {
    let mut f = StudyFile::new("e".into(), "e.pdf".into(), FileKind::Esercizi, 0);
    f.exercises = statuses
        .into_iter()
        .enumerate()
        .map(|(i, status)| Exercise {
            name: format!("Argomento {}", i + 1),
            status,
        })
        .collect();
    f
}

fn page_counts() -> impl Strategy<Value = PageCounts> {
    (0u32..500).prop_flat_map(|total| {
        (Just(total), 0..=total, 0..=total, 0..=total).prop_map(
            |(total, read, studied, repeated)| PageCounts {
                total,
                read,
                studied,
                repeated,
            },
        )
    })
}

fn exercise_status() -> impl Strategy<Value = ExerciseStatus> {
    prop_oneof![
        Just(ExerciseStatus::DaFare),
        Just(ExerciseStatus::InCorso),
        Just(ExerciseStatus::Fatto),
    ]
}

fn study_file() -> impl Strategy<Value = StudyFile> {
    prop_oneof![
        page_counts().prop_map(notes),
        prop::collection::vec(exercise_status(), 0..12).prop_map(exercises),
    ]
}

fn page_field() -> impl Strategy<Value = PageField> {
    prop_oneof![
        Just(PageField::Total),
        Just(PageField::Read),
        Just(PageField::Studied),
        Just(PageField::Repeated),
    ]
}

proptest! {
    #[test]
    fn snap_is_idempotent(x in -100_000i32..100_000) {
        let once = snap_to_grid(x, SNAP_MINUTES);
        prop_assert_eq!(snap_to_grid(once, SNAP_MINUTES), once);
        prop_assert_eq!(once % SNAP_MINUTES, 0);
    }

    #[test]
    fn quarter_hours_survive_pixel_round_trip(
        slot in 0i32..=64,
        row_height in prop_oneof![Just(40.0f64), Just(48.0), Just(60.0), Just(72.0), Just(100.0)],
    ) {
        let g = GridGeometry { row_height_px: row_height, ..GridGeometry::default() };
        let minutes = g.open_minutes() + slot * 15;
        prop_assume!(minutes <= g.close_minutes());
        let back = g.pixel_to_minutes(g.minutes_to_pixel(minutes));
        prop_assert_eq!(minutes_to_time_of_day(back), minutes_to_time_of_day(minutes));
    }

    #[test]
    fn progress_stays_in_bounds(files in prop::collection::vec(study_file(), 0..6)) {
        let p = calc_progress(&files);
        prop_assert!(p <= 100);
        let weightless = files.iter().all(|f| match f.kind {
            FileKind::Appunti => f.pages.total == 0,
            FileKind::Esercizi => f.exercises.is_empty(),
        });
        if weightless {
            prop_assert_eq!(p, 0);
        }
    }

    #[test]
    fn more_pages_never_lower_the_score(
        pages in page_counts(),
        field in prop_oneof![Just(PageField::Read), Just(PageField::Studied), Just(PageField::Repeated)],
        bump in 1u32..50,
    ) {
        prop_assume!(pages.total > 0);
        let before = file_score(&notes(pages)).unwrap();
        let mut raised = pages;
        raised.set(field, pages.get(field).saturating_add(bump));
        let after = file_score(&notes(raised)).unwrap();
        prop_assert!(after >= before - 1e-12);
    }

    #[test]
    fn page_edits_keep_counters_within_total(
        pages in page_counts(),
        edits in prop::collection::vec((page_field(), 0u32..600, any::<bool>()), 1..20),
    ) {
        let mut p = pages;
        for (field, value, step) in edits {
            if step {
                p.step(field, value % 2 == 0);
            } else {
                p.set(field, value);
            }
            prop_assert!(p.read <= p.total);
            prop_assert!(p.studied <= p.total);
            prop_assert!(p.repeated <= p.total);
        }
    }

    #[test]
    fn chart_segments_cover_the_total(
        total in 1u32..1000,
        read in 0u32..1200,
        studied in 0u32..1200,
        repeated in 0u32..1200,
    ) {
        let bar = stacked_bar(&PageCounts { total, read, studied, repeated }).unwrap();
        let pages: u32 = bar.segments().iter().map(|s| s.pages).sum();
        let percent: f64 = bar.segments().iter().map(|s| s.percent).sum();
        prop_assert_eq!(pages, total);
        prop_assert!((percent - 100.0).abs() < 1e-6);
        prop_assert!(bar.segments().iter().all(|s| s.percent >= 0.0));
    }
}

#[test]
fn test_mixed_exam_progress_example() {
    use ExerciseStatus::*;
    let files = vec![
        notes(PageCounts {
            total: 100,
            read: 80,
            studied: 50,
            repeated: 20,
        }),
        exercises(vec![Fatto, Fatto, InCorso, DaFare]),
    ];
    assert!((file_score(&files[0]).unwrap() - 0.41).abs() < 1e-9);
    assert!((file_score(&files[1]).unwrap() - 0.625).abs() < 1e-9);
    assert_eq!(calc_progress(&files), 42);
}

#[test]
fn test_empty_chart_is_no_data() {
    assert!(stacked_bar(&PageCounts::default()).is_none());
}
