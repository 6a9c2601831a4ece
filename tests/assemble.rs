use kira_caltrace::assemble::{build_experiment, build_sample};
use kira_caltrace::naming::CurrentNaming;
use kira_caltrace::preprocess::Preprocessor;
use kira_caltrace::table::{Column, Table};
use kira_caltrace::{DetectionConfig, PreprocessConfig};

/// Raw acquisition counts: baseline around `scale`, transient rising from
/// row 50 to a doubled level at row 70, decayed by row 100, plus a constant
/// background offset.
fn raw_signal(scale: f64, rows: usize) -> Vec<f64> {
    (0..rows)
        .map(|i| {
            let f = i as f64;
            let t = if (50..=70).contains(&i) {
                1.0 + (f - 50.0) * 0.05
            } else if (71..100).contains(&i) {
                2.0 - (f - 70.0) / 30.0
            } else {
                1.0
            };
            scale * t + 11.0
        })
        .collect()
}

fn raw_table(rows: usize) -> Table {
    Table::new(
        vec![
            Column::new("Time", (0..rows).map(|i| 0.5 * i as f64).collect()),
            Column::new("ROI 9 (Average)", vec![10.0; rows]),
            Column::new("ROI 10 (Average)", vec![12.0; rows]),
            Column::new("ROI 1 (Average)", raw_signal(100.0, rows)),
            Column::new("ROI 2 (Average)", raw_signal(80.0, rows)),
        ],
        Some("Time"),
        &["ROI 9 (Average)", "ROI 10 (Average)"],
    )
    .unwrap()
}

#[test]
fn raw_table_to_experiment() {
    let preprocessor = Preprocessor::new(PreprocessConfig::default());
    let detection = DetectionConfig::default();

    let (s1, w1) = build_sample(
        "1 - control",
        &raw_table(160),
        &CurrentNaming,
        &preprocessor,
        &detection,
    )
    .unwrap();
    let (s2, _) = build_sample(
        "2 - shNCLX",
        &raw_table(160),
        &CurrentNaming,
        &preprocessor,
        &detection,
    )
    .unwrap();
    assert!(w1.is_empty(), "warnings: {:?}", w1);
    assert_eq!(s1.len(), 2);
    assert_eq!(s1.group_label, "control");

    let exp = build_experiment("fish_NCLX", vec![s2, s1]).unwrap();
    let labels: Vec<&str> = exp.iter().map(|g| g.group_label.as_str()).collect();
    assert_eq!(labels, vec!["control", "shNCLX"]);

    let (records, _) = exp.full_analysis();
    assert_eq!(records.len(), 4);
    for r in &records {
        assert!((r.onset_frame - 50).abs() <= 2, "onset {}", r.onset_frame);
        assert!((r.peak_frame - 70).abs() <= 1, "peak {}", r.peak_frame);
        assert!((r.amplitude.unwrap() - 1.0).abs() < 0.1);
        assert!(r.influx.unwrap() > 0.0);
        assert!(r.eflux.unwrap() < 0.0);
        // Elapsed time runs on the acquisition clock (0.5 s per frame).
        let tau = r.tau.unwrap();
        assert!((tau - 9.5).abs() < 1.0, "tau {}", tau);
    }
}

#[test]
fn unparseable_stem_is_rejected() {
    let preprocessor = Preprocessor::new(PreprocessConfig::default());
    let err = build_sample(
        "notes about nothing",
        &raw_table(160),
        &CurrentNaming,
        &preprocessor,
        &DetectionConfig::default(),
    );
    assert!(err.is_err());
}

#[test]
fn unrecognized_columns_are_skipped_with_warning() {
    let rows = 160;
    let mut columns = vec![
        Column::new("Time", (0..rows).map(|i| 0.5 * i as f64).collect()),
        Column::new("ROI 9 (Average)", vec![10.0; rows]),
        Column::new("ROI 1 (Average)", raw_signal(100.0, rows)),
    ];
    columns.push(Column::new("junk annotation", raw_signal(90.0, rows)));
    let table = Table::new(columns, Some("Time"), &["ROI 9 (Average)"]).unwrap();

    let (sample, warnings) = build_sample(
        "4 - control",
        &table,
        &CurrentNaming,
        &Preprocessor::new(PreprocessConfig::default()),
        &DetectionConfig::default(),
    )
    .unwrap();
    assert_eq!(sample.len(), 1);
    assert!(warnings.iter().any(|w| w.contains("junk annotation")));
}
