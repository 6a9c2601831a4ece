use kira_caltrace::schema::{FullAnalysisRecord, MetricKind, MetricRecord};

#[test]
fn metric_record_roundtrip() {
    let record = MetricRecord {
        group_label: "control".to_string(),
        sample_id: 3,
        response_id: 14,
        value: Some(-0.021),
    };
    let json = serde_json::to_string(&record).unwrap();
    let decoded: MetricRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded.group_label, "control");
    assert_eq!(decoded.sample_id, 3);
    assert_eq!(decoded.response_id, 14);
    assert_eq!(decoded.value, Some(-0.021));
}

#[test]
fn missing_value_serializes_as_null() {
    let record = MetricRecord {
        group_label: "control".to_string(),
        sample_id: 1,
        response_id: 1,
        value: None,
    };
    let json = serde_json::to_string(&record).unwrap();
    assert!(json.contains("\"value\":null"));
    let decoded: MetricRecord = serde_json::from_str(&json).unwrap();
    assert!(decoded.value.is_none());
}

#[test]
fn full_analysis_record_roundtrip() {
    let record = FullAnalysisRecord {
        group_label: "shNCLX".to_string(),
        sample_id: 2,
        response_id: 7,
        onset_frame: 49,
        peak_frame: 70,
        eflux: Some(-0.03),
        influx: Some(0.05),
        amplitude: Some(0.98),
        integral: None,
        tau: Some(19.0),
    };
    let json = serde_json::to_string(&record).unwrap();
    let decoded: FullAnalysisRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded.onset_frame, 49);
    assert_eq!(decoded.peak_frame, 70);
    assert!(decoded.integral.is_none());
    assert_eq!(decoded.tau, Some(19.0));
}

#[test]
fn metric_kind_snake_case() {
    let json = serde_json::to_string(&MetricKind::Eflux).unwrap();
    assert_eq!(json, "\"eflux\"");
    let decoded: MetricKind = serde_json::from_str("\"tau\"").unwrap();
    assert_eq!(decoded, MetricKind::Tau);
}
