use kira_caltrace::{DetectionConfig, Response, Trace};

/// Flat 1.0 baseline, linear rise frames 50..=70 to 2.0, linear decay back
/// to 1.0 by frame 100, flat afterwards. 150 samples.
fn transient_values() -> Vec<f64> {
    let mut values = vec![1.0; 150];
    for (i, v) in values.iter_mut().enumerate() {
        let f = i as f64;
        if (50..=70).contains(&i) {
            *v = 1.0 + (f - 50.0) * 0.05;
        } else if (71..100).contains(&i) {
            *v = 2.0 - (f - 70.0) / 30.0;
        }
    }
    values
}

fn transient_response() -> Response {
    Response::new(
        1,
        1,
        "control",
        Trace::new(0, transient_values()),
        DetectionConfig::default(),
    )
    .unwrap()
}

#[test]
fn end_to_end_synthetic_transient() {
    let response = transient_response();
    let indices = response.indices();
    assert!((indices.onset_idx - 50).abs() <= 2, "onset {}", indices.onset_idx);
    assert!((indices.peak_idx - 70).abs() <= 1, "peak {}", indices.peak_idx);
    assert!((response.amplitude() - 1.0).abs() < 0.05);

    let mut warnings = Vec::new();
    let influx = response.influx_rate(&mut warnings).unwrap();
    let eflux = response.eflux_rate(&mut warnings).unwrap();
    assert!(influx > 0.0);
    assert!(eflux < 0.0);
    assert!(warnings.is_empty());
}

#[test]
fn index_ordering_invariant_holds() {
    let response = transient_response();
    let s = response.indices();
    assert!(s.onset_idx <= s.influx_end_idx);
    assert!(s.influx_end_idx < s.eflux_start_idx);
    assert!(s.eflux_start_idx <= s.eflux_end_idx);
    assert!(s.baseline_return_idx >= s.eflux_start_idx);
}

#[test]
fn peak_override_is_idempotent() {
    let mut response = transient_response();
    response.set_peak_idx(68);
    let once = *response.indices();
    response.set_peak_idx(68);
    assert_eq!(once, *response.indices());
    assert_eq!(once.peak_idx, 68);
    assert_eq!(once.eflux_start_idx, 68 + 5);
}

#[test]
fn onset_override_is_idempotent_and_moves_influx_start() {
    let mut response = transient_response();
    response.set_onset_idx(48);
    let once = *response.indices();
    response.set_onset_idx(48);
    assert_eq!(once, *response.indices());
    assert_eq!(once.onset_idx, 48);
    assert_eq!(once.influx_start_idx, 48);
}

#[test]
fn shift_round_trip_is_identity() {
    let mut response = transient_response();
    let before = *response.indices();
    response.shift(9);
    let shifted = *response.indices();
    assert_eq!(shifted.onset_idx, before.onset_idx + 9);
    assert_eq!(shifted.peak_idx, before.peak_idx + 9);
    response.shift(-9);
    assert_eq!(before, *response.indices());
    assert_eq!(response.trace().first_frame(), 0);
}

#[test]
fn tau_reaches_one_over_e_crossing() {
    let response = transient_response();
    // Amplitude 1.0, crossing at value 1.368: first frame at or below is 89
    // on a decay of 1/30 per frame from frame 70.
    let tau = response.tau().unwrap();
    assert!((tau - 19.0).abs() < 1.5, "tau {}", tau);
}

#[test]
fn tau_uses_time_axis_when_present() {
    let time: Vec<f64> = (0..150).map(|i| 0.5 * i as f64).collect();
    let response = Response::new(
        1,
        1,
        "control",
        Trace::with_time(0, transient_values(), time),
        DetectionConfig::default(),
    )
    .unwrap();
    let tau = response.tau().unwrap();
    assert!((tau - 9.5).abs() < 0.75, "tau {}", tau);
}

#[test]
fn integral_positive_over_transient() {
    let response = transient_response();
    // Triangle of height 1.0 over ~50 frames above baseline: area well
    // above zero but below the full-height rectangle.
    let integral = response.integral().unwrap();
    assert!(integral > 60.0 && integral < 90.0, "integral {}", integral);
}

#[test]
fn degenerate_influx_window_errors() {
    let mut response = transient_response();
    // Force the peak onto the onset: influx window collapses.
    response.set_peak_idx(response.indices().onset_idx);
    let mut warnings = Vec::new();
    assert!(response.influx_rate(&mut warnings).is_err());
}
