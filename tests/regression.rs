use kira_caltrace::math::regression::linear_fit;
use kira_caltrace::CalTraceError;
use kira_caltrace::Trace;

/// Closed-form OLS on (x, y) pairs, for cross-checking.
fn reference_fit(points: &[(f64, f64)]) -> (f64, f64) {
    let n = points.len() as f64;
    let sx: f64 = points.iter().map(|p| p.0).sum();
    let sy: f64 = points.iter().map(|p| p.1).sum();
    let sxx: f64 = points.iter().map(|p| p.0 * p.0).sum();
    let sxy: f64 = points.iter().map(|p| p.0 * p.1).sum();
    let slope = (n * sxy - sx * sy) / (n * sxx - sx * sx);
    let intercept = (sy - slope * sx) / n;
    (slope, intercept)
}

fn residual_sum_of_squares(points: &[(f64, f64)], slope: f64, intercept: f64) -> f64 {
    points
        .iter()
        .map(|&(x, y)| {
            let r = y - (intercept + slope * x);
            r * r
        })
        .sum()
}

#[test]
fn matches_closed_form_on_noisy_line() {
    // Deterministic pseudo-noise around y = 0.3x + 1.2.
    let values: Vec<f64> = (0..50)
        .map(|i| {
            let noise = ((i * 7919) % 13) as f64 / 13.0 - 0.5;
            0.3 * i as f64 + 1.2 + 0.2 * noise
        })
        .collect();
    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect();
    let trace = Trace::new(0, values);

    let fit = linear_fit(&trace, 0, 49).unwrap();
    let (slope, intercept) = reference_fit(&points);
    assert!((fit.slope - slope).abs() < 1e-9);
    assert!((fit.intercept - intercept).abs() < 1e-9);
}

#[test]
fn fit_is_least_squares_optimal() {
    let values: Vec<f64> = (0..30)
        .map(|i| 1.0 + 0.1 * i as f64 + if i % 2 == 0 { 0.05 } else { -0.05 })
        .collect();
    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect();
    let trace = Trace::new(0, values);
    let fit = linear_fit(&trace, 0, 29).unwrap();

    let best = residual_sum_of_squares(&points, fit.slope, fit.intercept);
    for ds in [-0.01, 0.01] {
        for di in [-0.01, 0.01] {
            let perturbed =
                residual_sum_of_squares(&points, fit.slope + ds, fit.intercept + di);
            assert!(perturbed >= best);
        }
    }
}

#[test]
fn window_bounds_are_inclusive() {
    let trace = Trace::new(0, vec![0.0, 1.0, 2.0, 10.0]);
    // [0, 2] excludes the outlier at frame 3.
    let fit = linear_fit(&trace, 0, 2).unwrap();
    assert!((fit.slope - 1.0).abs() < 1e-12);
}

#[test]
fn degenerate_windows_rejected() {
    let trace = Trace::new(0, vec![1.0; 10]);
    for (start, end) in [(5, 5), (5, 4), (9, 0)] {
        let err = linear_fit(&trace, start, end).unwrap_err();
        assert!(matches!(err, CalTraceError::InvalidWindow { .. }));
    }
}
