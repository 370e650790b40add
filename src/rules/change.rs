/// Percentage change from `previous` to `current`.
///
/// Returns `None` when there is no previous value or it is zero, so a pair's
/// first observation never reports a change.
pub fn percent_change(current: f64, previous: Option<f64>) -> Option<f64> {
    match previous {
        Some(prev) if prev != 0.0 => Some(((current - prev) / prev) * 100.0),
        _ => None,
    }
}
