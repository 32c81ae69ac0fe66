/// Format whole seconds as `mm:ss`.
///
/// Minutes are not wrapped at the hour, so 3725 seconds is `62:05`.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Fraction of `duration` covered by `position`, clamped to `[0, 1]`.
///
/// A zero duration yields 0 rather than dividing.
pub fn progress_fraction(position_seconds: u64, duration_seconds: u64) -> f64 {
    if duration_seconds == 0 {
        return 0.0;
    }
    (position_seconds as f64 / duration_seconds as f64).clamp(0.0, 1.0)
}
