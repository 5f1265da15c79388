/// Extract a short type name from the full module path.
///
/// Given `"my_crate::some_module::MyType"`, returns `"MyType"`.
pub fn short_type_name(full: &str) -> &str {
    full.rsplit("::").next().unwrap_or(full)
}

/// `numerator / denominator * 100`, or 0 when the denominator is 0.
pub fn percent(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

/// `numerator / denominator`, or 0 when the denominator is 0.
pub fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Mean of the given durations rounded to whole seconds, 0 for an empty set.
pub fn mean_duration<I>(durations: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    let (total, count) = durations
        .into_iter()
        .fold((0u64, 0u64), |(sum, n), d| (sum + d, n + 1));
    if count == 0 {
        0
    } else {
        (total as f64 / count as f64).round() as u64
    }
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
