use ordered_float::OrderedFloat;

/// Rounds `value` to the nearest multiple of `step`, half away from zero.
///
/// The sign of negative inputs is preserved. A non-positive or non-finite
/// `step` returns `value` unchanged.
#[must_use]
pub fn round_to_nearest(value: f64, step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 || !value.is_finite() {
        return value;
    }
    let magnitude = (value.abs() / step).round() * step;
    if value < 0.0 { -magnitude } else { magnitude }
}

#[must_use]
pub fn round_to_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Min/max over the finite values of an iterator, `None` when empty.
#[must_use]
pub fn value_extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let mut extent: Option<(OrderedFloat<f64>, OrderedFloat<f64>)> = None;
    for value in values.into_iter().filter(|v| v.is_finite()) {
        let value = OrderedFloat(value);
        extent = Some(match extent {
            None => (value, value),
            Some((min, max)) => (min.min(value), max.max(value)),
        });
    }
    extent.map(|(min, max)| (min.into_inner(), max.into_inner()))
}

/// Formats a number with a space as thousands separator and up to three
/// fraction digits, e.g. `1234567.5` -> `"1 234 567.5"`.
#[must_use]
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = (value * 1000.0).round() / 1000.0;
    let negative = rounded < 0.0;
    let text = format!("{:.3}", rounded.abs());
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3 + 4);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(fraction);
    }
    out
}
