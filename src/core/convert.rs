//! Pure amount conversion.

/// Converts user-entered `amount` text at `rate`, returning the result with
/// exactly two fractional digits.
///
/// Returns `None` when the amount does not parse to a finite number or the
/// product overflows; callers display nothing in that case instead of an
/// error. Ties round half away from zero, so `convert("0.125", 1.0)` is
/// `"0.13"`.
pub fn convert(amount: &str, rate: f64) -> Option<String> {
    let amount: f64 = amount.trim().parse().ok()?;
    if !amount.is_finite() {
        return None;
    }

    let scaled = (amount * rate * 100.0).round();
    if !scaled.is_finite() {
        return None;
    }

    // Collapse -0.0 so tiny negative amounts do not display as "-0.00".
    let value = if scaled == 0.0 { 0.0 } else { scaled / 100.0 };
    Some(format!("{value:.2}"))
}
