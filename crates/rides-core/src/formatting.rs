/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use rides_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let scale = 10_f64.powi(decimals as i32);
    let magnitude = value.abs();
    // Half an ULP at the target precision pushes exact midpoints up.
    let rounded = (magnitude * scale + f64::EPSILON * magnitude * scale).round() / scale;

    let fixed = format!("{:.*}", decimals as usize, rounded);
    let (digits, fraction) = match fixed.split_once('.') {
        Some((digits, fraction)) => (digits, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    if value < 0.0 && rounded != 0.0 {
        out.push('-');
    }
    out.push_str(&group_thousands(digits));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Format a rental count: whole numbers get separators only, fractional
/// values (means) keep two decimals.
///
/// # Examples
///
/// ```
/// use rides_core::formatting::format_count;
///
/// assert_eq!(format_count(3_292_679.0), "3,292,679");
/// assert_eq!(format_count(189.4631), "189.46");
/// ```
pub fn format_count(value: f64) -> String {
    if value.fract() == 0.0 {
        format_number(value, 0)
    } else {
        format_number(value, 2)
    }
}

/// Format `part` as a share of `whole`, e.g. `"18.8%"`.
pub fn format_share(part: f64, whole: f64) -> String {
    format!("{}%", format_number(percentage(part, whole, 1), 1))
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero to avoid division by zero.
///
/// # Examples
///
/// ```
/// use rides_core::formatting::percentage;
///
/// assert!((percentage(50.0, 200.0, 1) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(0.0, 0.0, 2), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let raw = (part / whole) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of a digit string.
fn group_thousands(digits: &str) -> String {
    let lead = match digits.len() % 3 {
        0 => 3.min(digits.len()),
        n => n,
    };
    let mut groups = vec![&digits[..lead]];
    groups.extend((lead..digits.len()).step_by(3).map(|i| &digits[i..i + 3]));
    groups.join(",")
}

// ── Tests ──────────────────────────────────────────────────────────────────────
