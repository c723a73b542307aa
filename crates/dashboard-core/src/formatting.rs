/// Render `value` with `decimals` fractional digits and comma-grouped
/// thousands. Non-finite input renders as `"N/A"`.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_number;
///
/// assert_eq!(format_number(8760.25, 1), "8,760.3");
/// assert_eq!(format_number(2_191_800.0, 0), "2,191,800");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-412.75, 1), "-412.8");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }

    // Scale up by one ulp so decimal halves stored just below .5 round up.
    let scale = 10_f64.powi(decimals as i32);
    let magnitude = (value.abs() * scale * (1.0 + f64::EPSILON)).round() / scale;

    let digits = format!("{:.*}", decimals as usize, magnitude);
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0.0 && magnitude != 0.0 {
        out.push('-');
    }
    out.push_str(&group_thousands(whole));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Format a euro amount with two decimals and thousands separators.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_currency;
///
/// assert_eq!(format_currency(1520.4), "€1,520.40");
/// assert_eq!(format_currency(-3.125), "€-3.13");
/// ```
pub fn format_currency(amount: f64) -> String {
    format!("€{}", format_number(amount, 2))
}

/// `"1,234 kWh"` style energy figure.
pub fn format_energy(kwh: f64, decimals: u32) -> String {
    format!("{} kWh", format_number(kwh, decimals))
}

/// `"12.34 cents/kWh"` style price figure.
pub fn format_price(cents_per_kwh: f64) -> String {
    format!("{} cents/kWh", format_number(cents_per_kwh, 2))
}

/// `"-4.5 °C"` style temperature figure.
pub fn format_temperature(celsius: f64) -> String {
    format!("{:.1} °C", celsius)
}

/// Format an optional statistic, substituting `"N/A"` when undefined.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_optional;
///
/// assert_eq!(format_optional(Some(2.345), 2), "2.35");
/// assert_eq!(format_optional(None, 2), "N/A");
/// ```
pub fn format_optional(value: Option<f64>, decimals: u32) -> String {
    match value {
        Some(v) => format_number(v, decimals),
        None => "N/A".to_string(),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// `"1234567"` → `"1,234,567"` for an ASCII digit string.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

// ── Tests ──────────────────────────────────────────────────────────────────────
