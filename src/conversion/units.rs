/// Convert a FIT semicircle angle to degrees. The domain is the full signed
/// 32-bit range; no rounding happens here.
pub fn semicircles_to_degrees(semicircles: i64) -> f64 {
    semicircles as f64 * 180.0 / 2_147_483_648.0
}

/// Render a number with ten fixed decimals, then trim trailing zeros and a
/// bare trailing point. Every numeric field in the output goes through this,
/// so the rounding behavior is part of the document format, not cosmetics.
/// Never produces scientific notation; integral values render without a
/// fraction ("5", not "5.0").
pub fn format_number(value: f64) -> String {
    let mut formatted = format!("{value:.10}");
    while formatted.ends_with('0') {
        formatted.pop();
    }
    if formatted.ends_with('.') {
        formatted.pop();
    }
    formatted
}
