/// Formats a float the way the stash files and the legacy editor print them:
/// shortest round-trip digits, always with a fractional part (`1.0`), and
/// scientific notation outside `1e-4..1e16` (`1e+16`, `1.5e-05`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..16).contains(&exponent) {
        let mut plain = value.to_string();
        if !plain.contains('.') {
            plain.push_str(".0");
        }
        plain
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    }
}

/// Parses user or file text as a float, accepting surrounding whitespace.
pub fn parse_float(text: &str) -> Result<f64, std::num::ParseFloatError> {
    text.trim().parse::<f64>()
}
