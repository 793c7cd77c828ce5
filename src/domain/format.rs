// Value label formatting for chart annotations

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

/// Formats `value` with `digits` significant digits and an SI prefix,
/// matching d3-format's `s` type (`.2s`: 1234 -> "1.2k", 120 -> "120").
pub fn format_si(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let digits = digits.clamp(1, 21);
    let sign = if value.is_sign_negative() && value != 0.0 { "-" } else { "" };
    let x = value.abs();

    let (coefficient, exponent) = decimal_parts(x, digits);
    let prefix_exponent = exponent.div_euclid(3).clamp(-8, 8);
    let i = exponent - prefix_exponent * 3 + 1;
    let n = coefficient.len() as i32;

    let body = if i == n {
        coefficient
    } else if i > n {
        format!("{}{}", coefficient, "0".repeat((i - n) as usize))
    } else if i > 0 {
        let (whole, fraction) = coefficient.split_at(i as usize);
        format!("{}.{}", whole, fraction)
    } else {
        let precision = (digits as i32 + i - 1).max(1) as usize;
        let (tail, _) = decimal_parts(x, precision);
        format!("0.{}{}", "0".repeat((-i) as usize), tail)
    };

    let suffix = SI_PREFIXES[(prefix_exponent + 8) as usize];
    format!("{}{}{}", sign, body, suffix)
}

/// Splits `x` into its significant digits (no decimal point) and decimal exponent.
fn decimal_parts(x: f64, digits: usize) -> (String, i32) {
    let formatted = format!("{:.*e}", digits - 1, x);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => (
            mantissa.replace('.', ""),
            exponent.parse().unwrap_or_default(),
        ),
        None => (formatted, 0),
    }
}
