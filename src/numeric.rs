//! Round-tripping numeric formatting (spec §6).
//!
//! Mirrors `tomsolver::ToString`: fixed notation with 16 fraction digits in
//! the common range, scientific notation with 16 mantissa digits once the
//! magnitude leaves `[1e-16, 1e16)`, trailing zeros (and a trailing `.`)
//! stripped in both cases, and an exact `"0"` for zero.

/// Renders `value` so that parsing it back reproduces the same `f64`.
pub fn to_string(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let abs = value.abs();
    if abs >= 1.0e16 || abs <= 1.0e-16 {
        format_scientific(value)
    } else {
        format_fixed(value)
    }
}

fn strip_trailing(mantissa: &str) -> String {
    if !mantissa.contains('.') {
        return mantissa.to_string();
    }
    let trimmed = mantissa.trim_end_matches('0');
    trimmed.trim_end_matches('.').to_string()
}

fn format_fixed(value: f64) -> String {
    let formatted = format!("{:.16}", value);
    strip_trailing(&formatted)
}

fn format_scientific(value: f64) -> String {
    let formatted = format!("{:.16e}", value);
    let (mantissa, exponent) = formatted.split_once('e').expect("format! always emits 'e'");
    let mantissa = strip_trailing(mantissa);
    // Rust's exponent has no leading '+', unlike printf's "%e"; keep that
    // form since the spec only requires round-trip parseability, not a
    // byte-identical rendering to the C original.
    format!("{}e{}", mantissa, exponent)
}
