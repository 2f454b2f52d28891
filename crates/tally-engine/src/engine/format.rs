//! Fixed-width display formatting for grid cells.

use super::Value;

/// Format a value so it occupies exactly `width` characters.
pub fn format_value(value: &Value, width: usize) -> String {
    match value {
        Value::Integer(n) => format_integer(*n, width),
        Value::Text(s) => format_text(s, width),
        Value::Boolean(b) => format_centered(if *b { "TRUE" } else { "FALSE" }, width),
        Value::Error(e) => format_centered(e.as_code(), width),
    }
}

/// Left-aligned, truncated or right-padded.
pub fn format_text(s: &str, width: usize) -> String {
    let mut out: String = s.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat_n(' ', width - len));
    out
}

/// Centered word, extra padding on the right; `#` fill if it does not fit.
pub fn format_centered(word: &str, width: usize) -> String {
    let len = word.chars().count();
    if len > width {
        return "#".repeat(width);
    }
    let left = (width - len) / 2;
    let right = width - len - left;
    format!("{}{}{}", " ".repeat(left), word, " ".repeat(right))
}

/// Right-aligned decimal, falling back to scientific notation (`1.23E+9`)
/// when the full number does not fit.
pub fn format_integer(n: i64, width: usize) -> String {
    let full = n.to_string();
    if full.len() <= width {
        return format!("{full:>width$}");
    }

    let sign = if n < 0 { "-" } else { "" };
    let digits = n.unsigned_abs().to_string();
    let unsigned_width = width.saturating_sub(sign.len());
    let exp = (digits.len() - 1).to_string();

    // Leading digit, 'E' and '+'.
    if unsigned_width < 3 + exp.len() {
        return "#".repeat(width);
    }

    let mantissa = if unsigned_width < 5 + exp.len() {
        digits[..1].to_string()
    } else {
        let precision = (unsigned_width - 4 - exp.len()).min(digits.len() - 1);
        format!("{}.{}", &digits[..1], &digits[1..1 + precision])
    };

    let res = format!("{sign}{mantissa}E+{exp}");
    format!("{res:>width$}")
}
