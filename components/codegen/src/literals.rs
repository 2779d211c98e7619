//! Printing of number and string literals

use std::fmt::Write;

/// Shortest source text for a finite number.
///
/// Candidates are the plain decimal form (`.5`, `1500`), the integer
/// mantissa form (`15e-8`) and the dotted mantissa form (`1.5e-7`). The
/// shortest one wins, plain decimal on ties.
///
/// # Examples
///
/// ```
/// use codegen::format_number;
///
/// assert_eq!(format_number(0.5), ".5");
/// assert_eq!(format_number(1000.0), "1e3");
/// assert_eq!(format_number(-0.5), "-.5");
/// assert_eq!(format_number(123.0), "123");
/// ```
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        // Not reachable from source literals, folding never produces them
        return if value.is_nan() {
            "NaN".to_string()
        } else if value > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }
    if value < 0.0 {
        return format!("-{}", format_number(-value));
    }

    let mut buffer = ryu::Buffer::new();
    let text = buffer.format_finite(value);
    let (mantissa, exponent) = match text.split_once('e') {
        Some((m, e)) => (m, e.parse::<i64>().unwrap_or(0)),
        None => (text, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    // value = 0.<digits> * 10^point
    let all_digits = format!("{}{}", int_part, frac_part);
    let mut point = int_part.len() as i64 + exponent;
    let trimmed = all_digits.trim_start_matches('0');
    point -= (all_digits.len() - trimmed.len()) as i64;
    let digits = trimmed.trim_end_matches('0');
    let len = digits.len() as i64;

    let decimal = if point <= 0 {
        format!(".{}{}", "0".repeat((-point) as usize), digits)
    } else if point < len {
        format!("{}.{}", &digits[..point as usize], &digits[point as usize..])
    } else {
        format!("{}{}", digits, "0".repeat((point - len) as usize))
    };

    let mut best = decimal;
    let integer_mantissa = format!("{}e{}", digits, point - len);
    if integer_mantissa.len() < best.len() {
        best = integer_mantissa;
    }
    if len > 1 {
        let dotted = format!("{}.{}e{}", &digits[..1], &digits[1..], point - 1);
        if dotted.len() < best.len() {
            best = dotted;
        }
    }
    best
}

/// Quote a string value, choosing the quote that needs fewer escapes
/// (double quotes on ties). Control characters, line separators and every
/// character at or above `ascii_threshold` are escaped.
///
/// # Examples
///
/// ```
/// use codegen::quote_string;
///
/// assert_eq!(quote_string("it's", 128), "\"it's\"");
/// assert_eq!(quote_string("say \"hi\"", 128), "'say \"hi\"'");
/// assert_eq!(quote_string("é", 128), "\"\\xe9\"");
/// ```
pub fn quote_string(value: &str, ascii_threshold: u32) -> String {
    let singles = value.chars().filter(|c| *c == '\'').count();
    let doubles = value.chars().filter(|c| *c == '"').count();
    let quote = if doubles > singles { '\'' } else { '"' };

    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c == '\u{2028}' || c == '\u{2029}' || (c as u32) >= ascii_threshold => {
                push_escape(&mut out, c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn push_escape(out: &mut String, ch: char) {
    let code = ch as u32;
    // Writing into a String cannot fail
    let _ = if code <= 0xff {
        write!(out, "\\x{:02x}", code)
    } else if code <= 0xffff {
        write!(out, "\\u{:04x}", code)
    } else {
        let mut units = [0u16; 2];
        let mut result = Ok(());
        for unit in ch.encode_utf16(&mut units) {
            result = result.and(write!(out, "\\u{:04x}", unit));
        }
        result
    };
}
