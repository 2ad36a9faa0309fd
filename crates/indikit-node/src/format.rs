//! Number formatting and parsing driven by the `@format` attribute of
//! number definitions.
//!
//! Two families are supported. Printf-style directives (`%d`, `%u`,
//! `%x`, `%X` for integers, `%f`, `%e`, `%g` for floats, with optional
//! flags, width, and precision) render the way C's `printf` does.
//! Sexagesimal directives `%<w>.<f>m` render degrees (or hours) split
//! into minutes and seconds; the fraction width `f` selects one of five
//! layouts:
//!
//! | `f` | layout       |
//! |-----|--------------|
//! | 3   | `d:mm`       |
//! | 5   | `d:mm.m`     |
//! | 6   | `d:mm:ss`    |
//! | 8   | `d:mm:ss.s`  |
//! | 9   | `d:mm:ss.ss` |
//!
//! The family is chosen by which conversion letters the format string
//! contains, and an incompatible format logs an error and yields `"0"`
//! or `"0.0"` rather than failing.

use std::sync::OnceLock;

use regex::Regex;

fn directive_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([^%]*)%([-+0 #]*)(\d+)?(?:\.(\d+))?(?:hh|h|ll|l|z)?([duxXfeg])([^%]*)$")
            .unwrap()
    })
}

fn sexagesimal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^%]*%(\d+)\.(\d+)m$").unwrap())
}

struct Directive {
    prefix: String,
    flags: String,
    width: usize,
    precision: Option<usize>,
    conversion: char,
    suffix: String,
}

fn parse_directive(format: &str) -> Option<Directive> {
    let captures = directive_regex().captures(format)?;
    Some(Directive {
        prefix: captures[1].to_owned(),
        flags: captures[2].to_owned(),
        width: captures
            .get(3)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0),
        precision: captures.get(4).and_then(|m| m.as_str().parse().ok()),
        conversion: captures[5].chars().next()?,
        suffix: captures[6].to_owned(),
    })
}

impl Directive {
    /// Applies sign, zero padding, and field width around an unsigned
    /// body, then wraps the literal text surrounding the directive.
    fn finish(&self, sign: &str, body: String) -> String {
        let mut text = format!("{sign}{body}");
        if text.len() < self.width {
            if self.flags.contains('-') {
                text = format!("{text:<width$}", width = self.width);
            } else if self.flags.contains('0') {
                let pad = "0".repeat(self.width - text.len());
                text = format!("{sign}{pad}{body}");
            } else {
                text = format!("{text:>width$}", width = self.width);
            }
        }
        format!("{}{}{}", self.prefix, text, self.suffix)
    }

    fn sign_for(&self, negative: bool) -> &'static str {
        if negative {
            "-"
        } else if self.flags.contains('+') {
            "+"
        } else if self.flags.contains(' ') {
            " "
        } else {
            ""
        }
    }
}

/// Renders `value` according to a printf-style or sexagesimal format.
/// An incompatible format logs an error and yields `"0.0"`.
pub fn format_f64(format: &str, value: f64) -> String {
    if format.contains(['f', 'e', 'g']) {
        if let Some(directive) = parse_directive(format) {
            if matches!(directive.conversion, 'f' | 'e' | 'g') {
                return format_float_directive(&directive, value);
            }
        }
        if !format.contains('%') {
            return format.to_owned();
        }
    } else if let Some(text) = format_sexagesimal(format, value) {
        return text;
    }
    log::error!("format `{format}` is not usable for a float value");
    "0.0".to_owned()
}

/// Parses the text of a number leaf back into a float. Printf-family
/// formats read a plain decimal; sexagesimal formats read `d:mm[:ss]`
/// with fractional minutes or seconds, yielding NaN for out-of-range
/// minutes or seconds. An incompatible format logs an error and yields
/// zero.
pub fn parse_f64(format: &str, text: &str) -> f64 {
    if format.contains(['f', 'e', 'g']) {
        scan_f64(text).map(|(value, _)| value).unwrap_or(0.0)
    } else if sexagesimal_regex().is_match(format) {
        parse_sexagesimal(text)
    } else {
        log::error!("format `{format}` is not usable for a float value");
        0.0
    }
}

/// Renders `value` according to a printf-style integer format, decimal
/// for `%d`/`%u` and hexadecimal for `%x`/`%X`. An incompatible format
/// logs an error and yields `"0"`.
pub fn format_i64(format: &str, value: i64) -> String {
    let conversions: &[char] = if format.contains(['d', 'u']) {
        &['d', 'u']
    } else if format.contains(['x', 'X']) {
        &['x', 'X']
    } else {
        &[]
    };
    if !conversions.is_empty() {
        if let Some(directive) = parse_directive(format) {
            if matches!(directive.conversion, 'd' | 'u' | 'x' | 'X') {
                return format_int_directive(&directive, value);
            }
        }
        if !format.contains('%') {
            return format.to_owned();
        }
    }
    log::error!("format `{format}` is not usable for an integer value");
    "0".to_owned()
}

/// Parses the text of a number leaf back into an integer, base 10 for
/// `%d`/`%u` formats and base 16 for `%x`/`%X`. An incompatible format
/// logs an error and yields zero.
pub fn parse_i64(format: &str, text: &str) -> i64 {
    if format.contains(['d', 'u']) {
        scan_i64(text, 10)
    } else if format.contains(['x', 'X']) {
        scan_i64(text, 16)
    } else {
        log::error!("format `{format}` is not usable for an integer value");
        0
    }
}

fn format_int_directive(directive: &Directive, value: i64) -> String {
    let negative = directive.conversion == 'd' && value < 0;
    let magnitude = match directive.conversion {
        'd' => value.unsigned_abs(),
        _ => value as u64,
    };
    let mut body = match directive.conversion {
        'x' => format!("{magnitude:x}"),
        'X' => format!("{magnitude:X}"),
        _ => format!("{magnitude}"),
    };
    if let Some(precision) = directive.precision {
        if body.len() < precision {
            body = format!("{}{}", "0".repeat(precision - body.len()), body);
        }
    }
    if directive.flags.contains('#') && magnitude != 0 {
        match directive.conversion {
            'x' => body = format!("0x{body}"),
            'X' => body = format!("0X{body}"),
            _ => {}
        }
    }
    let sign = if directive.conversion == 'd' {
        directive.sign_for(negative)
    } else {
        ""
    };
    directive.finish(sign, body)
}

fn format_float_directive(directive: &Directive, value: f64) -> String {
    let negative = value.is_sign_negative();
    let magnitude = value.abs();
    let precision = directive.precision.unwrap_or(6);
    let body = match directive.conversion {
        'f' => format!("{magnitude:.precision$}"),
        'e' => exponent_form(magnitude, precision),
        _ => shortest_form(magnitude, precision),
    };
    directive.finish(directive.sign_for(negative), body)
}

/// `%e` rendering: one leading digit, `precision` fraction digits, and
/// a signed two-digit-minimum exponent.
fn exponent_form(magnitude: f64, precision: usize) -> String {
    let rendered = format!("{magnitude:.precision$e}");
    match rendered.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            format!(
                "{}e{}{:02}",
                mantissa,
                if exponent < 0 { "-" } else { "+" },
                exponent.abs()
            )
        }
        None => rendered,
    }
}

/// `%g` rendering per the C rule: pick `%f` or `%e` depending on the
/// decimal exponent, then strip trailing fraction zeros.
fn shortest_form(magnitude: f64, precision: usize) -> String {
    let significant = precision.max(1);
    let exponential = format!("{magnitude:.precision$e}", precision = significant - 1);
    let exponent: i32 = exponential
        .split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0);
    if exponent >= -4 && exponent < significant as i32 {
        let fixed = format!(
            "{magnitude:.precision$}",
            precision = (significant as i32 - 1 - exponent).max(0) as usize
        );
        strip_fraction_zeros(fixed)
    } else {
        let (mantissa, _) = exponential.split_once('e').unwrap_or((&exponential, ""));
        format!(
            "{}e{}{:02}",
            strip_fraction_zeros(mantissa.to_owned()),
            if exponent < 0 { "-" } else { "+" },
            exponent.abs()
        )
    }
}

fn strip_fraction_zeros(text: String) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        text
    }
}

fn format_sexagesimal(format: &str, value: f64) -> Option<String> {
    let captures = sexagesimal_regex().captures(format)?;
    let width: usize = captures[1].parse().ok()?;
    let fraction: u32 = captures[2].parse().ok()?;
    if !matches!(fraction, 3 | 5 | 6 | 8 | 9) {
        return None;
    }

    let sign = if value.is_sign_negative() { "-" } else { "" };
    let value = value.abs();
    let mut degrees = value.floor() as i64;
    let fractional = value - value.floor();

    let core = match fraction {
        3 => {
            let mut minutes = (fractional * 60.0).round() as i64;
            if minutes >= 60 {
                minutes = 0;
                degrees += 1;
            }
            format!("{sign}{degrees}:{minutes:02}")
        }
        5 => {
            let tenths = (fractional * 600.0).round() as i64;
            let mut minutes = tenths / 10;
            let remainder = tenths % 10;
            if minutes >= 60 {
                minutes = 0;
                degrees += 1;
            }
            format!("{sign}{degrees}:{minutes:02}.{remainder}")
        }
        6 => {
            let seconds = (fractional * 3600.0).round() as i64;
            let mut minutes = seconds / 60;
            let seconds = seconds % 60;
            if minutes >= 60 {
                minutes = 0;
                degrees += 1;
            }
            format!("{sign}{degrees}:{minutes:02}:{seconds:02}")
        }
        8 => {
            let tenths = (fractional * 36000.0).round() as i64;
            let mut minutes = tenths / 600;
            let seconds = (tenths % 600) / 10;
            let remainder = tenths % 10;
            if minutes >= 60 {
                minutes = 0;
                degrees += 1;
            }
            format!("{sign}{degrees}:{minutes:02}:{seconds:02}.{remainder}")
        }
        _ => {
            let hundredths = (fractional * 360000.0).round() as i64;
            let mut minutes = hundredths / 6000;
            let seconds = (hundredths % 6000) / 100;
            let remainder = hundredths % 100;
            if minutes >= 60 {
                minutes = 0;
                degrees += 1;
            }
            format!("{sign}{degrees}:{minutes:02}:{seconds:02}.{remainder:02}")
        }
    };

    if width > 0 {
        Some(format!("{core:>width$}"))
    } else {
        Some(core)
    }
}

/// Reads `[sign]deg:minutes` or `[sign]deg:minutes:seconds` text.
/// Minutes may be fractional in the two-part form, seconds in the
/// three-part form; both must lie in `[0, 60)` or the result is NaN.
fn parse_sexagesimal(text: &str) -> f64 {
    let rest = skip_space(text);
    let (negative, rest) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };

    let Some((degrees, rest)) = scan_i64_at(rest, 10) else {
        return f64::NAN;
    };
    let Some(rest) = rest.strip_prefix(':') else {
        return f64::NAN;
    };

    let minutes;
    let mut seconds = 0.0;
    let rest = if rest.contains(':') {
        let Some((whole_minutes, rest)) = scan_i64_at(rest, 10) else {
            return f64::NAN;
        };
        minutes = whole_minutes as f64;
        let Some(rest) = rest.strip_prefix(':') else {
            return f64::NAN;
        };
        let Some((parsed, rest)) = scan_f64(rest) else {
            return f64::NAN;
        };
        seconds = parsed;
        rest
    } else {
        let Some((parsed, rest)) = scan_f64(rest) else {
            return f64::NAN;
        };
        minutes = parsed;
        rest
    };

    if !skip_space(rest).is_empty() {
        return f64::NAN;
    }
    if !(0.0..60.0).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
        return f64::NAN;
    }

    let value = degrees as f64 + minutes / 60.0 + seconds / 3600.0;
    if negative {
        -value
    } else {
        value
    }
}

fn skip_space(text: &str) -> &str {
    text.trim_start_matches([' ', '\t', '\n', '\x0B', '\x0C', '\r'])
}

/// `strtol`-style scan: leading whitespace and an optional sign, then
/// as many digits as match. No digits at all yields zero.
fn scan_i64(text: &str, radix: u32) -> i64 {
    scan_i64_at(text, radix).map(|(value, _)| value).unwrap_or(0)
}

fn scan_i64_at(text: &str, radix: u32) -> Option<(i64, &str)> {
    let rest = skip_space(text);
    let (negative, rest) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };
    let digits = rest
        .as_bytes()
        .iter()
        .take_while(|byte| (**byte as char).is_digit(radix))
        .count();
    if digits == 0 {
        return None;
    }
    let mut value: i64 = 0;
    for byte in &rest.as_bytes()[..digits] {
        let digit = (*byte as char).to_digit(radix).unwrap_or(0) as i64;
        value = value
            .saturating_mul(radix as i64)
            .saturating_add(digit);
    }
    if negative {
        value = -value;
    }
    Some((value, &rest[digits..]))
}

/// `strtod`-style scan of a plain decimal with optional fraction and
/// exponent. Returns the value and the unconsumed remainder, or `None`
/// when no digits are present.
fn scan_f64(text: &str) -> Option<(f64, &str)> {
    let rest = skip_space(text);
    let bytes = rest.as_bytes();
    let mut at = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        at += 1;
    }
    let integer_digits = count_digits(&bytes[at..]);
    at += integer_digits;
    let mut fraction_digits = 0;
    if bytes.get(at) == Some(&b'.') {
        fraction_digits = count_digits(&bytes[at + 1..]);
        if integer_digits > 0 || fraction_digits > 0 {
            at += 1 + fraction_digits;
        }
    }
    if integer_digits == 0 && fraction_digits == 0 {
        return None;
    }
    if matches!(bytes.get(at), Some(b'e') | Some(b'E')) {
        let mut exponent_at = at + 1;
        if matches!(bytes.get(exponent_at), Some(b'+') | Some(b'-')) {
            exponent_at += 1;
        }
        let exponent_digits = count_digits(&bytes[exponent_at.min(bytes.len())..]);
        if exponent_digits > 0 {
            at = exponent_at + exponent_digits;
        }
    }
    let value = rest[..at].parse().unwrap_or(0.0);
    Some((value, &rest[at..]))
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|byte| byte.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_point_formats_like_printf() {
        assert_eq!(format_f64("%.1f", 12.34), "12.3");
        assert_eq!(format_f64("%f", 1.5), "1.500000");
        assert_eq!(format_f64("%8.2f", -3.5), "   -3.50");
        assert_eq!(format_f64("%08.2f", -3.5), "-0003.50");
        assert_eq!(format_f64("%-8.2f", 3.5), "3.50    ");
        assert_eq!(format_f64("%+.1f", 3.5), "+3.5");
        assert_eq!(format_f64("%.0f", 48000.0), "48000");
        assert_eq!(format_f64("Power: %.1f dB", -7.25), "Power: -7.2 dB");
    }

    #[test]
    fn exponent_formats_carry_a_signed_two_digit_exponent() {
        assert_eq!(format_f64("%e", 12.345), "1.234500e+01");
        assert_eq!(format_f64("%.2e", 0.0123), "1.23e-02");
        assert_eq!(format_f64("%.2e", 0.0), "0.00e+00");
        assert_eq!(format_f64("%.3e", -99999.0), "-1.000e+05");
    }

    #[test]
    fn shortest_formats_follow_the_c_g_rule() {
        assert_eq!(format_f64("%g", 100.0), "100");
        assert_eq!(format_f64("%g", 0.5), "0.5");
        assert_eq!(format_f64("%g", 0.0001), "0.0001");
        assert_eq!(format_f64("%g", 0.00001), "1e-05");
        assert_eq!(format_f64("%g", 1234567.0), "1.23457e+06");
        assert_eq!(format_f64("%g", 0.0), "0");
    }

    #[test]
    fn incompatible_float_formats_log_and_yield_zero() {
        assert_eq!(format_f64("%d", 1.5), "0.0");
        assert_eq!(parse_f64("%d", "1.5"), 0.0);
    }

    #[test]
    fn directive_free_float_formats_render_verbatim() {
        // printf prints a directive-free format as is.
        assert_eq!(format_f64("degrees", 1.5), "degrees");
    }

    #[test]
    fn integer_formats_cover_decimal_and_hex() {
        assert_eq!(format_i64("%d", -42), "-42");
        assert_eq!(format_i64("%05d", 42), "00042");
        assert_eq!(format_i64("%u", 42), "42");
        assert_eq!(format_i64("%x", 255), "ff");
        assert_eq!(format_i64("%#X", 255), "0XFF");
        assert_eq!(format_i64("%6x", 255), "    ff");
        assert_eq!(format_i64("%ld", 3_000_000_000), "3000000000");
        assert_eq!(format_i64("%f", 7), "0");
    }

    #[test]
    fn integer_parsing_follows_the_format_base() {
        assert_eq!(parse_i64("%d", "  -42xyz"), -42);
        assert_eq!(parse_i64("%x", "ff"), 255);
        assert_eq!(parse_i64("%u", ""), 0);
        assert_eq!(parse_i64("%f", "42"), 0);
    }

    #[test]
    fn sexagesimal_layouts_split_into_minutes_and_seconds() {
        assert_eq!(format_f64("%9.3m", 12.5), "    12:30");
        assert_eq!(format_f64("%0.5m", 12.505), "12:30.3");
        assert_eq!(format_f64("%9.6m", 12.5125), " 12:30:45");
        assert_eq!(format_f64("%0.8m", 12.51251), "12:30:45.0");
        assert_eq!(format_f64("%0.9m", 12.512512), "12:30:45.04");
        assert_eq!(format_f64("%8.3m", -12.5), "  -12:30");
    }

    #[test]
    fn sexagesimal_rounding_carries_into_degrees() {
        assert_eq!(format_f64("%0.3m", 11.9999), "12:00");
        assert_eq!(format_f64("%0.6m", 11.99999), "12:00:00");
    }

    #[test]
    fn sexagesimal_parsing_accepts_both_layouts() {
        assert_eq!(parse_f64("%9.6m", "12:30:00"), 12.5);
        assert_eq!(parse_f64("%9.6m", "  -12:30:00  "), -12.5);
        assert_eq!(parse_f64("%9.3m", "12:30"), 12.5);
        assert_eq!(parse_f64("%9.3m", "12:7.5"), 12.125);
        assert_eq!(parse_f64("%9.6m", "+1:00:30"), 1.0 + 30.0 / 3600.0);
    }

    #[test]
    fn sexagesimal_parsing_rejects_bad_layouts() {
        assert!(parse_f64("%9.3m", "5").is_nan());
        assert!(parse_f64("%9.3m", "12:").is_nan());
        assert!(parse_f64("%9.6m", "12:61:00").is_nan());
        assert!(parse_f64("%9.6m", "12:30:60").is_nan());
        assert!(parse_f64("%9.6m", "12:30:00junk").is_nan());
        assert!(parse_f64("%9.6m", "12:30.5:10").is_nan());
    }

    #[test]
    fn float_parsing_reads_a_leading_decimal() {
        assert_eq!(parse_f64("%.2f", "3.25 K"), 3.25);
        assert_eq!(parse_f64("%.2f", "-1e3"), -1000.0);
        assert_eq!(parse_f64("%.2f", "junk"), 0.0);
    }
}
