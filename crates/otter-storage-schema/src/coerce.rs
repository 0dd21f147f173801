//! Native string coercion used by raw mode
//!
//! Raw mode stores exactly what the host language prints for a primitive:
//! numbers follow `Number.prototype.toString`, booleans print as
//! `true`/`false`, bigints print their decimal digits and dates use the
//! `Date.prototype.toString` layout. There is no locale awareness.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone};

use crate::value::Value;

const DAY_FORMAT: &str = "%a %b %d";
const TIME_FORMAT: &str = "%H:%M:%S GMT%z";
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const UTC_ZONE_NAME: &str = " (Coordinated Universal Time)";

/// Format a number to string per JS semantics.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        // Covers -0 as well
        return "0".to_string();
    }

    // ryu yields the shortest round-tripping digits, e.g. "2.2", "1e21", "1.5e-7"
    let mut buffer = ryu::Buffer::new();
    let shortest = buffer.format_finite(n.abs());
    let (mantissa, exponent) = match shortest.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (shortest, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let mut digits = format!("{}{}", int_part, frac_part);
    let mut point = int_part.len() as i32 + exponent;
    let leading = digits.len() - digits.trim_start_matches('0').len();
    digits.drain(..leading);
    point -= leading as i32;
    let significant = digits.trim_end_matches('0').len();
    digits.truncate(significant);

    let k = digits.len() as i32;
    let mut out = String::with_capacity(k.max(point).unsigned_abs() as usize + 8);
    if n < 0.0 {
        out.push('-');
    }

    if k <= point && point <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat('0').take((point - k) as usize));
    } else if 0 < point && point <= 21 {
        let (whole, frac) = digits.split_at(point as usize);
        out.push_str(whole);
        out.push('.');
        out.push_str(frac);
    } else if -6 < point && point <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-point) as usize));
        out.push_str(&digits);
    } else {
        let e = point - 1;
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        out.push('e');
        out.push(if e < 0 { '-' } else { '+' });
        out.push_str(&e.unsigned_abs().to_string());
    }
    out
}

/// Whether text has the shape of a stringified number (`${number}`)
///
/// Accepts an optional sign, digits with an optional fraction and exponent,
/// and the non-finite spellings `NaN`, `Infinity`, `-Infinity`.
pub fn is_numeric_text(text: &str) -> bool {
    if text == "NaN" {
        return true;
    }
    let body = text.strip_prefix('-').unwrap_or(text);
    if body == "Infinity" {
        return true;
    }

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let (mantissa, exponent) = match body.split_once('e') {
        Some((m, e)) => (m, Some(e)),
        None => (body, None),
    };
    let valid_mantissa = match mantissa.split_once('.') {
        Some((whole, frac)) => all_digits(whole) && all_digits(frac),
        None => all_digits(mantissa),
    };
    valid_mantissa
        && exponent
            .map(|e| all_digits(e.strip_prefix(['+', '-']).unwrap_or(e)))
            .unwrap_or(true)
}

/// Render a date the way `Date.prototype.toString` does.
///
/// Years are zero-padded to four digits and only negative years carry a
/// sign. Zero offsets get the UTC zone name; other fixed offsets carry no
/// zone name because none can be derived from an offset alone.
pub fn date_to_string(date: &DateTime<FixedOffset>) -> String {
    let year = date.year();
    let mut text = format!(
        "{} {}{:04} {}",
        date.format(DAY_FORMAT),
        if year < 0 { "-" } else { "" },
        year.unsigned_abs(),
        date.format(TIME_FORMAT)
    );
    if date.offset().local_minus_utc() == 0 {
        text.push_str(UTC_ZONE_NAME);
    }
    text
}

/// Parse text produced by [`date_to_string`] back into a date.
///
/// Raw mode never re-parses stored dates; this is for callers that want a
/// date object back.
pub fn parse_date_string(text: &str) -> Option<DateTime<FixedOffset>> {
    let body = text.find(" (").map_or(text, |idx| &text[..idx]);
    let parts: Vec<&str> = body.split(' ').collect();
    let [weekday, month, day, year, time, zone] = parts.as_slice() else {
        return None;
    };

    let month = MONTHS.iter().position(|name| name == month)? as u32 + 1;
    let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month, day.parse().ok()?)?;
    if date.format("%a").to_string() != *weekday {
        return None;
    }
    let time = NaiveTime::parse_from_str(time, "%H:%M:%S").ok()?;
    let offset = parse_gmt_offset(zone)?;
    offset.from_local_datetime(&date.and_time(time)).single()
}

/// `GMT+0200` -> two hours east
fn parse_gmt_offset(zone: &str) -> Option<FixedOffset> {
    let signed = zone.strip_prefix("GMT")?;
    let (sign, digits) = if let Some(digits) = signed.strip_prefix('+') {
        (1, digits)
    } else {
        (-1, signed.strip_prefix('-')?)
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits.get(..2)?.parse().ok()?;
    let minutes: i32 = digits.get(2..)?.parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Coerce a value to its raw stored string.
///
/// Returns `None` for values raw mode never writes: absence markers,
/// structured data (callers pass pre-serialized text), callables and symbols.
pub fn to_raw_string(value: &Value) -> Option<String> {
    match value {
        Value::Boolean(b) => Some(b.to_string()),
        Value::Number(n) => Some(number_to_string(*n)),
        Value::BigInt(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Date(d) => Some(date_to_string(d)),
        Value::Undefined
        | Value::Null
        | Value::Structured(_)
        | Value::Function(_)
        | Value::Symbol(_) => None,
    }
}
