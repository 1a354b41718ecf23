//! Symbolic time templates.
//!
//! Patterns name their time layout with compact symbolic codes (`yyyy-mm-dd
//! HH:MM:ss`) rather than strftime specifiers. The translator turns such a
//! template into the chrono format string used at parse/render time, using
//! longest-match tokenization: a candidate token is extended while any known
//! code still has it as a prefix, and committed to the longest match found.

use chrono::format::{parse, Parsed, StrftimeItems};
use chrono::{NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;

use crate::error::SyntaxError;
use crate::scanner::{is_letter, Scanner};

/// Symbolic code → chrono fragment. Longer codes shadow their prefixes.
const TIME_TOKENS: &[(&str, &str)] = &[
    ("yyyy", "%Y"),
    ("yy", "%y"),
    ("mmm", "%b"),
    ("mm", "%m"),
    ("m", "%-m"),
    ("ccc", "%a"),
    ("ddd", "%j"),
    ("dd", "%d"),
    ("d", "%-d"),
    ("HH", "%H"),
    ("H", "%-H"),
    ("hh", "%I"),
    ("h", "%-I"),
    ("MM", "%M"),
    ("M", "%-M"),
    ("ss", "%S"),
    ("SSS", "%3f"),
    ("S", "%f"),
    ("ZZZ", "%:z"),
    ("ZZ", "%z"),
];

/// Template applied when `%t` carries no parenthesized override.
pub const DEFAULT_TIME_TEMPLATE: &str = "yyyy-mm-dd HH:MM:ss";

static DEFAULT_TIME_FORMAT: Lazy<String> =
    Lazy::new(|| translate_template(DEFAULT_TIME_TEMPLATE));

/// Absolute formats accepted for time literals in filter expressions,
/// tried in order.
const ACCEPTED_FORMATS: &[&str] = &["%Y-%m-%d", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Reads the optional `(template)` following a `%t` specifier and returns
/// the native format, falling back to the default template. A template
/// without a closing parenthesis is a syntax error.
pub fn parse_time_format(sc: &mut Scanner) -> Result<String, SyntaxError> {
    if sc.peek() != Some('(') {
        return Ok(DEFAULT_TIME_FORMAT.clone());
    }
    sc.read();
    let mut raw = String::new();
    loop {
        match sc.read() {
            None => return Err(SyntaxError::Missing(')')),
            Some(')') => break,
            Some(c) => raw.push(c),
        }
    }
    Ok(translate_template(&raw))
}

/// Translates a full symbolic template into a chrono format string.
///
/// Non-letters break any pending candidate and are copied through verbatim;
/// letter runs with no matching code are copied through as literals.
pub fn translate_template(template: &str) -> String {
    let mut out = String::new();
    let mut pending = String::new();
    for c in template.chars() {
        if !is_letter(c) {
            flush_pending(&mut pending, &mut out);
            if c == '%' {
                out.push_str("%%");
            } else {
                out.push(c);
            }
            continue;
        }
        pending.push(c);
        if !is_token_prefix(&pending) {
            // commit the longest match seen so far, re-seed with the
            // left-over character
            pending.pop();
            flush_pending(&mut pending, &mut out);
            pending.push(c);
            if !is_token_prefix(&pending) {
                flush_pending(&mut pending, &mut out);
            }
        }
    }
    flush_pending(&mut pending, &mut out);
    out
}

fn is_token_prefix(candidate: &str) -> bool {
    TIME_TOKENS.iter().any(|(code, _)| code.starts_with(candidate))
}

fn flush_pending(pending: &mut String, out: &mut String) {
    while !pending.is_empty() {
        match TIME_TOKENS
            .iter()
            .filter(|(code, _)| pending.starts_with(code))
            .max_by_key(|(code, _)| code.len())
        {
            Some((code, native)) => {
                out.push_str(native);
                pending.drain(..code.len());
            }
            None => {
                let c = pending.remove(0);
                out.push(c);
            }
        }
    }
}

/// Parses a time literal against the accepted absolute formats, in order.
pub fn parse_time(text: &str) -> Option<NaiveDateTime> {
    ACCEPTED_FORMATS
        .iter()
        .find_map(|format| parse_with_format(text, format))
}

/// Parses captured text against a translated format. Missing date parts
/// default (year 1970, January 1st) so year-less stamps such as syslog's
/// `mmm d HH:MM:ss` still carry their month and day.
pub fn parse_with_format(text: &str, format: &str) -> Option<NaiveDateTime> {
    let mut parsed = Parsed::new();
    parse(&mut parsed, text, StrftimeItems::new(format)).ok()?;
    if parsed.year().is_none() {
        parsed.set_year(1970).ok()?;
    }
    if parsed.ordinal().is_none() {
        if parsed.month().is_none() {
            parsed.set_month(1).ok()?;
        }
        if parsed.day().is_none() {
            parsed.set_day(1).ok()?;
        }
    }
    let date = parsed.to_naive_date().ok()?;
    let time = parsed.to_naive_time().unwrap_or(NaiveTime::MIN);
    Some(NaiveDateTime::new(date, time))
}
