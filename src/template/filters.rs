//! Custom filters for the message templates.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use minijinja::{Error, ErrorKind};
use regex::Regex;

/// Title-cases every word: the first letter is uppercased and the rest of the
/// word lowercased, so `TestAlert` becomes `Testalert`.
///
/// Underscores and apostrophes inside a word do not start a new one, so
/// `high_cpu` becomes `High_cpu` and `don't` becomes `Don't`.
pub fn title(value: String) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_word = false;
    let mut cased = false;
    for c in value.chars() {
        if c.is_alphanumeric() {
            if cased {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
            cased = true;
        } else if c == '_' || (c == '\'' && in_word) {
            out.push(c);
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
            cased = false;
        }
    }
    out
}

/// Returns whether `value` contains `needle`.
pub fn contains(value: String, needle: String) -> bool {
    value.contains(&needle)
}

/// Replaces every match of the regular expression `pattern` in `value`.
/// `$1`-style references to capture groups are expanded.
pub fn re_replace_all(value: String, pattern: String, replacement: String) -> Result<String, Error> {
    let re = Regex::new(&pattern).map_err(|e| {
        Error::new(ErrorKind::InvalidOperation, format!("invalid regex '{pattern}': {e}"))
    })?;
    Ok(re.replace_all(&value, replacement.as_str()).into_owned())
}

/// Formats an RFC 3339 timestamp with a `strftime`-style format in the given
/// IANA time zone (UTC when omitted).
pub fn format_time(value: String, format: String, tz: Option<String>) -> Result<String, Error> {
    let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&value)
        .map_err(|e| {
            Error::new(ErrorKind::InvalidOperation, format!("invalid timestamp '{value}': {e}"))
        })?
        .with_timezone(&Utc);

    let tz: Tz = match tz.as_deref() {
        None | Some("") => Tz::UTC,
        Some(name) => name.parse().map_err(|_| {
            Error::new(ErrorKind::InvalidOperation, format!("unknown time zone '{name}'"))
        })?,
    };

    let mut out = String::new();
    std::fmt::write(&mut out, format_args!("{}", timestamp.with_timezone(&tz).format(&format)))
        .map_err(|_| {
            Error::new(ErrorKind::InvalidOperation, format!("invalid time format '{format}'"))
        })?;
    Ok(out)
}
