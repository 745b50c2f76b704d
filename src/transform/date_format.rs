//! Date reformatting.
//!
//! Target patterns use the custom date/time pattern language common in
//! operator-facing tools (`yyyy-MM-dd`, `MMMM d, yyyy`, `dd/MM/yyyy HH:mm`)
//! and are compiled to chrono format strings before use. Single-letter
//! patterns select a standard layout (`d`, `D`, `s`, `u`, ...).

use std::fmt::Write as _;

use chrono::{NaiveDate, NaiveDateTime};

use super::{
    Transformation, TransformationKind,
    params::{TARGET_FORMAT, TransformParameters},
};
use crate::inference::{parse_explicit_datetime, parse_general_datetime};

pub const DEFAULT_TARGET_FORMAT: &str = "yyyy-MM-dd";

/// Named target formats offered to operators.
pub const COMMON_DATE_FORMATS: &[(&str, &str)] = &[
    ("ISO8601", "yyyy-MM-dd"),
    ("US", "MM/dd/yyyy"),
    ("European", "dd/MM/yyyy"),
    ("FileFriendly", "yyyyMMdd"),
    ("LongDate", "MMMM d, yyyy"),
    ("ShortDateWithDay", "ddd, MMM d, yyyy"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct DateFormat;

impl Transformation for DateFormat {
    fn kind(&self) -> TransformationKind {
        TransformationKind::DateFormat
    }

    fn transform(&self, input: &str, params: &TransformParameters) -> String {
        if input.trim().is_empty() {
            return String::new();
        }
        let target = params.text_or(TARGET_FORMAT, DEFAULT_TARGET_FORMAT);
        let Ok(chrono_format) = compile_pattern(target) else {
            return input.to_string();
        };
        let trimmed = input.trim();
        parse_general_datetime(trimmed)
            .or_else(|| parse_explicit_datetime(trimmed))
            .and_then(|value| render(&value, &chrono_format))
            .unwrap_or_else(|| input.to_string())
    }

    fn describe(&self, params: &TransformParameters) -> String {
        let target = params.text_or(TARGET_FORMAT, DEFAULT_TARGET_FORMAT);
        let name = COMMON_DATE_FORMATS
            .iter()
            .find(|(_, pattern)| *pattern == target)
            .map(|(name, _)| *name)
            .unwrap_or("Custom");
        format!("Format date as {name} ({target})")
    }

    fn validate_parameters(&self, params: &TransformParameters) -> Result<(), String> {
        if let Some(value) = params.get(TARGET_FORMAT)
            && value.as_text().is_none()
        {
            return Err(format!(
                "{TARGET_FORMAT} must be a string, found {}",
                value.type_name()
            ));
        }
        let target = params.text_or(TARGET_FORMAT, DEFAULT_TARGET_FORMAT);
        let invalid = |reason: String| format!("Invalid date format string '{target}': {reason}");
        let chrono_format = compile_pattern(target).map_err(invalid)?;
        let sample = NaiveDate::from_ymd_opt(2023, 1, 31)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .ok_or_else(|| "sample date out of range".to_string())?;
        render(&sample, &chrono_format)
            .map(|_| ())
            .ok_or_else(|| invalid("pattern cannot be rendered".to_string()))
    }
}

fn render(value: &NaiveDateTime, chrono_format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", value.format(chrono_format)).ok()?;
    Some(out)
}

fn standard_pattern(token: char) -> Option<&'static str> {
    let pattern = match token {
        'd' => "%m/%d/%Y",
        'D' => "%A, %d %B %Y",
        'f' => "%A, %d %B %Y %H:%M",
        'F' => "%A, %d %B %Y %H:%M:%S",
        'g' => "%m/%d/%Y %H:%M",
        'G' => "%m/%d/%Y %H:%M:%S",
        'm' | 'M' => "%B %d",
        's' => "%Y-%m-%dT%H:%M:%S",
        't' => "%H:%M",
        'T' => "%H:%M:%S",
        'u' => "%Y-%m-%d %H:%M:%SZ",
        'y' | 'Y' => "%Y %B",
        _ => return None,
    };
    Some(pattern)
}

/// Compiles a custom date pattern into a chrono format string.
pub fn compile_pattern(pattern: &str) -> Result<String, String> {
    if pattern.is_empty() {
        return Err("pattern is empty".to_string());
    }
    let chars = pattern.chars().collect::<Vec<_>>();
    if chars.len() == 1 {
        return standard_pattern(chars[0])
            .map(str::to_string)
            .ok_or_else(|| format!("'{}' is not a standard format specifier", chars[0]));
    }

    let mut out = String::with_capacity(pattern.len() * 2);
    let mut idx = 0usize;
    while idx < chars.len() {
        let ch = chars[idx];
        match ch {
            '\'' | '"' => {
                let close = chars[idx + 1..]
                    .iter()
                    .position(|c| *c == ch)
                    .ok_or_else(|| format!("missing closing quote for {ch}"))?;
                for literal in &chars[idx + 1..idx + 1 + close] {
                    push_literal(&mut out, *literal);
                }
                idx += close + 2;
            }
            '\\' => {
                let escaped = chars
                    .get(idx + 1)
                    .ok_or_else(|| "pattern ends with an escape character".to_string())?;
                push_literal(&mut out, *escaped);
                idx += 2;
            }
            '%' => {
                let next = chars
                    .get(idx + 1)
                    .ok_or_else(|| "pattern ends with '%'".to_string())?;
                match specifier(*next, 1)? {
                    Some(item) => out.push_str(item),
                    None => {
                        out.push_str("%%");
                        push_literal(&mut out, *next);
                    }
                }
                idx += 2;
            }
            _ => {
                let run = chars[idx..].iter().take_while(|c| **c == ch).count();
                match specifier(ch, run)? {
                    Some(item) => out.push_str(item),
                    None => {
                        for _ in 0..run {
                            push_literal(&mut out, ch);
                        }
                    }
                }
                idx += run;
            }
        }
    }
    Ok(out)
}

/// Maps a run of `count` identical pattern letters to a chrono specifier.
/// `Ok(None)` means the character is a literal.
fn specifier(ch: char, count: usize) -> Result<Option<&'static str>, String> {
    let item = match (ch, count) {
        ('y', 1) => "%-y",
        ('y', 2) => "%y",
        ('y', _) => "%Y",
        ('M', 1) => "%-m",
        ('M', 2) => "%m",
        ('M', 3) => "%b",
        ('M', _) => "%B",
        ('d', 1) => "%-d",
        ('d', 2) => "%d",
        ('d', 3) => "%a",
        ('d', _) => "%A",
        ('H', 1) => "%-H",
        ('H', _) => "%H",
        ('h', 1) => "%-I",
        ('h', _) => "%I",
        ('m', 1) => "%-M",
        ('m', _) => "%M",
        ('s', 1) => "%-S",
        ('s', _) => "%S",
        ('t', _) => "%p",
        ('f' | 'F', 3) => "%3f",
        ('f' | 'F', 6) => "%6f",
        ('f' | 'F', 9) => "%9f",
        ('f' | 'F', n) => return Err(format!("unsupported fraction width {n}")),
        ('z' | 'K', _) => return Err("time zone specifiers are not supported".to_string()),
        ('g', _) => return Err("era specifiers are not supported".to_string()),
        _ => return Ok(None),
    };
    Ok(Some(item))
}

fn push_literal(out: &mut String, ch: char) {
    if ch == '%' {
        out.push_str("%%");
    } else {
        out.push(ch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(format: &str) -> TransformParameters {
        TransformParameters::new().with(TARGET_FORMAT, format)
    }

    #[test]
    fn compiles_common_patterns() {
        assert_eq!(compile_pattern("yyyy-MM-dd").unwrap(), "%Y-%m-%d");
        assert_eq!(compile_pattern("MMMM d, yyyy").unwrap(), "%B %-d, %Y");
        assert_eq!(compile_pattern("ddd, MMM d, yyyy").unwrap(), "%a, %b %-d, %Y");
        assert_eq!(compile_pattern("HH:mm:ss.fff").unwrap(), "%H:%M:%S.%3f");
        assert_eq!(compile_pattern("yyyy'T'HH").unwrap(), "%YT%H");
        assert_eq!(compile_pattern("d").unwrap(), "%m/%d/%Y");
        assert_eq!(compile_pattern("%d").unwrap(), "%-d");
        assert_eq!(compile_pattern("yyyy%x").unwrap(), "%Y%%x");
    }

    #[test]
    fn rejects_broken_patterns() {
        assert!(compile_pattern("").is_err());
        assert!(compile_pattern("yyyy 'open").is_err());
        assert!(compile_pattern("yyyy\\").is_err());
        assert!(compile_pattern("q").is_err());
        assert!(compile_pattern("yyyy zzz").is_err());
    }

    #[test]
    fn reformats_known_layouts() {
        let iso = TransformParameters::new();
        assert_eq!(DateFormat.transform("01/31/2024", &iso), "2024-01-31");
        assert_eq!(DateFormat.transform("31/01/2024", &iso), "2024-01-31");
        assert_eq!(DateFormat.transform("January 5, 2024", &iso), "2024-01-05");
        assert_eq!(DateFormat.transform("2024-01-05", &target("yyyy")), "2024");
        assert_eq!(
            DateFormat.transform("2024-01-05", &target("MMMM d, yyyy")),
            "January 5, 2024"
        );
    }

    #[test]
    fn unparsable_input_is_returned_unchanged() {
        let iso = TransformParameters::new();
        assert_eq!(DateFormat.transform("sometime soon", &iso), "sometime soon");
        assert_eq!(DateFormat.transform("  ", &iso), "");
    }

    #[test]
    fn validation_reports_invalid_pattern() {
        assert!(DateFormat.validate_parameters(&TransformParameters::new()).is_ok());
        let err = DateFormat
            .validate_parameters(&target("yyyy 'open"))
            .unwrap_err();
        assert!(err.contains("Invalid date format string"));
        assert!(DateFormat.validate_parameters(&target("q")).is_err());
    }

    #[test]
    fn description_names_common_formats() {
        assert_eq!(
            DateFormat.describe(&TransformParameters::new()),
            "Format date as ISO8601 (yyyy-MM-dd)"
        );
        assert_eq!(
            DateFormat.describe(&target("yyyy")),
            "Format date as Custom (yyyy)"
        );
    }
}
