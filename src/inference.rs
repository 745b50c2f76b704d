//! Semantic type inference over small sets of sample strings.
//!
//! A column is classified by testing, in order of specificity, whether every
//! non-blank sample is an integer, a decimal or a date/time value. Anything
//! else (including a sample set with no non-blank values) is a string.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Int,
    Decimal,
    #[serde(rename = "datetime")]
    DateTime,
    String,
}

impl TypeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::Decimal => "decimal",
            TypeTag::DateTime => "datetime",
            TypeTag::String => "string",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => Ok(TypeTag::Int),
            "decimal" => Ok(TypeTag::Decimal),
            "datetime" => Ok(TypeTag::DateTime),
            "string" => Ok(TypeTag::String),
            other => Err(format!("Unknown type tag '{other}'")),
        }
    }
}

/// Date/time layouts tried first, in the order an invariant-culture parser
/// would resolve them (month-first for slash dates).
const GENERAL_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%B %d, %Y %H:%M:%S",
];

const GENERAL_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%A, %B %d, %Y",
    "%a, %b %d, %Y",
];

/// Explicit layouts tried after the general ones fail.
const EXPLICIT_DATETIME_FORMATS: &[&str] = &["%d/%m/%Y %H:%M:%S", "%d-%m-%Y %H:%M:%S"];

const EXPLICIT_DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Returns `true` for empty or whitespace-only values.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Base-10 signed integer with no fractional part. Length is not bounded so
/// long identifiers still classify as integers.
pub fn is_integer(value: &str) -> bool {
    let digits = strip_sign(value.trim());
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Signed decimal number such as `12`, `-3.5`, `+.25` or `10.`.
pub fn is_decimal(value: &str) -> bool {
    let body = strip_sign(value.trim());
    let mut digits = 0usize;
    let mut seen_point = false;
    for ch in body.chars() {
        match ch {
            '0'..='9' => digits += 1,
            '.' if !seen_point => seen_point = true,
            _ => return false,
        }
    }
    digits > 0
}

pub fn is_datetime(value: &str) -> bool {
    parse_datetime(value).is_some()
}

fn strip_sign(value: &str) -> &str {
    value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value)
}

/// Parses a date or date/time value, trying general layouts before the
/// explicit day-first fallbacks.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_general_datetime(trimmed).or_else(|| parse_explicit_datetime(trimmed))
}

pub(crate) fn parse_general_datetime(value: &str) -> Option<NaiveDateTime> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_local());
    }
    for fmt in GENERAL_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(parsed);
        }
    }
    parse_with_date_formats(value, GENERAL_DATE_FORMATS)
}

pub(crate) fn parse_explicit_datetime(value: &str) -> Option<NaiveDateTime> {
    if let Some(compact) = parse_compact_date(value) {
        return Some(compact);
    }
    for fmt in EXPLICIT_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(parsed);
        }
    }
    parse_with_date_formats(value, EXPLICIT_DATE_FORMATS)
}

fn parse_with_date_formats(value: &str, formats: &[&str]) -> Option<NaiveDateTime> {
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
}

// yyyyMMdd
fn parse_compact_date(value: &str) -> Option<NaiveDateTime> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = value[0..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).map(|date| date.and_time(NaiveTime::MIN))
}

/// Classifies a set of samples. Blank samples are ignored; a set with no
/// non-blank samples is a string.
pub fn infer_type<S: AsRef<str>>(samples: &[S]) -> TypeTag {
    let mut values = samples
        .iter()
        .map(AsRef::as_ref)
        .filter(|value| !is_blank(value))
        .peekable();
    if values.peek().is_none() {
        return TypeTag::String;
    }

    let mut possible_integer = true;
    let mut possible_decimal = true;
    let mut possible_datetime = true;
    for value in values {
        if possible_integer && !is_integer(value) {
            possible_integer = false;
        }
        if possible_decimal && !is_decimal(value) {
            possible_decimal = false;
        }
        if possible_datetime && !is_datetime(value) {
            possible_datetime = false;
        }
        if !possible_integer && !possible_decimal && !possible_datetime {
            break;
        }
    }

    if possible_integer {
        TypeTag::Int
    } else if possible_decimal {
        TypeTag::Decimal
    } else if possible_datetime {
        TypeTag::DateTime
    } else {
        TypeTag::String
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_and_decimal_literals() {
        assert!(is_integer("-42"));
        assert!(is_integer("+7"));
        assert!(!is_integer("4.0"));
        assert!(!is_integer("-"));
        assert!(is_decimal("4.0"));
        assert!(is_decimal(".5"));
        assert!(is_decimal("12"));
        assert!(!is_decimal("1.2.3"));
        assert!(!is_decimal("."));
        assert!(!is_decimal("1e5"));
    }

    #[test]
    fn parse_datetime_supports_common_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_time(NaiveTime::MIN);
        for raw in [
            "2024-01-31",
            "01/31/2024",
            "31/01/2024",
            "20240131",
            "January 31, 2024",
            "31 January 2024",
            "Wed, Jan 31, 2024",
        ] {
            assert_eq!(parse_datetime(raw), Some(expected), "layout {raw}");
        }
        let with_time = parse_datetime("2024-01-31 14:05:00").unwrap();
        assert_eq!(with_time.format("%H:%M").to_string(), "14:05");
        assert!(parse_datetime("not a date").is_none());
        assert!(parse_datetime("20241399").is_none());
    }

    #[test]
    fn slash_dates_resolve_month_first() {
        let parsed = parse_datetime("03/04/2024").unwrap();
        assert_eq!(parsed.format("%Y-%m-%d").to_string(), "2024-03-04");
    }

    #[test]
    fn infer_type_orders_by_specificity() {
        assert_eq!(infer_type::<&str>(&[]), TypeTag::String);
        assert_eq!(infer_type(&["", "  "]), TypeTag::String);
        assert_eq!(infer_type(&["1", "", "-20"]), TypeTag::Int);
        assert_eq!(infer_type(&["1", "2.5"]), TypeTag::Decimal);
        assert_eq!(infer_type(&["2024-01-01", "02/03/2020"]), TypeTag::DateTime);
        assert_eq!(infer_type(&["2024-01-01", "12"]), TypeTag::String);
        assert_eq!(infer_type(&["Smith", "Jones"]), TypeTag::String);
    }

    #[test]
    fn type_tag_round_trips_through_text() {
        assert_eq!("datetime".parse::<TypeTag>().unwrap(), TypeTag::DateTime);
        assert_eq!(TypeTag::Decimal.to_string(), "decimal");
        assert_eq!(
            serde_json::to_string(&TypeTag::DateTime).unwrap(),
            "\"datetime\""
        );
    }
}
