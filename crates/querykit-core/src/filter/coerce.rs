//! Value coercion chain.
//!
//! Raw string values are percent-decoded and then offered to a fixed,
//! ordered list of parsers. The first parser that accepts a value wins; a
//! value nobody accepts stays a (decoded) string.
//!
//! ## Parsers
//!
//! | Order | Parser          | Accepts                                       | Produces              |
//! |-------|-----------------|-----------------------------------------------|-----------------------|
//! | 1     | `Array`         | array operator, or value containing `\|`      | list of coerced items |
//! | 2     | `DateTime`      | `YYYY-MM-DD` dates and timestamps             | date/time             |
//! | 3     | `Number`        | `-?\d+` / `-?\d+\.\d+`                        | integer / float       |
//! | 4     | `Regex`         | `/pattern/flags` with flags from `imx`        | regex literal         |
//! | 5     | `BooleanOrNull` | `true`, `false`, `nil`                        | boolean / null        |
//!
//! List elements go through the same chain, minus the array parser.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

use super::datetime::{looks_like_date_time, parse_date_time};
use super::error::FilterError;
use crate::types::{FilterValue, Operator, RegexLiteral};

/// One step of the coercion chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueParser {
    /// Splits on `|` into a list.
    Array,
    /// Dates and timestamps.
    DateTime,
    /// Integers and decimals.
    Number,
    /// `/pattern/flags` literals.
    Regex,
    /// `true`, `false` and `nil`.
    BooleanOrNull,
}

impl ValueParser {
    /// The full chain, in priority order.
    pub const CHAIN: [ValueParser; 5] = [
        ValueParser::Array,
        ValueParser::DateTime,
        ValueParser::Number,
        ValueParser::Regex,
        ValueParser::BooleanOrNull,
    ];

    /// Returns true if this parser claims `value`.
    pub fn accepts(&self, value: &str, operator: Option<Operator>) -> bool {
        match self {
            ValueParser::Array => {
                operator.is_some_and(|op| op.is_array()) || value.contains('|')
            }
            ValueParser::DateTime => looks_like_date_time(value),
            ValueParser::Number => parse_number(value).is_some(),
            ValueParser::Regex => parse_regex(value).is_some(),
            ValueParser::BooleanOrNull => matches!(value, "true" | "false" | "nil"),
        }
    }

    fn parse(&self, value: &str) -> Result<FilterValue, FilterError> {
        match self {
            ValueParser::Array => split_list(value)
                .map(coerce_scalar)
                .collect::<Result<Vec<_>, _>>()
                .map(FilterValue::List),
            ValueParser::DateTime => match parse_date_time(value) {
                Some(result) => result.map(FilterValue::DateTime),
                None => Ok(FilterValue::String(value.to_string())),
            },
            ValueParser::Number => {
                Ok(parse_number(value).unwrap_or_else(|| FilterValue::String(value.to_string())))
            }
            ValueParser::Regex => Ok(parse_regex(value)
                .map(FilterValue::Regex)
                .unwrap_or_else(|| FilterValue::String(value.to_string()))),
            ValueParser::BooleanOrNull => Ok(match value {
                "true" => FilterValue::Bool(true),
                "false" => FilterValue::Bool(false),
                "nil" => FilterValue::Null,
                other => FilterValue::String(other.to_string()),
            }),
        }
    }
}

/// Percent-decode a raw value. `+` is left alone and invalid UTF-8 is replaced.
pub fn unescape(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw).decode_utf8_lossy()
}

/// Coerce a raw string value for an attribute with the given operator.
pub fn coerce(raw: &str, operator: Option<Operator>) -> Result<FilterValue, FilterError> {
    let value = unescape(raw);
    for parser in ValueParser::CHAIN {
        if parser.accepts(&value, operator) {
            return parser.parse(&value);
        }
    }
    Ok(FilterValue::String(value.into_owned()))
}

/// Coerce a raw parameter value: strings go through the chain, anything
/// structured is returned unchanged.
pub fn coerce_value(
    raw: &FilterValue,
    operator: Option<Operator>,
) -> Result<FilterValue, FilterError> {
    match raw {
        FilterValue::String(s) => coerce(s, operator),
        other => Ok(other.clone()),
    }
}

fn coerce_scalar(value: &str) -> Result<FilterValue, FilterError> {
    for parser in &ValueParser::CHAIN[1..] {
        if parser.accepts(value, None) {
            return parser.parse(value);
        }
    }
    Ok(FilterValue::String(value.to_string()))
}

/// Split on `|`, dropping trailing empty segments.
pub fn split_list(value: &str) -> impl Iterator<Item = &str> {
    let mut items: Vec<&str> = value.split('|').collect();
    while items.last().is_some_and(|item| item.is_empty()) {
        items.pop();
    }
    items.into_iter()
}

/// Parse `-?\d+` as an integer (falling back to float on overflow) or
/// `-?\d+\.\d+` as a float.
pub fn parse_number(value: &str) -> Option<FilterValue> {
    let unsigned = value.strip_prefix('-').unwrap_or(value);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    if !is_digits(whole) {
        return None;
    }
    match fraction {
        None => value
            .parse::<i64>()
            .map(FilterValue::Integer)
            .or_else(|_| value.parse::<f64>().map(FilterValue::Float))
            .ok(),
        Some(fraction) if is_digits(fraction) => value.parse::<f64>().ok().map(FilterValue::Float),
        Some(_) => None,
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a `/pattern/flags` literal. The last `/` closes the pattern.
pub fn parse_regex(value: &str) -> Option<RegexLiteral> {
    let body = value.strip_prefix('/')?;
    let close = body.rfind('/')?;
    let (pattern, flags) = (&body[..close], &body[close + 1..]);

    let mut seen = String::new();
    for flag in flags.chars() {
        if !"imx".contains(flag) || seen.contains(flag) {
            return None;
        }
        seen.push(flag);
    }
    Some(RegexLiteral::new(pattern, flags))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_string_is_unescaped() {
        assert_eq!(coerce("Some%20Title", None).unwrap(), FilterValue::from("Some Title"));
        assert_eq!(coerce("a+b", None).unwrap(), FilterValue::from("a+b"));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(coerce("1", None).unwrap(), FilterValue::Integer(1));
        assert_eq!(coerce("-12", None).unwrap(), FilterValue::Integer(-12));
        assert_eq!(coerce("2.5", None).unwrap(), FilterValue::Float(2.5));
        assert_eq!(
            coerce("100000000000000000000", None).unwrap(),
            FilterValue::Float(1e20)
        );
    }

    #[test]
    fn test_not_numbers() {
        for value in ["H4", "4H", "4H4", "4.1H", "1.", ".5", "-", "1.2.3"] {
            assert_eq!(parse_number(value), None, "{value}");
            assert_eq!(coerce(value, None).unwrap(), FilterValue::from(value));
        }
    }

    #[test]
    fn test_regex_literals() {
        assert_eq!(
            coerce("/2012/20/i", None).unwrap(),
            FilterValue::Regex(RegexLiteral::new("2012/20", "i"))
        );
        assert_eq!(
            coerce("/some%20title/", None).unwrap(),
            FilterValue::Regex(RegexLiteral::new("some title", ""))
        );
        assert_eq!(coerce("/abc", None).unwrap(), FilterValue::from("/abc"));
        assert_eq!(coerce("/abc/q", None).unwrap(), FilterValue::from("/abc/q"));
        assert_eq!(parse_regex("/abc/ii"), None);
    }

    #[test]
    fn test_booleans_and_null() {
        assert_eq!(coerce("true", None).unwrap(), FilterValue::Bool(true));
        assert_eq!(coerce("false", None).unwrap(), FilterValue::Bool(false));
        assert_eq!(coerce("nil", None).unwrap(), FilterValue::Null);
        assert_eq!(coerce("True", None).unwrap(), FilterValue::from("True"));
    }

    #[test]
    fn test_dates() {
        assert!(matches!(
            coerce("2010-01-01", None).unwrap(),
            FilterValue::DateTime(_)
        ));
        assert!(matches!(
            coerce("2010-13-01", None),
            Err(FilterError::DateTimeParse { .. })
        ));
    }

    #[test]
    fn test_array_operator_always_yields_list() {
        assert_eq!(
            coerce("1", Some(Operator::In)).unwrap(),
            FilterValue::List(vec![FilterValue::Integer(1)])
        );
        assert_eq!(
            coerce("Foo|Bar", Some(Operator::All)).unwrap(),
            FilterValue::List(vec!["Foo".into(), "Bar".into()])
        );
    }

    #[test]
    fn test_pipe_yields_list_without_operator() {
        assert_eq!(
            coerce("flamengo%7Cbasquete", None).unwrap(),
            FilterValue::List(vec!["flamengo".into(), "basquete".into()])
        );
        assert_eq!(
            coerce("1|true|2010-01-01|", Some(Operator::Nin)).unwrap(),
            FilterValue::List(vec![
                FilterValue::Integer(1),
                FilterValue::Bool(true),
                coerce("2010-01-01", None).unwrap(),
            ])
        );
    }

    #[test]
    fn test_list_items_are_decoded_once() {
        assert_eq!(coerce("100%2525", None).unwrap(), FilterValue::from("100%25"));
        assert_eq!(
            coerce("100%2525|x", None).unwrap(),
            FilterValue::List(vec!["100%25".into(), "x".into()])
        );
    }

    #[test]
    fn test_comparison_operator_does_not_force_list() {
        assert_eq!(coerce("5", Some(Operator::Gte)).unwrap(), FilterValue::Integer(5));
    }

    #[test]
    fn test_structured_values_pass_through() {
        let raw = FilterValue::List(vec!["1".into(), "2".into()]);
        assert_eq!(coerce_value(&raw, Some(Operator::In)).unwrap(), raw);
        assert_eq!(
            coerce_value(&FilterValue::Integer(7), None).unwrap(),
            FilterValue::Integer(7)
        );
    }

    #[test]
    fn test_split_list_drops_trailing_empties() {
        assert_eq!(split_list("a||b||").collect::<Vec<_>>(), vec!["a", "", "b"]);
        assert_eq!(split_list("").count(), 0);
    }
}
