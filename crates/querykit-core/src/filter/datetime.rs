//! Date/time recognition for filter values.
//!
//! ## Grammar
//!
//! ```text
//! <value>     := <date> | <date> <sep>+ <time>
//! <date>      := YYYY "-" M{1,2} "-" D{1,2}        (date-only form requires MM and DD)
//! <sep>       := " " | "\t" | "T"
//! <time>      := h{1,2} ":" mm ":" ss ["." digits] <zone>
//! <zone>      := ""                                 (UTC)
//!              | [" " | "\t"]* "Z"
//!              | [" " | "\t"]* ("+" | "-") HH [":"] [MM]
//!              | [" " | "\t"]+ HH [":"] [MM]        (unsigned offset, read as "+")
//! ```
//!
//! A value matching the grammar is committed to being a date: if the parts do
//! not form a real calendar date/time the value fails with
//! [`FilterError::DateTimeParse`] instead of falling through to other parsers.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use winnow::combinator::{opt, preceded};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};
use winnow::ModalResult;

use super::error::FilterError;

/// Matched pieces of a date/time value.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DateParts<'a> {
    year: &'a str,
    month: &'a str,
    day: &'a str,
    time: Option<TimeParts<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TimeParts<'a> {
    hour: &'a str,
    minute: &'a str,
    second: &'a str,
    fraction: Option<&'a str>,
    zone: Zone<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Zone<'a> {
    /// No zone designator; read as UTC.
    Unspecified,
    /// `Z`
    Utc,
    /// Numeric offset.
    Offset {
        sign: char,
        hours: &'a str,
        minutes: Option<&'a str>,
    },
}

fn digits<'a>(input: &mut &'a str, count: std::ops::RangeInclusive<usize>) -> ModalResult<&'a str> {
    take_while(count, |c: char| c.is_ascii_digit()).parse_next(input)
}

fn date_parts<'a>(input: &mut &'a str) -> ModalResult<DateParts<'a>> {
    let year = digits(input, 4..=4)?;
    let _ = '-'.parse_next(input)?;
    let month = digits(input, 1..=2)?;
    let _ = '-'.parse_next(input)?;
    let day = digits(input, 1..=2)?;
    let time = opt(preceded(
        take_while(1.., [' ', '\t', 'T']),
        time_parts,
    ))
    .parse_next(input)?;

    Ok(DateParts {
        year,
        month,
        day,
        time,
    })
}

fn time_parts<'a>(input: &mut &'a str) -> ModalResult<TimeParts<'a>> {
    let hour = digits(input, 1..=2)?;
    let _ = ':'.parse_next(input)?;
    let minute = digits(input, 2..=2)?;
    let _ = ':'.parse_next(input)?;
    let second = digits(input, 2..=2)?;
    let fraction: Option<&str> = opt(preceded(
        '.',
        take_while(0.., |c: char| c.is_ascii_digit()),
    ))
    .parse_next(input)?;
    let zone = zone.parse_next(input)?;

    Ok(TimeParts {
        hour,
        minute,
        second,
        fraction,
        zone,
    })
}

fn zone<'a>(input: &mut &'a str) -> ModalResult<Zone<'a>> {
    let gap: &str = take_while(0.., [' ', '\t']).parse_next(input)?;
    if input.is_empty() {
        return Ok(Zone::Unspecified);
    }
    if opt('Z').parse_next(input)?.is_some() {
        return Ok(Zone::Utc);
    }

    // Offsets written after whitespace may omit the sign.
    let sign: char = if gap.is_empty() {
        one_of(['+', '-']).parse_next(input)?
    } else {
        opt(one_of(['+', '-'])).parse_next(input)?.unwrap_or('+')
    };
    let hours = digits(input, 2..=2)?;
    let minutes: Option<&str> = opt(preceded(
        opt(':'),
        take_while(2, |c: char| c.is_ascii_digit()),
    ))
    .parse_next(input)?;

    Ok(Zone::Offset {
        sign,
        hours,
        minutes,
    })
}

fn scan(value: &str) -> Option<DateParts<'_>> {
    let parts = date_parts.parse(value).ok()?;
    if parts.time.is_none() && (parts.month.len() != 2 || parts.day.len() != 2) {
        return None;
    }
    Some(parts)
}

/// Returns true if `value` has the shape of a date or timestamp.
pub fn looks_like_date_time(value: &str) -> bool {
    scan(value).is_some()
}

/// Parse a date or timestamp.
///
/// Returns `None` if the value does not have a date shape, and
/// `Some(Err(..))` if it does but names an impossible date/time.
pub fn parse_date_time(value: &str) -> Option<Result<DateTime<FixedOffset>, FilterError>> {
    scan(value).map(|parts| resolve(value, &parts))
}

fn resolve(value: &str, parts: &DateParts<'_>) -> Result<DateTime<FixedOffset>, FilterError> {
    let invalid = |message: &str| FilterError::DateTimeParse {
        value: value.to_string(),
        message: message.to_string(),
    };

    let date = NaiveDate::from_ymd_opt(
        number(parts.year),
        number(parts.month),
        number(parts.day),
    )
    .ok_or_else(|| invalid("invalid calendar date"))?;

    let (time, offset) = match &parts.time {
        None => (NaiveTime::MIN, Utc.fix()),
        Some(time) => {
            let nanos = time.fraction.map(fraction_nanos).unwrap_or(0);
            let clock = NaiveTime::from_hms_nano_opt(
                number(time.hour),
                number(time.minute),
                number(time.second),
                nanos,
            )
            .ok_or_else(|| invalid("invalid time of day"))?;
            let offset = match &time.zone {
                Zone::Unspecified | Zone::Utc => Utc.fix(),
                Zone::Offset {
                    sign,
                    hours,
                    minutes,
                } => {
                    let seconds = number::<i32>(hours) * 3600
                        + minutes.map(number::<i32>).unwrap_or(0) * 60;
                    let seconds = if *sign == '-' { -seconds } else { seconds };
                    FixedOffset::east_opt(seconds)
                        .ok_or_else(|| invalid("utc offset out of range"))?
                }
            };
            (clock, offset)
        }
    };

    date.and_time(time)
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| invalid("ambiguous local time"))
}

/// Digit runs are at most four characters, so they always fit.
fn number<T: std::str::FromStr + Default>(digits: &str) -> T {
    digits.parse().unwrap_or_default()
}

/// Fractional seconds to nanoseconds, truncating past nine digits.
fn fraction_nanos(fraction: &str) -> u32 {
    let truncated = &fraction[..fraction.len().min(9)];
    format!("{truncated:0<9}").parse().unwrap_or(0)
}
