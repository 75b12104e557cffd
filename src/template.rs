// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Bracketed-token format templates for EPOCH and EPOCH16 text.
//!
//! A template such as `<year>-<mm.02>-<dom.02>T<hour>:<min>:<sec>.<fos>` is
//! tokenized once into literal and field segments; the resulting
//! [`EpochFormat`] can render any number of values.
//!
//! | Token | Field | Default width |
//! |-------|-------|---------------|
//! | `<dom>` | day of month | natural |
//! | `<doy>` | day of year | 3, zero-padded |
//! | `<month>` | `Jan`..`Dec` | 3 |
//! | `<mm>` | month number | natural |
//! | `<year>` | year | 4, zero-padded |
//! | `<yr>` | year modulo 100 | 2, zero-padded |
//! | `<hour>`, `<min>`, `<sec>` | time of day | 2, zero-padded |
//! | `<fos>` | fraction of second | 3 digits (12 for EPOCH16) |
//! | `<fod>` | fraction of day | 8 digits (15 for EPOCH16) |
//! | `<msc>`, `<usc>`, `<nsc>`, `<psc>` | sub-second groups, EPOCH16 only | 3, zero-padded |
//!
//! A modifier after a dot overrides the width: `<mm.02>` pads to two digits
//! with zeros, `<dom.2>` with blanks, `<fod.7>` keeps seven digits. A value
//! wider than its width renders as `*` characters. `<<` is a literal `<`.
//! An unknown token, a bad modifier or an unterminated `<` emits `?` and
//! stops rendering.

use crate::calendar::{day_of_year, month_token, CalendarDateTime};
use crate::scan::leading_int;
use std::fmt;
use std::str::FromStr;

/// Fraction digits beyond this are not rendered.
const MAX_FRACTION_WIDTH: usize = 23;

/// Which value family a template renders; this selects the sub-second
/// tokens available and the default fraction widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// EPOCH, millisecond resolution.
    Millisecond,
    /// EPOCH16, picosecond resolution.
    Picosecond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    DayOfMonth,
    DayOfYear,
    MonthName,
    Month,
    Year,
    ShortYear,
    Hour,
    Minute,
    Second,
    FractionOfSecond,
    FractionOfDay,
    Millisecond,
    Microsecond,
    Nanosecond,
    Picosecond,
}

impl Part {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "dom" => Self::DayOfMonth,
            "doy" => Self::DayOfYear,
            "month" => Self::MonthName,
            "mm" => Self::Month,
            "year" => Self::Year,
            "yr" => Self::ShortYear,
            "hour" => Self::Hour,
            "min" => Self::Minute,
            "sec" => Self::Second,
            "fos" => Self::FractionOfSecond,
            "fod" => Self::FractionOfDay,
            "msc" => Self::Millisecond,
            "usc" => Self::Microsecond,
            "nsc" => Self::Nanosecond,
            "psc" => Self::Picosecond,
            _ => return None,
        })
    }

    #[inline]
    fn is_fraction(self) -> bool {
        matches!(self, Self::FractionOfSecond | Self::FractionOfDay)
    }

    #[inline]
    fn is_sub_second_group(self) -> bool {
        matches!(
            self,
            Self::Millisecond | Self::Microsecond | Self::Nanosecond | Self::Picosecond
        )
    }

    /// Default `(width, zero_pad)` for integer parts.
    fn integer_default(self) -> (usize, bool) {
        match self {
            Self::DayOfMonth | Self::Month => (0, false),
            Self::DayOfYear => (3, true),
            Self::Year => (4, true),
            Self::ShortYear | Self::Hour | Self::Minute | Self::Second => (2, true),
            _ => (3, true),
        }
    }

    fn fraction_default(self, precision: Precision) -> usize {
        match (self, precision) {
            (Self::FractionOfSecond, Precision::Millisecond) => 3,
            (Self::FractionOfSecond, Precision::Picosecond) => 12,
            (_, Precision::Millisecond) => 8,
            (_, Precision::Picosecond) => 15,
        }
    }
}

/// Width override after the dot in a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    Default,
    Width { width: i64, zero_pad: bool },
    Invalid,
}

impl Modifier {
    fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::Default;
        }
        match leading_int(text) {
            Some(width) => Self::Width {
                width,
                zero_pad: text.starts_with('0'),
            },
            None => Self::Invalid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field(Part, Modifier),
    /// Renders `?` and ends the output.
    Stop,
}

/// A tokenized format template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochFormat {
    segments: Vec<Segment>,
}

impl EpochFormat {
    /// Tokenizes `pattern`; never fails, errors render as `?`.
    pub fn new(pattern: &str) -> Self {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut rest = pattern;

        while let Some(c) = rest.chars().next() {
            if c != '<' {
                text.push(c);
                rest = &rest[c.len_utf8()..];
                continue;
            }
            if rest[1..].starts_with('<') {
                text.push('<');
                rest = &rest[2..];
                continue;
            }
            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text)));
            }
            let Some(close) = rest.find('>') else {
                segments.push(Segment::Stop);
                return Self { segments };
            };
            let token = &rest[1..close];
            rest = &rest[close + 1..];
            let (name, modifier) = match token.split_once('.') {
                Some((name, modifier)) => (name, Modifier::parse(modifier)),
                None => (token, Modifier::Default),
            };
            match Part::from_name(name) {
                Some(part) => segments.push(Segment::Field(part, modifier)),
                None => {
                    segments.push(Segment::Stop);
                    return Self { segments };
                }
            }
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }
        Self { segments }
    }

    /// Whether the template has no segments at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Renders a broken-down value.
    pub fn render(&self, dt: &CalendarDateTime, precision: Precision) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Stop => {
                    out.push('?');
                    break;
                }
                Segment::Field(part, modifier) => {
                    if !render_field(&mut out, dt, *part, *modifier, precision) {
                        out.push('?');
                        break;
                    }
                }
            }
        }
        out
    }
}

impl FromStr for EpochFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl fmt::Display for EpochFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => write!(f, "{}", text.replace('<', "<<"))?,
                Segment::Stop => write!(f, "<?>")?,
                Segment::Field(part, modifier) => {
                    let name = match part {
                        Part::DayOfMonth => "dom",
                        Part::DayOfYear => "doy",
                        Part::MonthName => "month",
                        Part::Month => "mm",
                        Part::Year => "year",
                        Part::ShortYear => "yr",
                        Part::Hour => "hour",
                        Part::Minute => "min",
                        Part::Second => "sec",
                        Part::FractionOfSecond => "fos",
                        Part::FractionOfDay => "fod",
                        Part::Millisecond => "msc",
                        Part::Microsecond => "usc",
                        Part::Nanosecond => "nsc",
                        Part::Picosecond => "psc",
                    };
                    match modifier {
                        Modifier::Width { width, zero_pad: true } => write!(f, "<{name}.0{width}>")?,
                        Modifier::Width { width, zero_pad: false } => write!(f, "<{name}.{width}>")?,
                        _ => write!(f, "<{name}>")?,
                    }
                }
            }
        }
        Ok(())
    }
}

/// Appends one field; `false` stops rendering.
fn render_field(out: &mut String, dt: &CalendarDateTime, part: Part, modifier: Modifier, precision: Precision) -> bool {
    if part == Part::MonthName {
        out.push_str(month_token(dt.month));
        return true;
    }
    if part.is_sub_second_group() && precision == Precision::Millisecond {
        return false;
    }

    if part.is_fraction() {
        let width = match modifier {
            Modifier::Default => part.fraction_default(precision),
            Modifier::Width { width, .. } if width >= 1 => (width as usize).min(MAX_FRACTION_WIDTH),
            _ => return false,
        };
        let value = match part {
            Part::FractionOfSecond => match precision {
                Precision::Millisecond => dt.millisecond as f64 / 1000.0,
                Precision::Picosecond => {
                    dt.millisecond as f64 / 1.0e3
                        + dt.microsecond as f64 / 1.0e6
                        + dt.nanosecond as f64 / 1.0e9
                        + dt.picosecond as f64 / 1.0e12
                }
            },
            _ => match precision {
                Precision::Millisecond => {
                    dt.hour as f64 / 24.0
                        + dt.minute as f64 / 1440.0
                        + dt.second as f64 / 86_400.0
                        + dt.millisecond as f64 / 86_400_000.0
                }
                Precision::Picosecond => {
                    let in_day = dt.hour * 3600 + dt.minute * 60 + dt.second;
                    let ps = dt.millisecond as f64 * 1.0e9
                        + dt.microsecond as f64 * 1.0e6
                        + dt.nanosecond as f64 * 1.0e3
                        + dt.picosecond as f64;
                    in_day as f64 / 86_400.0 + ps / 86_400.0e12
                }
            },
        };
        out.push_str(&fraction_digits(value, width));
        return true;
    }

    let (width, zero_pad) = match modifier {
        Modifier::Default => part.integer_default(),
        Modifier::Width { width, zero_pad } if width >= 0 => (width as usize, zero_pad),
        _ => return false,
    };
    let value = match part {
        Part::DayOfMonth => dt.day,
        Part::DayOfYear => day_of_year(dt.year, dt.month, dt.day),
        Part::Month => dt.month,
        Part::Year => dt.year,
        Part::ShortYear => dt.year % 100,
        Part::Hour => dt.hour,
        Part::Minute => dt.minute,
        Part::Second => dt.second,
        Part::Millisecond => dt.millisecond,
        Part::Microsecond => dt.microsecond,
        Part::Nanosecond => dt.nanosecond,
        _ => dt.picosecond,
    };
    push_padded(out, &value.to_string(), width, zero_pad);
    true
}

/// `width` digits of a fraction in `[0, 1)`; a value that would round up
/// to one renders as all nines.
fn fraction_digits(value: f64, width: usize) -> String {
    let text = format!("{value:.width$}");
    if text.starts_with('1') {
        return "9".repeat(width);
    }
    match text.split_once('.') {
        Some((_, digits)) => digits.to_owned(),
        None => "0".repeat(width),
    }
}

fn push_padded(out: &mut String, digits: &str, width: usize, zero_pad: bool) {
    if width == 0 {
        out.push_str(digits);
    } else if digits.len() > width {
        out.extend(std::iter::repeat('*').take(width));
    } else {
        let fill = if zero_pad { '0' } else { ' ' };
        out.extend(std::iter::repeat(fill).take(width - digits.len()));
        out.push_str(digits);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CalendarDateTime {
        CalendarDateTime::new(1990, 4, 1)
            .with_time(3, 5, 2)
            .with_subsecond(7, 8, 9)
            .with_picosecond(10)
    }

    #[test]
    fn iso_layout() {
        let f = EpochFormat::new("<year>-<mm.02>-<dom.02>T<hour>:<min>:<sec>.<fos>");
        assert_eq!(f.render(&sample(), Precision::Millisecond), "1990-04-01T03:05:02.007");
        assert_eq!(f.render(&sample(), Precision::Picosecond), "1990-04-01T03:05:02.007008009010");
    }

    #[test]
    fn day_of_year_and_month_name() {
        let f = EpochFormat::new("<doy> <month> <yr> <dom>");
        assert_eq!(f.render(&sample(), Precision::Millisecond), "091 Apr 90 1");
    }

    #[test]
    fn modifiers_pad_and_overflow() {
        let f = EpochFormat::new("[<dom.3>][<dom.03>][<year.2>]");
        assert_eq!(f.render(&sample(), Precision::Millisecond), "[  1][001][**]");
    }

    #[test]
    fn fraction_of_day() {
        let noon = CalendarDateTime::new(2000, 1, 1).with_time(12, 0, 0);
        let f = EpochFormat::new("<fod.7>|<fod>");
        assert_eq!(f.render(&noon, Precision::Millisecond), "5000000|50000000");
    }

    #[test]
    fn rounding_up_renders_nines() {
        let late = CalendarDateTime::new(2000, 1, 1).with_time(23, 59, 59).with_subsecond(999, 0, 0);
        let f = EpochFormat::new("<fod.4>");
        assert_eq!(f.render(&late, Precision::Millisecond), "9999");
    }

    #[test]
    fn escapes_and_errors() {
        let dt = sample();
        assert_eq!(EpochFormat::new("<<<year>>").render(&dt, Precision::Millisecond), "<1990>");
        assert_eq!(EpochFormat::new("a<bogus>b").render(&dt, Precision::Millisecond), "a?");
        assert_eq!(EpochFormat::new("a<year").render(&dt, Precision::Millisecond), "a?");
        assert_eq!(EpochFormat::new("<sec.x>z").render(&dt, Precision::Millisecond), "?");
        assert_eq!(EpochFormat::new("<fos.0>").render(&dt, Precision::Millisecond), "?");
        assert_eq!(EpochFormat::new("<psc>").render(&dt, Precision::Millisecond), "?");
        assert_eq!(EpochFormat::new("<psc>").render(&dt, Precision::Picosecond), "010");
    }

    #[test]
    fn display_round_trips_tokens() {
        let pattern = "<year>-<mm.02>-<dom.2> <<x";
        let f: EpochFormat = pattern.parse().unwrap();
        assert_eq!(f.to_string(), pattern);
        assert!(EpochFormat::new("").is_empty());
    }
}
