// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! # EPOCH codec
//!
//! EPOCH is a count of milliseconds from 0000-01-01T00:00:00.000 on the
//! proleptic Gregorian calendar, without leap seconds.
//!
//! | Style | Layout | Fill literal |
//! |-------|--------|--------------|
//! | 0 | `dd-Mon-yyyy hh:mm:ss.mmm` | `31-Dec-9999 23:59:59.999` |
//! | 1 | `yyyymmdd.fffffff` (day fraction) | `99991231.9999999` |
//! | 2 | `yyyymmddhhmmss` | `99991231235959` |
//! | 3 | `yyyy-mm-ddThh:mm:ss.mmmZ` | `9999-12-31T23:59:59.999Z` |
//! | 4 | `yyyy-mm-ddThh:mm:ss.mmm` | `9999-12-31T23:59:59.999` |
//!
//! Style numbers outside `0..=4` encode as style 4. [`Epoch::NAN`] encodes
//! as `Nan`, and any text containing `nan` (any case) parses back to it.

use crate::calendar::{julian_day_number, month_number, CalendarDateTime, JDN_0000_01_01};
use crate::scan::scan;
use crate::template::{EpochFormat, Precision};
use crate::tt2000::trim_unprintable;
use crate::value::{Epoch, TimeValue};
use std::sync::OnceLock;

const MS_PER_DAY: f64 = 86_400_000.0;
/// EPOCH value of 1970-01-01T00:00:00.000.
pub const UNIX_EPOCH: Epoch = Epoch::new(62_167_219_200_000.0);
pub(crate) const NAN_TEXT: &str = "Nan";

const STYLE_TEMPLATES: [&str; 5] = [
    "<dom.02>-<month>-<year> <hour>:<min>:<sec>.<fos>",
    "<year><mm.02><dom.02>.<fod.7>",
    "<year><mm.02><dom.02><hour><min><sec>",
    "<year>-<mm.02>-<dom.02>T<hour>:<min>:<sec>.<fos>Z",
    "<year>-<mm.02>-<dom.02>T<hour>:<min>:<sec>.<fos>",
];

const FILL_TEXT: [&str; 5] = [
    "31-Dec-9999 23:59:59.999",
    "99991231.9999999",
    "99991231235959",
    "9999-12-31T23:59:59.999Z",
    "9999-12-31T23:59:59.999",
];

const STYLE0_LEN: usize = 24;
const STYLE1_LEN: usize = 16;
const STYLE2_LEN: usize = 14;
const STYLE4_LEN: usize = 23;

fn standard_format(style: usize) -> &'static EpochFormat {
    static FORMATS: OnceLock<Vec<EpochFormat>> = OnceLock::new();
    &FORMATS.get_or_init(|| STYLE_TEMPLATES.iter().map(|t| EpochFormat::new(t)).collect())[style]
}

// ═══════════════════════════════════════════════════════════════════════════
// Compute / breakdown
// ═══════════════════════════════════════════════════════════════════════════

/// Days from 0000-01-01 to a date; `month == 0` reads `day` as day of year.
#[inline]
pub(crate) fn days_since_0ad(year: i64, month: i64, day: i64) -> i64 {
    if month == 0 {
        julian_day_number(year, 1, 1) + (day - 1) - JDN_0000_01_01
    } else {
        julian_day_number(year, month, day) - JDN_0000_01_01
    }
}

/// Lenient form: out-of-range fields are added as offsets, a negative
/// month counts back from the previous year.
fn compute_lenient(dt: &CalendarDateTime) -> Epoch {
    let (mut year, mut month) = (dt.year, dt.month);
    if month < 0 {
        year -= 1;
        month += 13;
    }
    let days = days_since_0ad(year, month, dt.day);
    if days < 0 {
        return Epoch::ILLEGAL;
    }
    let in_day = 3_600_000.0 * dt.hour as f64
        + 60_000.0 * dt.minute as f64
        + 1000.0 * dt.second as f64
        + dt.millisecond as f64;
    let ms = MS_PER_DAY * days as f64 + in_day;
    if ms < 0.0 {
        Epoch::ILLEGAL
    } else {
        Epoch::new(ms)
    }
}

/// EPOCH value of a calendar reading, to the millisecond.
///
/// 9999-12-31T23:59:59.999 returns [`Epoch::FILL`] and a negative year
/// [`Epoch::ILLEGAL`]. Fields outside their usual range (hour 25, second
/// 60, day 0, ...) are accepted as offsets, so `second == 60` reads as the
/// start of the next minute. A month of zero reads `day` as day of year.
pub fn compute(dt: &CalendarDateTime) -> Epoch {
    let CalendarDateTime {
        year,
        month,
        day,
        hour,
        minute,
        second,
        millisecond,
        ..
    } = *dt;
    if year == 9999 && month == 12 && day == 31 && hour == 23 && minute == 59 && second == 59 && millisecond == 999 {
        return Epoch::FILL;
    }
    if year < 0 {
        return Epoch::ILLEGAL;
    }
    let strict = year <= 9999
        && (0..=12).contains(&month)
        && (0..=23).contains(&hour)
        && (0..=59).contains(&minute)
        && (0..=59).contains(&second)
        && (0..=999).contains(&millisecond)
        && if month == 0 { (1..=366).contains(&day) } else { (1..=31).contains(&day) };
    if !strict {
        return compute_lenient(dt);
    }
    let in_day = 3_600_000 * hour + 60_000 * minute + 1000 * second + millisecond;
    Epoch::new(MS_PER_DAY * days_since_0ad(year, month, day) as f64 + in_day as f64)
}

/// Splits whole seconds since 0000-01-01 into date and time of day.
pub(crate) fn decode_seconds(seconds: f64) -> CalendarDateTime {
    let minutes = seconds / 60.0;
    let hours = minutes / 60.0;
    let days = hours / 24.0;
    let date = crate::calendar::calendar_from_julian_day_number(JDN_0000_01_01 + days as i64);
    CalendarDateTime::new(date.year, date.month, date.day).with_time(
        (hours % 24.0) as i64,
        (minutes % 60.0) as i64,
        (seconds % 60.0) as i64,
    )
}

/// Calendar reading of an EPOCH value.
///
/// [`Epoch::FILL`] and [`Epoch::ILLEGAL`] decode as
/// 9999-12-31T23:59:59.999; negative zero and `NaN` decode as all zeros.
/// Negative values decode by magnitude and values past [`Epoch::MAX`] clamp.
pub fn breakdown(epoch: Epoch) -> CalendarDateTime {
    let v = epoch.value();
    if v.is_nan() || (v == 0.0 && v.is_sign_negative()) {
        return CalendarDateTime::default();
    }
    if epoch.is_fill() || epoch.is_illegal() {
        return CalendarDateTime::new(9999, 12, 31)
            .with_time(23, 59, 59)
            .with_subsecond(999, 0, 0);
    }
    let ms = v.abs().min(Epoch::MAX.value());
    let dt = decode_seconds(ms / 1000.0);
    dt.with_subsecond((ms % 1000.0) as i64, 0, 0)
}

// ═══════════════════════════════════════════════════════════════════════════
// Text
// ═══════════════════════════════════════════════════════════════════════════

#[inline]
fn normalize_style(style: i32) -> usize {
    if (0..=4).contains(&style) {
        style as usize
    } else {
        4
    }
}

/// Text form of an EPOCH value in one of the five styles.
pub fn encode(epoch: Epoch, style: i32) -> String {
    let style = normalize_style(style);
    if epoch.is_undefined() {
        return NAN_TEXT.to_owned();
    }
    if epoch.is_fill() || epoch.is_illegal() {
        return FILL_TEXT[style].to_owned();
    }
    standard_format(style).render(&breakdown(epoch), Precision::Millisecond)
}

/// Renders an EPOCH value with a tokenized template.
pub fn encode_with(epoch: Epoch, format: &EpochFormat) -> String {
    if epoch.is_undefined() {
        return NAN_TEXT.to_owned();
    }
    if format.is_empty() {
        return encode(epoch, 0);
    }
    format.render(&breakdown(epoch), Precision::Millisecond)
}

/// Renders an EPOCH value with a template string; see [`crate::template`].
#[inline]
pub fn encode_format(epoch: Epoch, pattern: &str) -> String {
    encode_with(epoch, &EpochFormat::new(pattern))
}

#[inline]
pub(crate) fn byte_at(b: &[u8], i: usize) -> u8 {
    b.get(i).copied().unwrap_or(0)
}

#[inline]
pub(crate) fn is_iso_separator(c: u8) -> bool {
    matches!(c, b'T' | b't' | b' ' | b'/')
}

/// Digits after the first `.` at or past `from`, right-padded with zeros
/// to `width`; zero when absent.
pub(crate) fn fraction_after(s: &str, from: usize, width: usize) -> i64 {
    let Some(dot) = s.get(from..).and_then(|t| t.find('.')) else {
        return 0;
    };
    let digits: String = s[from + dot + 1..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .take(width)
        .map(char::from)
        .collect();
    if digits.is_empty() {
        return 0;
    }
    format!("{digits:0<width$}").parse().unwrap_or(0)
}

/// EPOCH value of a string in any of the five styles.
///
/// The style is detected from the length and the delimiter positions.
/// A month abbreviation may be in any case, a short millisecond field is
/// read as if right-padded with zeros, and malformed text returns
/// [`Epoch::ILLEGAL`].
pub fn parse(text: &str) -> Epoch {
    if text.to_ascii_lowercase().contains("nan") {
        return Epoch::NAN;
    }
    let s = trim_unprintable(text);
    if !s.is_ascii() {
        return Epoch::ILLEGAL;
    }
    let b = s.as_bytes();
    let len = b.len();
    let last = byte_at(b, len.wrapping_sub(1));
    let iso = is_iso_separator(byte_at(b, 10));

    if len == STYLE0_LEN {
        if byte_at(b, 11) == b' ' {
            parse_style0(s)
        } else if iso {
            parse_iso(s)
        } else {
            Epoch::ILLEGAL
        }
    } else if len == STYLE1_LEN && byte_at(b, 8) == b'.' {
        parse_style1(s)
    } else if len == STYLE2_LEN && scan(&s[..8], "%8ld").count() == 1 {
        parse_style2(s)
    } else if len == STYLE4_LEN && iso {
        parse_iso(s)
    } else if len == STYLE0_LEN + 1 && matches!(last, b'Z' | b'z') {
        parse_style0(s)
    } else if byte_at(b, 11) == b' ' {
        parse_style0(s)
    } else if iso {
        parse_iso(s)
    } else if (9..STYLE1_LEN).contains(&len) && byte_at(b, 8) == b'.' {
        parse_style1(s)
    } else {
        Epoch::ILLEGAL
    }
}

fn parse_style0(s: &str) -> Epoch {
    let f = scan(s, "%2ld-%c%c%c-%4ld %2ld:%2ld:%2ld");
    if f.count() < 8 {
        return Epoch::ILLEGAL;
    }
    let token: String = [f.char(1), f.char(2), f.char(3)].iter().map(|&c| char::from(c)).collect();
    let Some(month) = month_number(&token) else {
        return Epoch::ILLEGAL;
    };
    let dt = CalendarDateTime::new(f.int(4), month, f.int(0))
        .with_time(f.int(5), f.int(6), f.int(7))
        .with_subsecond(fraction_after(s, 20, 3), 0, 0);
    compute(&dt)
}

fn parse_style1(s: &str) -> Epoch {
    if s == FILL_TEXT[1] {
        return Epoch::FILL;
    }
    let mut padded = s.to_owned();
    while padded.len() < STYLE1_LEN {
        padded.push('0');
    }
    let f = scan(&padded, "%4ld%2ld%2ld.%ld");
    if f.count() != 4 {
        return Epoch::ILLEGAL;
    }
    let mut fraction = f.int(3) as f64 / 1.0e7;
    let hour = (fraction * 24.0) as i64;
    fraction -= hour as f64 / 24.0;
    let minute = (fraction * 1440.0) as i64;
    fraction -= minute as f64 / 1440.0;
    let second = (fraction * 86_400.0) as i64;
    fraction -= second as f64 / 86_400.0;
    let milli = (fraction * MS_PER_DAY) as i64;
    let dt = CalendarDateTime::new(f.int(0), f.int(1), f.int(2))
        .with_time(hour, minute, second)
        .with_subsecond(milli, 0, 0);
    compute(&dt)
}

fn parse_style2(s: &str) -> Epoch {
    if s == FILL_TEXT[2] {
        return Epoch::FILL;
    }
    let f = scan(s, "%4ld%2ld%2ld%2ld%2ld%2ld");
    if f.count() != 6 {
        return Epoch::ILLEGAL;
    }
    let dt = CalendarDateTime::new(f.int(0), f.int(1), f.int(2)).with_time(f.int(3), f.int(4), f.int(5));
    compute(&dt)
}

/// Styles 3 and 4; the trailing `Z` is optional.
fn parse_iso(s: &str) -> Epoch {
    let f = scan(s, "%4ld-%2ld-%2ld%c%2ld:%2ld:%2ld");
    if f.count() < 7 {
        return Epoch::ILLEGAL;
    }
    let dt = CalendarDateTime::new(f.int(0), f.int(1), f.int(2))
        .with_time(f.int(4), f.int(5), f.int(6))
        .with_subsecond(fraction_after(s, 19, 3), 0, 0);
    compute(&dt)
}

// ═══════════════════════════════════════════════════════════════════════════
// Unix time and wall clock
// ═══════════════════════════════════════════════════════════════════════════

/// Unix seconds of an EPOCH value.
#[inline]
pub fn to_unix(epoch: Epoch) -> f64 {
    (epoch.value() - UNIX_EPOCH.value()) / 1000.0
}

/// EPOCH value of Unix seconds; the millisecond is rounded half-up.
pub fn from_unix(unix: f64) -> Epoch {
    if unix.is_nan() {
        return Epoch::NAN;
    }
    let seconds = unix.trunc();
    let mut millis = (unix - seconds) * 1000.0;
    if millis - millis.trunc() > 0.5 {
        millis += 1.0;
    }
    Epoch::new(seconds * 1000.0 + millis.trunc() + UNIX_EPOCH.value())
}

/// Local wall-clock time as `Weekday, d-Mon-yyyy hh:mm:ss`.
pub fn time_stamp() -> String {
    chrono::Local::now().format("%A, %-d-%b-%Y %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i64, m: i64, d: i64, h: i64, mi: i64, s: i64, ms: i64) -> CalendarDateTime {
        CalendarDateTime::new(y, m, d).with_time(h, mi, s).with_subsecond(ms, 0, 0)
    }

    #[test]
    fn reference_values() {
        assert_eq!(compute(&at(0, 1, 1, 0, 0, 0, 0)), Epoch::PAD);
        assert_eq!(compute(&at(1970, 1, 1, 0, 0, 0, 0)), UNIX_EPOCH);
        assert_eq!(compute(&at(2000, 1, 1, 0, 0, 0, 0)).value(), 63_113_904_000_000.0);
        assert_eq!(compute(&at(9999, 12, 31, 23, 59, 59, 999)), Epoch::FILL);
        assert_eq!(compute(&at(-1, 1, 1, 0, 0, 0, 0)), Epoch::ILLEGAL);
    }

    #[test]
    fn lenient_fields_carry() {
        let next = compute(&at(1999, 12, 31, 23, 59, 60, 0));
        assert_eq!(next, compute(&at(2000, 1, 1, 0, 0, 0, 0)));
        let by_doy = compute(&at(2000, 0, 61, 0, 0, 0, 0));
        assert_eq!(by_doy, compute(&at(2000, 3, 1, 0, 0, 0, 0)));
        let dec = compute(&at(2000, -1, 15, 0, 0, 0, 0));
        assert_eq!(dec, compute(&at(1999, 12, 15, 0, 0, 0, 0)));
        assert_eq!(compute(&at(0, 1, 0, 0, 0, 0, 0)), Epoch::ILLEGAL);
    }

    #[test]
    fn breakdown_inverts_compute() {
        for dt in [
            at(0, 1, 1, 0, 0, 0, 0),
            at(1582, 10, 15, 1, 2, 3, 4),
            at(1993, 10, 10, 23, 45, 49, 999),
            at(2400, 2, 29, 12, 0, 0, 500),
            at(9999, 12, 31, 23, 59, 59, 998),
        ] {
            assert_eq!(breakdown(compute(&dt)), dt, "{dt:?}");
        }
    }

    #[test]
    fn breakdown_sentinels() {
        let fill = at(9999, 12, 31, 23, 59, 59, 999);
        assert_eq!(breakdown(Epoch::FILL), fill);
        assert_eq!(breakdown(Epoch::ILLEGAL), fill);
        assert_eq!(breakdown(Epoch::new(-0.0)), CalendarDateTime::default());
        assert_eq!(breakdown(Epoch::NAN), CalendarDateTime::default());
        assert_eq!(breakdown(Epoch::new(1.0e20)), breakdown(Epoch::MAX));
    }

    #[test]
    fn styles() {
        let e = compute(&at(1990, 4, 1, 3, 5, 2, 0));
        assert_eq!(encode(e, 0), "01-Apr-1990 03:05:02.000");
        assert_eq!(encode(e, 2), "19900401030502");
        assert_eq!(encode(e, 3), "1990-04-01T03:05:02.000Z");
        assert_eq!(encode(e, 4), "1990-04-01T03:05:02.000");
        assert_eq!(encode(e, -3), encode(e, 4));
        let noon = compute(&at(1995, 5, 8, 12, 0, 0, 0));
        assert_eq!(encode(noon, 1), "19950508.5000000");
    }

    #[test]
    fn sentinel_text() {
        for style in 0..5 {
            assert_eq!(encode(Epoch::FILL, style), FILL_TEXT[style as usize]);
            assert_eq!(encode(Epoch::ILLEGAL, style), FILL_TEXT[style as usize]);
            assert_eq!(encode(Epoch::NAN, style), "Nan");
            assert_eq!(parse(FILL_TEXT[style as usize]), Epoch::FILL);
            assert_eq!(parse(&encode(Epoch::PAD, style)), Epoch::PAD);
        }
        assert!(parse("nan").is_undefined());
        assert!(parse("  NaN ").is_undefined());
    }

    #[test]
    fn every_style_round_trips() {
        let e = compute(&at(1993, 10, 10, 12, 0, 0, 0));
        for style in 0..5 {
            assert_eq!(parse(&encode(e, style)), e, "style {style}");
        }
        let e = compute(&at(1993, 10, 10, 23, 45, 49, 999));
        for style in [0, 3, 4] {
            assert_eq!(parse(&encode(e, style)), e, "style {style}");
        }
    }

    #[test]
    fn lenient_parsing() {
        let e = compute(&at(1990, 4, 1, 3, 5, 2, 500));
        assert_eq!(parse(" 01-apr-1990 03:05:02.500\t"), e);
        assert_eq!(parse("01-Apr-1990 03:05:02.5"), e);
        assert_eq!(parse("1990-04-01T03:05:02.5"), e);
        assert_eq!(parse("1990-04-01 03:05:02.500Z"), e);
        assert_eq!(parse("19671231.5"), compute(&at(1967, 12, 31, 12, 0, 0, 0)));
        assert_eq!(parse("1990-04-01T03:05:02"), compute(&at(1990, 4, 1, 3, 5, 2, 0)));
    }

    #[test]
    fn malformed_text_is_illegal() {
        for bad in ["", "hello", "01-Foo-1990 03:05:02.000", "1990:04:01"] {
            assert_eq!(parse(bad), Epoch::ILLEGAL, "{bad:?}");
        }
    }

    #[test]
    fn custom_formats() {
        let e = compute(&at(1990, 4, 1, 3, 5, 2, 7));
        assert_eq!(encode_format(e, "<doy.03>/<yr> <hour>h"), "091/90 03h");
        assert_eq!(encode_format(e, ""), encode(e, 0));
        assert_eq!(encode_format(Epoch::NAN, "<year>"), "Nan");
    }

    #[test]
    fn unix_round_trip() {
        let e = compute(&at(2017, 1, 1, 0, 0, 0, 250));
        let u = to_unix(e);
        assert!((u - 1_483_228_800.25).abs() < 1e-9);
        assert_eq!(from_unix(u), e);
        assert_eq!(from_unix(0.0), UNIX_EPOCH);
        assert!(from_unix(f64::NAN).is_undefined());
    }

    #[test]
    fn time_stamp_shape() {
        let stamp = time_stamp();
        let (weekday, rest) = stamp.split_once(", ").unwrap();
        assert!(weekday.ends_with("day"));
        assert_eq!(rest.matches('-').count(), 2);
        assert_eq!(rest.matches(':').count(), 2);
    }
}
