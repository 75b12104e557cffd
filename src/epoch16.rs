// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! # EPOCH16 codec
//!
//! EPOCH16 pairs whole seconds from 0000-01-01T00:00:00 with picoseconds
//! into the second, no leap seconds.
//!
//! | Style | Layout |
//! |-------|--------|
//! | 0 | `dd-Mon-yyyy hh:mm:ss.mmm.uuu.nnn.ppp` |
//! | 1 | `yyyymmdd.fffffffffffffff` (15-digit day fraction) |
//! | 2 | `yyyymmddhhmmss` |
//! | 3 | `yyyy-mm-ddThh:mm:ss.mmm.uuu.nnn.pppZ` |
//! | 4 | `yyyy-mm-ddThh:mm:ss.mmmuuunnnppp` |
//!
//! [`Epoch16::FILL`] and [`Epoch16::ILLEGAL`] both encode as the
//! 9999-12-31T23:59:59.999999999999 literal of the style.

use crate::calendar::{month_number, CalendarDateTime};
use crate::epoch::{byte_at, days_since_0ad, decode_seconds, fraction_after, is_iso_separator, NAN_TEXT};
use crate::scan::scan;
use crate::template::{EpochFormat, Precision};
use crate::tt2000::trim_unprintable;
use crate::value::{Epoch16, TimeValue};
use std::sync::OnceLock;

const PS_PER_SECOND: f64 = 1.0e12;
/// Seconds from 0000-01-01 to 1970-01-01.
const UNIX_EPOCH_SECONDS: f64 = 62_167_219_200.0;

const STYLE_TEMPLATES: [&str; 5] = [
    "<dom.02>-<month>-<year> <hour>:<min>:<sec>.<msc>.<usc>.<nsc>.<psc>",
    "<year><mm.02><dom.02>.<fod.15>",
    "<year><mm.02><dom.02><hour><min><sec>",
    "<year>-<mm.02>-<dom.02>T<hour>:<min>:<sec>.<msc>.<usc>.<nsc>.<psc>Z",
    "<year>-<mm.02>-<dom.02>T<hour>:<min>:<sec>.<msc><usc><nsc><psc>",
];

const FILL_TEXT: [&str; 5] = [
    "31-Dec-9999 23:59:59.999.999.999.999",
    "99991231.999999999999999",
    "99991231235959",
    "9999-12-31T23:59:59.999.999.999.999Z",
    "9999-12-31T23:59:59.999999999999",
];

const STYLE0_LEN: usize = 36;
const STYLE1_LEN: usize = 24;
const STYLE2_LEN: usize = 14;
const STYLE4_LEN: usize = 32;

fn standard_format(style: usize) -> &'static EpochFormat {
    static FORMATS: OnceLock<Vec<EpochFormat>> = OnceLock::new();
    &FORMATS.get_or_init(|| STYLE_TEMPLATES.iter().map(|t| EpochFormat::new(t)).collect())[style]
}

#[inline]
fn fill_reading() -> CalendarDateTime {
    CalendarDateTime::new(9999, 12, 31)
        .with_time(23, 59, 59)
        .with_subsecond(999, 999, 999)
        .with_picosecond(999)
}

/// Sets the four sub-second groups from a picosecond count below one second.
#[inline]
fn with_picoseconds(dt: CalendarDateTime, ps: i64) -> CalendarDateTime {
    dt.with_subsecond(ps / 1_000_000_000, ps / 1_000_000 % 1000, ps / 1000 % 1000)
        .with_picosecond(ps % 1000)
}

// ═══════════════════════════════════════════════════════════════════════════
// Compute / breakdown
// ═══════════════════════════════════════════════════════════════════════════

#[inline]
fn sub_second_total(dt: &CalendarDateTime) -> f64 {
    dt.millisecond as f64 * 1.0e9 + dt.microsecond as f64 * 1.0e6 + dt.nanosecond as f64 * 1.0e3 + dt.picosecond as f64
}

fn compute_lenient(dt: &CalendarDateTime) -> Epoch16 {
    let (mut year, mut month) = (dt.year, dt.month);
    if month < 0 {
        year -= 1;
        month += 13;
    }
    let days = days_since_0ad(year, month, dt.day);
    if days < 0 {
        return Epoch16::ILLEGAL;
    }
    let mut seconds =
        86_400.0 * days as f64 + 3600.0 * dt.hour as f64 + 60.0 * dt.minute as f64 + dt.second as f64;
    let mut ps = sub_second_total(dt);
    if !(0.0..PS_PER_SECOND).contains(&ps) {
        let carry = (ps / PS_PER_SECOND).floor();
        seconds += carry;
        ps -= carry * PS_PER_SECOND;
    }
    if seconds < 0.0 {
        Epoch16::ILLEGAL
    } else {
        Epoch16::new(seconds, ps)
    }
}

/// EPOCH16 value of a calendar reading, to the picosecond.
///
/// 9999-12-31T23:59:59.999.999.999.999 returns [`Epoch16::FILL`] and a
/// negative year [`Epoch16::ILLEGAL`]. Out-of-range fields carry as
/// offsets; a picosecond total of one second or more moves into the seconds
/// half.
pub fn compute(dt: &CalendarDateTime) -> Epoch16 {
    if *dt == fill_reading() {
        return Epoch16::FILL;
    }
    if dt.year < 0 {
        return Epoch16::ILLEGAL;
    }
    let sub = [dt.millisecond, dt.microsecond, dt.nanosecond, dt.picosecond];
    let strict = dt.year <= 9999
        && (0..=12).contains(&dt.month)
        && (0..=23).contains(&dt.hour)
        && (0..=59).contains(&dt.minute)
        && (0..=59).contains(&dt.second)
        && sub.iter().all(|v| (0..=999).contains(v))
        && if dt.month == 0 { (1..=366).contains(&dt.day) } else { (1..=31).contains(&dt.day) };
    if !strict {
        return compute_lenient(dt);
    }
    let days = days_since_0ad(dt.year, dt.month, dt.day);
    let in_day = 3600 * dt.hour + 60 * dt.minute + dt.second;
    Epoch16::new(86_400.0 * days as f64 + in_day as f64, sub_second_total(dt))
}

/// Calendar reading of an EPOCH16 value.
///
/// Either half `NaN` decodes as all zeros; [`Epoch16::FILL`] and
/// [`Epoch16::ILLEGAL`] as the 9999-12-31 fill reading. Negative halves
/// decode by magnitude and both halves are clamped to their maxima.
pub fn breakdown(epoch: Epoch16) -> CalendarDateTime {
    if epoch.is_undefined() {
        return CalendarDateTime::default();
    }
    if epoch == Epoch16::FILL || epoch == Epoch16::ILLEGAL {
        return fill_reading();
    }
    let seconds = epoch.seconds().abs().min(Epoch16::MAX_SECONDS);
    let ps = epoch.picoseconds().abs().min(Epoch16::MAX_PICOSECONDS);
    with_picoseconds(decode_seconds(seconds.trunc()), ps as i64)
}

// ═══════════════════════════════════════════════════════════════════════════
// Text
// ═══════════════════════════════════════════════════════════════════════════

/// Text form of an EPOCH16 value in one of the five styles; other style
/// numbers use style 4.
pub fn encode(epoch: Epoch16, style: i32) -> String {
    let style = if (0..=4).contains(&style) { style as usize } else { 4 };
    if epoch.is_undefined() {
        return NAN_TEXT.to_owned();
    }
    if epoch == Epoch16::FILL || epoch == Epoch16::ILLEGAL {
        return FILL_TEXT[style].to_owned();
    }
    let clamped = Epoch16::new(epoch.seconds().max(0.0), epoch.picoseconds().max(0.0));
    standard_format(style).render(&breakdown(clamped), Precision::Picosecond)
}

/// Renders an EPOCH16 value with a tokenized template.
pub fn encode_with(epoch: Epoch16, format: &EpochFormat) -> String {
    if epoch.is_undefined() {
        return NAN_TEXT.to_owned();
    }
    if format.is_empty() {
        return encode(epoch, 0);
    }
    format.render(&breakdown(epoch), Precision::Picosecond)
}

/// Renders an EPOCH16 value with a template string.
#[inline]
pub fn encode_format(epoch: Epoch16, pattern: &str) -> String {
    encode_with(epoch, &EpochFormat::new(pattern))
}

/// EPOCH16 value of a string in any of the five styles.
///
/// Malformed text returns [`Epoch16::ILLEGAL`]; text containing `nan`
/// returns [`Epoch16::NAN`].
pub fn parse(text: &str) -> Epoch16 {
    if text.to_ascii_lowercase().contains("nan") {
        return Epoch16::NAN;
    }
    let s = trim_unprintable(text);
    if !s.is_ascii() {
        return Epoch16::ILLEGAL;
    }
    let b = s.as_bytes();
    let len = b.len();
    let blank = byte_at(b, 11) == b' ';
    let iso = is_iso_separator(byte_at(b, 10));
    let zulu = matches!(byte_at(b, len.wrapping_sub(1)), b'Z' | b'z');

    if len == STYLE0_LEN {
        if blank {
            parse_style0(s)
        } else if iso {
            parse_style3(s)
        } else {
            Epoch16::ILLEGAL
        }
    } else if len == STYLE1_LEN && byte_at(b, 8) == b'.' {
        parse_style1(s)
    } else if len == STYLE2_LEN && scan(&s[..8], "%8ld").count() == 1 {
        parse_style2(s)
    } else if len == STYLE4_LEN && iso {
        parse_style4(s)
    } else if len < STYLE0_LEN && blank {
        parse_style0(s)
    } else if len < STYLE0_LEN && iso {
        if zulu {
            parse_style4(&s[..len - 1])
        } else if len == STYLE0_LEN - 1 {
            parse_style3(s)
        } else {
            parse_style4(s)
        }
    } else if blank {
        parse_style0(s)
    } else if iso {
        if zulu {
            parse_style3(s)
        } else {
            parse_style4(s)
        }
    } else {
        Epoch16::ILLEGAL
    }
}

/// Assembles the reading once every dotted sub-second group is in range.
fn finish_groups(dt: CalendarDateTime, groups: [i64; 4]) -> Epoch16 {
    if groups.iter().any(|g| !(0..=999).contains(g)) {
        return Epoch16::ILLEGAL;
    }
    compute(&dt.with_subsecond(groups[0], groups[1], groups[2]).with_picosecond(groups[3]))
}

fn parse_style0(s: &str) -> Epoch16 {
    let f = scan(s, "%2ld-%c%c%c-%4ld %2ld:%2ld:%2ld.%3ld.%3ld.%3ld.%3ld");
    if f.count() < 8 {
        return Epoch16::ILLEGAL;
    }
    let token: String = [f.char(1), f.char(2), f.char(3)].iter().map(|&c| char::from(c)).collect();
    let Some(month) = month_number(&token) else {
        return Epoch16::ILLEGAL;
    };
    let dt = CalendarDateTime::new(f.int(4), month, f.int(0)).with_time(f.int(5), f.int(6), f.int(7));
    finish_groups(dt, [f.int(8), f.int(9), f.int(10), f.int(11)])
}

fn parse_style1(s: &str) -> Epoch16 {
    if s == FILL_TEXT[1] {
        return Epoch16::FILL;
    }
    let f = scan(s, "%4ld%2ld%2ld.%7ld%8ld");
    if f.count() != 5 {
        return Epoch16::ILLEGAL;
    }
    let mut fraction = (f.int(3) as f64 * 1.0e8 + f.int(4) as f64) / 1.0e15;
    let hour = (fraction * 24.0) as i64;
    fraction -= hour as f64 / 24.0;
    let minute = (fraction * 1440.0) as i64;
    fraction -= minute as f64 / 1440.0;
    let second = (fraction * 86_400.0) as i64;
    fraction -= second as f64 / 86_400.0;
    let ps = (fraction * 86_400.0 * PS_PER_SECOND).round().max(0.0) as i64;
    let dt = CalendarDateTime::new(f.int(0), f.int(1), f.int(2)).with_time(hour, minute, second);
    compute(&with_picoseconds(dt, ps))
}

fn parse_style2(s: &str) -> Epoch16 {
    if s == FILL_TEXT[2] {
        return Epoch16::FILL;
    }
    let f = scan(s, "%4ld%2ld%2ld%2ld%2ld%2ld");
    if f.count() != 6 {
        return Epoch16::ILLEGAL;
    }
    compute(&CalendarDateTime::new(f.int(0), f.int(1), f.int(2)).with_time(f.int(3), f.int(4), f.int(5)))
}

fn parse_style3(s: &str) -> Epoch16 {
    let f = scan(s, "%4ld-%2ld-%2ld%c%2ld:%2ld:%2ld.%3ld.%3ld.%3ld.%3ld");
    if f.count() < 7 {
        return Epoch16::ILLEGAL;
    }
    let dt = CalendarDateTime::new(f.int(0), f.int(1), f.int(2)).with_time(f.int(4), f.int(5), f.int(6));
    finish_groups(dt, [f.int(7), f.int(8), f.int(9), f.int(10)])
}

fn parse_style4(s: &str) -> Epoch16 {
    let f = scan(s, "%4ld-%2ld-%2ld%c%2ld:%2ld:%2ld");
    if f.count() < 7 {
        return Epoch16::ILLEGAL;
    }
    let dt = CalendarDateTime::new(f.int(0), f.int(1), f.int(2)).with_time(f.int(4), f.int(5), f.int(6));
    compute(&with_picoseconds(dt, fraction_after(s, 19, 12)))
}

// ═══════════════════════════════════════════════════════════════════════════
// Unix time
// ═══════════════════════════════════════════════════════════════════════════

/// Unix seconds of an EPOCH16 value, to the microsecond.
pub fn to_unix(epoch: Epoch16) -> f64 {
    if epoch.is_undefined() {
        return f64::NAN;
    }
    let mut micros = epoch.picoseconds() * 1.0e-6;
    if micros - micros.trunc() > 0.5 {
        micros += 1.0;
    }
    epoch.seconds() - UNIX_EPOCH_SECONDS + micros.trunc() * 1.0e-6
}

/// EPOCH16 value of Unix seconds; the microsecond is rounded half-up.
pub fn from_unix(unix: f64) -> Epoch16 {
    if unix.is_nan() {
        return Epoch16::NAN;
    }
    let whole = unix.floor();
    let mut micros = (unix - whole) * 1.0e6;
    if micros - micros.trunc() > 0.5 {
        micros += 1.0;
    }
    Epoch16::new(whole + UNIX_EPOCH_SECONDS, micros.trunc() * 1.0e6)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i64, m: i64, d: i64, h: i64, mi: i64, s: i64) -> CalendarDateTime {
        CalendarDateTime::new(y, m, d).with_time(h, mi, s)
    }

    fn sample() -> CalendarDateTime {
        at(1990, 4, 1, 3, 5, 2).with_subsecond(7, 8, 9).with_picosecond(10)
    }

    #[test]
    fn reference_values() {
        assert_eq!(compute(&at(0, 1, 1, 0, 0, 0)), Epoch16::PAD);
        assert_eq!(compute(&at(2000, 1, 1, 0, 0, 0)), Epoch16::new(63_113_904_000.0, 0.0));
        assert_eq!(compute(&sample()).picoseconds(), 7_008_009_010.0);
        assert_eq!(compute(&fill_reading()), Epoch16::FILL);
        assert_eq!(compute(&at(-3, 1, 1, 0, 0, 0)), Epoch16::ILLEGAL);
    }

    #[test]
    fn lenient_fields_carry() {
        let over = compute(&at(2000, 1, 1, 0, 0, 0).with_subsecond(1500, 0, 0));
        assert_eq!(over, compute(&at(2000, 1, 1, 0, 0, 1).with_subsecond(500, 0, 0)));
        let minute = compute(&at(1999, 12, 31, 23, 59, 60));
        assert_eq!(minute, compute(&at(2000, 1, 1, 0, 0, 0)));
        let dec = compute(&at(2000, -1, 15, 0, 0, 0));
        assert_eq!(dec, compute(&at(1999, 12, 15, 0, 0, 0)));
        assert_eq!(compute(&at(0, 1, 0, 0, 0, 0)), Epoch16::ILLEGAL);
        assert_eq!(compute(&at(2000, 0, 61, 0, 0, 0)), compute(&at(2000, 3, 1, 0, 0, 0)));
    }

    #[test]
    fn breakdown_inverts_compute() {
        for dt in [
            sample(),
            at(0, 1, 1, 0, 0, 0),
            at(2016, 12, 31, 23, 59, 59).with_subsecond(999, 0, 1).with_picosecond(2),
            at(9999, 12, 31, 23, 59, 59).with_subsecond(999, 999, 999).with_picosecond(998),
        ] {
            assert_eq!(breakdown(compute(&dt)), dt, "{dt:?}");
        }
    }

    #[test]
    fn breakdown_sentinels_and_clamping() {
        assert_eq!(breakdown(Epoch16::FILL), fill_reading());
        assert_eq!(breakdown(Epoch16::ILLEGAL), fill_reading());
        assert_eq!(breakdown(Epoch16::NAN), CalendarDateTime::default());
        assert_eq!(breakdown(Epoch16::new(f64::NAN, 0.0)), CalendarDateTime::default());
        assert_eq!(
            breakdown(Epoch16::new(1.0e20, 5.0)),
            breakdown(Epoch16::new(Epoch16::MAX_SECONDS, 5.0))
        );
        assert_eq!(breakdown(Epoch16::new(0.0, 5.0e15)).picosecond, 999);
    }

    #[test]
    fn styles() {
        let e = compute(&sample());
        assert_eq!(encode(e, 0), "01-Apr-1990 03:05:02.007.008.009.010");
        assert_eq!(encode(e, 2), "19900401030502");
        assert_eq!(encode(e, 3), "1990-04-01T03:05:02.007.008.009.010Z");
        assert_eq!(encode(e, 4), "1990-04-01T03:05:02.007008009010");
        assert_eq!(encode(e, 9), encode(e, 4));
        let noon = compute(&at(1995, 5, 8, 12, 0, 0));
        assert_eq!(encode(noon, 1), "19950508.500000000000000");
    }

    #[test]
    fn sentinel_text() {
        for style in 0..5 {
            let literal = FILL_TEXT[style as usize];
            assert_eq!(encode(Epoch16::FILL, style), literal);
            assert_eq!(encode(Epoch16::ILLEGAL, style), literal);
            assert_eq!(encode(Epoch16::NAN, style), "Nan");
            assert_eq!(parse(literal), Epoch16::FILL, "{literal}");
            assert_eq!(parse(&encode(Epoch16::PAD, style)), Epoch16::PAD, "style {style}");
        }
        assert!(parse("NaN").is_undefined());
    }

    #[test]
    fn every_style_round_trips() {
        let noon = compute(&at(1993, 10, 10, 12, 0, 0));
        for style in 0..5 {
            assert_eq!(parse(&encode(noon, style)), noon, "style {style}");
        }
        let e = compute(&at(1993, 10, 10, 23, 45, 49).with_subsecond(123, 456, 789).with_picosecond(12));
        for style in [0, 3, 4] {
            assert_eq!(parse(&encode(e, style)), e, "style {style}");
        }
        assert_eq!(parse(&encode(e, 2)), compute(&at(1993, 10, 10, 23, 45, 49)));
    }

    #[test]
    fn lenient_parsing() {
        let half = compute(&at(1990, 4, 1, 3, 5, 2).with_subsecond(500, 0, 0));
        assert_eq!(parse("1990-04-01T03:05:02.5"), half);
        assert_eq!(parse("1990-04-01T03:05:02.5Z"), half);
        assert_eq!(parse("1990-04-01 03:05:02.500000000000"), half);
        let e = compute(&sample());
        assert_eq!(parse("1990-04-01T03:05:02.007.008.009.010"), e);
        assert_eq!(parse(" 01-apr-1990 03:05:02.007.008.009.010\n"), e);
        assert_eq!(parse("01-Apr-1990 03:05:02"), compute(&at(1990, 4, 1, 3, 5, 2)));
    }

    #[test]
    fn malformed_text_is_illegal() {
        for bad in [
            "",
            "garbage",
            "01-Foo-1990 03:05:02.007.008.009.010",
            "01-Apr-1990 03:05:02.007.-08.009.010",
        ] {
            assert_eq!(parse(bad), Epoch16::ILLEGAL, "{bad:?}");
        }
    }

    #[test]
    fn custom_formats() {
        let e = compute(&sample());
        assert_eq!(encode_format(e, "<sec>.<msc>|<psc.04>"), "02.007|0010");
        assert_eq!(encode_format(e, "<fos>"), "007008009010");
        assert_eq!(encode_format(e, ""), encode(e, 0));
        assert_eq!(encode_format(Epoch16::NAN, "<year>"), "Nan");
    }

    #[test]
    fn unix_round_trip() {
        let e = compute(&at(2017, 1, 1, 0, 0, 0).with_subsecond(250, 0, 0));
        let u = to_unix(e);
        assert!((u - 1_483_228_800.25).abs() < 1e-6);
        assert_eq!(from_unix(u), e);
        assert_eq!(from_unix(-0.5), compute(&at(1969, 12, 31, 23, 59, 59).with_subsecond(500, 0, 0)));
        assert!(to_unix(Epoch16::NAN).is_nan());
        assert!(from_unix(f64::NAN).is_undefined());
    }
}
