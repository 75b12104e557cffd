// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! # TT2000 codec
//!
//! TT2000 counts SI nanoseconds from 2000-01-01T12:00:00 Terrestrial Time.
//! Mapping it to a UTC calendar reading needs the leap-second table:
//!
//! ```text
//! TT2000 = (JDN − 2 451 545)·86 400 s + time-of-day − 12 h + ΔAT(date) + 32.184 s
//! ```
//!
//! Every operation takes the [`LeapSecondTable`] it runs against; use
//! [`crate::LeapSecondCache::table`] for the process-wide one.
//!
//! ## Text styles
//!
//! | Style | Layout | Fill literal |
//! |-------|--------|--------------|
//! | 0 | `dd-Mon-yyyy hh:mm:ss.mmmuuunnn` | `31-Dec-9999 23:59:59.999999999` |
//! | 1 | `yyyymmdd.ffffffffff` (day fraction) | `99991231.9999999999` |
//! | 2 | `yyyymmddhhmmss` | `99991231235959` |
//! | 3 | `yyyy-mm-ddThh:mm:ss.mmmuuunnn` | `9999-12-31T23:59:59.999999999` |
//! | 4 | style 3 with a trailing `Z` | `9999-12-31T23:59:59.999999999Z` |
//!
//! Style numbers outside `0..=4` encode as style 3. An inserted leap
//! second reads as second 60, e.g. `2016-12-31T23:59:60.000000000`.
//!
//! ## Tables that changed under the data
//!
//! The `*_with_based_leap_day` family reproduces values written when the
//! newest known leap second was `as_of` (`yyyymmdd`): every leap second the
//! live table adds after `as_of` is compensated by one second.

use crate::calendar::{
    calendar_from_julian_day_number, cumulative_day_of_year, days_in_month, days_in_year,
    julian_day_number, month_number, month_token, CalendarDate, CalendarDateTime, JDN_J2000,
};
use crate::leap_seconds::LeapSecondTable;
use crate::scan::{leading_int, scan};
use crate::value::{Epoch, Epoch16, TimeState, TimeValue, Tt2000};
use crate::epoch::{self, decode_seconds};
use crate::epoch16;
use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};

const SECOND_NS: i64 = 1_000_000_000;
const MINUTE_NS: i64 = 60 * SECOND_NS;
const HOUR_NS: i64 = 3600 * SECOND_NS;
const DAY_NS: i64 = 86_400 * SECOND_NS;
const HALF_DAY_NS: i64 = 43_200 * SECOND_NS;
/// TT − TAI.
const TT_MINUS_TAI_NS: i64 = 32_184_000_000;
/// Seconds from 0000-01-01T00:00 to 2000-01-01T00:00.
const J2000_SINCE_0AD_SEC: f64 = 63_113_904_000.0;
/// EPOCH value of 1970-01-01T00:00:00.
const UNIX_EPOCH_MS: f64 = 62_167_219_200_000.0;

/// JDN bounds of the representable range, 1707-09-22 and 2292-04-11.
const JDN_FIRST: i64 = 2_344_793;
const JDN_LAST: i64 = 2_558_297;

/// Inputs beyond these magnitudes cannot land in range.
const MAX_YEAR_INPUT: f64 = 1.0e6;
const MAX_DAY_SPAN: f64 = 1.0e8;

const DEFAULT_STYLE: i32 = 3;

const FILL_TEXT: [&str; 5] = [
    "31-Dec-9999 23:59:59.999999999",
    "99991231.9999999999",
    "99991231235959",
    "9999-12-31T23:59:59.999999999",
    "9999-12-31T23:59:59.999999999Z",
];

const PAD_TEXT: [&str; 5] = [
    "01-JAN-0000 00:00:00.000000000",
    "00000101.0000000000",
    "00000101000000",
    "0000-01-01T00:00:00.000000000",
    "0000-01-01T00:00:00.000000000Z",
];

// ═══════════════════════════════════════════════════════════════════════════
// Variable-resolution fields
// ═══════════════════════════════════════════════════════════════════════════

/// Finest field supplied to [`compute`] or requested from [`breakdown`].
///
/// Fields finer than the resolution are derived from the fractional part of
/// the last field on input, and folded into it as a fraction on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resolution {
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
    Microsecond,
    Nanosecond,
}

impl Resolution {
    /// Number of time-of-day fields carried at this resolution.
    #[inline]
    pub const fn time_fields(self) -> usize {
        match self {
            Self::Day => 0,
            Self::Hour => 1,
            Self::Minute => 2,
            Self::Second => 3,
            Self::Millisecond => 4,
            Self::Microsecond => 5,
            Self::Nanosecond => 6,
        }
    }
}

/// Calendar fields as reals, so the last field at a [`Resolution`] may carry
/// a fraction (e.g. `day = 1.5` at [`Resolution::Day`] is noon).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateTimeFields {
    pub year: f64,
    pub month: f64,
    pub day: f64,
    pub hour: f64,
    pub minute: f64,
    pub second: f64,
    pub millisecond: f64,
    pub microsecond: f64,
    pub nanosecond: f64,
}

impl DateTimeFields {
    #[inline]
    pub const fn new(year: f64, month: f64, day: f64) -> Self {
        Self {
            year,
            month,
            day,
            hour: 0.0,
            minute: 0.0,
            second: 0.0,
            millisecond: 0.0,
            microsecond: 0.0,
            nanosecond: 0.0,
        }
    }

    #[inline]
    pub const fn with_time(mut self, hour: f64, minute: f64, second: f64) -> Self {
        self.hour = hour;
        self.minute = minute;
        self.second = second;
        self
    }

    #[inline]
    pub const fn with_subsecond(mut self, millisecond: f64, microsecond: f64, nanosecond: f64) -> Self {
        self.millisecond = millisecond;
        self.microsecond = microsecond;
        self.nanosecond = nanosecond;
        self
    }

    #[inline]
    fn time(&self) -> [f64; 6] {
        [
            self.hour,
            self.minute,
            self.second,
            self.millisecond,
            self.microsecond,
            self.nanosecond,
        ]
    }
}

impl From<&CalendarDateTime> for DateTimeFields {
    fn from(dt: &CalendarDateTime) -> Self {
        Self::new(dt.year as f64, dt.month as f64, dt.day as f64)
            .with_time(dt.hour as f64, dt.minute as f64, dt.second as f64)
            .with_subsecond(dt.millisecond as f64, dt.microsecond as f64, dt.nanosecond as f64)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Validity
// ═══════════════════════════════════════════════════════════════════════════

#[inline]
fn year_within(year: i64) -> bool {
    (1708..=2291).contains(&year)
}

#[inline]
fn ymd_within(year: i64, month: i64, day: i64) -> bool {
    if year <= 0 || month < 0 || day < 0 {
        return false;
    }
    (JDN_FIRST..=JDN_LAST).contains(&julian_day_number(year, month, day))
}

/// Rejects dates outside the representable window.
#[inline]
fn date_in_range(year: i64, month: i64, day: i64) -> bool {
    year_within(year) || ymd_within(year, month, day)
}

// ═══════════════════════════════════════════════════════════════════════════
// Compute
// ═══════════════════════════════════════════════════════════════════════════

/// Fills `out[field..]` from `value`, expressed in units of `out[field]`.
fn cascade(value: f64, field: usize, out: &mut [f64; 6]) {
    const PER_UNIT: [f64; 5] = [60.0, 60.0, 1000.0, 1000.0, 1000.0];
    let mut rest = value;
    for i in field..5 {
        out[i] = rest.floor();
        rest = (rest - out[i]) * PER_UNIT[i];
    }
    out[5] = rest;
}

#[inline]
fn is_integral(v: f64) -> bool {
    v - v.floor() == 0.0
}

/// Moves the overflow of one field into coarser ones.
///
/// `units[i]` is the size of day/hour/minute/second/ms/us in units of
/// the overflowing field; `coarse` receives the carried amounts.
fn carry(value: &mut f64, units: &[f64], coarse: &mut [&mut f64]) {
    for (unit, target) in units.iter().zip(coarse.iter_mut()) {
        let q = (*value / unit).floor();
        *value -= q * unit;
        **target += q;
    }
}

/// TT2000 of a calendar reading at the given resolution.
///
/// Returns [`Tt2000::FILL`] for 9999-12-31T23:59:59.999, [`Tt2000::PAD`]
/// for 0000-01-01T00:00:00 and [`Tt2000::ILLEGAL`] for negative,
/// non-integral or out-of-range fields. A month of zero reads `day` as the
/// day of the year. Overflowing fields carry into coarser ones, and a
/// second of 60 is legal on a day that ends with a leap second.
pub fn compute(table: &LeapSecondTable, fields: &DateTimeFields, resolution: Resolution) -> Tt2000 {
    let supplied = resolution.time_fields();
    let opt = fields.time();
    if !fields.year.is_finite()
        || !fields.month.is_finite()
        || !fields.day.is_finite()
        || opt[..supplied].iter().any(|v| !v.is_finite())
    {
        return Tt2000::ILLEGAL;
    }

    let month = if fields.month == 0.0 { 1.0 } else { fields.month };
    let ly = fields.year.floor();
    let lm = month.floor();
    let mut ld = fields.day.floor();

    // ── Split the last supplied field into finer ones ──
    let mut t = [0.0f64; 6];
    if supplied == 0 {
        let frac = fields.day - ld;
        if frac > 0.0 {
            cascade(frac * 24.0, 0, &mut t);
        }
    } else {
        if opt[..supplied].iter().any(|&v| v < 0.0) {
            return Tt2000::ILLEGAL;
        }
        if !is_integral(fields.day) || !opt[..supplied - 1].iter().all(|&v| is_integral(v)) {
            return Tt2000::ILLEGAL;
        }
        t[..supplied - 1].copy_from_slice(&opt[..supplied - 1]);
        if supplied == 6 {
            t[5] = opt[5];
        } else {
            cascade(opt[supplied - 1], supplied - 1, &mut t);
        }
    }

    let span = ld.abs()
        + t[0] / 24.0
        + t[1] / 1440.0
        + t[2] / 86_400.0
        + t[3] / 8.64e7
        + t[4] / 8.64e10
        + t[5] / 8.64e13;
    if ly.abs() > MAX_YEAR_INPUT || lm.abs() > MAX_YEAR_INPUT || span > MAX_DAY_SPAN {
        return Tt2000::ILLEGAL;
    }

    // ── Carries ──
    let [mut lh, mut ln, mut ls, mut ll, mut lu, mut la] = t;
    let mut carried: Option<CalendarDate> = None;
    let renormalize = |ly: f64, lm: f64, ld: f64| {
        calendar_from_julian_day_number(julian_day_number(ly as i64, lm as i64, ld as i64))
    };
    if la >= 1000.0 {
        carry(
            &mut la,
            &[86_400.0e9, 3600.0e9, 60.0e9, 1.0e9, 1.0e6, 1.0e3],
            &mut [&mut ld, &mut lh, &mut ln, &mut ls, &mut ll, &mut lu],
        );
        carried = Some(renormalize(ly, lm, ld));
    }
    if lu >= 1000.0 {
        carry(
            &mut lu,
            &[86_400.0e6, 3600.0e6, 60.0e6, 1.0e6, 1.0e3],
            &mut [&mut ld, &mut lh, &mut ln, &mut ls, &mut ll],
        );
        carried = Some(renormalize(ly, lm, ld));
    }
    if ll >= 1000.0 {
        carry(
            &mut ll,
            &[86_400_000.0, 3_600_000.0, 60_000.0, 1000.0],
            &mut [&mut ld, &mut lh, &mut ln, &mut ls],
        );
        carried = Some(renormalize(ly, lm, ld));
    }
    if ls >= 60.0 {
        let jdn = julian_day_number(ly as i64, lm as i64, ld as i64);
        let next = calendar_from_julian_day_number(jdn + 1);
        let leap = (table.delta_at_ymd(next.year, next.month, next.day)
            - table.delta_at_ymd(ly as i64, lm as i64, ld as i64))
        .floor();
        if ls >= 60.0 + leap {
            carry(
                &mut ls,
                &[86_400.0 + leap, 3600.0 + leap, 60.0 + leap],
                &mut [&mut ld, &mut lh, &mut ln],
            );
            carried = Some(renormalize(ly, lm, ld));
        }
    }
    if ln >= 60.0 {
        carry(&mut ln, &[1440.0, 60.0], &mut [&mut ld, &mut lh]);
        carried = Some(renormalize(ly, lm, ld));
    }
    if lh >= 24.0 {
        carry(&mut lh, &[24.0], &mut [&mut ld]);
        carried = Some(renormalize(ly, lm, ld));
    }
    let date = carried.unwrap_or(CalendarDate::new(ly as i64, lm as i64, ld as i64));
    let (year, mut month, mut day) = (date.year, date.month, date.day);
    let (hour, minute, second) = (lh as i64, ln as i64, ls as i64);
    let (milli, micro, nano) = (ll as i64, lu as i64, la as i64);

    // ── Sentinels ──
    if year == 9999 && month == 12 && day == 31 && hour == 23 && minute == 59 && second == 59 && milli == 999 {
        return Tt2000::FILL;
    }
    if year == 0
        && month == 1
        && day == 1
        && hour == 0
        && minute == 0
        && second == 0
        && milli == 0
        && micro == 0
        && nano == 0
    {
        return Tt2000::PAD;
    }

    // ── Validation ──
    if !date_in_range(year, month, day) {
        return Tt2000::ILLEGAL;
    }
    if month == 0 {
        month = 1;
    }
    if !(1..=12).contains(&month) || day < 1 || day > days_in_year(year) {
        return Tt2000::ILLEGAL;
    }
    if month > 1 && day > days_in_month(year, month) {
        return Tt2000::ILLEGAL;
    }
    if month == 1 && day > 31 {
        match cumulative_day_of_year(year, day) {
            Some((m, d)) => {
                month = m;
                day = d;
            }
            None => return Tt2000::ILLEGAL,
        }
    }
    // ── Assemble ──
    let delta_at = table.delta_at_ymd(year, month, day);
    let days = (julian_day_number(year, month, day) - JDN_J2000) as i128;
    let sub_day = hour as i128 * HOUR_NS as i128
        + minute as i128 * MINUTE_NS as i128
        + second as i128 * SECOND_NS as i128
        + milli as i128 * 1_000_000
        + micro as i128 * 1000
        + nano as i128;
    let leap_ns = (delta_at * SECOND_NS as f64) as i64 as i128;
    let total = days * DAY_NS as i128 + sub_day - HALF_DAY_NS as i128 + leap_ns + TT_MINUS_TAI_NS as i128;
    i64::try_from(total).map(Tt2000::new).unwrap_or(Tt2000::ILLEGAL)
}

/// TT2000 of a full-resolution calendar reading.
#[inline]
pub fn compute_parts(table: &LeapSecondTable, dt: &CalendarDateTime) -> Tt2000 {
    compute(table, &DateTimeFields::from(dt), Resolution::Nanosecond)
}

// ═══════════════════════════════════════════════════════════════════════════
// Breakdown
// ═══════════════════════════════════════════════════════════════════════════

#[inline]
fn split_seconds(ns: i128) -> (i64, i64) {
    let s = SECOND_NS as i128;
    (ns.div_euclid(s) as i64, ns.rem_euclid(s) as i64)
}

/// Refines a pre-1972 guess: the drift of the guessed date gives a better ΔAT.
fn refine_guess(table: &LeapSecondTable, shifted: i128, guess: &CalendarDateTime) -> (CalendarDateTime, i64) {
    let delta = table.delta_at_ymd(guess.year, guess.month, guess.day);
    let (secs, nanos) = split_seconds(shifted - (delta * SECOND_NS as f64) as i64 as i128);
    (decode_seconds(secs as f64 + J2000_SINCE_0AD_SEC), nanos)
}

/// Full-resolution reading, plus whether it is an inserted leap second.
fn decompose(table: &LeapSecondTable, t: Tt2000) -> (CalendarDateTime, bool) {
    if t == Tt2000::FILL {
        let dt = CalendarDateTime::new(9999, 12, 31).with_time(23, 59, 59).with_subsecond(999, 999, 999);
        return (dt, false);
    }
    if t == Tt2000::PAD {
        return (CalendarDateTime::new(0, 1, 1), false);
    }

    let ns = t.value();
    let (delta, leap) = table.delta_at_ns(ns);
    // Seconds from 2000-01-01T00:00 UTC-with-ΔAT, i.e. TAI-like.
    let shifted = ns as i128 + HALF_DAY_NS as i128 - TT_MINUS_TAI_NS as i128;
    let (secs, mut nanos) = split_seconds(shifted);

    let mut dt;
    if delta > 0.0 {
        let epoch = J2000_SINCE_0AD_SEC + (secs - delta as i64) as f64;
        if leap {
            dt = decode_seconds(epoch - 1.0);
            dt.second += 1;
        } else {
            dt = decode_seconds(epoch);
        }
    } else {
        dt = decode_seconds(secs as f64 + J2000_SINCE_0AD_SEC);
        let recomputed = |dt: &CalendarDateTime, nanos: i64| {
            compute_parts(table, &dt.with_subsecond(0, 0, nanos))
        };
        if recomputed(&dt, nanos) != t {
            (dt, nanos) = refine_guess(table, shifted, &dt);
            if recomputed(&dt, nanos) != t {
                (dt, nanos) = refine_guess(table, shifted, &dt);
            }
        }
    }

    let to_plus = dt.second == 60;
    let milli = nanos / 1_000_000;
    let rest = nanos - milli * 1_000_000;
    let dt = dt.with_subsecond(milli, rest / 1000, rest % 1000);
    (dt, to_plus)
}

/// Full-resolution calendar reading of a TT2000 value.
///
/// `FILL` decodes as 9999-12-31T23:59:59.999999999 and `PAD` as
/// 0000-01-01T00:00:00. An inserted leap second has `second == 60`.
#[inline]
pub fn breakdown_parts(table: &LeapSecondTable, t: Tt2000) -> CalendarDateTime {
    decompose(table, t).0
}

/// Calendar reading at the given resolution, finer fields folded into the
/// last one as a fraction.
pub fn breakdown(table: &LeapSecondTable, t: Tt2000, resolution: Resolution) -> DateTimeFields {
    let (dt, to_plus) = decompose(table, t);
    let full = DateTimeFields::from(&dt);
    if t == Tt2000::FILL || t == Tt2000::PAD {
        return truncate_fields(full, resolution);
    }

    let extra = if to_plus { 1.0e9 } else { 0.0 };
    let ms = dt.millisecond as f64;
    let us = dt.microsecond as f64;
    let ns = dt.nanosecond as f64;
    let below_second = ms * 1.0e6 + us * 1.0e3 + ns;
    let mut out = truncate_fields(full, resolution);
    match resolution {
        Resolution::Nanosecond => {}
        Resolution::Microsecond => out.microsecond = us + ns / 1000.0,
        Resolution::Millisecond => out.millisecond = ms + (us * 1000.0 + ns) / 1.0e6,
        Resolution::Second => out.second = dt.second as f64 + below_second / 1.0e9,
        Resolution::Minute => {
            out.minute = dt.minute as f64 + (dt.second as f64 * 1.0e9 + below_second) / (60.0e9 + extra);
        }
        Resolution::Hour => {
            let within = dt.minute as f64 * 60.0e9 + dt.second as f64 * 1.0e9 + below_second;
            out.hour = dt.hour as f64 + within / (3600.0e9 + extra);
        }
        Resolution::Day => {
            let within = dt.hour as f64 * 3600.0e9
                + dt.minute as f64 * 60.0e9
                + dt.second as f64 * 1.0e9
                + below_second;
            out.day = dt.day as f64 + within / (86_400.0e9 + extra);
        }
    }
    out
}

/// Zeroes every field finer than `resolution`.
fn truncate_fields(mut f: DateTimeFields, resolution: Resolution) -> DateTimeFields {
    let keep = resolution.time_fields();
    let fields = [
        &mut f.hour,
        &mut f.minute,
        &mut f.second,
        &mut f.millisecond,
        &mut f.microsecond,
        &mut f.nanosecond,
    ];
    for field in fields.into_iter().skip(keep) {
        *field = 0.0;
    }
    f
}

// ═══════════════════════════════════════════════════════════════════════════
// Encode
// ═══════════════════════════════════════════════════════════════════════════

#[inline]
fn normalize_style(style: i32) -> usize {
    if (0..=4).contains(&style) {
        style as usize
    } else {
        DEFAULT_STYLE as usize
    }
}

/// Text form of a TT2000 value in one of the five styles.
pub fn encode(table: &LeapSecondTable, t: Tt2000, style: i32) -> String {
    let style = normalize_style(style);
    if t == Tt2000::FILL || t == Tt2000::ILLEGAL {
        return FILL_TEXT[style].to_owned();
    }
    if t == Tt2000::PAD {
        return PAD_TEXT[style].to_owned();
    }
    let p = breakdown_parts(table, t);
    match style {
        0 => format!(
            "{:02}-{}-{:04} {:02}:{:02}:{:02}.{:03}{:03}{:03}",
            p.day,
            month_token(p.month),
            p.year,
            p.hour,
            p.minute,
            p.second,
            p.millisecond,
            p.microsecond,
            p.nanosecond
        ),
        1 => {
            let millis = 3_600_000 * p.hour + 60_000 * p.minute + 1000 * p.second + p.millisecond;
            let nanos = 1000 * p.microsecond + p.nanosecond;
            let day_fraction = (1.0e6 * millis as f64 + nanos as f64) / (86_400.0 * 1.0e9);
            let digits = (day_fraction * 1.0e10) as i64;
            format!("{:04}{:02}{:02}.{:010}", p.year, p.month, p.day, digits)
        }
        2 => format!(
            "{:04}{:02}{:02}{:02}{:02}{:02}",
            p.year, p.month, p.day, p.hour, p.minute, p.second
        ),
        _ => format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}{:03}{:03}{}",
            p.year,
            p.month,
            p.day,
            p.hour,
            p.minute,
            p.second,
            p.millisecond,
            p.microsecond,
            p.nanosecond,
            if style == 4 { "Z" } else { "" }
        ),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Parse
// ═══════════════════════════════════════════════════════════════════════════

const STYLE0_LEN: usize = 30;
const STYLE1_LEN: usize = 19;
const STYLE2_LEN: usize = 14;
const STYLE3_LEN: usize = 29;
const STYLE4_LEN: usize = 30;

#[inline]
fn byte_at(b: &[u8], i: usize) -> u8 {
    b.get(i).copied().unwrap_or(0)
}

#[inline]
fn is_date_time_separator(c: u8) -> bool {
    matches!(c, b'T' | b't' | b' ')
}

/// Strips blanks and unprintable characters from both ends.
#[inline]
pub(crate) fn trim_unprintable(s: &str) -> &str {
    s.trim_matches(|c: char| !c.is_ascii_graphic())
}

/// Detects the style of a trimmed string from its length and delimiters.
fn detect_style(b: &[u8]) -> Option<usize> {
    let len = b.len();
    let last = byte_at(b, len.wrapping_sub(1));
    let sep = is_date_time_separator(byte_at(b, 10));
    if len == STYLE3_LEN || ((19..STYLE3_LEN).contains(&len) && sep && last != b'Z') {
        Some(3)
    } else if len <= STYLE0_LEN && byte_at(b, 11) == b' ' {
        Some(0)
    } else if len == STYLE4_LEN || ((19..STYLE4_LEN).contains(&len) && sep && last == b'Z') {
        Some(4)
    } else if (len == STYLE1_LEN || (len > 9 && len < STYLE1_LEN)) && byte_at(b, 8) == b'.' {
        Some(1)
    } else if len == STYLE2_LEN && scan(std::str::from_utf8(&b[..8]).unwrap_or(""), "%8ld").count() == 1 {
        Some(2)
    } else if len == STYLE0_LEN + 1 && byte_at(b, 11) == b' ' && last == b'Z' {
        Some(0)
    } else {
        None
    }
}

/// Whole-second fields shared by the text styles.
struct Reading {
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
}

impl Reading {
    #[inline]
    fn is_fill_second(&self) -> bool {
        self.year == 9999
            && self.month == 12
            && self.day == 31
            && self.hour == 23
            && self.minute == 59
            && self.second == 59
    }

    #[inline]
    fn is_pad_second(&self) -> bool {
        self.year == 0
            && self.month == 1
            && self.day == 1
            && self.hour == 0
            && self.minute == 0
            && self.second == 0
    }

    #[inline]
    fn in_range(&self) -> bool {
        date_in_range(self.year, self.month, self.day)
    }

    fn with_nanos(&self, nanos: i64) -> CalendarDateTime {
        CalendarDateTime::new(self.year, self.month, self.day)
            .with_time(self.hour, self.minute, self.second)
            .with_subsecond(nanos / 1_000_000, nanos / 1000 % 1000, nanos % 1000)
    }
}

#[inline]
fn is_fill_fraction(nanos: i64) -> bool {
    matches!(nanos, 999_999_999 | 999 | 999_999)
}

/// TT2000 value of a string in any of the five styles.
///
/// Leading zeros may be dropped from fields, the trailing `Z` is optional
/// and a short fraction is read as if right-padded with zeros. Anything
/// else returns [`Tt2000::ILLEGAL`].
pub fn parse(table: &LeapSecondTable, text: &str) -> Tt2000 {
    let s = trim_unprintable(text);
    if !s.is_ascii() {
        return Tt2000::ILLEGAL;
    }
    match detect_style(s.as_bytes()) {
        Some(0) => parse_style0(table, s),
        Some(1) => parse_style1(table, s),
        Some(2) => parse_style2(table, s),
        Some(_) => parse_iso(s)
            .map(|(reading, nanos)| finish_iso(table, &reading, nanos))
            .unwrap_or(Tt2000::ILLEGAL),
        None => Tt2000::ILLEGAL,
    }
}

fn parse_style0(table: &LeapSecondTable, s: &str) -> Tt2000 {
    const LAYOUT: &str = "%2ld-%c%c%c-%4ld %2ld:%2ld:%2ld.%9ld";
    let padded;
    let source: &str = if s.len() != STYLE0_LEN {
        let mut body = s.as_bytes();
        if matches!(body.last(), Some(b'Z' | b'z')) {
            body = &body[..body.len() - 1];
        }
        let mut buf = vec![b'0'; STYLE0_LEN];
        let n = body.len().min(STYLE0_LEN);
        buf[..n].copy_from_slice(&body[..n]);
        padded = String::from_utf8_lossy(&buf).into_owned();
        &padded
    } else {
        s
    };
    let f = scan(source, LAYOUT);
    let complete = if s.len() == STYLE0_LEN { 9 } else { 8 };
    if f.count() < complete {
        return Tt2000::ILLEGAL;
    }
    let token: String = [f.char(1), f.char(2), f.char(3)].iter().map(|&c| c as char).collect();
    let Some(month) = month_number(&token) else {
        return Tt2000::ILLEGAL;
    };
    let reading = Reading {
        year: f.int(4),
        month,
        day: f.int(0),
        hour: f.int(5),
        minute: f.int(6),
        second: f.int(7),
    };
    let mut nanos = f.int(8);
    if reading.is_fill_second() && is_fill_fraction(nanos) {
        return Tt2000::FILL;
    }
    if reading.is_pad_second() && nanos == 0 {
        return Tt2000::PAD;
    }
    if nanos != 0 {
        match source.rfind('.') {
            Some(dot) => {
                let digits = source.len() - dot - 1;
                if digits < 9 {
                    nanos *= 10i64.pow((9 - digits) as u32);
                }
            }
            None => nanos = 0,
        }
    }
    if !reading.in_range() {
        return Tt2000::ILLEGAL;
    }
    compute_parts(table, &reading.with_nanos(nanos))
}

fn parse_style1(table: &LeapSecondTable, s: &str) -> Tt2000 {
    let f = scan(s, "%4ld%2ld%2ld.%lld");
    if f.count() != 4 {
        return Tt2000::ILLEGAL;
    }
    let (year, month, day, digits) = (f.int(0), f.int(1), f.int(2), f.int(3));
    let mut fraction = if digits == 0 {
        0.0
    } else {
        let width = s.rfind('.').map_or(0, |dot| s.len() - dot - 1);
        digits as f64 / 10f64.powi(width as i32)
    };
    if year == 9999 && month == 12 && day == 31 && digits == 9_999_999_999 {
        return Tt2000::FILL;
    }
    if year == 0 && month == 1 && day == 1 && digits == 0 {
        return Tt2000::PAD;
    }
    if !date_in_range(year, month, day) {
        return Tt2000::ILLEGAL;
    }
    let mut unit = |scale: f64| {
        fraction *= scale;
        let whole = fraction.floor();
        fraction -= whole;
        whole as i64
    };
    let hour = unit(24.0);
    let minute = unit(60.0);
    let second = unit(60.0);
    let milli = unit(1000.0);
    let micro = unit(1000.0);
    let nano = (fraction * 1000.0) as i64;
    let dt = CalendarDateTime::new(year, month, day)
        .with_time(hour, minute, second)
        .with_subsecond(milli, micro, nano);
    compute_parts(table, &dt)
}

fn parse_style2(table: &LeapSecondTable, s: &str) -> Tt2000 {
    let f = scan(s, "%4ld%2ld%2ld%2ld%2ld%2ld");
    if f.count() != 6 {
        return Tt2000::ILLEGAL;
    }
    let reading = Reading {
        year: f.int(0),
        month: f.int(1),
        day: f.int(2),
        hour: f.int(3),
        minute: f.int(4),
        second: f.int(5),
    };
    if reading.is_fill_second() {
        return Tt2000::FILL;
    }
    if reading.is_pad_second() {
        return Tt2000::PAD;
    }
    if !reading.in_range() {
        return Tt2000::ILLEGAL;
    }
    compute_parts(table, &reading.with_nanos(0))
}

/// Fields of an ISO 8601 reading (styles 3 and 4) and its 9-digit fraction.
fn parse_iso(s: &str) -> Option<(Reading, i64)> {
    let b = s.as_bytes();
    let zulu = b.last() == Some(&b'Z');
    let layout = if s.contains('.') {
        "%4ld-%2ld-%2ld%c%2ld:%2ld:%2ld."
    } else {
        "%4ld-%2ld-%2ld%c%2ld:%2ld:%2ld"
    };
    let f = scan(s, layout);
    if f.count() != 7 {
        return None;
    }
    let mut fraction = *b"000000000";
    if s.contains('.') {
        let end = if zulu { b.len() - 1 } else { b.len() };
        let digits = b.get(20..end).unwrap_or(&[]);
        let n = digits.len().min(fraction.len());
        fraction[..n].copy_from_slice(&digits[..n]);
    }
    let nanos = leading_int(std::str::from_utf8(&fraction).ok()?)?;
    let reading = Reading {
        year: f.int(0),
        month: f.int(1),
        day: f.int(2),
        hour: f.int(4),
        minute: f.int(5),
        second: f.int(6),
    };
    Some((reading, nanos))
}

fn finish_iso(table: &LeapSecondTable, reading: &Reading, nanos: i64) -> Tt2000 {
    if reading.is_fill_second() && is_fill_fraction(nanos) {
        return Tt2000::FILL;
    }
    if reading.is_pad_second() && nanos == 0 {
        return Tt2000::PAD;
    }
    if !reading.in_range() {
        return Tt2000::ILLEGAL;
    }
    compute_parts(table, &reading.with_nanos(nanos))
}

// ═══════════════════════════════════════════════════════════════════════════
// As-of-table adjustment
// ═══════════════════════════════════════════════════════════════════════════

/// [`compute_parts`] for data written when the newest known leap second was
/// `as_of` (`yyyymmdd`; `<= 0` disables the adjustment).
///
/// From the last second of `as_of` on, one second is removed for every
/// entry the live table holds between `as_of` and the reading's date.
pub fn compute_with_based_leap_day(table: &LeapSecondTable, dt: &CalendarDateTime, as_of: i64) -> Tt2000 {
    let fields = [
        dt.year,
        dt.month,
        dt.day,
        dt.hour,
        dt.minute,
        dt.second,
        dt.millisecond,
        dt.microsecond,
        dt.nanosecond,
    ];
    if fields.iter().any(|&v| v < 0) {
        return Tt2000::ILLEGAL;
    }
    let mut dt = *dt;
    if dt.month == 0 {
        dt.month = 1;
    }
    let t = compute_parts(table, &dt);
    let date = dt.date().yyyymmdd();
    if as_of <= 0 || date < as_of || (date == as_of && dt.hhmmss() < 235_960) || t.state() != TimeState::Normal {
        return t;
    }
    let known = table.entry_index_at_or_before(as_of) as i64;
    let current = table.entry_index_at_or_before(date) as i64;
    Tt2000::new(t.value().saturating_sub((current - known) * SECOND_NS))
}

/// Shift to apply before decoding `t` written under a table current as of
/// `as_of`.
fn based_shift(table: &LeapSecondTable, t: Tt2000, as_of: i64) -> i64 {
    if as_of <= 0 {
        return 0;
    }
    let known = table.entry_index_at_or_before(as_of);
    let newer = table.entries().get(known + 1..).unwrap_or(&[]);
    let boundaries: Vec<Tt2000> = newer
        .iter()
        .map(|e| compute_with_based_leap_day(table, &CalendarDateTime::new(e.year, e.month, e.day), as_of))
        .collect();
    boundaries
        .iter()
        .rposition(|&b| t >= b)
        .map_or(0, |i| (i as i64 + 1) * SECOND_NS)
}

/// [`breakdown_parts`] for a value written under a table current as of
/// `as_of`.
pub fn breakdown_with_based_leap_day(table: &LeapSecondTable, t: Tt2000, as_of: i64) -> CalendarDateTime {
    let shift = based_shift(table, t, as_of);
    breakdown_parts(table, Tt2000::new(t.value().saturating_add(shift)))
}

/// ISO 8601 (style 3) text of a value written under a table current as of
/// `as_of`.
pub fn encode_with_based_leap_day(table: &LeapSecondTable, t: Tt2000, as_of: i64) -> String {
    let shift = based_shift(table, t, as_of);
    encode(table, Tt2000::new(t.value().saturating_add(shift)), DEFAULT_STYLE)
}

/// Parses ISO 8601 text (styles 3 and 4 only) written under a table current
/// as of `as_of`.
pub fn parse_with_based_leap_day(table: &LeapSecondTable, text: &str, as_of: i64) -> Tt2000 {
    let s = trim_unprintable(text);
    if !s.is_ascii() || !matches!(detect_style(s.as_bytes()), Some(3 | 4)) {
        return Tt2000::ILLEGAL;
    }
    match parse_iso(s) {
        Some((r, nanos)) => compute_with_based_leap_day(table, &r.with_nanos(nanos), as_of),
        None => Tt2000::ILLEGAL,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Conversions
// ═══════════════════════════════════════════════════════════════════════════

/// EPOCH value of the same UTC reading. Sub-millisecond digits are dropped
/// and a leap second reads as the following midnight.
pub fn to_epoch(table: &LeapSecondTable, t: Tt2000) -> Epoch {
    if t == Tt2000::FILL {
        return Epoch::FILL;
    }
    if t == Tt2000::PAD || t == Tt2000::ILLEGAL {
        return Epoch::PAD;
    }
    let p = breakdown_parts(table, t);
    epoch::compute(&p.with_subsecond(p.millisecond, 0, 0))
}

/// TT2000 value of an EPOCH reading.
pub fn from_epoch(table: &LeapSecondTable, e: Epoch) -> Tt2000 {
    let v = e.value();
    if v == -1.0e31 || v == -1.0e-31 {
        return Tt2000::FILL;
    }
    if v == 0.0 {
        return Tt2000::PAD;
    }
    let p = epoch::breakdown(e);
    if !date_in_range(p.year, p.month, p.day) {
        return Tt2000::ILLEGAL;
    }
    compute_parts(table, &p)
}

/// EPOCH16 value of the same UTC reading.
pub fn to_epoch16(table: &LeapSecondTable, t: Tt2000) -> Epoch16 {
    if t == Tt2000::FILL {
        return Epoch16::FILL;
    }
    if t == Tt2000::PAD || t == Tt2000::ILLEGAL {
        return Epoch16::PAD;
    }
    epoch16::compute(&breakdown_parts(table, t))
}

/// TT2000 value of an EPOCH16 reading; picoseconds are dropped.
pub fn from_epoch16(table: &LeapSecondTable, e: Epoch16) -> Tt2000 {
    let (s, ps) = (e.seconds(), e.picoseconds());
    if s == 0.0 && ps == 0.0 {
        return Tt2000::PAD;
    }
    if (s == -1.0e31 && ps == -1.0e31) || (s == -1.0e-31 && ps == -1.0e-31) {
        return Tt2000::FILL;
    }
    let p = epoch16::breakdown(e);
    if !date_in_range(p.year, p.month, p.day) {
        return Tt2000::ILLEGAL;
    }
    compute_parts(table, &p.with_picosecond(0))
}

/// Unix seconds (1970-01-01T00:00:00 UTC, leap seconds not counted) to
/// microsecond precision.
pub fn to_unix(table: &LeapSecondTable, t: Tt2000) -> f64 {
    let p = breakdown_parts(table, t);
    let ms = epoch::compute(&p.with_subsecond(p.millisecond, 0, 0)).value();
    let micros = p.microsecond + i64::from(p.nanosecond > 500);
    (ms - UNIX_EPOCH_MS) * 1.0e-3 + micros as f64 * 1.0e-6
}

/// TT2000 value of Unix seconds, rounded to the microsecond.
pub fn from_unix(table: &LeapSecondTable, unix: f64) -> Tt2000 {
    if !unix.is_finite() {
        return Tt2000::ILLEGAL;
    }
    let ms = unix * 1.0e3;
    let whole = ms.floor();
    let p = epoch::breakdown(Epoch::new(whole + UNIX_EPOCH_MS));
    let micro_frac = (ms - whole) * 1.0e3;
    let mut micros = micro_frac as i64;
    if micro_frac - micros as f64 > 0.5 {
        micros += 1;
    }
    compute_parts(table, &p.with_subsecond(p.millisecond, micros, 0))
}

/// The same instant as a chrono timestamp. A leap second maps to chrono's
/// leap representation (`nanosecond() >= 1_000_000_000` on second 59).
/// Sentinels return `None`.
pub fn to_utc(table: &LeapSecondTable, t: Tt2000) -> Option<DateTime<Utc>> {
    if t.state() != TimeState::Normal {
        return None;
    }
    let p = breakdown_parts(table, t);
    let mut nanos = (p.millisecond * 1_000_000 + p.microsecond * 1000 + p.nanosecond) as u32;
    let mut second = p.second as u32;
    if second == 60 {
        second = 59;
        nanos += 1_000_000_000;
    }
    let date = NaiveDate::from_ymd_opt(i32::try_from(p.year).ok()?, p.month as u32, p.day as u32)?;
    let time = date.and_hms_nano_opt(p.hour as u32, p.minute as u32, second, nanos)?;
    Some(DateTime::<Utc>::from_naive_utc_and_offset(time, Utc))
}

/// TT2000 value of a chrono timestamp, honouring chrono leap seconds.
pub fn from_utc(table: &LeapSecondTable, datetime: DateTime<Utc>) -> Tt2000 {
    let mut second = i64::from(datetime.second());
    let mut nanos = i64::from(datetime.nanosecond());
    if nanos >= SECOND_NS {
        second += 1;
        nanos -= SECOND_NS;
    }
    let dt = CalendarDateTime::new(
        i64::from(datetime.year()),
        i64::from(datetime.month()),
        i64::from(datetime.day()),
    )
    .with_time(i64::from(datetime.hour()), i64::from(datetime.minute()), second)
    .with_subsecond(nanos / 1_000_000, nanos / 1000 % 1000, nanos % 1000);
    compute_parts(table, &dt)
}
