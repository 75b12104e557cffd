// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! # Proleptic Gregorian calendar arithmetic
//!
//! Every codec in this crate pivots through the **Julian Day Number** (JDN):
//! an integer count of days that starts at noon of 4713 BC (Julian
//! calendar). The conversions here are integer exact and use truncating
//! division, so they agree bit-for-bit with archived CDF timestamps.
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`julian_day_number`] | `(y, m, d)` → JDN |
//! | [`calendar_from_julian_day_number`] | JDN → `(y, m, d)` |
//! | [`is_leap_year`] | Gregorian leap-year rule |
//! | [`days_in_month`] | month length under the leap-year rule |
//! | [`cumulative_day_of_year`] | day-of-year → `(m, d)` |
//! | [`month_token`] / [`month_number`] | three-letter month names |
//!
//! The supported range is years 0 through 9999, which covers both the EPOCH
//! family (0000–9999) and TT2000 (1707-09-22 through 2292-04-11).

/// JDN of 0000-01-01. EPOCH and EPOCH16 count days from here.
pub const JDN_0000_01_01: i64 = 1_721_060;

/// JDN of 2000-01-01 (the TT2000 reference day; the reference instant is at
/// 12:00 of that day).
pub const JDN_J2000: i64 = 2_451_545;

/// Cumulative day counts at the end of each month, common years.
pub(crate) const DOY_END_COMMON: [i64; 12] =
    [31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334, 365];

/// Cumulative day counts at the end of each month, leap years.
pub(crate) const DOY_END_LEAP: [i64; 12] =
    [31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335, 366];

const MONTH_LENGTH_COMMON: [i64; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const MONTH_LENGTH_LEAP: [i64; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

const MONTH_TOKENS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// ═══════════════════════════════════════════════════════════════════════════
// Calendar types
// ═══════════════════════════════════════════════════════════════════════════

/// A proleptic Gregorian calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalendarDate {
    pub year: i64,
    pub month: i64,
    pub day: i64,
}

impl CalendarDate {
    #[inline]
    pub const fn new(year: i64, month: i64, day: i64) -> Self {
        Self { year, month, day }
    }

    /// The date packed as the integer `yyyymmdd`.
    #[inline]
    pub const fn yyyymmdd(&self) -> i64 {
        self.year * 10_000 + self.month * 100 + self.day
    }

    /// Julian Day Number of this date.
    #[inline]
    pub const fn julian_day_number(&self) -> i64 {
        julian_day_number(self.year, self.month, self.day)
    }
}

/// A broken-down calendar instant with every sub-second field down to
/// picoseconds.
///
/// Codecs populate the fields their resolution carries and leave the rest at
/// zero: EPOCH stops at milliseconds, TT2000 at nanoseconds, EPOCH16 at
/// picoseconds. A `second` of 60 is only ever produced by TT2000 for an
/// inserted leap second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalendarDateTime {
    pub year: i64,
    pub month: i64,
    pub day: i64,
    pub hour: i64,
    pub minute: i64,
    pub second: i64,
    pub millisecond: i64,
    pub microsecond: i64,
    pub nanosecond: i64,
    pub picosecond: i64,
}

impl CalendarDateTime {
    /// Midnight of the given date.
    #[inline]
    pub const fn new(year: i64, month: i64, day: i64) -> Self {
        Self {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
            millisecond: 0,
            microsecond: 0,
            nanosecond: 0,
            picosecond: 0,
        }
    }

    #[inline]
    pub const fn with_time(mut self, hour: i64, minute: i64, second: i64) -> Self {
        self.hour = hour;
        self.minute = minute;
        self.second = second;
        self
    }

    #[inline]
    pub const fn with_subsecond(mut self, millisecond: i64, microsecond: i64, nanosecond: i64) -> Self {
        self.millisecond = millisecond;
        self.microsecond = microsecond;
        self.nanosecond = nanosecond;
        self
    }

    #[inline]
    pub const fn with_picosecond(mut self, picosecond: i64) -> Self {
        self.picosecond = picosecond;
        self
    }

    #[inline]
    pub const fn date(&self) -> CalendarDate {
        CalendarDate::new(self.year, self.month, self.day)
    }

    /// `hhmmss` packed as an integer.
    #[inline]
    pub(crate) const fn hhmmss(&self) -> i64 {
        self.hour * 10_000 + self.minute * 100 + self.second
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Julian Day Number conversions
// ═══════════════════════════════════════════════════════════════════════════

/// Julian Day Number of a proleptic Gregorian date.
///
/// A `month` of zero is read as January, so `julian_day_number(y, 0, doy)`
/// is the JDN of day-of-year `doy`. The formula is linear in `day`, so days
/// past the end of the month roll forward.
#[inline]
pub const fn julian_day_number(year: i64, month: i64, day: i64) -> i64 {
    let m = if month == 0 { 1 } else { month };
    367 * year - 7 * (year + (m + 9) / 12) / 4 - 3 * ((year + (m - 9) / 7) / 100 + 1) / 4
        + 275 * m / 9
        + day
        + 1_721_029
}

/// Calendar date of a Julian Day Number. Exact inverse of
/// [`julian_day_number`] over the supported range.
pub const fn calendar_from_julian_day_number(jdn: i64) -> CalendarDate {
    let mut l = jdn + 68_569;
    let n = 4 * l / 146_097;
    l -= (146_097 * n + 3) / 4;
    let i = 4000 * (l + 1) / 1_461_001;
    l = l - 1461 * i / 4 + 31;
    let j = 80 * l / 2447;
    let day = l - 2447 * j / 80;
    l = j / 11;
    let month = j + 2 - 12 * l;
    let year = 100 * (n - 49) + i + l;
    CalendarDate { year, month, day }
}

// ═══════════════════════════════════════════════════════════════════════════
// Month and year shape
// ═══════════════════════════════════════════════════════════════════════════

#[inline]
pub const fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[inline]
pub const fn days_in_year(year: i64) -> i64 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Length of `month` (1–12) in `year`; zero for any other month number.
#[inline]
pub const fn days_in_month(year: i64, month: i64) -> i64 {
    if month < 1 || month > 12 {
        return 0;
    }
    if is_leap_year(year) {
        MONTH_LENGTH_LEAP[(month - 1) as usize]
    } else {
        MONTH_LENGTH_COMMON[(month - 1) as usize]
    }
}

#[inline]
pub(crate) const fn cumulative_table(year: i64) -> &'static [i64; 12] {
    if is_leap_year(year) {
        &DOY_END_LEAP
    } else {
        &DOY_END_COMMON
    }
}

/// Resolves a day-of-year into `(month, day)`.
///
/// Returns `None` when `doy` is outside `1..=days_in_year(year)`.
pub fn cumulative_day_of_year(year: i64, doy: i64) -> Option<(i64, i64)> {
    if doy < 1 || doy > days_in_year(year) {
        return None;
    }
    let table = cumulative_table(year);
    let month = table.iter().position(|&end| doy <= end)?;
    let before = if month == 0 { 0 } else { table[month - 1] };
    Some((month as i64 + 1, doy - before))
}

/// Day-of-year (1-based) of a date.
#[inline]
pub const fn day_of_year(year: i64, month: i64, day: i64) -> i64 {
    julian_day_number(year, month, day) - julian_day_number(year, 1, 1) + 1
}

// ── Month names ───────────────────────────────────────────────────────────

/// Three-letter month token (`"Jan"` … `"Dec"`); `"???"` outside 1–12.
#[inline]
pub fn month_token(month: i64) -> &'static str {
    if (1..=12).contains(&month) {
        MONTH_TOKENS[(month - 1) as usize]
    } else {
        "???"
    }
}

/// Month number of a three-letter token, case-insensitive.
pub fn month_number(token: &str) -> Option<i64> {
    MONTH_TOKENS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(token))
        .map(|i| i as i64 + 1)
}
