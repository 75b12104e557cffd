// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! # Leap-second table (TAI − UTC)
//!
//! A [`LeapSecondTable`] is the ordered list of dates at which the
//! cumulative offset **ΔAT = TAI − UTC** changed, together with the TT2000
//! value of each change's effective midnight.
//!
//! ## Two eras
//!
//! Between 1960 and 1972 UTC was steered with fractional steps *and* a
//! linear frequency drift. The first [`DRIFT_ROWS`] entries therefore carry
//! a reference MJD and a rate in seconds per day:
//!
//! ```text
//! ΔAT(date) = delta + (JDN(date) − 2 400 000.5 − drift_reference_mjd) × drift_rate
//! ```
//!
//! From 1972 onward every entry is a whole number of seconds and the drift
//! columns are zero.
//!
//! ## Sources
//!
//! | Constructor | Provenance |
//! |-------------|------------|
//! | [`LeapSecondTable::builtin`] | compiled-in rows, 1960-01-01 to 2017-01-01 |
//! | [`LeapSecondTable::from_lines`] | text rows `year month day delta drift_mjd drift_rate` |
//! | [`LeapSecondTable::from_file`] | same, read from disk |
//!
//! Text loading is all-or-nothing: a single malformed row rejects the file.
//! Process-wide selection between the two sources lives in
//! [`crate::LeapSecondCache`].

use crate::calendar::{julian_day_number, CalendarDate, CalendarDateTime};
use crate::error::{Result, TableLoadError};
use crate::tt2000;
use qtty::*;
use std::path::{Path, PathBuf};

/// Number of leading rows that use the pre-1972 drift formula.
pub const DRIFT_ROWS: usize = 14;

/// Date (`yyyymmdd`) of the last leap second in the built-in table.
pub const LAST_LEAP_SECOND_DAY: i64 = 20170101;

/// MJD = JD − 2 400 000.5.
const MJD_BASE: f64 = 2_400_000.5;

const SECOND_NS: i64 = 1_000_000_000;

/// Column count of a table row.
const COLUMNS: usize = 6;

// ═══════════════════════════════════════════════════════════════════════════
// Entries
// ═══════════════════════════════════════════════════════════════════════════

/// One row of the leap-second table.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeapSecondEntry {
    pub year: i64,
    pub month: i64,
    pub day: i64,
    /// ΔAT in seconds from this date on.
    pub delta_at: f64,
    /// Reference MJD of the drift term (zero after 1972).
    pub drift_reference_mjd: f64,
    /// Drift in seconds per day (zero after 1972).
    pub drift_rate: f64,
}

impl LeapSecondEntry {
    #[inline]
    pub const fn new(
        year: i64,
        month: i64,
        day: i64,
        delta_at: f64,
        drift_reference_mjd: f64,
        drift_rate: f64,
    ) -> Self {
        Self {
            year,
            month,
            day,
            delta_at,
            drift_reference_mjd,
            drift_rate,
        }
    }

    #[inline]
    pub const fn date(&self) -> CalendarDate {
        CalendarDate::new(self.year, self.month, self.day)
    }

    #[inline]
    pub const fn yyyymmdd(&self) -> i64 {
        self.date().yyyymmdd()
    }

    /// Month-granular sort key `12·year + month`.
    #[inline]
    const fn month_key(&self) -> i64 {
        12 * self.year + self.month
    }
}

#[rustfmt::skip]
const BUILT_IN: [LeapSecondEntry; 42] = [
    LeapSecondEntry::new(1960,  1, 1,  1.417_818_0, 37_300.0, 0.001_296_0),
    LeapSecondEntry::new(1961,  1, 1,  1.422_818_0, 37_300.0, 0.001_296_0),
    LeapSecondEntry::new(1961,  8, 1,  1.372_818_0, 37_300.0, 0.001_296_0),
    LeapSecondEntry::new(1962,  1, 1,  1.845_858_0, 37_665.0, 0.001_123_2),
    LeapSecondEntry::new(1963, 11, 1,  1.945_858_0, 37_665.0, 0.001_123_2),
    LeapSecondEntry::new(1964,  1, 1,  3.240_130_0, 38_761.0, 0.001_296_0),
    LeapSecondEntry::new(1964,  4, 1,  3.340_130_0, 38_761.0, 0.001_296_0),
    LeapSecondEntry::new(1964,  9, 1,  3.440_130_0, 38_761.0, 0.001_296_0),
    LeapSecondEntry::new(1965,  1, 1,  3.540_130_0, 38_761.0, 0.001_296_0),
    LeapSecondEntry::new(1965,  3, 1,  3.640_130_0, 38_761.0, 0.001_296_0),
    LeapSecondEntry::new(1965,  7, 1,  3.740_130_0, 38_761.0, 0.001_296_0),
    LeapSecondEntry::new(1965,  9, 1,  3.840_130_0, 38_761.0, 0.001_296_0),
    LeapSecondEntry::new(1966,  1, 1,  4.313_170_0, 39_126.0, 0.002_592_0),
    LeapSecondEntry::new(1968,  2, 1,  4.213_170_0, 39_126.0, 0.002_592_0),
    LeapSecondEntry::new(1972,  1, 1, 10.0, 0.0, 0.0),
    LeapSecondEntry::new(1972,  7, 1, 11.0, 0.0, 0.0),
    LeapSecondEntry::new(1973,  1, 1, 12.0, 0.0, 0.0),
    LeapSecondEntry::new(1974,  1, 1, 13.0, 0.0, 0.0),
    LeapSecondEntry::new(1975,  1, 1, 14.0, 0.0, 0.0),
    LeapSecondEntry::new(1976,  1, 1, 15.0, 0.0, 0.0),
    LeapSecondEntry::new(1977,  1, 1, 16.0, 0.0, 0.0),
    LeapSecondEntry::new(1978,  1, 1, 17.0, 0.0, 0.0),
    LeapSecondEntry::new(1979,  1, 1, 18.0, 0.0, 0.0),
    LeapSecondEntry::new(1980,  1, 1, 19.0, 0.0, 0.0),
    LeapSecondEntry::new(1981,  7, 1, 20.0, 0.0, 0.0),
    LeapSecondEntry::new(1982,  7, 1, 21.0, 0.0, 0.0),
    LeapSecondEntry::new(1983,  7, 1, 22.0, 0.0, 0.0),
    LeapSecondEntry::new(1985,  7, 1, 23.0, 0.0, 0.0),
    LeapSecondEntry::new(1988,  1, 1, 24.0, 0.0, 0.0),
    LeapSecondEntry::new(1990,  1, 1, 25.0, 0.0, 0.0),
    LeapSecondEntry::new(1991,  1, 1, 26.0, 0.0, 0.0),
    LeapSecondEntry::new(1992,  7, 1, 27.0, 0.0, 0.0),
    LeapSecondEntry::new(1993,  7, 1, 28.0, 0.0, 0.0),
    LeapSecondEntry::new(1994,  7, 1, 29.0, 0.0, 0.0),
    LeapSecondEntry::new(1996,  1, 1, 30.0, 0.0, 0.0),
    LeapSecondEntry::new(1997,  7, 1, 31.0, 0.0, 0.0),
    LeapSecondEntry::new(1999,  1, 1, 32.0, 0.0, 0.0),
    LeapSecondEntry::new(2006,  1, 1, 33.0, 0.0, 0.0),
    LeapSecondEntry::new(2009,  1, 1, 34.0, 0.0, 0.0),
    LeapSecondEntry::new(2012,  7, 1, 35.0, 0.0, 0.0),
    LeapSecondEntry::new(2015,  7, 1, 36.0, 0.0, 0.0),
    LeapSecondEntry::new(2017,  1, 1, 37.0, 0.0, 0.0),
];

// ═══════════════════════════════════════════════════════════════════════════
// Table
// ═══════════════════════════════════════════════════════════════════════════

/// Where the rows of a table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Provenance {
    BuiltIn,
    File,
}

/// Outcome of [`LeapSecondTable::validate_tt2000`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableValidity {
    /// Data stamped under the older table agrees with this one.
    Consistent,
    /// No last-update date was recorded, so consistency cannot be judged.
    Unknown,
    /// The older table missed a leap second that affects the date, or names
    /// a date this table does not know.
    Inconsistent,
}

impl TableValidity {
    /// `1`, `0` or `-1`, as stored by CDF writers.
    #[inline]
    pub const fn code(self) -> i32 {
        match self {
            Self::Consistent => 1,
            Self::Unknown => 0,
            Self::Inconsistent => -1,
        }
    }
}

/// An immutable leap-second table with precomputed TT2000 thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct LeapSecondTable {
    entries: Vec<LeapSecondEntry>,
    thresholds: Vec<i64>,
    provenance: Provenance,
    source: Option<PathBuf>,
}

impl LeapSecondTable {
    // ── constructors ──────────────────────────────────────────────────

    /// The compiled-in table.
    pub fn builtin() -> Self {
        Self::assemble(BUILT_IN.to_vec(), Provenance::BuiltIn, None)
    }

    /// Builds a table from explicit rows.
    pub fn from_entries(entries: Vec<LeapSecondEntry>, provenance: Provenance) -> Result<Self> {
        if entries.is_empty() {
            return Err(TableLoadError::Empty);
        }
        Ok(Self::assemble(entries, provenance, None))
    }

    /// Parses table rows. Lines starting with `;` are comments and blank
    /// lines are ignored; every other line must hold exactly six numbers.
    pub fn from_lines<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = Vec::new();
        for (index, line) in lines.into_iter().enumerate() {
            let line = line.as_ref().trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            entries.push(parse_row(index + 1, line)?);
        }
        Self::from_entries(entries, Provenance::File)
    }

    /// Reads and parses a table file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TableLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_lines(text.lines())?.with_source(path))
    }

    /// Records the file a table was read from.
    #[inline]
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    fn assemble(entries: Vec<LeapSecondEntry>, provenance: Provenance, source: Option<PathBuf>) -> Self {
        let mut table = Self {
            thresholds: vec![0; entries.len()],
            entries,
            provenance,
            source,
        };
        // Midnight values only depend on `delta_at_ymd`, never on thresholds.
        let thresholds: Vec<i64> = table
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                if i < DRIFT_ROWS {
                    0
                } else {
                    tt2000::compute_parts(&table, &CalendarDateTime::new(e.year, e.month, e.day)).value()
                }
            })
            .collect();
        table.thresholds = thresholds;
        table
    }

    // ── introspection ─────────────────────────────────────────────────

    #[inline]
    pub fn row_count(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn entries(&self) -> &[LeapSecondEntry] {
        &self.entries
    }

    /// TT2000 of each entry's effective midnight; zero for drift rows.
    #[inline]
    pub fn thresholds(&self) -> &[i64] {
        &self.thresholds
    }

    #[inline]
    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// The file the rows were read from, if any.
    #[inline]
    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Effective date of the newest entry.
    #[inline]
    pub fn last_entry_date(&self) -> CalendarDate {
        self.entries
            .last()
            .map(LeapSecondEntry::date)
            .unwrap_or(CalendarDate::new(0, 0, 0))
    }

    // ── lookups ───────────────────────────────────────────────────────

    /// ΔAT in effect on a calendar date, drift included before 1972.
    #[inline]
    pub fn delta_at(&self, year: i64, month: i64, day: i64) -> Seconds {
        Seconds::new(self.delta_at_ymd(year, month, day))
    }

    pub(crate) fn delta_at_ymd(&self, year: i64, month: i64, day: i64) -> f64 {
        let key = 12 * year + month;
        let Some(j) = self.entries.iter().rposition(|e| key >= e.month_key()) else {
            return 0.0;
        };
        let entry = &self.entries[j];
        if j < DRIFT_ROWS {
            let mjd = julian_day_number(year, month, day) as f64 - MJD_BASE;
            entry.delta_at + (mjd - entry.drift_reference_mjd) * entry.drift_rate
        } else {
            entry.delta_at
        }
    }

    /// ΔAT in effect at a TT2000 instant, and whether the instant falls in
    /// the second just before the next entry (an inserted leap second).
    ///
    /// Instants before 1972 report zero; callers resolve them from the
    /// calendar date instead.
    #[inline]
    pub fn delta_at_and_leap_flag(&self, nanoseconds: i64) -> (Seconds, bool) {
        let (delta, leap) = self.delta_at_ns(nanoseconds);
        (Seconds::new(delta), leap)
    }

    pub(crate) fn delta_at_ns(&self, nanoseconds: i64) -> (f64, bool) {
        let n = self.entries.len();
        for i in (DRIFT_ROWS..n).rev() {
            if nanoseconds >= self.thresholds[i] {
                let leap = i + 1 < n && nanoseconds.saturating_add(SECOND_NS) >= self.thresholds[i + 1];
                return (self.entries[i].delta_at, leap);
            }
        }
        (0.0, false)
    }

    /// Index of the newest entry dated on or before `yyyymmdd`; zero when
    /// every entry is later.
    #[inline]
    pub fn entry_index_at_or_before(&self, yyyymmdd: i64) -> usize {
        self.entries
            .iter()
            .rposition(|e| yyyymmdd >= e.yyyymmdd())
            .unwrap_or(0)
    }

    /// Whether `yyyymmdd` is the date of some entry.
    #[inline]
    pub fn is_known_update_date(&self, yyyymmdd: i64) -> bool {
        self.entries.iter().any(|e| e.yyyymmdd() == yyyymmdd)
    }

    /// Judges whether TT2000 data for day `yyyymmdd`, written with a table
    /// whose newest entry was `last_updated` (`yyyymmdd`, or `<= 0` when
    /// unrecorded), agrees with this table.
    pub fn validate_tt2000(&self, yyyymmdd: i64, last_updated: i64) -> TableValidity {
        if yyyymmdd < LAST_LEAP_SECOND_DAY {
            return TableValidity::Consistent;
        }
        let last_date = self.last_entry_date().yyyymmdd();
        if last_updated == last_date {
            return TableValidity::Consistent;
        }
        if last_updated <= 0 {
            return TableValidity::Unknown;
        }
        if yyyymmdd < last_updated {
            return TableValidity::Consistent;
        }
        if last_date < last_updated {
            return TableValidity::Inconsistent;
        }
        let n = self.entries.len();
        match self.entries[..n - 1]
            .iter()
            .rposition(|e| e.yyyymmdd() == last_updated)
        {
            Some(i) if yyyymmdd < self.entries[i + 1].yyyymmdd() => TableValidity::Consistent,
            _ => TableValidity::Inconsistent,
        }
    }
}

impl Default for LeapSecondTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn parse_row(line: usize, text: &str) -> Result<LeapSecondEntry> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() != COLUMNS {
        return Err(TableLoadError::Columns {
            line,
            found: tokens.len(),
        });
    }
    let int = |token: &str| {
        token.parse::<i64>().map_err(|_| TableLoadError::Number {
            line,
            token: token.to_string(),
        })
    };
    let real = |token: &str| {
        token.parse::<f64>().map_err(|_| TableLoadError::Number {
            line,
            token: token.to_string(),
        })
    };
    Ok(LeapSecondEntry::new(
        int(tokens[0])?,
        int(tokens[1])?,
        int(tokens[2])?,
        real(tokens[3])?,
        real(tokens[4])?,
        real(tokens[5])?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Published midnight values of the 1972+ rows.
    #[rustfmt::skip]
    const EXPECTED_THRESHOLDS: [i64; 28] = [
        -883_655_957_816_000_000, -867_931_156_816_000_000, -852_033_555_816_000_000,
        -820_497_554_816_000_000, -788_961_553_816_000_000, -757_425_552_816_000_000,
        -725_803_151_816_000_000, -694_267_150_816_000_000, -662_731_149_816_000_000,
        -631_195_148_816_000_000, -583_934_347_816_000_000, -552_398_346_816_000_000,
        -520_862_345_816_000_000, -457_703_944_816_000_000, -378_734_343_816_000_000,
        -315_575_942_816_000_000, -284_039_941_816_000_000, -236_779_140_816_000_000,
        -205_243_139_816_000_000, -173_707_138_816_000_000, -126_273_537_816_000_000,
         -79_012_736_816_000_000,  -31_579_135_816_000_000,  189_345_665_184_000_000,
         284_040_066_184_000_000,  394_372_867_184_000_000,  488_980_868_184_000_000,
         536_500_869_184_000_000,
    ];

    #[test]
    fn builtin_shape() {
        let t = LeapSecondTable::builtin();
        assert_eq!(t.row_count(), 42);
        assert_eq!(t.provenance(), Provenance::BuiltIn);
        assert_eq!(t.last_entry_date(), CalendarDate::new(2017, 1, 1));
        assert_eq!(t.last_entry_date().yyyymmdd(), LAST_LEAP_SECOND_DAY);
        assert!(t.source_path().is_none());
    }

    #[test]
    fn thresholds_match_published_values() {
        let t = LeapSecondTable::builtin();
        assert!(t.thresholds()[..DRIFT_ROWS].iter().all(|&v| v == 0));
        assert_eq!(&t.thresholds()[DRIFT_ROWS..], &EXPECTED_THRESHOLDS[..]);
    }

    #[test]
    fn delta_at_flat_era() {
        let t = LeapSecondTable::builtin();
        assert_eq!(t.delta_at(2016, 12, 31), Seconds::new(36.0));
        assert_eq!(t.delta_at(2017, 1, 1), Seconds::new(37.0));
        assert_eq!(t.delta_at(1972, 1, 1), Seconds::new(10.0));
        assert_eq!(t.delta_at(1959, 12, 31), Seconds::new(0.0));
    }

    #[test]
    fn delta_at_drift_era() {
        let t = LeapSecondTable::builtin();
        // Row 1968-02-01 applies; JDN 2440588 sits half a day past MJD 40587.
        let expected = 4.213_170_0 + (40_587.5 - 39_126.0) * 0.002_592_0;
        assert!((t.delta_at(1970, 1, 1) - Seconds::new(expected)).abs() < Seconds::new(1e-9));
    }

    #[test]
    fn leap_flag_marks_inserted_second() {
        let t = LeapSecondTable::builtin();
        let jan_2017 = EXPECTED_THRESHOLDS[27];
        assert_eq!(t.delta_at_and_leap_flag(jan_2017), (Seconds::new(37.0), false));
        assert_eq!(t.delta_at_and_leap_flag(jan_2017 - 1), (Seconds::new(36.0), true));
        assert_eq!(t.delta_at_and_leap_flag(jan_2017 - SECOND_NS), (Seconds::new(36.0), true));
        assert_eq!(
            t.delta_at_and_leap_flag(jan_2017 - SECOND_NS - 1),
            (Seconds::new(36.0), false)
        );
        assert_eq!(t.delta_at_and_leap_flag(i64::MIN + 10).0, Seconds::new(0.0));
    }

    #[test]
    fn entry_index_lookup() {
        let t = LeapSecondTable::builtin();
        assert_eq!(t.entry_index_at_or_before(20170101), 41);
        assert_eq!(t.entry_index_at_or_before(20161231), 40);
        assert_eq!(t.entry_index_at_or_before(20991231), 41);
        assert_eq!(t.entry_index_at_or_before(19000101), 0);
    }

    #[test]
    fn from_lines_parses_and_skips_comments() {
        let text = "; leap seconds\n\n1972 1 1 10.0 0.0 0.0\n1972 7 1 11.0 0.0 0.0\n";
        let t = LeapSecondTable::from_lines(text.lines()).unwrap();
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.provenance(), Provenance::File);
        assert_eq!(t.entries()[1], LeapSecondEntry::new(1972, 7, 1, 11.0, 0.0, 0.0));
    }

    #[test]
    fn from_lines_rejects_wrong_column_count() {
        let text = "1972 1 1 10.0 0.0 0.0\n1972 7 1 11.0 0.0\n";
        match LeapSecondTable::from_lines(text.lines()) {
            Err(TableLoadError::Columns { line, found }) => assert_eq!((line, found), (2, 5)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn from_lines_rejects_garbage_and_empty() {
        assert!(matches!(
            LeapSecondTable::from_lines(["1972 1 x 10.0 0.0 0.0"]),
            Err(TableLoadError::Number { line: 1, .. })
        ));
        assert!(matches!(
            LeapSecondTable::from_lines(["; only a comment"]),
            Err(TableLoadError::Empty)
        ));
    }

    #[test]
    fn file_table_recomputes_thresholds() {
        let rows: Vec<String> = BUILT_IN
            .iter()
            .map(|e| format!("{} {} {} {} {} {}", e.year, e.month, e.day, e.delta_at, e.drift_reference_mjd, e.drift_rate))
            .chain(std::iter::once("2030 1 1 38.0 0.0 0.0".to_string()))
            .collect();
        let t = LeapSecondTable::from_lines(&rows).unwrap();
        assert_eq!(t.row_count(), 43);
        assert_eq!(&t.thresholds()[DRIFT_ROWS..42], &EXPECTED_THRESHOLDS[..]);
        assert_eq!(t.delta_at(2030, 1, 1), Seconds::new(38.0));
    }

    #[test]
    fn validate_against_newer_table() {
        let t = LeapSecondTable::builtin();
        assert_eq!(t.validate_tt2000(20160101, 0), TableValidity::Consistent);
        assert_eq!(t.validate_tt2000(20180101, 20170101), TableValidity::Consistent);
        assert_eq!(t.validate_tt2000(20180101, 0), TableValidity::Unknown);
        assert_eq!(t.validate_tt2000(20180101, 20150701), TableValidity::Inconsistent);
        assert_eq!(t.validate_tt2000(20180101, 20190101), TableValidity::Consistent);
        assert_eq!(t.validate_tt2000(20200101, 20190101), TableValidity::Inconsistent);
        assert_eq!(t.validate_tt2000(20180101, 20150702), TableValidity::Inconsistent);
        assert_eq!(TableValidity::Inconsistent.code(), -1);
    }

    #[test]
    fn known_update_dates() {
        let t = LeapSecondTable::builtin();
        assert!(t.is_known_update_date(20150701));
        assert!(!t.is_known_update_date(20150702));
    }
}
