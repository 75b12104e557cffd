// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Binary time values and their reserved sentinels.
//!
//! Each CDF time encoding is a thin newtype around its on-disk representation:
//!
//! | Type | Storage | Meaning |
//! |------|---------|---------|
//! | [`Epoch`] | `f64` | milliseconds since 0000-01-01T00:00:00 |
//! | [`Epoch16`] | `(f64, f64)` | whole seconds since 0000-01-01 plus picoseconds |
//! | [`Tt2000`] | `i64` | nanoseconds since 2000-01-01T12:00:00 TT, leap-second aware |
//!
//! Every type reserves three values through the [`TimeValue`] trait: `FILL`
//! ("no data"), `PAD` (default/zero) and `ILLEGAL` (validation failure).
//! Codec operations never fail; they return one of these instead.

use qtty::*;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ═══════════════════════════════════════════════════════════════════════════
// TimeValue trait
// ═══════════════════════════════════════════════════════════════════════════

/// Classification of a binary time value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeState {
    /// An ordinary instant.
    Normal,
    /// Explicit "no data"; encodes as the maximal representable date.
    Fill,
    /// Default/zero value.
    Pad,
    /// The result of a validation failure.
    Illegal,
}

/// A binary time encoding with reserved sentinel values.
pub trait TimeValue: Copy + Clone + fmt::Debug + PartialEq + 'static {
    /// Display label used by the `Display` impls.
    const LABEL: &'static str;
    const FILL: Self;
    const PAD: Self;
    const ILLEGAL: Self;

    /// Classifies this value against the reserved sentinels.
    #[inline]
    fn state(&self) -> TimeState {
        if *self == Self::FILL {
            TimeState::Fill
        } else if *self == Self::PAD {
            TimeState::Pad
        } else if *self == Self::ILLEGAL {
            TimeState::Illegal
        } else {
            TimeState::Normal
        }
    }

    #[inline]
    fn is_fill(&self) -> bool {
        *self == Self::FILL
    }

    #[inline]
    fn is_pad(&self) -> bool {
        *self == Self::PAD
    }

    #[inline]
    fn is_illegal(&self) -> bool {
        *self == Self::ILLEGAL
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// EPOCH
// ═══════════════════════════════════════════════════════════════════════════

/// Milliseconds since 0000-01-01T00:00:00.000, without leap seconds.
///
/// `NaN` is the dedicated "undefined" value; it encodes as `"Nan"` and any
/// string containing `nan` parses back to it.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Epoch(f64);

impl Epoch {
    /// Largest decodable value: 9999-12-31T23:59:59.999.
    pub const MAX: Self = Self(315_569_519_999_999.0);

    /// Undefined instant.
    pub const NAN: Self = Self(f64::NAN);

    #[inline]
    pub const fn new(milliseconds: f64) -> Self {
        Self(milliseconds)
    }

    /// The raw millisecond count.
    #[inline]
    pub const fn value(&self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        self.0.is_nan()
    }

    /// Days elapsed since 0000-01-01.
    #[inline]
    pub fn days(&self) -> Days {
        Days::new(self.0 / 86_400_000.0)
    }

    /// Seconds elapsed since 0000-01-01.
    #[inline]
    pub fn seconds(&self) -> Seconds {
        Seconds::new(self.0 / 1000.0)
    }
}

impl TimeValue for Epoch {
    const LABEL: &'static str = "EPOCH";
    const FILL: Self = Self(-1.0e31);
    const PAD: Self = Self(0.0);
    const ILLEGAL: Self = Self(-1.0);

    #[inline]
    fn state(&self) -> TimeState {
        if self.0.is_nan() || *self == Self::ILLEGAL {
            TimeState::Illegal
        } else if *self == Self::FILL {
            TimeState::Fill
        } else if *self == Self::PAD {
            TimeState::Pad
        } else {
            TimeState::Normal
        }
    }
}

impl From<f64> for Epoch {
    #[inline]
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<Epoch> for f64 {
    #[inline]
    fn from(epoch: Epoch) -> Self {
        epoch.0
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// EPOCH16
// ═══════════════════════════════════════════════════════════════════════════

/// Whole seconds since 0000-01-01T00:00:00 plus picoseconds within the
/// second, without leap seconds.
///
/// Ordering is lexicographic on `(seconds, picoseconds)`.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Epoch16 {
    seconds: f64,
    picoseconds: f64,
}

impl Epoch16 {
    /// Largest decodable seconds half: 9999-12-31T23:59:59.
    pub const MAX_SECONDS: f64 = 315_569_519_999.0;

    /// Largest picoseconds half.
    pub const MAX_PICOSECONDS: f64 = 999_999_999_999.0;

    /// Undefined instant.
    pub const NAN: Self = Self::new(f64::NAN, f64::NAN);

    #[inline]
    pub const fn new(seconds: f64, picoseconds: f64) -> Self {
        Self {
            seconds,
            picoseconds,
        }
    }

    #[inline]
    pub const fn seconds(&self) -> f64 {
        self.seconds
    }

    #[inline]
    pub const fn picoseconds(&self) -> f64 {
        self.picoseconds
    }

    /// The two halves as the on-disk pair.
    #[inline]
    pub const fn to_array(self) -> [f64; 2] {
        [self.seconds, self.picoseconds]
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        self.seconds.is_nan() || self.picoseconds.is_nan()
    }

    /// Whole seconds as a quantity.
    #[inline]
    pub fn elapsed(&self) -> Seconds {
        Seconds::new(self.seconds)
    }
}

impl TimeValue for Epoch16 {
    const LABEL: &'static str = "EPOCH16";
    const FILL: Self = Self::new(-1.0e31, -1.0e31);
    const PAD: Self = Self::new(0.0, 0.0);
    const ILLEGAL: Self = Self::new(-1.0, -1.0);

    #[inline]
    fn state(&self) -> TimeState {
        if self.is_undefined() || *self == Self::ILLEGAL {
            TimeState::Illegal
        } else if *self == Self::FILL {
            TimeState::Fill
        } else if *self == Self::PAD {
            TimeState::Pad
        } else {
            TimeState::Normal
        }
    }
}

impl From<[f64; 2]> for Epoch16 {
    #[inline]
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<Epoch16> for [f64; 2] {
    #[inline]
    fn from(epoch: Epoch16) -> Self {
        epoch.to_array()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TT2000
// ═══════════════════════════════════════════════════════════════════════════

/// Signed nanoseconds since 2000-01-01T12:00:00 Terrestrial Time, counting
/// every inserted leap second.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Tt2000(i64);

impl Tt2000 {
    /// The reference instant itself.
    pub const J2000: Self = Self(0);

    #[inline]
    pub const fn new(nanoseconds: i64) -> Self {
        Self(nanoseconds)
    }

    /// The raw nanosecond count.
    #[inline]
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Elapsed SI seconds from `earlier` to `self`.
    #[inline]
    pub fn seconds_since(&self, earlier: Tt2000) -> Seconds {
        Seconds::new((self.0 as i128 - earlier.0 as i128) as f64 / 1e9)
    }
}

impl TimeValue for Tt2000 {
    const LABEL: &'static str = "TT2000";
    const FILL: Self = Self(i64::MIN);
    const PAD: Self = Self(-9_223_372_036_854_775_807);
    const ILLEGAL: Self = Self(-9_223_372_036_854_775_805);
}

impl From<i64> for Tt2000 {
    #[inline]
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Tt2000> for i64 {
    #[inline]
    fn from(tt: Tt2000) -> Self {
        tt.0
    }
}

// ── Display ───────────────────────────────────────────────────────────────

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", Self::LABEL, self.0)
    }
}

impl fmt::Display for Epoch16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", Self::LABEL, self.seconds, self.picoseconds)
    }
}

impl fmt::Display for Tt2000 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", Self::LABEL, self.0)
    }
}

// ── Serde ─────────────────────────────────────────────────────────────────

#[cfg(feature = "serde")]
impl Serialize for Epoch {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Epoch {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = f64::deserialize(deserializer)?;
        Ok(Self::new(v))
    }
}

#[cfg(feature = "serde")]
impl Serialize for Epoch16 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_array().serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Epoch16 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pair = <[f64; 2]>::deserialize(deserializer)?;
        Ok(Self::from(pair))
    }
}

#[cfg(feature = "serde")]
impl Serialize for Tt2000 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Tt2000 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = i64::deserialize(deserializer)?;
        Ok(Self::new(v))
    }
}
