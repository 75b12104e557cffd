// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! CDF time engine
//!
//! Conversions between the three binary time encodings of the Common Data
//! Format and their text forms, the leap-second table TT2000 depends on,
//! and range search over sorted time arrays.
//!
//! # Encodings
//!
//! | Type | Storage | Reference | Leap seconds |
//! |------|---------|-----------|--------------|
//! | [`Epoch`] | `f64` milliseconds | 0000-01-01T00:00:00 | no |
//! | [`Epoch16`] | `f64` seconds + `f64` picoseconds | 0000-01-01T00:00:00 | no |
//! | [`Tt2000`] | `i64` nanoseconds | 2000-01-01T12:00:00 TT | yes |
//!
//! Every value is in one of the [`TimeState`]s: normal, fill ("no data"),
//! pad (default) or illegal. Codec functions never fail; invalid input maps
//! to the illegal sentinel of the target type.
//!
//! # Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`calendar`] | proleptic Gregorian and Julian Day Number arithmetic |
//! | [`leap_seconds`] | [`LeapSecondTable`], built in or loaded from a file |
//! | [`cache`] | process-wide table with reload and open handles |
//! | [`tt2000`] | TT2000 compute, breakdown, text and as-of-table variants |
//! | [`epoch`] | EPOCH compute, breakdown and text |
//! | [`epoch16`] | EPOCH16 compute, breakdown and text |
//! | [`template`] | `<year>-<mm.02>`-style format templates |
//! | [`search`] | inclusive range search |
//!
//! # Leap seconds
//!
//! TT2000 functions take the table explicitly:
//!
//! ```
//! use cdfepoch::{tt2000, CalendarDateTime, LeapSecondTable};
//!
//! let table = LeapSecondTable::builtin();
//! let before = tt2000::compute_parts(&table, &CalendarDateTime::new(2016, 12, 31).with_time(23, 59, 59));
//! let after = tt2000::compute_parts(&table, &CalendarDateTime::new(2017, 1, 1));
//! assert_eq!(after.value() - before.value(), 2_000_000_000);
//! ```
//!
//! The table named by `CDF_LEAPSECONDSTABLE` is reachable through
//! [`cache::global()`].

pub mod cache;
pub mod calendar;
pub mod epoch;
pub mod epoch16;
pub mod error;
pub mod leap_seconds;
pub(crate) mod scan;
pub mod search;
pub mod template;
pub mod tt2000;
mod value;

// ── Re-exports ────────────────────────────────────────────────────────────

pub use cache::{EnvSource, LeapSecondCache, LineSource, OpenHandle, SystemHost, TableConfig};
pub use calendar::{CalendarDate, CalendarDateTime};
pub use error::TableLoadError;
pub use leap_seconds::{LeapSecondEntry, LeapSecondTable, Provenance, TableValidity};
pub use search::{range_search, SearchKey};
pub use template::{EpochFormat, Precision};
pub use tt2000::{DateTimeFields, Resolution};
pub use value::{Epoch, Epoch16, TimeState, TimeValue, Tt2000};
