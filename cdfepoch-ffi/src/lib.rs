// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! C FFI bindings for **cdfepoch**, the CDF time engine.
//!
//! A flat C API over EPOCH, EPOCH16 and TT2000 compute, breakdown, text
//! encode/parse, sorted-array range search and the process-wide leap-second
//! table. TT2000 entry points use the table selected by
//! `CDF_LEAPSECONDSTABLE`; [`cdfepoch_open`] / [`cdfepoch_close`] pin it
//! across a batch of calls.
//!
//! Strings are written into caller buffers and always NUL-terminated; a
//! buffer too small for the text reports [`CdfepochStatus::BufferTooSmall`]
//! and is left untouched.

mod datetime;
mod epoch;
mod error;
mod search;
mod table;
mod tt2000;

pub use datetime::*;
pub use epoch::*;
pub use error::*;
pub use search::*;
pub use table::*;
pub use tt2000::*;

/// Runs `$body`, returning `$fallback` if it panics.
#[doc(hidden)]
#[macro_export]
macro_rules! catch_panic {
    ($fallback:expr, $body:block) => {
        match ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| $body)) {
            Ok(value) => value,
            Err(_) => $fallback,
        }
    };
}

/// Returns the cdfepoch-ffi ABI version (semver-encoded: major*10000 + minor*100 + patch).
#[allow(clippy::erasing_op, clippy::identity_op)]
#[no_mangle]
pub extern "C" fn cdfepoch_ffi_version() -> u32 {
    0 * 10000 + 1 * 100 + 0 // 0.1.0
}
