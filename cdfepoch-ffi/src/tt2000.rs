// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Vallés Puig, Ramon

//! FFI bindings for TT2000 values against the process-wide leap-second table.

use crate::catch_panic;
use crate::datetime::{read_text, write_text, CdfepochDateTime};
use crate::error::CdfepochStatus;
use cdfepoch::{cache, tt2000, TimeValue, Tt2000};
use std::os::raw::c_char;

/// TT2000 nanoseconds of a UTC calendar reading.
///
/// Out-of-range readings return the ILLEGAL sentinel; the all-nines and
/// all-zero readings return FILL and PAD.
#[no_mangle]
pub extern "C" fn cdfepoch_tt2000_compute(dt: CdfepochDateTime) -> i64 {
    catch_panic!(Tt2000::ILLEGAL.value(), {
        tt2000::compute_parts(&cache::global().table(), &dt.into()).value()
    })
}

/// Calendar reading of a TT2000 value.
///
/// # Safety
/// `out` must be a valid, writable pointer to `CdfepochDateTime`.
#[no_mangle]
pub unsafe extern "C" fn cdfepoch_tt2000_breakdown(nanoseconds: i64, out: *mut CdfepochDateTime) -> CdfepochStatus {
    catch_panic!(CdfepochStatus::Internal, {
        if out.is_null() {
            return CdfepochStatus::NullPointer;
        }
        let dt = tt2000::breakdown_parts(&cache::global().table(), Tt2000::new(nanoseconds));
        unsafe { *out = dt.into() };
        CdfepochStatus::Ok
    })
}

/// Text form of a TT2000 value in style 0..=4.
///
/// # Safety
/// `buf` must be valid for `len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn cdfepoch_tt2000_encode(
    nanoseconds: i64,
    style: i32,
    buf: *mut c_char,
    len: usize,
) -> CdfepochStatus {
    catch_panic!(CdfepochStatus::Internal, {
        let text = tt2000::encode(&cache::global().table(), Tt2000::new(nanoseconds), style);
        unsafe { write_text(&text, buf, len) }
    })
}

/// Parses TT2000 text in any style; malformed text stores ILLEGAL.
///
/// # Safety
/// `text` must be a NUL-terminated string and `out` a valid, writable
/// pointer to `i64`.
#[no_mangle]
pub unsafe extern "C" fn cdfepoch_tt2000_parse(text: *const c_char, out: *mut i64) -> CdfepochStatus {
    catch_panic!(CdfepochStatus::Internal, {
        if out.is_null() {
            return CdfepochStatus::NullPointer;
        }
        let text = match unsafe { read_text(text) } {
            Ok(text) => text,
            Err(status) => return status,
        };
        let t = tt2000::parse(&cache::global().table(), text);
        unsafe { *out = t.value() };
        CdfepochStatus::Ok
    })
}
