// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Vallés Puig, Ramon

//! FFI bindings for EPOCH (`double` milliseconds) and EPOCH16 (a pair of
//! `double`s: seconds, picoseconds).

use crate::catch_panic;
use crate::datetime::{read_text, write_text, CdfepochDateTime};
use crate::error::CdfepochStatus;
use cdfepoch::{epoch, epoch16, Epoch, Epoch16, TimeValue};
use std::os::raw::c_char;

// ═══════════════════════════════════════════════════════════════════════════
// EPOCH
// ═══════════════════════════════════════════════════════════════════════════

/// EPOCH milliseconds of a calendar reading.
#[no_mangle]
pub extern "C" fn cdfepoch_epoch_compute(dt: CdfepochDateTime) -> f64 {
    catch_panic!(Epoch::ILLEGAL.value(), { epoch::compute(&dt.into()).value() })
}

/// Calendar reading of an EPOCH value.
///
/// # Safety
/// `out` must be a valid, writable pointer to `CdfepochDateTime`.
#[no_mangle]
pub unsafe extern "C" fn cdfepoch_epoch_breakdown(milliseconds: f64, out: *mut CdfepochDateTime) -> CdfepochStatus {
    catch_panic!(CdfepochStatus::Internal, {
        if out.is_null() {
            return CdfepochStatus::NullPointer;
        }
        unsafe { *out = epoch::breakdown(Epoch::new(milliseconds)).into() };
        CdfepochStatus::Ok
    })
}

/// Text form of an EPOCH value in style 0..=4.
///
/// # Safety
/// `buf` must be valid for `len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn cdfepoch_epoch_encode(
    milliseconds: f64,
    style: i32,
    buf: *mut c_char,
    len: usize,
) -> CdfepochStatus {
    catch_panic!(CdfepochStatus::Internal, {
        let text = epoch::encode(Epoch::new(milliseconds), style);
        unsafe { write_text(&text, buf, len) }
    })
}

/// Parses EPOCH text in any style; malformed text stores ILLEGAL.
///
/// # Safety
/// `text` must be a NUL-terminated string and `out` a valid, writable
/// pointer to `double`.
#[no_mangle]
pub unsafe extern "C" fn cdfepoch_epoch_parse(text: *const c_char, out: *mut f64) -> CdfepochStatus {
    catch_panic!(CdfepochStatus::Internal, {
        if out.is_null() {
            return CdfepochStatus::NullPointer;
        }
        match unsafe { read_text(text) } {
            Ok(text) => {
                unsafe { *out = epoch::parse(text).value() };
                CdfepochStatus::Ok
            }
            Err(status) => status,
        }
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// EPOCH16
// ═══════════════════════════════════════════════════════════════════════════

/// EPOCH16 pair of a calendar reading, stored as `out[0]` seconds and
/// `out[1]` picoseconds.
///
/// # Safety
/// `out` must be valid for two writable `double`s.
#[no_mangle]
pub unsafe extern "C" fn cdfepoch_epoch16_compute(dt: CdfepochDateTime, out: *mut f64) -> CdfepochStatus {
    catch_panic!(CdfepochStatus::Internal, {
        if out.is_null() {
            return CdfepochStatus::NullPointer;
        }
        let pair = epoch16::compute(&dt.into()).to_array();
        unsafe { std::ptr::copy_nonoverlapping(pair.as_ptr(), out, 2) };
        CdfepochStatus::Ok
    })
}

/// Calendar reading of an EPOCH16 pair.
///
/// # Safety
/// `out` must be a valid, writable pointer to `CdfepochDateTime`.
#[no_mangle]
pub unsafe extern "C" fn cdfepoch_epoch16_breakdown(
    seconds: f64,
    picoseconds: f64,
    out: *mut CdfepochDateTime,
) -> CdfepochStatus {
    catch_panic!(CdfepochStatus::Internal, {
        if out.is_null() {
            return CdfepochStatus::NullPointer;
        }
        unsafe { *out = epoch16::breakdown(Epoch16::new(seconds, picoseconds)).into() };
        CdfepochStatus::Ok
    })
}

/// Text form of an EPOCH16 pair in style 0..=4.
///
/// # Safety
/// `buf` must be valid for `len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn cdfepoch_epoch16_encode(
    seconds: f64,
    picoseconds: f64,
    style: i32,
    buf: *mut c_char,
    len: usize,
) -> CdfepochStatus {
    catch_panic!(CdfepochStatus::Internal, {
        let text = epoch16::encode(Epoch16::new(seconds, picoseconds), style);
        unsafe { write_text(&text, buf, len) }
    })
}

/// Parses EPOCH16 text into `out[0]` seconds and `out[1]` picoseconds;
/// malformed text stores the ILLEGAL pair.
///
/// # Safety
/// `text` must be a NUL-terminated string and `out` valid for two writable
/// `double`s.
#[no_mangle]
pub unsafe extern "C" fn cdfepoch_epoch16_parse(text: *const c_char, out: *mut f64) -> CdfepochStatus {
    catch_panic!(CdfepochStatus::Internal, {
        if out.is_null() {
            return CdfepochStatus::NullPointer;
        }
        match unsafe { read_text(text) } {
            Ok(text) => {
                let pair = epoch16::parse(text).to_array();
                unsafe { std::ptr::copy_nonoverlapping(pair.as_ptr(), out, 2) };
                CdfepochStatus::Ok
            }
            Err(status) => status,
        }
    })
}
