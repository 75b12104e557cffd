// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Vallés Puig, Ramon

//! FFI bindings for range search over sorted time arrays.
//!
//! Each function stores the first and last matching index in `out[0]` and
//! `out[1]`, or `-1, -1` when nothing lies in `[start, stop]`.

use crate::catch_panic;
use crate::error::CdfepochStatus;
use cdfepoch::{range_search, SearchKey};

/// # Safety
/// `keys` must be valid for `len` reads (or may be null when `len` is 0)
/// and `out` for two writes.
unsafe fn search_into<K: SearchKey>(keys: *const K, len: usize, start: K, stop: K, out: *mut i64) -> CdfepochStatus {
    if out.is_null() || (keys.is_null() && len > 0) {
        return CdfepochStatus::NullPointer;
    }
    let keys = if len == 0 {
        &[][..]
    } else {
        unsafe { std::slice::from_raw_parts(keys, len) }
    };
    let (first, last) = match range_search(keys, start, stop) {
        Some((first, last)) => (first as i64, last as i64),
        None => (-1, -1),
    };
    unsafe {
        *out = first;
        *out.add(1) = last;
    }
    CdfepochStatus::Ok
}

/// Searches `len` sorted EPOCH values.
///
/// # Safety
/// `array` must be valid for `len` reads and `out` for two writes.
#[no_mangle]
pub unsafe extern "C" fn cdfepoch_search_epoch(
    array: *const f64,
    len: usize,
    start: f64,
    stop: f64,
    out: *mut i64,
) -> CdfepochStatus {
    catch_panic!(CdfepochStatus::Internal, {
        unsafe { search_into(array, len, start, stop, out) }
    })
}

/// Searches `len` sorted EPOCH16 pairs laid out as `2 * len` doubles.
///
/// # Safety
/// `array` must be valid for `2 * len` reads, `start` and `stop` for two
/// reads each, and `out` for two writes.
#[no_mangle]
pub unsafe extern "C" fn cdfepoch_search_epoch16(
    array: *const f64,
    len: usize,
    start: *const f64,
    stop: *const f64,
    out: *mut i64,
) -> CdfepochStatus {
    catch_panic!(CdfepochStatus::Internal, {
        if start.is_null() || stop.is_null() {
            return CdfepochStatus::NullPointer;
        }
        let (start, stop) = unsafe { ([*start, *start.add(1)], [*stop, *stop.add(1)]) };
        unsafe { search_into(array.cast::<[f64; 2]>(), len, start, stop, out) }
    })
}

/// Searches `len` sorted TT2000 values.
///
/// # Safety
/// `array` must be valid for `len` reads and `out` for two writes.
#[no_mangle]
pub unsafe extern "C" fn cdfepoch_search_tt2000(
    array: *const i64,
    len: usize,
    start: i64,
    stop: i64,
    out: *mut i64,
) -> CdfepochStatus {
    catch_panic!(CdfepochStatus::Internal, {
        unsafe { search_into(array, len, start, stop, out) }
    })
}
