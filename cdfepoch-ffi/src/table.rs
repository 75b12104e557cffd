// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Vallés Puig, Ramon

//! FFI bindings for the process-wide leap-second table and its open/close
//! lifecycle.

use crate::catch_panic;
use crate::error::CdfepochStatus;
use cdfepoch::{cache, Provenance};

/// Number of rows in the live table.
#[no_mangle]
pub extern "C" fn cdfepoch_leap_table_rows() -> usize {
    catch_panic!(0, { cache::global().table().row_count() })
}

/// Date of the newest row as `yyyymmdd`.
#[no_mangle]
pub extern "C" fn cdfepoch_leap_table_last_date() -> i64 {
    catch_panic!(0, { cache::global().table().last_entry_date().yyyymmdd() })
}

/// Whether the live table was read from the configured file rather than
/// being the built-in one.
#[no_mangle]
pub extern "C" fn cdfepoch_leap_table_from_file() -> bool {
    catch_panic!(false, { cache::global().table().provenance() == Provenance::File })
}

/// Writes the live table rows as a JSON array into `buf`.
///
/// # Safety
/// `buf` must be valid for `len` writable bytes.
#[cfg(feature = "serde")]
#[no_mangle]
pub unsafe extern "C" fn cdfepoch_leap_table_json(buf: *mut std::os::raw::c_char, len: usize) -> CdfepochStatus {
    catch_panic!(CdfepochStatus::Internal, {
        match serde_json::to_string(cache::global().table().entries()) {
            Ok(json) => unsafe { crate::datetime::write_text(&json, buf, len) },
            Err(_) => CdfepochStatus::SerializationFailed,
        }
    })
}

/// Pins the live table; reloads are deferred until the matching
/// [`cdfepoch_close`]. Returns the number of open handles.
#[no_mangle]
pub extern "C" fn cdfepoch_open() -> usize {
    catch_panic!(0, {
        let cache = cache::global();
        cache.retain();
        cache.open_count()
    })
}

/// Releases one [`cdfepoch_open`]. When the last one goes the table is
/// dropped and the next call loads it afresh. Returns the remaining count.
#[no_mangle]
pub extern "C" fn cdfepoch_close() -> usize {
    catch_panic!(0, {
        let cache = cache::global();
        cache.release();
        cache.open_count()
    })
}

/// Reloads the table now if the configured path changed and nothing is
/// open; returns [`CdfepochStatus::Ok`] either way.
#[no_mangle]
pub extern "C" fn cdfepoch_leap_table_refresh() -> CdfepochStatus {
    catch_panic!(CdfepochStatus::Internal, {
        cache::global().reload_if_changed();
        CdfepochStatus::Ok
    })
}
