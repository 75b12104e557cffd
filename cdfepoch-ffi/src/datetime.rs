// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Vallés Puig, Ramon

//! C-repr calendar reading and the string plumbing shared by the codecs.

use crate::error::CdfepochStatus;
use cdfepoch::CalendarDateTime;
use std::ffi::CStr;
use std::os::raw::c_char;

/// Calendar breakdown for C interop.
///
/// Fields finer than an encoding's resolution are ignored on input and zero
/// on output. `second` is 60 for an inserted leap second (TT2000 only).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CdfepochDateTime {
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

impl From<CdfepochDateTime> for CalendarDateTime {
    fn from(dt: CdfepochDateTime) -> Self {
        CalendarDateTime::new(dt.year, dt.month, dt.day)
            .with_time(dt.hour, dt.minute, dt.second)
            .with_subsecond(dt.millisecond, dt.microsecond, dt.nanosecond)
            .with_picosecond(dt.picosecond)
    }
}

impl From<CalendarDateTime> for CdfepochDateTime {
    fn from(dt: CalendarDateTime) -> Self {
        Self {
            year: dt.year,
            month: dt.month,
            day: dt.day,
            hour: dt.hour,
            minute: dt.minute,
            second: dt.second,
            millisecond: dt.millisecond,
            microsecond: dt.microsecond,
            nanosecond: dt.nanosecond,
            picosecond: dt.picosecond,
        }
    }
}

/// Copies `text` and a NUL terminator into `buf`.
///
/// # Safety
/// `buf` must be null or valid for `len` writable bytes.
pub(crate) unsafe fn write_text(text: &str, buf: *mut c_char, len: usize) -> CdfepochStatus {
    if buf.is_null() {
        return CdfepochStatus::NullPointer;
    }
    let bytes = text.as_bytes();
    if bytes.len() >= len {
        return CdfepochStatus::BufferTooSmall;
    }
    unsafe {
        std::ptr::copy_nonoverlapping(bytes.as_ptr().cast::<c_char>(), buf, bytes.len());
        *buf.add(bytes.len()) = 0;
    }
    CdfepochStatus::Ok
}

/// Borrows a NUL-terminated input string.
///
/// # Safety
/// `text` must be null or point to a NUL-terminated string that outlives `'a`.
pub(crate) unsafe fn read_text<'a>(text: *const c_char) -> Result<&'a str, CdfepochStatus> {
    if text.is_null() {
        return Err(CdfepochStatus::NullPointer);
    }
    unsafe { CStr::from_ptr(text) }
        .to_str()
        .map_err(|_| CdfepochStatus::InvalidUtf8)
}
