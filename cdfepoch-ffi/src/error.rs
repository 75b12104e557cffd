// SPDX-License-Identifier: AGPL-3.0-or-later

/// Status codes returned by cdfepoch-ffi functions.
///
/// Time values never fail: malformed input yields the ILLEGAL sentinel of
/// the target encoding with status `Ok`. These codes only report problems
/// with the call itself.
///
/// cbindgen:prefix-with-name
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CdfepochStatus {
    /// Success.
    Ok = 0,
    /// A required pointer was null.
    NullPointer = 1,
    /// The output buffer cannot hold the text and its NUL terminator.
    BufferTooSmall = 2,
    /// An input string was not valid UTF-8.
    InvalidUtf8 = 3,
    /// The leap-second table could not be serialized.
    SerializationFailed = 4,
    /// The call panicked internally.
    Internal = 5,
}
