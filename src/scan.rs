// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Fixed-layout field scanner.
//!
//! Archived CDF time strings are positional: a field is "at most N digits,
//! optionally signed, after optional blanks". [`scan`] reads such layouts
//! from a small pattern language and stops at the first mismatch, reporting
//! how many fields it converted so callers can tell a truncated string
//! from a complete one.
//!
//! | Directive | Input accepted |
//! |-----------|----------------|
//! | `%ld`, `%lld`, `%d` | blanks, optional sign, one or more digits |
//! | `%Nld` | as above, at most `N` bytes including the sign |
//! | `%c` | exactly one byte, blanks included |
//! | blank | any run of blanks, possibly empty |
//! | other byte | that byte, literally |

/// A converted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Int(i64),
    Char(u8),
}

/// The fields converted before the first mismatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Scanned(Vec<Field>);

impl Scanned {
    /// Number of converted fields.
    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.0.len()
    }

    /// Integer field `i`; zero when missing or not an integer.
    #[inline]
    pub(crate) fn int(&self, i: usize) -> i64 {
        match self.0.get(i) {
            Some(Field::Int(v)) => *v,
            _ => 0,
        }
    }

    /// Character field `i`; NUL when missing or not a character.
    #[inline]
    pub(crate) fn char(&self, i: usize) -> u8 {
        match self.0.get(i) {
            Some(Field::Char(c)) => *c,
            _ => 0,
        }
    }
}

#[inline]
fn is_blank(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0x0b
}

/// Scans `input` against `pattern`.
pub(crate) fn scan(input: &str, pattern: &str) -> Scanned {
    let src = input.as_bytes();
    let fmt = pattern.as_bytes();
    let mut out = Vec::new();
    let mut at = 0usize;
    let mut p = 0usize;

    while p < fmt.len() {
        let f = fmt[p];
        if is_blank(f) {
            while at < src.len() && is_blank(src[at]) {
                at += 1;
            }
            p += 1;
            continue;
        }
        if f != b'%' {
            if at < src.len() && src[at] == f {
                at += 1;
                p += 1;
                continue;
            }
            break;
        }

        // ── Conversion directive ──
        p += 1;
        let mut width = 0usize;
        while p < fmt.len() && fmt[p].is_ascii_digit() {
            width = width * 10 + usize::from(fmt[p] - b'0');
            p += 1;
        }
        while p < fmt.len() && fmt[p] == b'l' {
            p += 1;
        }
        let Some(&kind) = fmt.get(p) else {
            break;
        };
        p += 1;

        match kind {
            b'c' => match src.get(at) {
                Some(&c) => {
                    out.push(Field::Char(c));
                    at += 1;
                }
                None => break,
            },
            b'd' => {
                while at < src.len() && is_blank(src[at]) {
                    at += 1;
                }
                match read_int(&src[at..], width) {
                    Some((value, used)) => {
                        out.push(Field::Int(value));
                        at += used;
                    }
                    None => break,
                }
            }
            _ => break,
        }
    }

    Scanned(out)
}

/// Reads a signed decimal of at most `width` bytes (unbounded when zero).
/// Saturates at the `i64` bounds.
fn read_int(src: &[u8], width: usize) -> Option<(i64, usize)> {
    let limit = if width == 0 { src.len() } else { width.min(src.len()) };
    let mut i = 0usize;
    let mut negative = false;
    if i < limit && (src[i] == b'+' || src[i] == b'-') {
        negative = src[i] == b'-';
        i += 1;
    }
    let digits_start = i;
    let mut value: i64 = 0;
    while i < limit && src[i].is_ascii_digit() {
        let d = i64::from(src[i] - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(d)
        } else {
            value.saturating_mul(10).saturating_add(d)
        };
        i += 1;
    }
    if i == digits_start {
        return None;
    }
    Some((value, i))
}

/// Leading integer of `input`, as read by a lone `%ld`.
#[inline]
pub(crate) fn leading_int(input: &str) -> Option<i64> {
    let s = scan(input, "%ld");
    (s.count() == 1).then(|| s.int(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_fields() {
        let s = scan("2016-12-31T23:59:60", "%4ld-%2ld-%2ld%c%2ld:%2ld:%2ld");
        assert_eq!(s.count(), 7);
        assert_eq!(s.int(0), 2016);
        assert_eq!(s.int(2), 31);
        assert_eq!(s.char(3), b'T');
        assert_eq!(s.int(6), 60);
    }

    #[test]
    fn width_limits_digits() {
        let s = scan("20170101", "%4ld%2ld%2ld");
        assert_eq!(s.count(), 3);
        assert_eq!((s.int(0), s.int(1), s.int(2)), (2017, 1, 1));
    }

    #[test]
    fn missing_leading_zero_is_accepted() {
        let s = scan(" 1-Apr-1990", "%2ld-%c%c%c-%4ld");
        assert_eq!(s.count(), 5);
        assert_eq!(s.int(0), 1);
        assert_eq!(s.int(4), 1990);
    }

    #[test]
    fn stops_at_first_mismatch() {
        let s = scan("2017/01/01", "%4ld-%2ld-%2ld");
        assert_eq!(s.count(), 1);
        let s = scan("", "%ld");
        assert_eq!(s.count(), 0);
        let s = scan("abc", "%ld");
        assert_eq!(s.count(), 0);
    }

    #[test]
    fn literal_after_last_field_does_not_count() {
        let s = scan("12:30:15", "%2ld:%2ld:%2ldZ");
        assert_eq!(s.count(), 3);
    }

    #[test]
    fn signs_and_saturation() {
        assert_eq!(leading_int("-42x"), Some(-42));
        assert_eq!(leading_int("+7"), Some(7));
        assert_eq!(leading_int("-"), None);
        assert_eq!(leading_int("99999999999999999999999"), Some(i64::MAX));
        let s = scan("-1234", "%2ld%ld");
        assert_eq!((s.int(0), s.int(1)), (-1, 234));
    }
}
