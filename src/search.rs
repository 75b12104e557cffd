// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Inclusive range search over sorted time arrays.
//!
//! [`range_search`] returns the first and last index of the elements lying
//! in `[start, stop]`. Each bound comes from its own bisection, narrowed
//! until a single element is left, so a run of equal boundary values is
//! always returned whole.
//!
//! | Key | Order |
//! |-----|-------|
//! | `f64`, [`Epoch`] | numeric |
//! | `[f64; 2]`, [`Epoch16`] | seconds, then picoseconds |
//! | `i64`, [`Tt2000`] | numeric |

use crate::value::{Epoch, Epoch16, Tt2000};
use std::cmp::Ordering;

/// A value that can be located in a sorted time array.
pub trait SearchKey: Copy {
    fn key_cmp(&self, other: &Self) -> Ordering;
}

impl SearchKey for f64 {
    #[inline]
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

impl SearchKey for i64 {
    #[inline]
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl SearchKey for [f64; 2] {
    #[inline]
    fn key_cmp(&self, other: &Self) -> Ordering {
        self[0].total_cmp(&other[0]).then_with(|| self[1].total_cmp(&other[1]))
    }
}

impl SearchKey for Epoch {
    #[inline]
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.value().key_cmp(&other.value())
    }
}

impl SearchKey for Epoch16 {
    #[inline]
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.to_array().key_cmp(&other.to_array())
    }
}

impl SearchKey for Tt2000 {
    #[inline]
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.value().cmp(&other.value())
    }
}

/// Index of the first key not below `start`; the last key must not be below it.
fn lower_bound<K: SearchKey>(keys: &[K], start: &K) -> usize {
    let (mut lo, mut hi) = (0, keys.len() - 1);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if keys[mid].key_cmp(start) == Ordering::Less {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Index of the last key not above `stop`; the first key must not be above it.
fn upper_bound<K: SearchKey>(keys: &[K], stop: &K) -> usize {
    let (mut lo, mut hi) = (0, keys.len() - 1);
    while lo < hi {
        let mid = lo + (hi - lo).div_ceil(2);
        if keys[mid].key_cmp(stop) == Ordering::Greater {
            hi = mid - 1;
        } else {
            lo = mid;
        }
    }
    lo
}

/// First and last index of the sorted `keys` within `[start, stop]`.
///
/// `None` when `start > stop`, `keys` is empty or no key is in range.
pub fn range_search<K: SearchKey>(keys: &[K], start: K, stop: K) -> Option<(usize, usize)> {
    let (first, last) = (keys.first()?, keys.last()?);
    if start.key_cmp(&stop) == Ordering::Greater
        || last.key_cmp(&start) == Ordering::Less
        || first.key_cmp(&stop) == Ordering::Greater
    {
        return None;
    }
    let beginning = lower_bound(keys, &start);
    let ending = upper_bound(keys, &stop);
    (beginning <= ending).then_some((beginning, ending))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_numbers() {
        let keys = [1.0, 3.0, 5.0, 7.0, 9.0];
        assert_eq!(range_search(&keys, 4.0, 8.0), Some((2, 3)));
        assert_eq!(range_search(&keys, 10.0, 20.0), None);
        assert_eq!(range_search(&keys, 1.0, 9.0), Some((0, 4)));
        assert_eq!(range_search(&keys, -5.0, 0.5), None);
        assert_eq!(range_search(&keys, 3.0, 3.0), Some((1, 1)));
        assert_eq!(range_search(&keys, 5.5, 6.5), None);
    }

    #[test]
    fn reversed_bounds_and_empty() {
        assert_eq!(range_search(&[1_i64, 2, 3], 3, 1), None);
        assert_eq!(range_search::<i64>(&[], 0, 10), None);
    }

    #[test]
    fn duplicates_widen() {
        let keys = [1_i64, 2, 2, 2, 3, 4, 4, 5];
        assert_eq!(range_search(&keys, 2, 4), Some((1, 6)));
        assert_eq!(range_search(&keys, 2, 2), Some((1, 3)));
        assert_eq!(range_search(&[7_i64; 9], 7, 7), Some((0, 8)));
    }

    #[test]
    fn two_key_order() {
        let keys = [
            Epoch16::new(10.0, 0.0),
            Epoch16::new(10.0, 500.0),
            Epoch16::new(10.0, 500.0),
            Epoch16::new(11.0, 0.0),
            Epoch16::new(12.0, 999.0),
        ];
        assert_eq!(range_search(&keys, Epoch16::new(10.0, 1.0), Epoch16::new(11.0, 0.0)), Some((1, 3)));
        assert_eq!(range_search(&keys, Epoch16::new(12.0, 999.5), Epoch16::new(13.0, 0.0)), None);
        assert_eq!(range_search(&keys, Epoch16::new(11.0, 5.0), Epoch16::new(11.0, 1.0)), None);
        assert_eq!(range_search(&keys, Epoch16::new(0.0, 0.0), Epoch16::new(10.0, 0.0)), Some((0, 0)));
    }

    #[test]
    fn typed_keys() {
        let tt: Vec<Tt2000> = (0..100).map(|i| Tt2000::new(i * 1_000)).collect();
        assert_eq!(range_search(&tt, Tt2000::new(1_500), Tt2000::new(4_000)), Some((2, 4)));
        let ep: Vec<Epoch> = (0..10).map(|i| Epoch::new(f64::from(i))).collect();
        assert_eq!(range_search(&ep, Epoch::new(-1.0), Epoch::new(0.0)), Some((0, 0)));
    }

    #[test]
    fn matches_linear_scan() {
        let keys: Vec<i64> = (0..200).map(|i| i / 3 * 2).collect();
        for start in -2..140 {
            for stop in start..start + 9 {
                let hits: Vec<usize> = (0..keys.len()).filter(|&i| (start..=stop).contains(&keys[i])).collect();
                let expected = hits.first().map(|&f| (f, *hits.last().unwrap_or(&f)));
                assert_eq!(range_search(&keys, start, stop), expected, "[{start}, {stop}]");
            }
        }
    }
}
