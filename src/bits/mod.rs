/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Structures for [arrays of values of bounded bit width](`mod@bit_packed_array`).

pub mod bit_packed_array;
pub use bit_packed_array::*;

/// The number of bits in a storage word.
pub const WORD_BITS: usize = u64::BITS as usize;

/// Returns the number of bits necessary to represent `max_value`, and at
/// least one.
#[inline]
pub fn bit_width_for(max_value: u64) -> usize {
    ((u64::BITS - max_value.leading_zeros()) as usize).max(1)
}

/// Returns the number of words necessary to store `len` values of
/// `bit_width` bits.
#[inline(always)]
pub(crate) fn words_for(len: usize, bit_width: usize) -> usize {
    (len * bit_width).div_ceil(WORD_BITS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_width_for() {
        assert_eq!(bit_width_for(0), 1);
        assert_eq!(bit_width_for(1), 1);
        assert_eq!(bit_width_for(3), 2);
        assert_eq!(bit_width_for(4), 3);
        assert_eq!(bit_width_for(19), 5);
        assert_eq!(bit_width_for(u64::MAX), 64);
    }

    #[test]
    fn test_words_for() {
        assert_eq!(words_for(0, 7), 0);
        assert_eq!(words_for(9, 7), 1);
        assert_eq!(words_for(10, 7), 2);
        assert_eq!(words_for(3, 64), 3);
    }
}
