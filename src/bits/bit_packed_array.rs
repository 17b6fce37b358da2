/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Arrays of values of fixed bit width.

Values are stored contiguously in a buffer of `u64` words, with no padding
bits: the value of index *i* occupies the bits [*ib*..*ib* + *b*) of the
bit stream formed by the words, where *b* is the bit width. Bits are
numbered most-significant first within each word, so the first value of a
word is found in its highest bits.

Unless the bit width is a power of two, some values straddle two words:
the high part of the value then occupies the lowest bits of the first
word, and the remaining part the highest bits of the following one.

The buffer always contains exactly ⌈*nb* / 64⌉ words, where *n* is the
length; [`BitPackedArray::as_words`] exposes it as block 1 of the
[serialized parts](crate::seq::EncodedSeqParts) of an encoded sequence.

Out-of-range values are rejected with
[`Error::ValueOutOfRange`](crate::Error::ValueOutOfRange), never masked.

```rust
use encseq::prelude::*;

let mut array = BitPackedArray::new(5, 20)?;
array.set(12, 31)?; // bits 60..65 cross a word boundary
assert_eq!(array.get(12)?, 31);
assert!(array.set(0, 32).is_err());
# Ok::<(), encseq::Error>(())
```

*/

use super::{words_for, WORD_BITS};
use crate::error::{Error, Result};
use crate::traits::bit_field_slice::*;
use mem_dbg::*;

/// A vector of bit fields of fixed width, packed most-significant first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, MemDbg, MemSize)]
pub struct BitPackedArray {
    /// The underlying storage.
    data: Vec<u64>,
    /// The bit width of the values stored in the array.
    bit_width: usize,
    /// A mask with its lowest `bit_width` bits set to one.
    mask: u64,
    /// The length of the array.
    len: usize,
}

fn check_bit_width(bit_width: usize) -> Result<()> {
    if bit_width == 0 || bit_width > WORD_BITS {
        return Err(Error::InvalidBitWidth {
            bit_width,
            word_bits: WORD_BITS,
        });
    }
    Ok(())
}

/// A mask with the lowest `bit_width` bits set, for `bit_width` in
/// [1..64].
#[inline(always)]
fn mask(bit_width: usize) -> u64 {
    u64::MAX >> (WORD_BITS - bit_width)
}

/// Reads the value starting at bit `bit_index` of word `word_index`.
///
/// # Safety
/// The value must lie within `data`.
#[inline(always)]
unsafe fn read_field(
    data: &[u64],
    word_index: usize,
    bit_index: usize,
    bit_width: usize,
    mask: u64,
) -> u64 {
    if bit_index + bit_width <= WORD_BITS {
        (*data.get_unchecked(word_index) >> (WORD_BITS - bit_index - bit_width)) & mask
    } else {
        // 1 <= high_bits, low_bits <= 63
        let high_bits = WORD_BITS - bit_index;
        let low_bits = bit_width - high_bits;
        let high = *data.get_unchecked(word_index) & (u64::MAX >> bit_index);
        let low = *data.get_unchecked(word_index + 1) >> (WORD_BITS - low_bits);
        (high << low_bits) | low
    }
}

/// Writes `value` starting at bit `bit_index` of word `word_index`.
///
/// # Safety
/// The value must lie within `data`, and it must fit in `bit_width` bits.
#[inline(always)]
unsafe fn write_field(
    data: &mut [u64],
    word_index: usize,
    bit_index: usize,
    bit_width: usize,
    mask: u64,
    value: u64,
) {
    if bit_index + bit_width <= WORD_BITS {
        let shift = WORD_BITS - bit_index - bit_width;
        let word = data.get_unchecked_mut(word_index);
        *word = (*word & !(mask << shift)) | (value << shift);
    } else {
        let high_bits = WORD_BITS - bit_index;
        let low_bits = bit_width - high_bits;

        let word = data.get_unchecked_mut(word_index);
        *word = (*word & !(u64::MAX >> bit_index)) | (value >> low_bits);

        let word = data.get_unchecked_mut(word_index + 1);
        *word = (*word & (u64::MAX >> low_bits)) | (value << (WORD_BITS - low_bits));
    }
}

impl BitPackedArray {
    /// Creates a new zero-initialized array of given bit width and length.
    ///
    /// Returns [`Error::InvalidBitWidth`] if the bit width is zero or larger
    /// than 64.
    pub fn new(bit_width: usize, len: usize) -> Result<Self> {
        check_bit_width(bit_width)?;
        Ok(Self {
            data: vec![0; words_for(len, bit_width)],
            bit_width,
            mask: mask(bit_width),
            len,
        })
    }

    /// Creates an empty array that doesn't need to reallocate for up to
    /// `capacity` elements.
    pub fn with_capacity(bit_width: usize, capacity: usize) -> Result<Self> {
        check_bit_width(bit_width)?;
        Ok(Self {
            data: Vec::with_capacity(words_for(capacity, bit_width)),
            bit_width,
            mask: mask(bit_width),
            len: 0,
        })
    }

    /// Creates an array from its word buffer, checking that the number of
    /// words is exactly ⌈`len` · `bit_width` / 64⌉.
    pub fn from_raw_parts(data: Vec<u64>, bit_width: usize, len: usize) -> Result<Self> {
        check_bit_width(bit_width)?;
        let expected = words_for(len, bit_width);
        if data.len() != expected {
            return Err(Error::InvalidParts(format!(
                "{} values of {} bits need {} words, but {} were provided",
                len,
                bit_width,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            data,
            bit_width,
            mask: mask(bit_width),
            len,
        })
    }

    /// Returns the word buffer, the bit width, and the length.
    pub fn into_raw_parts(self) -> (Vec<u64>, usize, usize) {
        (self.data, self.bit_width, self.len)
    }

    /// Returns the word buffer.
    pub fn as_words(&self) -> &[u64] {
        &self.data
    }

    /// Returns the mask used to extract values from this array.
    /// This will keep the lowest `bit_width` bits.
    pub fn mask(&self) -> u64 {
        self.mask
    }

    /// Adds a value at the end of the array.
    ///
    /// Returns [`Error::ValueOutOfRange`] if the value does not fit in the
    /// bit width.
    pub fn push(&mut self, value: u64) -> Result<()> {
        ensure_value_fits!(value, self.mask, self.bit_width);
        if words_for(self.len + 1, self.bit_width) > self.data.len() {
            self.data.push(0);
        }
        unsafe {
            self.set_unchecked(self.len, value);
        }
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the last value, or `None` if the array is empty.
    pub fn pop(&mut self) -> Option<u64> {
        if self.len == 0 {
            return None;
        }
        let index = self.len - 1;
        let value = unsafe { self.get_unchecked(index) };
        // Clear the bits so that equal arrays have equal buffers
        unsafe { self.set_unchecked(index, 0) };
        self.len = index;
        self.data.truncate(words_for(self.len, self.bit_width));
        Some(value)
    }

    /// Sets the length to zero.
    pub fn clear(&mut self) {
        self.data.clear();
        self.len = 0;
    }

    /// Returns an iterator over the values starting at index `from`.
    ///
    /// Returns [`Error::OutOfBounds`] if `from` is larger than the length
    /// (an iterator starting at the length is empty).
    pub fn iter_from(&self, from: usize) -> Result<BitPackedArrayIter<'_>> {
        if from > self.len {
            return Err(Error::OutOfBounds {
                index: from,
                len: self.len,
            });
        }
        Ok(BitPackedArrayIter::new(self, from))
    }

    /// Returns an iterator over the values.
    pub fn iter(&self) -> BitPackedArrayIter<'_> {
        BitPackedArrayIter::new(self, 0)
    }
}

impl BitFieldSliceCore for BitPackedArray {
    #[inline(always)]
    fn bit_width(&self) -> usize {
        debug_assert!(self.bit_width <= WORD_BITS);
        self.bit_width
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.len
    }
}

impl BitFieldSlice for BitPackedArray {
    #[inline]
    unsafe fn get_unchecked(&self, index: usize) -> u64 {
        let pos = index * self.bit_width;
        read_field(
            &self.data,
            pos / WORD_BITS,
            pos % WORD_BITS,
            self.bit_width,
            self.mask,
        )
    }
}

impl BitFieldSliceMut for BitPackedArray {
    // We reimplement set as we have the mask in the structure.

    #[inline]
    fn set(&mut self, index: usize, value: u64) -> Result<()> {
        ensure_in_bounds!(index, self.len);
        ensure_value_fits!(value, self.mask, self.bit_width);
        unsafe {
            self.set_unchecked(index, value);
        }
        Ok(())
    }

    #[inline]
    unsafe fn set_unchecked(&mut self, index: usize, value: u64) {
        let pos = index * self.bit_width;
        write_field(
            &mut self.data,
            pos / WORD_BITS,
            pos % WORD_BITS,
            self.bit_width,
            self.mask,
            value,
        );
    }

    fn reset(&mut self) {
        self.data.iter_mut().for_each(|w| *w = 0);
    }
}

/// An [`Iterator`] over the values of a [`BitPackedArray`].
///
/// The iterator keeps track of the current word and bit offset, so that no
/// multiplication is needed to move to the next value.
#[derive(Debug, Clone)]
pub struct BitPackedArrayIter<'a> {
    array: &'a BitPackedArray,
    word_index: usize,
    bit_index: usize,
    index: usize,
}

impl<'a> BitPackedArrayIter<'a> {
    fn new(array: &'a BitPackedArray, from: usize) -> Self {
        let pos = from * array.bit_width;
        Self {
            array,
            word_index: pos / WORD_BITS,
            bit_index: pos % WORD_BITS,
            index: from,
        }
    }
}

impl Iterator for BitPackedArrayIter<'_> {
    type Item = u64;

    #[inline]
    fn next(&mut self) -> Option<u64> {
        if self.index >= self.array.len {
            return None;
        }
        // SAFETY: index has just been checked.
        let value = unsafe {
            read_field(
                &self.array.data,
                self.word_index,
                self.bit_index,
                self.array.bit_width,
                self.array.mask,
            )
        };
        self.index += 1;
        self.bit_index += self.array.bit_width;
        if self.bit_index >= WORD_BITS {
            self.word_index += 1;
            self.bit_index -= WORD_BITS;
        }
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.array.len - self.index;
        (len, Some(len))
    }
}

impl ExactSizeIterator for BitPackedArrayIter<'_> {}

impl<'a> IntoIterator for &'a BitPackedArray {
    type Item = u64;
    type IntoIter = BitPackedArrayIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msb_first_layout() -> Result<()> {
        let mut array = BitPackedArray::new(4, 16)?;
        array.set(0, 0xA)?;
        array.set(15, 0x5)?;
        assert_eq!(array.as_words(), &[0xA000_0000_0000_0005]);
        Ok(())
    }

    #[test]
    fn test_straddling_layout() -> Result<()> {
        // Index 2 of width 30 covers bits 60..90: 4 bits in word 0, 26 in word 1
        let mut array = BitPackedArray::new(30, 3)?;
        let value = (0b1011 << 26) | 0x3FF_FFFF;
        array.set(2, value)?;
        assert_eq!(array.as_words(), &[0b1011, 0x3FF_FFFF << 38]);
        assert_eq!(array.get(2)?, value);
        assert_eq!(array.get(1)?, 0);
        Ok(())
    }

    #[test]
    fn test_straddling_preserves_neighbours() -> Result<()> {
        let mut array = BitPackedArray::new(7, 20)?;
        for i in 0..20 {
            array.set(i, 0x7F)?;
        }
        // Index 9 covers bits 63..70
        array.set(9, 0b1010101)?;
        for i in 0..20 {
            assert_eq!(array.get(i)?, if i == 9 { 0b1010101 } else { 0x7F });
        }
        Ok(())
    }

    #[test]
    fn test_full_width() -> Result<()> {
        let mut array = BitPackedArray::new(64, 3)?;
        array.set(1, u64::MAX)?;
        array.set(2, 1)?;
        assert_eq!(array.get(0)?, 0);
        assert_eq!(array.get(1)?, u64::MAX);
        assert_eq!(array.get(2)?, 1);
        Ok(())
    }

    #[test]
    fn test_pop_clears_bits() -> Result<()> {
        let mut a = BitPackedArray::new(3, 0)?;
        let mut b = BitPackedArray::new(3, 0)?;
        for v in [1, 2, 3, 4, 5, 6, 7] {
            a.push(v)?;
        }
        for v in [1, 2, 3] {
            b.push(v)?;
        }
        for _ in 0..4 {
            a.pop();
        }
        assert_eq!(a, b);
        Ok(())
    }
}
