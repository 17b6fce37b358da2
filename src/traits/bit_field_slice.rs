/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Traits for slices of bit fields of constant width.

Slices of bit fields are accessed with a logic similar to slices, but
when indexed with [`get`](BitFieldSlice::get) return an owned `u64` value
of a [fixed bit width](BitFieldSliceCore::bit_width). The associated
implementation is [`BitPackedArray`](crate::bits::BitPackedArray).

Implementing the [`Index`](core::ops::Index)/[`IndexMut`](core::ops::IndexMut) traits
would be more natural and practical, but it is impossible: there is no way
to return a reference to a bit segment.

There are two end-user traits: [`BitFieldSlice`] and [`BitFieldSliceMut`].
The trait [`BitFieldSliceCore`] contains the common methods, and in particular
[`BitFieldSliceCore::bit_width`], which returns the bit width the values stored in the slice.
All stored values must fit within this bit width, which is at most 64.

Checked methods return an [`Error`](crate::Error) when the index is out of bounds or,
in the case of [`BitFieldSliceMut::set`], when the value does not fit in
the bit width: values are never silently masked. Unchecked methods
are available for loops whose indices are known to be valid.

*/

use crate::error::Result;

/// Common methods for [`BitFieldSlice`] and [`BitFieldSliceMut`].
pub trait BitFieldSliceCore {
    /// Returns the width of the slice. All elements stored in the slice must
    /// fit within this bit width.
    fn bit_width(&self) -> usize;
    /// Returns the length of the slice.
    fn len(&self) -> usize;
    /// Returns true if the slice has length zero.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

macro_rules! ensure_in_bounds {
    ($index: expr, $len: expr) => {
        if $index >= $len {
            return Err($crate::error::Error::OutOfBounds {
                index: $index,
                len: $len,
            });
        }
    };
}
pub(crate) use ensure_in_bounds;

macro_rules! ensure_value_fits {
    ($value: expr, $mask: expr, $bit_width: expr) => {
        if $value & $mask != $value {
            return Err($crate::error::Error::ValueOutOfRange {
                value: $value,
                bit_width: $bit_width,
            });
        }
    };
}
pub(crate) use ensure_value_fits;

/// A slice of bit fields of constant bit width.
pub trait BitFieldSlice: BitFieldSliceCore {
    /// Returns the value at the specified index.
    ///
    /// # Safety
    /// `index` must be in [0..[len](`BitFieldSliceCore::len`)). No bounds checking is performed.
    unsafe fn get_unchecked(&self, index: usize) -> u64;

    /// Returns the value at the specified index, or
    /// [`Error::OutOfBounds`](crate::Error::OutOfBounds) if the index is not in
    /// [0..[len](`BitFieldSliceCore::len`)).
    fn get(&self, index: usize) -> Result<u64> {
        ensure_in_bounds!(index, self.len());
        Ok(unsafe { self.get_unchecked(index) })
    }
}

/// A mutable slice of bit fields of constant bit width.
pub trait BitFieldSliceMut: BitFieldSliceCore {
    /// Sets the element of the slice at the specified index.
    ///
    /// # Safety
    /// - `index` must be in [0..[len](`BitFieldSliceCore::len`));
    /// - `value` must fit withing [`BitFieldSliceCore::bit_width`] bits.
    ///
    /// No bound or bit-width check is performed.
    unsafe fn set_unchecked(&mut self, index: usize, value: u64);

    /// Sets the element of the slice at the specified index.
    ///
    /// Returns [`Error::OutOfBounds`](crate::Error::OutOfBounds) if the index is not in
    /// [0..[len](`BitFieldSliceCore::len`)), and
    /// [`Error::ValueOutOfRange`](crate::Error::ValueOutOfRange) if the value does not fit in
    /// [`BitFieldSliceCore::bit_width`] bits; in both cases the slice is
    /// left untouched.
    fn set(&mut self, index: usize, value: u64) -> Result<()> {
        ensure_in_bounds!(index, self.len());
        let bit_width = self.bit_width();
        let mask = u64::MAX >> (u64::BITS as usize - bit_width);
        ensure_value_fits!(value, mask, bit_width);
        unsafe {
            self.set_unchecked(index, value);
        }
        Ok(())
    }

    /// Sets all values to zero.
    fn reset(&mut self);
}
