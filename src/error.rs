/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Errors of the crate.
//!
//! Construction errors ([`Error::MalformedRange`] in particular) leave the
//! structure that reported them poisoned: it must be discarded and rebuilt.
//! Query errors never change the state of a sealed structure, and the
//! query can be retried with corrected arguments.

use crate::alphabet::SymbolClass;

fn as_char(symbol: &u8) -> char {
    char::from(*symbol)
}

/// Result type of the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type of the crate.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A raw symbol outside the domain of the alphabet.
    #[error("Unknown symbol {:?}", as_char(.0))]
    UnknownSymbol(u8),

    /// A code outside the range of the alphabet.
    #[error("Unknown code {code} (alphabet size {size})")]
    UnknownCode { code: u8, size: usize },

    /// A regular symbol was given where a special one was expected, or
    /// vice versa.
    #[error("Symbol {:?} is {actual}, but a {expected} symbol was expected", as_char(.symbol))]
    WrongSymbolClass {
        symbol: u8,
        actual: SymbolClass,
        expected: SymbolClass,
    },

    /// The bit width is zero or larger than a word.
    #[error("Invalid bit width {bit_width}: it must be in [1..{word_bits}]")]
    InvalidBitWidth { bit_width: usize, word_bits: usize },

    /// The alphabet definition is inconsistent.
    #[error("Invalid alphabet: {0}")]
    InvalidAlphabet(String),

    /// An appended range is empty, or it starts before the end of the
    /// previous range.
    #[error("Malformed range [{start}..{start}+{len}): ranges must be nonempty and start at or after position {min_start}")]
    MalformedRange {
        start: usize,
        len: usize,
        min_start: usize,
    },

    /// The structure has already been sealed.
    #[error("The structure has already been sealed")]
    AlreadySealed,

    /// The structure must be sealed before querying it.
    #[error("The structure has not been sealed yet")]
    NotSealed,

    /// A previous construction error left the structure unusable.
    #[error("The structure has been poisoned by a previous construction error and must be rebuilt")]
    Poisoned,

    /// An index or position out of bounds.
    #[error("Index out of bounds: {index} >= {len}")]
    OutOfBounds { index: usize, len: usize },

    /// An empty region, or a region not contained in `[0..len)`.
    #[error("Invalid region [{start}..={end}] for a sequence of length {len}")]
    InvalidRegion { start: usize, end: usize, len: usize },

    /// A value does not fit in the bit width of a packed array.
    #[error("Value {value} does not fit in {bit_width} bits")]
    ValueOutOfRange { value: u64, bit_width: usize },

    /// A record query on a sequence built without a separator.
    #[error("The sequence has no record separator")]
    NoSeparator,

    /// Serialized parts that do not describe a valid sequence.
    #[error("Invalid serialized parts: {0}")]
    InvalidParts(String),
}
