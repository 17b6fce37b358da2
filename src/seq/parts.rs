/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Serializable parts of an encoded sequence.

An [`EncodedSeqParts`] exposes the content of a sealed
[`EncodedSeq`] as three ordered blocks:

1. the words of the packed array of regular codes;
2. the special ranges, as [`RangeRecord`]s sorted by starting position;
3. the alphabet, as [`AlphabetRecord`]s.

The code of the record separator, if any, is stored alongside.

The structure can be serialized with ε-serde, and
[`EncodedSeq::store`]/[`EncodedSeq::load`] do exactly that; the byte
layout is the one of ε-serde. [`EncodedSeq::from_parts`] checks all
invariants, so parts coming from an untrusted source are safe to load.

*/

use super::EncodedSeq;
use crate::alphabet::{Alphabet, SymbolClass};
use crate::bits::BitPackedArray;
use crate::error::{Error, Result};
use crate::ranges::{SpecialRange, SpecialRangeIndex};
use crate::traits::bit_field_slice::*;
use epserde::prelude::*;
use epserde::Epserde;
use mem_dbg::*;
use std::path::Path;

/// A special range, as stored in block 2.
#[derive(Epserde, Debug, Clone, Copy, PartialEq, Eq, Hash, MemDbg, MemSize)]
#[deep_copy]
pub struct RangeRecord {
    pub start: u64,
    pub len: u64,
    pub symbol: u8,
}

/// An alphabet entry, as stored in block 3.
#[derive(Epserde, Debug, Clone, Copy, PartialEq, Eq, Hash, MemDbg, MemSize)]
#[deep_copy]
pub struct AlphabetRecord {
    pub raw: u8,
    pub code: u8,
    pub special: bool,
}

/// The logical content of a sealed [`EncodedSeq`].
#[derive(Epserde, Debug, Clone, PartialEq, Eq, MemDbg, MemSize)]
#[deep_copy]
pub struct EncodedSeqParts {
    /// The length of the sequence.
    pub len: usize,
    /// The bit width of the packed array.
    pub bit_width: usize,
    /// The number of regular positions, that is, the length of the packed
    /// array.
    pub num_regular: usize,
    /// Block 1: ⌈`num_regular` · `bit_width` / 64⌉ words.
    pub words: Vec<u64>,
    /// Block 2.
    pub ranges: Vec<RangeRecord>,
    /// Block 3.
    pub alphabet: Vec<AlphabetRecord>,
    /// The code of the record separator, if any.
    pub separator: Option<u8>,
}

fn to_usize(value: u64) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| Error::InvalidParts(format!("value {} does not fit in a usize", value)))
}

impl EncodedSeq {
    /// Returns the parts of a sealed sequence.
    pub fn to_parts(&self) -> Result<EncodedSeqParts> {
        self.state().ensure_sealed()?;
        let packed = self.packed();
        Ok(EncodedSeqParts {
            len: self.num_appended(),
            bit_width: packed.bit_width(),
            num_regular: packed.len(),
            words: packed.as_words().to_vec(),
            ranges: self
                .special_ranges()
                .iter()
                .map(|r| RangeRecord {
                    start: r.start as u64,
                    len: r.len as u64,
                    symbol: r.symbol,
                })
                .collect(),
            alphabet: self
                .alphabet()
                .records()
                .map(|(raw, code, class)| AlphabetRecord {
                    raw,
                    code,
                    special: class == SymbolClass::Special,
                })
                .collect(),
            separator: self.separator_code(),
        })
    }

    /// Rebuilds a sealed sequence from its parts.
    ///
    /// All invariants are checked: the alphabet must be a bijection, the
    /// packed array must contain exactly the regular positions with
    /// regular codes, and the ranges must be sorted, nonempty,
    /// nonoverlapping, and carry special codes.
    pub fn from_parts(parts: EncodedSeqParts) -> Result<Self> {
        let alphabet = Alphabet::from_records(parts.alphabet.iter().map(|r| {
            let class = if r.special {
                SymbolClass::Special
            } else {
                SymbolClass::Regular
            };
            (r.raw, r.code, class)
        }))?;

        if parts.bit_width != alphabet.regular_bit_width() {
            return Err(Error::InvalidParts(format!(
                "bit width {} does not match the alphabet (expected {})",
                parts.bit_width,
                alphabet.regular_bit_width()
            )));
        }
        let packed = BitPackedArray::from_raw_parts(parts.words, parts.bit_width, parts.num_regular)?;
        if let Some(code) = packed
            .iter()
            .find(|&c| alphabet.class(c as u8) != Ok(SymbolClass::Regular))
        {
            return Err(Error::InvalidParts(format!(
                "code {} in the packed array is not a regular code",
                code
            )));
        }

        let mut specials = SpecialRangeIndex::new();
        for r in &parts.ranges {
            if !alphabet.is_special(r.symbol) {
                return Err(Error::InvalidParts(format!(
                    "range symbol {} is not a special code",
                    r.symbol
                )));
            }
            specials.append(SpecialRange::new(to_usize(r.start)?, to_usize(r.len)?, r.symbol))?;
        }
        if specials.end() > parts.len {
            return Err(Error::InvalidParts(format!(
                "ranges end at {}, after the end of the sequence ({})",
                specials.end(),
                parts.len
            )));
        }
        if specials.num_special_positions() + parts.num_regular != parts.len {
            return Err(Error::InvalidParts(format!(
                "{} special and {} regular positions do not add up to length {}",
                specials.num_special_positions(),
                parts.num_regular,
                parts.len
            )));
        }
        if let Some(code) = parts.separator {
            if !alphabet.is_special(code) {
                return Err(Error::InvalidParts(format!(
                    "separator {} is not a special code",
                    code
                )));
            }
        }
        specials.seal()?;

        Ok(Self::from_sealed_parts(
            alphabet,
            packed,
            specials,
            parts.len,
            parts.separator,
        ))
    }

    /// Stores a sealed sequence at the given path using ε-serde.
    pub fn store(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let parts = self.to_parts()?;
        parts.store(path)?;
        Ok(())
    }

    /// Loads a sequence stored with [`store`](EncodedSeq::store), checking
    /// its invariants.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let parts = EncodedSeqParts::load_full(path)?;
        Ok(Self::from_parts(parts)?)
    }
}
