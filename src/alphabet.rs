/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Alphabets mapping raw symbols to dense codes.

An [`Alphabet`] is a bijection between a domain of at most
[`MAX_ALPHABET_SIZE`] raw bytes and the codes `0..k`. Every code is either
[regular](SymbolClass::Regular), in which case an
[encoded sequence](crate::seq::EncodedSeq) stores it individually in a
[bit-packed array](crate::bits::BitPackedArray), or
[special](SymbolClass::Special), in which case it is expected to appear in
runs (wildcards, separators) and it is stored in a
[range index](crate::ranges::SpecialRangeIndex).

The alphabet is immutable once built.

```rust
use encseq::alphabet::{Alphabet, SymbolClass};

let alphabet = Alphabet::new(b"ACGT", b"N")?;
assert_eq!(alphabet.size(), 5);
assert_eq!(alphabet.encode(b'G')?, 2);
assert_eq!(alphabet.decode(4)?, b'N');
assert!(alphabet.is_special(4));
assert_eq!(alphabet.regular_bit_width(), 2);
# Ok::<(), encseq::Error>(())
```

*/

use crate::bits::bit_width_for;
use crate::error::{Error, Result};
use core::fmt;
use mem_dbg::*;

/// The maximum number of symbols of an alphabet.
pub const MAX_ALPHABET_SIZE: usize = 255;

/// Marks bytes outside the domain. As codes are at most
/// `MAX_ALPHABET_SIZE - 1`, it cannot collide with a valid code.
const UNDEF: u8 = u8::MAX;

/// The regular symbols of the DNA preset.
pub const DNA_BASES: &[u8] = b"ACGT";
/// The IUPAC wildcards of the DNA preset.
pub const DNA_WILDCARDS: &[u8] = b"NSYWRKVBDHM";
/// The regular symbols of the protein preset.
pub const PROTEIN_AMINO_ACIDS: &[u8] = b"LVIFKREDAGSTNQYWPHMC";
/// The wildcards of the protein preset.
pub const PROTEIN_WILDCARDS: &[u8] = b"XUBZJO*-";

/// Symbols that only occur in protein sequences.
const GUESS_PROTEIN_CHARS: &[u8] = b"LIFEQPlifeqpXZ*-";
/// The number of symbols inspected by [`Alphabet::guess`].
const GUESS_MAX_LENGTH: usize = 5000;

/// The classification of a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, MemDbg, MemSize)]
pub enum SymbolClass {
    /// Stored individually, bit-packed.
    Regular,
    /// Stored as runs in a range index.
    Special,
}

impl fmt::Display for SymbolClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolClass::Regular => f.write_str("regular"),
            SymbolClass::Special => f.write_str("special"),
        }
    }
}

/// A bijection between raw symbols and dense codes, with a regular/special
/// classification of codes.
#[derive(Debug, Clone, PartialEq, Eq, MemDbg, MemSize)]
pub struct Alphabet {
    /// The code of each byte, or `UNDEF`.
    symbol_map: [u8; 256],
    /// The raw symbol of each code.
    characters: Vec<u8>,
    /// Whether each code is special.
    special: Vec<bool>,
    /// The number of regular codes.
    num_regular: usize,
}

impl Alphabet {
    /// Creates an alphabet from a list of regular and a list of special
    /// symbols.
    ///
    /// Regular symbols receive the codes `0..regular.len()` in the given
    /// order, and special symbols the following codes.
    pub fn new(regular: &[u8], special: &[u8]) -> Result<Self> {
        let records = regular
            .iter()
            .map(|&raw| (raw, SymbolClass::Regular))
            .chain(special.iter().map(|&raw| (raw, SymbolClass::Special)))
            .enumerate()
            .map(|(code, (raw, class))| (raw, code, class));
        Self::build(records)
    }

    /// Creates an alphabet from `(raw symbol, code, class)` records, as
    /// found in block 3 of the [serialized parts](crate::seq::EncodedSeqParts).
    ///
    /// Records may come in any order, but codes must be exactly `0..k`.
    pub fn from_records(records: impl IntoIterator<Item = (u8, u8, SymbolClass)>) -> Result<Self> {
        let mut records = records
            .into_iter()
            .map(|(raw, code, class)| (raw, code as usize, class))
            .collect::<Vec<_>>();
        records.sort_by_key(|&(_, code, _)| code);
        for (expected, &(_, code, _)) in records.iter().enumerate() {
            if code != expected {
                return Err(Error::InvalidAlphabet(format!(
                    "codes are not dense: expected code {}, found {}",
                    expected, code
                )));
            }
        }
        Self::build(records)
    }

    fn build(records: impl IntoIterator<Item = (u8, usize, SymbolClass)>) -> Result<Self> {
        let mut symbol_map = [UNDEF; 256];
        let mut characters = vec![];
        let mut special = vec![];

        for (raw, code, class) in records {
            if code >= MAX_ALPHABET_SIZE {
                return Err(Error::InvalidAlphabet(format!(
                    "at most {} symbols are supported",
                    MAX_ALPHABET_SIZE
                )));
            }
            debug_assert_eq!(code, characters.len());
            if symbol_map[raw as usize] != UNDEF {
                return Err(Error::InvalidAlphabet(format!(
                    "cannot map symbol {:?} to {}: it is already mapped to {}",
                    char::from(raw),
                    code,
                    symbol_map[raw as usize]
                )));
            }
            symbol_map[raw as usize] = code as u8;
            characters.push(raw);
            special.push(class == SymbolClass::Special);
        }

        if characters.is_empty() {
            return Err(Error::InvalidAlphabet("the alphabet is empty".into()));
        }

        let num_regular = special.iter().filter(|&&s| !s).count();
        Ok(Self {
            symbol_map,
            characters,
            special,
            num_regular,
        })
    }

    /// The DNA alphabet: `ACGT` are regular, the IUPAC wildcards
    /// `NSYWRKVBDHM` are special, each with its own code.
    pub fn dna() -> Self {
        Self::new(DNA_BASES, DNA_WILDCARDS).expect("the DNA preset is a valid alphabet")
    }

    /// The protein alphabet: the 20 amino acids are regular, the wildcards
    /// `XUBZJO*-` are special.
    pub fn protein() -> Self {
        Self::new(PROTEIN_AMINO_ACIDS, PROTEIN_WILDCARDS)
            .expect("the protein preset is a valid alphabet")
    }

    /// Guesses whether a sequence is DNA or protein by looking at its
    /// first symbols, and returns the corresponding preset.
    pub fn guess(sequence: &[u8]) -> Self {
        if sequence
            .iter()
            .take(GUESS_MAX_LENGTH)
            .any(|c| GUESS_PROTEIN_CHARS.contains(c))
        {
            Self::protein()
        } else {
            Self::dna()
        }
    }

    /// Returns the number of symbols.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.characters.len()
    }

    /// Returns the number of regular symbols.
    #[inline(always)]
    pub fn num_regular(&self) -> usize {
        self.num_regular
    }

    /// Returns the number of special symbols.
    #[inline(always)]
    pub fn num_special(&self) -> usize {
        self.size() - self.num_regular
    }

    /// Returns whether a raw symbol belongs to the domain.
    #[inline(always)]
    pub fn is_valid(&self, raw: u8) -> bool {
        self.symbol_map[raw as usize] != UNDEF
    }

    /// Returns the code of a raw symbol.
    #[inline]
    pub fn encode(&self, raw: u8) -> Result<u8> {
        match self.symbol_map[raw as usize] {
            UNDEF => Err(Error::UnknownSymbol(raw)),
            code => Ok(code),
        }
    }

    /// Returns the raw symbol of a code.
    #[inline]
    pub fn decode(&self, code: u8) -> Result<u8> {
        self.characters
            .get(code as usize)
            .copied()
            .ok_or(Error::UnknownCode {
                code,
                size: self.size(),
            })
    }

    /// Returns whether a code is special. Codes outside the alphabet are
    /// not special.
    #[inline(always)]
    pub fn is_special(&self, code: u8) -> bool {
        self.special.get(code as usize).copied().unwrap_or(false)
    }

    /// Returns the class of a code.
    pub fn class(&self, code: u8) -> Result<SymbolClass> {
        match self.special.get(code as usize) {
            Some(true) => Ok(SymbolClass::Special),
            Some(false) => Ok(SymbolClass::Regular),
            None => Err(Error::UnknownCode {
                code,
                size: self.size(),
            }),
        }
    }

    /// Returns the code of a raw symbol, checking that it has the given
    /// class.
    pub fn encode_as(&self, raw: u8, expected: SymbolClass) -> Result<u8> {
        let code = self.encode(raw)?;
        let actual = self.class(code)?;
        if actual != expected {
            return Err(Error::WrongSymbolClass {
                symbol: raw,
                actual,
                expected,
            });
        }
        Ok(code)
    }

    /// Returns the number of bits necessary to represent any code.
    pub fn bits_per_symbol(&self) -> usize {
        bit_width_for((self.size() - 1) as u64)
    }

    /// Returns the number of bits necessary to represent any regular code,
    /// and at least one. This is the width of the packed array of an
    /// [encoded sequence](crate::seq::EncodedSeq).
    pub fn regular_bit_width(&self) -> usize {
        let max_regular = self
            .special
            .iter()
            .rposition(|&s| !s)
            .unwrap_or(0);
        bit_width_for(max_regular as u64)
    }

    /// Returns the raw symbols, indexed by code.
    pub fn characters(&self) -> &[u8] {
        &self.characters
    }

    /// Returns an iterator over the `(raw symbol, code, class)` records of
    /// the alphabet, in code order.
    pub fn records(&self) -> impl Iterator<Item = (u8, u8, SymbolClass)> + '_ {
        self.characters
            .iter()
            .zip(self.special.iter())
            .enumerate()
            .map(|(code, (&raw, &special))| {
                let class = if special {
                    SymbolClass::Special
                } else {
                    SymbolClass::Regular
                };
                (raw, code as u8, class)
            })
    }

    /// Maps a raw symbol to the spelling accepted by the alphabet.
    ///
    /// Symbols of the alphabet are returned unchanged; otherwise, lowercase
    /// symbols are mapped to uppercase, and `U` to `T` when the alphabet
    /// has `T` but not `U`. Symbols that cannot be mapped are returned
    /// unchanged, so that encoding them fails.
    pub fn normalize(&self, raw: u8) -> u8 {
        if self.is_valid(raw) {
            return raw;
        }
        let upper = raw.to_ascii_uppercase();
        if self.is_valid(upper) {
            upper
        } else if upper == b'U' && self.is_valid(b'T') {
            b'T'
        } else {
            raw
        }
    }

    /// Applies [`normalize`](Alphabet::normalize) to every symbol of a
    /// slice, in place.
    pub fn normalize_seq(&self, raw: &mut [u8]) {
        for c in raw {
            *c = self.normalize(*c);
        }
    }

    /// Encodes a sequence of raw symbols.
    pub fn encode_seq(&self, raw: &[u8]) -> Result<Vec<u8>> {
        raw.iter().map(|&c| self.encode(c)).collect()
    }

    /// Decodes a sequence of codes.
    pub fn decode_seq(&self, codes: &[u8]) -> Result<Vec<u8>> {
        codes.iter().map(|&c| self.decode(c)).collect()
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (raw, code, class) in self.records() {
            writeln!(f, "{} {} {}", char::from(raw), code, class)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let dna = Alphabet::dna();
        let mut raw = *b"acgtnuUAr-";
        dna.normalize_seq(&mut raw);
        assert_eq!(&raw, b"ACGTNTTAR-");
        assert_eq!(dna.encode(dna.normalize(b'-')), Err(Error::UnknownSymbol(b'-')));

        let protein = Alphabet::protein();
        assert_eq!(protein.normalize(b'l'), b'L');
        assert_eq!(protein.normalize(b'u'), b'U');
        assert_eq!(protein.normalize(b'*'), b'*');
    }

    #[test]
    fn test_presets_are_bijections() {
        for alphabet in [Alphabet::dna(), Alphabet::protein()] {
            for code in 0..alphabet.size() as u8 {
                let raw = alphabet.decode(code).unwrap();
                assert_eq!(alphabet.encode(raw).unwrap(), code);
            }
        }
    }

    #[test]
    fn test_dna_widths() {
        let dna = Alphabet::dna();
        assert_eq!(dna.num_regular(), 4);
        assert_eq!(dna.num_special(), 11);
        assert_eq!(dna.regular_bit_width(), 2);
        assert_eq!(dna.bits_per_symbol(), 4);
    }
}
