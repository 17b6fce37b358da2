/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Random-access sequences over small alphabets.

An [`EncodedSeq`] stores a sequence of raw symbols of an [`Alphabet`].
The codes of regular symbols are stored, in position order, in a
[`BitPackedArray`] of [minimal width](Alphabet::regular_bit_width);
runs of special symbols are stored in a [`SpecialRangeIndex`] and take
no space in the packed array. The packed array is thus *compacted*: the
code of a regular position `pos` is found at index `pos - s`, where `s`
is the number of special positions before `pos`.

Sequences are built by appending symbols in position order, and must be
[sealed](EncodedSeq::seal) before being queried. Once sealed, a sequence
is immutable, and it can be queried concurrently without synchronization.

```rust
use encseq::prelude::*;

let mut seq = EncodedSeq::new(Alphabet::new(b"ACGT", b"N")?)?;
for &c in b"ACGT" {
    seq.append_regular(c)?;
}
seq.append_special_run(b'N', 4)?;
seq.extend_from_slice(b"ACGT")?;
seq.seal()?;

assert_eq!(seq.len()?, 12);
assert_eq!(seq.get(5)?, b'N');
assert_eq!(seq.get(9)?, b'C');
assert_eq!(seq.symbol_count_in_seq_region(0, 11, b'N')?, 4);
assert_eq!(seq.all_special_symbols_count_in_seq_region(3, 8)?, 4);
# Ok::<(), encseq::Error>(())
```

*/

use crate::alphabet::{Alphabet, SymbolClass};
use crate::bits::BitPackedArray;
use crate::error::{Error, Result};
use crate::ranges::{BuildState, Located, SearchHint, SpecialRange, SpecialRangeIndex};
use crate::traits::bit_field_slice::*;
use derivative::Derivative;
use derive_setters::*;
use log::info;
use mem_dbg::*;

/// Options for building an [`EncodedSeq`].
///
/// ```rust
/// use encseq::prelude::*;
///
/// let seq = EncodedSeqConfig::default()
///     .expected_len(1 << 20)
///     .partial_symbol_sums(true)
///     .build(Alphabet::dna())?;
/// # Ok::<(), encseq::Error>(())
/// ```
#[derive(Setters, Debug, Clone, Derivative)]
#[derivative(Default)]
#[setters(generate = false)]
pub struct EncodedSeqConfig {
    /// The expected number of regular positions, used to preallocate the
    /// packed array.
    #[setters(generate = true, strip_option)]
    #[derivative(Default(value = "None"))]
    expected_len: Option<usize>,

    /// Compute per-symbol partial sums over the special ranges at sealing
    /// time, making symbol-specific special counts logarithmic in the
    /// number of ranges.
    #[setters(generate = true)]
    #[derivative(Default(value = "false"))]
    partial_symbol_sums: bool,

    /// A special raw symbol separating the records of a multi-record
    /// sequence, enabling [`seq_num_of`](EncodedSeq::seq_num_of) and
    /// [`seq_start`](EncodedSeq::seq_start).
    #[setters(generate = true, strip_option)]
    #[derivative(Default(value = "None"))]
    separator: Option<u8>,
}

impl EncodedSeqConfig {
    /// Creates an empty sequence in the building state.
    ///
    /// Returns an error if the separator is not a special symbol of the
    /// alphabet.
    pub fn build(self, alphabet: Alphabet) -> Result<EncodedSeq> {
        let separator = self
            .separator
            .map(|raw| alphabet.encode_as(raw, SymbolClass::Special))
            .transpose()?;
        let packed =
            BitPackedArray::with_capacity(alphabet.regular_bit_width(), self.expected_len.unwrap_or(0))?;
        let specials = if self.partial_symbol_sums {
            SpecialRangeIndex::with_partial_symbol_sums(alphabet.size())
        } else {
            SpecialRangeIndex::new()
        };
        Ok(EncodedSeq {
            alphabet,
            packed,
            specials,
            len: 0,
            separator,
            state: BuildState::Building,
        })
    }
}

/// A sequence of symbols with bit-packed regular symbols and run-indexed
/// special symbols.
#[derive(Debug, Clone, MemDbg, MemSize)]
pub struct EncodedSeq {
    alphabet: Alphabet,
    /// The codes of the regular positions, compacted.
    packed: BitPackedArray,
    /// The runs of special positions.
    specials: SpecialRangeIndex,
    /// The number of positions appended so far.
    len: usize,
    /// The code of the record separator.
    separator: Option<u8>,
    state: BuildState,
}

impl EncodedSeq {
    /// Creates an empty sequence with default options.
    pub fn new(alphabet: Alphabet) -> Result<Self> {
        EncodedSeqConfig::default().build(alphabet)
    }

    /// Creates a sealed sequence from its parts, without further checks.
    pub(crate) fn from_sealed_parts(
        alphabet: Alphabet,
        packed: BitPackedArray,
        specials: SpecialRangeIndex,
        len: usize,
        separator: Option<u8>,
    ) -> Self {
        debug_assert!(specials.is_sealed());
        Self {
            alphabet,
            packed,
            specials,
            len,
            separator,
            state: BuildState::Sealed,
        }
    }

    /// Returns the state of the sequence.
    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Returns whether the sequence has been sealed.
    pub fn is_sealed(&self) -> bool {
        self.state == BuildState::Sealed
    }

    /// Appends a regular symbol.
    ///
    /// Returns [`Error::UnknownSymbol`] if the symbol is not in the
    /// alphabet, and [`Error::WrongSymbolClass`] if it is special; in both
    /// cases the sequence is unchanged.
    pub fn append_regular(&mut self, raw: u8) -> Result<()> {
        self.state.ensure_building()?;
        let code = self.alphabet.encode_as(raw, SymbolClass::Regular)?;
        self.push_code(code)
    }

    fn push_code(&mut self, code: u8) -> Result<()> {
        self.packed.push(code as u64)?;
        self.len += 1;
        Ok(())
    }

    /// Appends a run of `run_len` copies of a special symbol.
    ///
    /// Returns [`Error::UnknownSymbol`] if the symbol is not in the
    /// alphabet, and [`Error::WrongSymbolClass`] if it is regular. A run of
    /// length zero is a [malformed range](Error::MalformedRange), and
    /// poisons the sequence.
    pub fn append_special_run(&mut self, raw: u8, run_len: usize) -> Result<()> {
        self.state.ensure_building()?;
        let code = self.alphabet.encode_as(raw, SymbolClass::Special)?;
        let result = self.specials.append(SpecialRange::new(self.len, run_len, code));
        self.advance(result, run_len)
    }

    /// Appends a single special symbol, extending the last run if it ends
    /// at the current position and has the same symbol.
    pub fn append_special(&mut self, raw: u8) -> Result<()> {
        self.state.ensure_building()?;
        let code = self.alphabet.encode_as(raw, SymbolClass::Special)?;
        let result = self.specials.push_position(self.len, code);
        self.advance(result, 1)
    }

    fn advance(&mut self, result: Result<()>, len: usize) -> Result<()> {
        match result {
            Ok(()) => {
                self.len += len;
                Ok(())
            }
            Err(e) => {
                self.state = BuildState::Poisoned;
                Err(e)
            }
        }
    }

    /// Appends a symbol of any class.
    ///
    /// Special symbols are merged into the last run when possible, as in
    /// [`append_special`](EncodedSeq::append_special).
    pub fn push(&mut self, raw: u8) -> Result<()> {
        self.state.ensure_building()?;
        let code = self.alphabet.encode(raw)?;
        if self.alphabet.is_special(code) {
            self.append_special(raw)
        } else {
            self.push_code(code)
        }
    }

    /// Appends all symbols of a slice with [`push`](EncodedSeq::push).
    ///
    /// On error, the symbols preceding the offending one have been
    /// appended.
    pub fn extend_from_slice(&mut self, raw: &[u8]) -> Result<()> {
        raw.iter().try_for_each(|&c| self.push(c))
    }

    /// Seals the sequence, making it queryable and immutable.
    pub fn seal(&mut self) -> Result<()> {
        self.state.ensure_building()?;
        self.specials.seal()?;
        self.state = BuildState::Sealed;
        info!(
            "Sealed sequence of length {}: {} regular positions in {} words of {} bits, {} special positions in {} ranges",
            self.len,
            self.packed.len(),
            self.packed.as_words().len(),
            self.packed.bit_width(),
            self.specials.num_special_positions(),
            self.specials.len()
        );
        Ok(())
    }

    /// Returns the length of the sequence.
    pub fn len(&self) -> Result<usize> {
        self.state.ensure_sealed()?;
        Ok(self.len)
    }

    /// Returns true if the sequence is empty.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Returns the number of positions appended so far, in any state.
    pub fn num_appended(&self) -> usize {
        self.len
    }

    /// Returns the raw symbol at position `pos`.
    pub fn get(&self, pos: usize) -> Result<u8> {
        self.get_inner(pos, None)
    }

    /// Returns the raw symbol at position `pos`, using and updating a
    /// search hint.
    ///
    /// Sequential accesses with the same hint find the containing run in
    /// constant time.
    pub fn get_with_hint(&self, pos: usize, hint: &mut SearchHint) -> Result<u8> {
        self.get_inner(pos, Some(hint))
    }

    fn get_inner(&self, pos: usize, hint: Option<&mut SearchHint>) -> Result<u8> {
        self.state.ensure_sealed()?;
        ensure_in_bounds!(pos, self.len);
        let code = match self.specials.locate(pos, hint) {
            Located::Special { symbol, .. } => symbol,
            // SAFETY: rank < number of regular positions, as pos < len.
            Located::Regular { rank } => unsafe { self.packed.get_unchecked(rank) as u8 },
        };
        self.alphabet.decode(code)
    }

    fn ensure_region(&self, start: usize, end: usize) -> Result<()> {
        self.state.ensure_sealed()?;
        if start > end || end >= self.len {
            return Err(Error::InvalidRegion {
                start,
                end,
                len: self.len,
            });
        }
        Ok(())
    }

    /// Returns the indices in the packed array of the regular positions in
    /// `[start..=end]`.
    fn compacted_region(&self, start: usize, end: usize) -> core::ops::Range<usize> {
        let mut hint = SearchHint::new();
        let from = start - self.specials.specials_before(start, Some(&mut hint));
        let to = end + 1 - self.specials.specials_before(end + 1, Some(&mut hint));
        from..to
    }

    fn count_regular(&self, start: usize, end: usize, code: u8) -> Result<usize> {
        let region = self.compacted_region(start, end);
        Ok(self
            .packed
            .iter_from(region.start)?
            .take(region.len())
            .filter(|&c| c == code as u64)
            .count())
    }

    /// Returns the number of occurrences of a raw symbol in the region
    /// `[start..=end]`.
    ///
    /// Returns [`Error::InvalidRegion`] if the region is empty or not
    /// contained in the sequence.
    pub fn symbol_count_in_seq_region(&self, start: usize, end: usize, raw: u8) -> Result<usize> {
        self.ensure_region(start, end)?;
        let code = self.alphabet.encode(raw)?;
        if self.alphabet.is_special(code) {
            Ok(self.specials.count(start, end, Some(code), None))
        } else {
            self.count_regular(start, end, code)
        }
    }

    /// Returns the number of special positions in the region
    /// `[start..=end]`.
    pub fn all_special_symbols_count_in_seq_region(&self, start: usize, end: usize) -> Result<usize> {
        self.ensure_region(start, end)?;
        Ok(self.specials.count(start, end, None, None))
    }

    /// Returns the number of occurrences of each code in the region
    /// `[start..=end]`, indexed by code.
    pub fn symbol_counts_in_seq_region(&self, start: usize, end: usize) -> Result<Vec<usize>> {
        self.ensure_region(start, end)?;
        let mut occ = vec![0; self.alphabet.size()];
        let region = self.compacted_region(start, end);
        for code in self.packed.iter_from(region.start)?.take(region.len()) {
            occ[code as usize] += 1;
        }
        self.specials.symbol_counts_in_region(start, end, &mut occ, None)?;
        Ok(occ)
    }

    /// Appends to `out` the raw symbols of the region `[start..=end]`.
    ///
    /// On error, `out` is left unchanged.
    pub fn extract(&self, start: usize, end: usize, out: &mut Vec<u8>) -> Result<()> {
        self.ensure_region(start, end)?;
        let mut buf = Vec::with_capacity(end - start + 1);
        let region = self.compacted_region(start, end);
        let mut regular = self.packed.iter_from(region.start)?;
        let mut pos = start;
        for run in self.specials.overlapping_unchecked(start, end, None) {
            for code in regular.by_ref().take(run.start - pos) {
                buf.push(self.alphabet.decode(code as u8)?);
            }
            let symbol = self.alphabet.decode(run.symbol)?;
            buf.extend(core::iter::repeat(symbol).take(run.len));
            pos = run.end();
        }
        for code in regular.take(end + 1 - pos) {
            buf.push(self.alphabet.decode(code as u8)?);
        }
        out.extend_from_slice(&buf);
        Ok(())
    }

    fn ensure_separator(&self) -> Result<u8> {
        self.state.ensure_sealed()?;
        self.separator.ok_or(Error::NoSeparator)
    }

    /// Returns the number of records, that is, the number of separators
    /// plus one.
    ///
    /// Returns [`Error::NoSeparator`] if the sequence was built without a
    /// [separator](EncodedSeqConfig::separator).
    pub fn num_records(&self) -> Result<usize> {
        let separator = self.ensure_separator()?;
        Ok(self.specials.count(0, usize::MAX, Some(separator), None) + 1)
    }

    /// Returns the number of the record containing position `pos`, that
    /// is, the number of separators before `pos`.
    ///
    /// A separator belongs to the record it terminates.
    pub fn seq_num_of(&self, pos: usize) -> Result<usize> {
        let separator = self.ensure_separator()?;
        ensure_in_bounds!(pos, self.len);
        if pos == 0 {
            return Ok(0);
        }
        Ok(self.specials.count(0, pos - 1, Some(separator), None))
    }

    /// Returns the starting position of record `num`.
    ///
    /// The start of a record following a separator at the end of the
    /// sequence is the length of the sequence.
    pub fn seq_start(&self, num: usize) -> Result<usize> {
        let separator = self.ensure_separator()?;
        let num_records = self.num_records()?;
        ensure_in_bounds!(num, num_records);
        if num == 0 {
            return Ok(0);
        }
        self.specials
            .select(separator, num - 1)
            .map(|pos| pos + 1)
            .ok_or(Error::OutOfBounds {
                index: num,
                len: num_records,
            })
    }

    /// Returns the length of record `num`, separator excluded.
    pub fn seq_len(&self, num: usize) -> Result<usize> {
        let start = self.seq_start(num)?;
        let end = if num + 1 < self.num_records()? {
            self.seq_start(num + 1)? - 1
        } else {
            self.len
        };
        Ok(end - start)
    }

    /// Returns the number of special positions at the start of the
    /// sequence, before the first regular one.
    pub fn special_prefix_len(&self) -> Result<usize> {
        self.state.ensure_sealed()?;
        let mut end = 0;
        for r in self.specials.ranges() {
            if r.start != end {
                break;
            }
            end = r.end();
        }
        Ok(end)
    }

    /// Returns the number of special positions at the end of the
    /// sequence, after the last regular one.
    pub fn special_suffix_len(&self) -> Result<usize> {
        self.state.ensure_sealed()?;
        let mut start = self.len;
        for r in self.specials.ranges().iter().rev() {
            if r.end() != start {
                break;
            }
            start = r.start;
        }
        Ok(self.len - start)
    }

    /// Returns, for each region `[start..=end]`, the number of occurrences
    /// of a raw symbol, computing counts in parallel.
    #[cfg(feature = "rayon")]
    pub fn par_symbol_count_in_seq_regions(
        &self,
        regions: &[(usize, usize)],
        raw: u8,
    ) -> Result<Vec<usize>> {
        use rayon::prelude::*;
        regions
            .par_iter()
            .map(|&(start, end)| self.symbol_count_in_seq_region(start, end, raw))
            .collect()
    }

    /// Returns the code of the record separator, if any.
    pub fn separator_code(&self) -> Option<u8> {
        self.separator
    }

    /// Returns the alphabet.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Returns the number of regular positions.
    pub fn num_regular(&self) -> usize {
        self.packed.len()
    }

    /// Returns the number of special positions.
    pub fn num_special_positions(&self) -> usize {
        self.specials.num_special_positions()
    }

    /// Returns the number of runs of special symbols.
    pub fn num_ranges(&self) -> usize {
        self.specials.len()
    }

    /// Returns the runs of special symbols.
    pub fn special_ranges(&self) -> &[SpecialRange] {
        self.specials.ranges()
    }

    /// Returns the range index.
    pub fn special_range_index(&self) -> &SpecialRangeIndex {
        &self.specials
    }

    /// Returns the packed array of regular codes.
    pub fn packed(&self) -> &BitPackedArray {
        &self.packed
    }
}
