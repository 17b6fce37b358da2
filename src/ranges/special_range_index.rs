/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

An index of runs of special symbols.

A [`SpecialRangeIndex`] stores a sequence of [`SpecialRange`]s, that is,
closed-open intervals of positions carrying the same (special) symbol.
Ranges are appended in increasing order of starting position, must be
nonempty and cannot overlap. Contiguous ranges with different symbols
are fine, and so are contiguous ranges with the same symbol if they are
appended separately.

An index goes through the states of a [`BuildState`]: it can be modified
only while it is [building](BuildState::Building), and it can be queried
only after it has been [sealed](SpecialRangeIndex::seal). An append that
violates the ordering constraints [poisons](BuildState::Poisoned) the
index, which must then be discarded.

Sealing computes the number of special positions before each range, so
that the number of special positions before any position can be computed
with a binary search. Optionally, [per-symbol partial
sums](SpecialRangeIndex::with_partial_symbol_sums) make region counts
logarithmic in the number of ranges instead of linear in the number of
ranges intersecting the region.

Lookups accept an optional [`SearchHint`], which remembers the last range
found: sequential lookups will then find their range in constant time. A
hint never changes the result of a query, only its cost.

```rust
use encseq::ranges::*;

let mut index = SpecialRangeIndex::new();
index.append(SpecialRange::new(4, 4, 0))?;
index.append(SpecialRange::new(10, 2, 1))?;
index.seal()?;

assert_eq!(index.find_first_intersecting(5, None)?, Some(0));
assert_eq!(index.find_first_intersecting(8, None)?, Some(1));
assert_eq!(index.find_first_intersecting(12, None)?, None);
assert_eq!(index.count_in_region(3, 10, None, None)?, 5);
assert_eq!(index.count_in_region(3, 10, Some(1), None)?, 1);
# Ok::<(), encseq::Error>(())
```

*/

use crate::error::{Error, Result};
use log::debug;
use mem_dbg::*;
use std::io::Write;

/// The lifecycle of a structure built by appending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, MemDbg, MemSize)]
pub enum BuildState {
    /// Appends are allowed, queries are not.
    Building,
    /// Queries are allowed, appends are not.
    Sealed,
    /// A construction error made the structure unusable.
    Poisoned,
}

impl BuildState {
    /// Returns an error unless the state is [`BuildState::Building`].
    pub(crate) fn ensure_building(self) -> Result<()> {
        match self {
            BuildState::Building => Ok(()),
            BuildState::Sealed => Err(Error::AlreadySealed),
            BuildState::Poisoned => Err(Error::Poisoned),
        }
    }

    /// Returns an error unless the state is [`BuildState::Sealed`].
    pub(crate) fn ensure_sealed(self) -> Result<()> {
        match self {
            BuildState::Sealed => Ok(()),
            BuildState::Building => Err(Error::NotSealed),
            BuildState::Poisoned => Err(Error::Poisoned),
        }
    }
}

/// A run of positions `[start..start + len)` carrying the same symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, MemDbg, MemSize)]
pub struct SpecialRange {
    pub start: usize,
    pub len: usize,
    pub symbol: u8,
}

impl SpecialRange {
    pub fn new(start: usize, len: usize, symbol: u8) -> Self {
        Self { start, len, symbol }
    }

    /// Returns the first position after the range.
    #[inline(always)]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Returns whether the range contains a position.
    #[inline(always)]
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end()
    }
}

/// A cursor remembering the index of the last range found by a lookup.
///
/// Any value is a valid hint: it is checked before use, so a stale hint,
/// or a hint coming from another index, just makes the lookup fall back
/// to binary search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, MemDbg, MemSize)]
pub struct SearchHint {
    index: usize,
}

impl SearchHint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a hint pointing at the given range index.
    pub fn at(index: usize) -> Self {
        Self { index }
    }

    /// Returns the range index the hint points at.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Where a position lies with respect to the special ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Located {
    /// The position belongs to the range of given index.
    Special { range: usize, symbol: u8 },
    /// The position is not special, and it is preceded by `pos - rank`
    /// special positions.
    Regular { rank: usize },
}

/// A sorted, append-only index of runs of special symbols.
#[derive(Debug, Clone, MemDbg, MemSize)]
pub struct SpecialRangeIndex {
    /// The ranges, sorted by starting position.
    ranges: Vec<SpecialRange>,
    state: BuildState,
    /// The number of special positions in the first `i` ranges, for `i`
    /// in `0..=ranges.len()`; filled at sealing time.
    special_before: Vec<usize>,
    /// The number of symbols for partial sums, if requested.
    num_symbols: Option<usize>,
    /// If `num_symbols` is `Some(k)`, `symbol_sums[i * k + s]` is the
    /// number of occurrences of symbol `s` in the first `i` ranges; filled
    /// at sealing time.
    symbol_sums: Vec<usize>,
}

impl Default for SpecialRangeIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecialRangeIndex {
    /// Creates a new empty index in the building state.
    pub fn new() -> Self {
        Self {
            ranges: vec![],
            state: BuildState::Building,
            special_before: vec![],
            num_symbols: None,
            symbol_sums: vec![],
        }
    }

    /// Creates a new empty index that at sealing time will compute partial
    /// sums for the symbols in `0..num_symbols`.
    ///
    /// Symbol-specific counts will then take time logarithmic in the
    /// number of ranges, at the cost of `num_symbols` words per range.
    /// Appending a range with a symbol larger than or equal to
    /// `num_symbols` will poison the index.
    pub fn with_partial_symbol_sums(num_symbols: usize) -> Self {
        Self {
            num_symbols: Some(num_symbols),
            ..Self::new()
        }
    }

    /// Returns the state of the index.
    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Returns whether the index has been sealed.
    pub fn is_sealed(&self) -> bool {
        self.state == BuildState::Sealed
    }

    /// Returns whether partial sums were requested at construction time.
    pub fn has_partial_symbol_sums(&self) -> bool {
        self.num_symbols.is_some()
    }

    /// Returns the number of ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns true if there are no ranges.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Returns the ranges, sorted by starting position.
    pub fn ranges(&self) -> &[SpecialRange] {
        &self.ranges
    }

    /// Returns the end of the last range, or zero.
    pub fn end(&self) -> usize {
        self.ranges.last().map_or(0, SpecialRange::end)
    }

    /// Appends a range.
    ///
    /// The range must be nonempty and must start at or after the end of
    /// the last range; otherwise, [`Error::MalformedRange`] is returned and
    /// the index is poisoned.
    pub fn append(&mut self, range: SpecialRange) -> Result<()> {
        self.state.ensure_building()?;
        let min_start = self.end();
        if range.len == 0 || range.start < min_start || range.start.checked_add(range.len).is_none()
        {
            self.state = BuildState::Poisoned;
            return Err(Error::MalformedRange {
                start: range.start,
                len: range.len,
                min_start,
            });
        }
        if let Some(num_symbols) = self.num_symbols {
            if range.symbol as usize >= num_symbols {
                self.state = BuildState::Poisoned;
                return Err(Error::UnknownCode {
                    code: range.symbol,
                    size: num_symbols,
                });
            }
        }
        self.ranges.push(range);
        Ok(())
    }

    /// Appends a single special position.
    ///
    /// If the position immediately follows the last range and has the
    /// same symbol, the last range is extended; otherwise, a new range of
    /// length one is appended, with the same constraints as
    /// [`append`](SpecialRangeIndex::append).
    pub fn push_position(&mut self, pos: usize, symbol: u8) -> Result<()> {
        self.state.ensure_building()?;
        match self.ranges.last_mut() {
            Some(last) if last.end() == pos && last.symbol == symbol => {
                last.len += 1;
                Ok(())
            }
            _ => self.append(SpecialRange::new(pos, 1, symbol)),
        }
    }

    /// Seals the index, making it queryable and immutable.
    ///
    /// Returns [`Error::AlreadySealed`] if the index has already been sealed.
    pub fn seal(&mut self) -> Result<()> {
        self.state.ensure_building()?;

        self.special_before = Vec::with_capacity(self.ranges.len() + 1);
        let mut total = 0;
        self.special_before.push(0);
        for range in &self.ranges {
            total += range.len;
            self.special_before.push(total);
        }

        if let Some(k) = self.num_symbols {
            self.symbol_sums = vec![0; (self.ranges.len() + 1) * k];
            for (i, range) in self.ranges.iter().enumerate() {
                let (prev, next) = self.symbol_sums.split_at_mut((i + 1) * k);
                next[..k].copy_from_slice(&prev[i * k..]);
                next[range.symbol as usize] += range.len;
            }
        }

        self.ranges.shrink_to_fit();
        self.state = BuildState::Sealed;
        debug!(
            "Sealed special range index: {} ranges, {} special positions{}",
            self.ranges.len(),
            total,
            match self.num_symbols {
                Some(k) => format!(", partial sums for {} symbols", k),
                None => String::new(),
            }
        );
        Ok(())
    }

    #[inline(always)]
    fn is_first_intersecting(&self, i: usize, pos: usize) -> bool {
        self.ranges[i].end() > pos && (i == 0 || self.ranges[i - 1].end() <= pos)
    }

    /// Lookup without state check: the ranges are sorted in every state.
    pub(crate) fn first_intersecting(
        &self,
        pos: usize,
        hint: Option<&mut SearchHint>,
    ) -> Option<usize> {
        let n = self.ranges.len();
        let found = hint
            .as_ref()
            .map(|h| h.index)
            .and_then(|c| {
                [c, c.wrapping_add(1), c.wrapping_sub(1)]
                    .into_iter()
                    .find(|&i| i < n && self.is_first_intersecting(i, pos))
            })
            .or_else(|| {
                let i = self.ranges.partition_point(|r| r.end() <= pos);
                (i < n).then_some(i)
            });
        if let (Some(hint), Some(i)) = (hint, found) {
            hint.index = i;
        }
        found
    }

    /// Returns the index of the first range that contains `pos` or lies
    /// after it, or `None` if all ranges end at or before `pos`.
    ///
    /// If a hint is provided, it is checked first, together with its
    /// neighbours, and then updated to the result.
    pub fn find_first_intersecting(
        &self,
        pos: usize,
        hint: Option<&mut SearchHint>,
    ) -> Result<Option<usize>> {
        self.state.ensure_sealed()?;
        Ok(self.first_intersecting(pos, hint))
    }

    /// Returns the index of the last range starting at or before `pos`, or
    /// `None` if all ranges start after `pos`.
    pub fn find_last_starting_at_or_before(
        &self,
        pos: usize,
        hint: Option<&mut SearchHint>,
    ) -> Result<Option<usize>> {
        self.state.ensure_sealed()?;
        Ok(self.last_starting_at_or_before(pos, hint))
    }

    fn last_starting_at_or_before(&self, pos: usize, hint: Option<&mut SearchHint>) -> Option<usize> {
        let n = self.ranges.len();
        let is_last = |i: usize| {
            self.ranges[i].start <= pos && (i + 1 == n || self.ranges[i + 1].start > pos)
        };
        let found = hint
            .as_ref()
            .map(|h| h.index)
            .and_then(|c| {
                [c, c.wrapping_add(1)]
                    .into_iter()
                    .find(|&i| i < n && is_last(i))
            })
            .or_else(|| self.ranges.partition_point(|r| r.start <= pos).checked_sub(1));
        if let (Some(hint), Some(i)) = (hint, found) {
            hint.index = i;
        }
        found
    }

    /// Returns where a position lies with respect to the ranges. Requires
    /// a sealed index.
    pub(crate) fn locate(&self, pos: usize, hint: Option<&mut SearchHint>) -> Located {
        match self.first_intersecting(pos, hint) {
            Some(i) if self.ranges[i].start <= pos => Located::Special {
                range: i,
                symbol: self.ranges[i].symbol,
            },
            Some(i) => Located::Regular {
                rank: pos - self.special_before[i],
            },
            None => Located::Regular {
                rank: pos - self.special_before[self.ranges.len()],
            },
        }
    }

    /// Returns the symbol of `pos` if it is special, or `None`.
    pub fn symbol_at(&self, pos: usize, hint: Option<&mut SearchHint>) -> Result<Option<u8>> {
        self.state.ensure_sealed()?;
        Ok(match self.locate(pos, hint) {
            Located::Special { symbol, .. } => Some(symbol),
            Located::Regular { .. } => None,
        })
    }

    /// Returns the number of special positions before `pos`.
    pub fn special_positions_before(&self, pos: usize) -> Result<usize> {
        self.state.ensure_sealed()?;
        Ok(self.specials_before(pos, None))
    }

    pub(crate) fn specials_before(&self, pos: usize, hint: Option<&mut SearchHint>) -> usize {
        match self.first_intersecting(pos, hint) {
            Some(i) if self.ranges[i].start < pos => {
                self.special_before[i] + (pos - self.ranges[i].start)
            }
            Some(i) => self.special_before[i],
            None => self.special_before[self.ranges.len()],
        }
    }

    /// Returns the total number of special positions.
    ///
    /// Before sealing, the total is computed by scanning the ranges.
    pub fn num_special_positions(&self) -> usize {
        match self.special_before.last() {
            Some(&total) => total,
            None => self.ranges.iter().map(|r| r.len).sum(),
        }
    }

    /// Returns an iterator over the ranges intersecting `[start..=end]`,
    /// clipped to the region. The iterator is empty if `start > end`.
    pub fn overlapping(
        &self,
        start: usize,
        end: usize,
        hint: Option<&mut SearchHint>,
    ) -> Result<Overlapping<'_>> {
        self.state.ensure_sealed()?;
        Ok(self.overlapping_unchecked(start, end, hint))
    }

    pub(crate) fn overlapping_unchecked(
        &self,
        start: usize,
        end: usize,
        hint: Option<&mut SearchHint>,
    ) -> Overlapping<'_> {
        let next = if start > end {
            self.ranges.len()
        } else {
            self.first_intersecting(start, hint)
                .unwrap_or(self.ranges.len())
        };
        Overlapping {
            ranges: &self.ranges,
            next,
            start,
            end,
        }
    }

    /// Returns the number of special positions in `[start..=end]`, or the
    /// number of positions with symbol `symbol` if provided. The count is
    /// zero if `start > end`.
    ///
    /// If partial sums are available, the cost is logarithmic in the
    /// number of ranges; otherwise, it is linear in the number of ranges
    /// intersecting the region.
    pub fn count_in_region(
        &self,
        start: usize,
        end: usize,
        symbol: Option<u8>,
        hint: Option<&mut SearchHint>,
    ) -> Result<usize> {
        self.state.ensure_sealed()?;
        Ok(self.count(start, end, symbol, hint))
    }

    pub(crate) fn count(
        &self,
        start: usize,
        end: usize,
        symbol: Option<u8>,
        hint: Option<&mut SearchHint>,
    ) -> usize {
        match (self.num_symbols, symbol) {
            (Some(k), Some(s)) if s as usize >= k => 0,
            (Some(_), _) => self.count_with_sums(start, end, symbol, hint),
            (None, _) => self
                .overlapping_unchecked(start, end, hint)
                .filter(|r| symbol.map_or(true, |s| r.symbol == s))
                .map(|r| r.len)
                .sum(),
        }
    }

    fn count_with_sums(
        &self,
        start: usize,
        end: usize,
        symbol: Option<u8>,
        hint: Option<&mut SearchHint>,
    ) -> usize {
        if start > end {
            return 0;
        }
        let Some(p) = self.first_intersecting(start, hint) else {
            return 0;
        };
        let Some(q) = self.last_starting_at_or_before(end, None) else {
            return 0;
        };
        if q < p {
            return 0;
        }

        let matches = |r: &SpecialRange| symbol.map_or(true, |s| r.symbol == s);
        let mut total = match symbol {
            Some(s) => {
                let k = self.num_symbols.unwrap_or(0);
                self.symbol_sums[(q + 1) * k + s as usize] - self.symbol_sums[p * k + s as usize]
            }
            None => self.special_before[q + 1] - self.special_before[p],
        };

        let first = &self.ranges[p];
        if matches(first) && start > first.start {
            total -= start - first.start;
        }
        let last = &self.ranges[q];
        if matches(last) && last.end() - 1 > end {
            total -= last.end() - 1 - end;
        }
        total
    }

    /// Adds to `occ[s]` the number of positions with symbol `s` in
    /// `[start..=end]`, for each special symbol `s`.
    ///
    /// Returns [`Error::UnknownCode`] without modifying `occ` if a range
    /// in the region has a symbol that is not a valid index of `occ`.
    pub fn symbol_counts_in_region(
        &self,
        start: usize,
        end: usize,
        occ: &mut [usize],
        hint: Option<&mut SearchHint>,
    ) -> Result<()> {
        self.state.ensure_sealed()?;
        let overlapping = self.overlapping_unchecked(start, end, hint);
        if let Some(r) = overlapping
            .clone()
            .find(|r| r.symbol as usize >= occ.len())
        {
            return Err(Error::UnknownCode {
                code: r.symbol,
                size: occ.len(),
            });
        }
        for r in overlapping {
            occ[r.symbol as usize] += r.len;
        }
        Ok(())
    }

    /// Returns the position of the occurrence of rank `rank` (starting from
    /// zero) of the special symbol `symbol`, or `None` if there are at most
    /// `rank` occurrences.
    ///
    /// If partial sums are available, the cost is logarithmic in the
    /// number of ranges; otherwise, it is linear.
    pub fn select_symbol(&self, symbol: u8, rank: usize) -> Result<Option<usize>> {
        self.state.ensure_sealed()?;
        Ok(self.select(symbol, rank))
    }

    pub(crate) fn select(&self, symbol: u8, rank: usize) -> Option<usize> {
        let s = symbol as usize;
        match self.num_symbols {
            Some(k) if s < k => {
                let n = self.ranges.len();
                if rank >= self.symbol_sums[n * k + s] {
                    return None;
                }
                // sums[lo] <= rank < sums[hi]
                let (mut lo, mut hi) = (0, n);
                while hi - lo > 1 {
                    let mid = lo + (hi - lo) / 2;
                    if self.symbol_sums[mid * k + s] <= rank {
                        lo = mid;
                    } else {
                        hi = mid;
                    }
                }
                Some(self.ranges[lo].start + rank - self.symbol_sums[lo * k + s])
            }
            Some(_) => None,
            None => {
                let mut rank = rank;
                for r in self.ranges.iter().filter(|r| r.symbol == symbol) {
                    if rank < r.len {
                        return Some(r.start + rank);
                    }
                    rank -= r.len;
                }
                None
            }
        }
    }

    /// Writes a human-readable description of the ranges intersecting
    /// `[start..start + len)`, one per line, including the partial sums of
    /// the range symbol when available.
    ///
    /// The index need not be sealed.
    pub fn write_ranges_info(
        &self,
        mut out: impl Write,
        start: usize,
        len: usize,
        hint: Option<&mut SearchHint>,
    ) -> std::io::Result<()> {
        let end = start.saturating_add(len);
        let first = self.first_intersecting(start, hint).unwrap_or(self.ranges.len());
        for (i, range) in self.ranges[first..]
            .iter()
            .enumerate()
            .map(|(d, r)| (first + d, r))
            .take_while(|(_, r)| r.start < end)
        {
            write!(
                out,
                "range {}: [{}..{}) length {} symbol {}",
                i,
                range.start,
                range.end(),
                range.len,
                range.symbol
            )?;
            if self.is_sealed() {
                write!(out, " specials before {}", self.special_before[i])?;
                if let Some(k) = self.num_symbols {
                    write!(
                        out,
                        " symbol occurrences before {}",
                        self.symbol_sums[i * k + range.symbol as usize]
                    )?;
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

/// An iterator over the ranges intersecting a region, clipped to the
/// region.
///
/// Returned by [`SpecialRangeIndex::overlapping`].
#[derive(Debug, Clone)]
pub struct Overlapping<'a> {
    ranges: &'a [SpecialRange],
    next: usize,
    start: usize,
    end: usize,
}

impl Iterator for Overlapping<'_> {
    type Item = SpecialRange;

    fn next(&mut self) -> Option<SpecialRange> {
        // Termination is checked before reading the range
        if self.next >= self.ranges.len() || self.ranges[self.next].start > self.end {
            return None;
        }
        let range = &self.ranges[self.next];
        self.next += 1;
        let start = range.start.max(self.start);
        let last = (range.end() - 1).min(self.end);
        Some(SpecialRange::new(start, last - start + 1, range.symbol))
    }
}

impl core::iter::FusedIterator for Overlapping<'_> {}
