/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use encseq::prelude::*;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

const NUM_SYMBOLS: u8 = 3;

/// Random ranges, and the symbol of each position (None if not special).
fn random_ranges(rng: &mut SmallRng, n: usize) -> (Vec<SpecialRange>, Vec<Option<u8>>) {
    let mut ranges = vec![];
    let mut symbols = vec![];
    let mut pos = 0;
    for _ in 0..n {
        // Gaps may be empty, so that ranges may be contiguous
        let gap = rng.random_range(0..5);
        symbols.extend(std::iter::repeat(None).take(gap));
        pos += gap;
        let len = rng.random_range(1..10);
        let symbol = rng.random_range(0..NUM_SYMBOLS);
        symbols.extend(std::iter::repeat(Some(symbol)).take(len));
        ranges.push(SpecialRange::new(pos, len, symbol));
        pos += len;
    }
    symbols.extend(std::iter::repeat(None).take(rng.random_range(0..5)));
    (ranges, symbols)
}

fn build(ranges: &[SpecialRange], partial_symbol_sums: bool) -> Result<SpecialRangeIndex> {
    let mut index = if partial_symbol_sums {
        SpecialRangeIndex::with_partial_symbol_sums(NUM_SYMBOLS as usize)
    } else {
        SpecialRangeIndex::new()
    };
    for &range in ranges {
        index.append(range)?;
    }
    index.seal()?;
    Ok(index)
}

fn brute_force_first_intersecting(ranges: &[SpecialRange], pos: usize) -> Option<usize> {
    ranges.iter().position(|r| r.end() > pos)
}

#[test]
fn test_count_equivalence() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(0);
    for n in [0, 1, 2, 10, 100] {
        let (ranges, symbols) = random_ranges(&mut rng, n);
        for partial_symbol_sums in [false, true] {
            let index = build(&ranges, partial_symbol_sums)?;
            assert_eq!(index.len(), n);
            assert_eq!(
                index.num_special_positions(),
                symbols.iter().filter(|s| s.is_some()).count()
            );
            for _ in 0..1000 {
                let start = rng.random_range(0..symbols.len() + 3);
                let end = rng.random_range(start..symbols.len() + 5);
                let window = &symbols[start.min(symbols.len())..(end + 1).min(symbols.len())];

                assert_eq!(
                    index.count_in_region(start, end, None, None)?,
                    window.iter().filter(|s| s.is_some()).count(),
                    "[{}..={}]",
                    start,
                    end
                );
                let mut occ = vec![0; NUM_SYMBOLS as usize];
                index.symbol_counts_in_region(start, end, &mut occ, None)?;
                for symbol in 0..NUM_SYMBOLS {
                    let expected = window.iter().filter(|&&s| s == Some(symbol)).count();
                    assert_eq!(
                        index.count_in_region(start, end, Some(symbol), None)?,
                        expected,
                        "[{}..={}] symbol {}",
                        start,
                        end,
                        symbol
                    );
                    assert_eq!(occ[symbol as usize], expected);
                }
                // Unknown symbols have no occurrences
                assert_eq!(index.count_in_region(start, end, Some(NUM_SYMBOLS), None)?, 0);
            }
        }
    }
    Ok(())
}

#[test]
fn test_lookups() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(1);
    let (ranges, symbols) = random_ranges(&mut rng, 50);
    let index = build(&ranges, false)?;
    for pos in 0..symbols.len() + 3 {
        assert_eq!(
            index.find_first_intersecting(pos, None)?,
            brute_force_first_intersecting(&ranges, pos)
        );
        assert_eq!(
            index.find_last_starting_at_or_before(pos, None)?,
            ranges.iter().rposition(|r| r.start <= pos)
        );
        assert_eq!(
            index.symbol_at(pos, None)?,
            symbols.get(pos).copied().flatten()
        );
        assert_eq!(
            index.special_positions_before(pos)?,
            symbols[..pos.min(symbols.len())]
                .iter()
                .filter(|s| s.is_some())
                .count()
        );
    }
    Ok(())
}

#[test]
fn test_hint_irrelevance() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(2);
    let (ranges, symbols) = random_ranges(&mut rng, 200);
    let index = build(&ranges, false)?;

    // Sequential scan with one hint
    let mut hint = SearchHint::new();
    for pos in 0..symbols.len() + 3 {
        let expected = brute_force_first_intersecting(&ranges, pos);
        assert_eq!(index.find_first_intersecting(pos, Some(&mut hint))?, expected);
        if let Some(i) = expected {
            assert_eq!(hint.index(), i);
        }
    }

    // Backward scan
    for pos in (0..symbols.len()).rev() {
        assert_eq!(
            index.find_first_intersecting(pos, Some(&mut hint))?,
            brute_force_first_intersecting(&ranges, pos)
        );
    }

    // Arbitrary and stale hints
    for _ in 0..10_000 {
        let pos = rng.random_range(0..symbols.len() + 3);
        let mut hint = SearchHint::at(rng.random_range(0..usize::MAX));
        assert_eq!(
            index.find_first_intersecting(pos, Some(&mut hint))?,
            brute_force_first_intersecting(&ranges, pos)
        );
        let mut hint = SearchHint::at(rng.random_range(0..ranges.len() + 2));
        assert_eq!(
            index.find_last_starting_at_or_before(pos, Some(&mut hint))?,
            ranges.iter().rposition(|r| r.start <= pos)
        );
        let mut hint = SearchHint::at(rng.random_range(0..ranges.len() + 2));
        let end = pos + rng.random_range(0..50);
        assert_eq!(
            index.count_in_region(pos, end, None, Some(&mut hint))?,
            index.count_in_region(pos, end, None, None)?
        );
    }
    Ok(())
}

#[test]
fn test_overlapping() -> Result<()> {
    let index = build(
        &[
            SpecialRange::new(2, 3, 0),
            SpecialRange::new(5, 2, 1),
            SpecialRange::new(10, 4, 2),
        ],
        false,
    )?;
    assert_eq!(
        index.overlapping(3, 11, None)?.collect::<Vec<_>>(),
        vec![
            SpecialRange::new(3, 2, 0),
            SpecialRange::new(5, 2, 1),
            SpecialRange::new(10, 2, 2)
        ]
    );
    assert_eq!(index.overlapping(7, 9, None)?.count(), 0);
    assert_eq!(index.overlapping(14, usize::MAX, None)?.count(), 0);
    assert_eq!(index.overlapping(4, 3, None)?.count(), 0);
    assert_eq!(index.count_in_region(4, 3, None, None)?, 0);
    Ok(())
}

#[test]
fn test_exact_range_region() -> Result<()> {
    for partial_symbol_sums in [false, true] {
        let index = build(
            &[SpecialRange::new(4, 4, 1), SpecialRange::new(8, 5, 2)],
            partial_symbol_sums,
        )?;
        assert_eq!(index.count_in_region(4, 7, None, None)?, 4);
        assert_eq!(index.count_in_region(4, 7, Some(1), None)?, 4);
        assert_eq!(index.count_in_region(8, 12, Some(2), None)?, 5);
        assert_eq!(index.count_in_region(5, 11, Some(2), None)?, 4);
    }
    Ok(())
}

#[test]
fn test_lifecycle() -> Result<()> {
    let mut index = SpecialRangeIndex::new();
    index.append(SpecialRange::new(3, 2, 0))?;
    assert_eq!(index.state(), BuildState::Building);
    assert_eq!(index.find_first_intersecting(0, None), Err(Error::NotSealed));
    assert_eq!(index.count_in_region(0, 10, None, None), Err(Error::NotSealed));
    index.seal()?;
    assert_eq!(index.seal(), Err(Error::AlreadySealed));
    assert_eq!(
        index.append(SpecialRange::new(10, 1, 0)),
        Err(Error::AlreadySealed)
    );
    // Repeated queries are deterministic
    for _ in 0..3 {
        assert_eq!(index.count_in_region(0, 10, None, None)?, 2);
    }
    Ok(())
}

#[test]
fn test_malformed_ranges_poison() -> Result<()> {
    for bad in [
        SpecialRange::new(4, 1, 0),
        SpecialRange::new(10, 0, 0),
        SpecialRange::new(1, 10, 0),
    ] {
        let mut index = SpecialRangeIndex::new();
        index.append(SpecialRange::new(3, 2, 0))?;
        assert!(matches!(
            index.append(bad),
            Err(Error::MalformedRange { min_start: 5, .. })
        ));
        assert_eq!(index.state(), BuildState::Poisoned);
        assert_eq!(index.append(SpecialRange::new(20, 1, 0)), Err(Error::Poisoned));
        assert_eq!(index.seal(), Err(Error::Poisoned));
        assert_eq!(index.symbol_at(3, None), Err(Error::Poisoned));
    }

    let mut index = SpecialRangeIndex::with_partial_symbol_sums(2);
    assert_eq!(
        index.append(SpecialRange::new(0, 1, 2)),
        Err(Error::UnknownCode { code: 2, size: 2 })
    );
    assert_eq!(index.state(), BuildState::Poisoned);
    Ok(())
}

#[test]
fn test_write_ranges_info() -> Result<()> {
    let index = build(
        &[SpecialRange::new(2, 3, 0), SpecialRange::new(10, 4, 2)],
        true,
    )?;
    let mut out = vec![];
    index.write_ranges_info(&mut out, 0, 11, None)?;
    let out = String::from_utf8(out)?;
    assert_eq!(out.lines().count(), 2);
    assert!(out.starts_with("range 0: [2..5) length 3 symbol 0"));
    let mut out = vec![];
    index.write_ranges_info(&mut out, 5, 5, None)?;
    assert!(out.is_empty());
    Ok(())
}
