/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */
use crate::prelude::*;
use arbitrary::Arbitrary;

const REGULAR: &[u8] = b"ACGT";
const SPECIAL: &[u8] = b"NX";

#[derive(Arbitrary, Debug)]
pub struct Data {
    /// (symbol index, run length): special symbols are appended as runs
    runs: Vec<(u8, u8)>,
    /// query regions, reduced modulo the length
    queries: Vec<(usize, usize)>,
    /// whether to build partial symbol sums
    partial_symbol_sums: bool,
}

/// build a sequence from random runs and check every query against a plain
/// scan of the raw symbols
pub fn harness(data: Data) {
    let alphabet = Alphabet::new(REGULAR, SPECIAL).unwrap();
    let mut seq = EncodedSeqConfig::default()
        .partial_symbol_sums(data.partial_symbol_sums)
        .build(alphabet)
        .unwrap();
    let mut raw = vec![];

    for &(symbol, run) in data.runs.iter().take(1 << 12) {
        let symbol = symbol as usize % (REGULAR.len() + SPECIAL.len());
        if symbol < REGULAR.len() {
            seq.append_regular(REGULAR[symbol]).unwrap();
            raw.push(REGULAR[symbol]);
        } else {
            let c = SPECIAL[symbol - REGULAR.len()];
            let run = run as usize + 1;
            seq.append_special_run(c, run).unwrap();
            raw.extend(std::iter::repeat(c).take(run));
        }
    }
    seq.seal().unwrap();

    assert_eq!(seq.len().unwrap(), raw.len());
    if raw.is_empty() {
        assert!(seq.get(0).is_err());
        return;
    }
    let mut hint = SearchHint::new();
    for (pos, &c) in raw.iter().enumerate() {
        assert_eq!(seq.get_with_hint(pos, &mut hint).unwrap(), c, "get({})", pos);
    }

    for &(a, b) in data.queries.iter().take(256) {
        let (a, b) = (a % raw.len(), b % raw.len());
        let (start, end) = (a.min(b), a.max(b));
        let region = &raw[start..=end];
        for &c in REGULAR.iter().chain(SPECIAL) {
            assert_eq!(
                seq.symbol_count_in_seq_region(start, end, c).unwrap(),
                region.iter().filter(|&&x| x == c).count(),
                "count of {} in [{}..={}]",
                c as char,
                start,
                end
            );
        }
        assert_eq!(
            seq.all_special_symbols_count_in_seq_region(start, end)
                .unwrap(),
            region.iter().filter(|x| SPECIAL.contains(x)).count()
        );
        let mut out = vec![];
        seq.extract(start, end, &mut out).unwrap();
        assert_eq!(out, region);
    }
}
