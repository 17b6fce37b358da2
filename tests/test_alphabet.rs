/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use encseq::prelude::*;

#[test]
fn test_custom_alphabet() -> Result<()> {
    let alphabet = Alphabet::new(b"ACGT", b"N$")?;
    assert_eq!(alphabet.size(), 6);
    assert_eq!(alphabet.num_regular(), 4);
    assert_eq!(alphabet.num_special(), 2);
    for (code, &raw) in b"ACGTN$".iter().enumerate() {
        assert_eq!(alphabet.encode(raw)?, code as u8);
        assert_eq!(alphabet.decode(code as u8)?, raw);
        assert_eq!(alphabet.is_special(code as u8), code >= 4);
    }
    assert_eq!(alphabet.class(0)?, SymbolClass::Regular);
    assert_eq!(alphabet.class(5)?, SymbolClass::Special);
    assert_eq!(alphabet.regular_bit_width(), 2);
    assert_eq!(alphabet.bits_per_symbol(), 3);
    Ok(())
}

#[test]
fn test_errors() -> Result<()> {
    let alphabet = Alphabet::new(b"ACGT", b"N")?;
    assert_eq!(alphabet.encode(b'x'), Err(Error::UnknownSymbol(b'x')));
    assert!(!alphabet.is_valid(b'x'));
    assert_eq!(alphabet.decode(5), Err(Error::UnknownCode { code: 5, size: 5 }));
    assert!(alphabet.class(5).is_err());
    assert!(!alphabet.is_special(200));
    assert_eq!(
        alphabet.encode_as(b'N', SymbolClass::Regular),
        Err(Error::WrongSymbolClass {
            symbol: b'N',
            actual: SymbolClass::Special,
            expected: SymbolClass::Regular
        })
    );
    assert_eq!(alphabet.encode_as(b'N', SymbolClass::Special)?, 4);

    assert!(matches!(
        Alphabet::new(b"ACGA", b""),
        Err(Error::InvalidAlphabet(_))
    ));
    assert!(matches!(
        Alphabet::new(b"ACGT", b"A"),
        Err(Error::InvalidAlphabet(_))
    ));
    assert!(Alphabet::new(b"", b"").is_err());
    let all = (0..=255).collect::<Vec<u8>>();
    assert!(Alphabet::new(&all, b"").is_err());
    assert!(Alphabet::new(&all[..255], b"").is_ok());
    Ok(())
}

#[test]
fn test_presets() {
    let dna = Alphabet::dna();
    assert_eq!(dna.characters(), b"ACGTNSYWRKVBDHM");
    assert!(dna.is_special(dna.encode(b'N').unwrap()));
    assert!(!dna.is_special(dna.encode(b'T').unwrap()));

    let protein = Alphabet::protein();
    assert_eq!(protein.num_regular(), 20);
    assert_eq!(protein.num_special(), 8);
    assert_eq!(protein.regular_bit_width(), 5);
    assert!(protein.is_special(protein.encode(b'*').unwrap()));
}

#[test]
fn test_guess() {
    assert_eq!(Alphabet::guess(b"ACGTNNNACGT"), Alphabet::dna());
    assert_eq!(Alphabet::guess(b"MKLV"), Alphabet::protein());
    assert_eq!(Alphabet::guess(b""), Alphabet::dna());
    // Only the first symbols are inspected
    let mut seq = vec![b'A'; 5000];
    seq.push(b'L');
    assert_eq!(Alphabet::guess(&seq), Alphabet::dna());
    seq[4999] = b'L';
    assert_eq!(Alphabet::guess(&seq), Alphabet::protein());
}

#[test]
fn test_records() -> Result<()> {
    let alphabet = Alphabet::protein();
    let mut records = alphabet.records().collect::<Vec<_>>();
    records.reverse();
    assert_eq!(Alphabet::from_records(records)?, alphabet);

    // Codes must be dense
    assert!(Alphabet::from_records([(b'A', 0, SymbolClass::Regular), (b'N', 2, SymbolClass::Special)]).is_err());

    // Interleaved classes: the packed width depends on the largest regular code
    let alphabet = Alphabet::from_records([
        (b'$', 0, SymbolClass::Special),
        (b'N', 1, SymbolClass::Special),
        (b'A', 2, SymbolClass::Regular),
        (b'C', 3, SymbolClass::Regular),
    ])?;
    assert_eq!(alphabet.regular_bit_width(), 2);
    assert_eq!(alphabet.num_regular(), 2);
    Ok(())
}

#[test]
fn test_seq_round_trip() -> Result<()> {
    let alphabet = Alphabet::dna();
    let raw = b"ACGTNNRYACGT";
    let codes = alphabet.encode_seq(raw)?;
    assert_eq!(alphabet.decode_seq(&codes)?, raw);
    assert!(alphabet.encode_seq(b"ACGU").is_err());
    Ok(())
}
