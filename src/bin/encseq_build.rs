/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */
use std::io::Read;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use dsi_progress_logger::*;
use encseq::{init_env_logger, prelude::*};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AlphabetKind {
    /// ACGT, with IUPAC wildcards as special symbols.
    Dna,
    /// The 20 amino acids, with XUBZJO*- as special symbols.
    Protein,
    /// Guess from the first symbols of the input.
    Guess,
}

#[derive(Parser, Debug)]
#[command(about = "Builds an encoded sequence from raw symbols and serializes it with ε-serde.", long_about = None)]
struct Args {
    /// A file containing raw symbols (whitespace is ignored), or - for standard input.
    source: String,
    /// A name for the ε-serde serialized sequence.
    dest: String,
    /// The alphabet of the sequence.
    #[arg(short, long, value_enum, default_value_t = AlphabetKind::Guess)]
    alphabet: AlphabetKind,
    /// Use a custom alphabet with these regular symbols (overrides --alphabet).
    #[arg(long, requires = "special")]
    regular: Option<String>,
    /// The special symbols of the custom alphabet.
    #[arg(long, requires = "regular")]
    special: Option<String>,
    /// Build per-symbol partial sums for faster special counts.
    #[arg(long, default_value_t = false)]
    partial_symbol_sums: bool,
    /// A special symbol separating records.
    #[arg(long)]
    separator: Option<char>,
    /// Reject lowercase symbols instead of mapping them to uppercase (and U to T for DNA).
    #[arg(long, default_value_t = false)]
    strict: bool,
}

fn main() -> Result<()> {
    init_env_logger()?;

    let args = Args::parse();

    let mut input = vec![];
    if args.source == "-" {
        std::io::stdin().lock().read_to_end(&mut input)?;
    } else {
        input = std::fs::read(&args.source)?;
    }
    input.retain(|c| !c.is_ascii_whitespace());

    let alphabet = match (&args.regular, &args.special, args.alphabet) {
        (Some(regular), Some(special), _) => Alphabet::new(regular.as_bytes(), special.as_bytes())?,
        (_, _, AlphabetKind::Dna) => Alphabet::dna(),
        (_, _, AlphabetKind::Protein) => Alphabet::protein(),
        (_, _, AlphabetKind::Guess) => Alphabet::guess(&input),
    };
    log::info!(
        "Alphabet: {} regular and {} special symbols",
        alphabet.num_regular(),
        alphabet.num_special()
    );
    if !args.strict {
        alphabet.normalize_seq(&mut input);
    }

    let mut config = EncodedSeqConfig::default()
        .expected_len(input.len())
        .partial_symbol_sums(args.partial_symbol_sums);
    if let Some(separator) = args.separator {
        if !separator.is_ascii() {
            bail!("Separator {:?} is not an ASCII symbol", separator);
        }
        config = config.separator(separator as u8);
    }
    let mut seq = config.build(alphabet)?;

    let mut pl = ProgressLogger::default();
    pl.display_memory(true)
        .item_name("symbol")
        .expected_updates(Some(input.len()));
    pl.start("Encoding symbols...");

    for (pos, &c) in input.iter().enumerate() {
        if let Err(e) = seq.push(c) {
            pl.info(format_args!("Cannot encode symbol at position {}: {}", pos, e));
            bail!(e);
        }
        pl.light_update();
    }

    pl.done();

    seq.seal()?;
    if args.separator.is_some() {
        log::info!("{} records", seq.num_records()?);
    }
    seq.store(&args.dest)?;
    Ok(())
}
