/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */
use anyhow::Result;
use clap::Parser;
use encseq::{init_env_logger, prelude::*};
use mem_dbg::*;

#[derive(Parser, Debug)]
#[command(about = "Loads an ε-serde serialized encoded sequence and queries it.", long_about = None)]
struct Args {
    /// The ε-serde serialized sequence.
    seq: String,
    /// The first position of the region (inclusive).
    #[arg(short, long)]
    start: Option<usize>,
    /// The last position of the region (inclusive); defaults to the last position.
    #[arg(short, long)]
    end: Option<usize>,
    /// Print the decoded symbols of the region.
    #[arg(short, long, default_value_t = false)]
    print: bool,
    /// Print the special ranges intersecting the region.
    #[arg(short, long, default_value_t = false)]
    ranges: bool,
    /// Print a memory breakdown of the loaded sequence.
    #[arg(short, long, default_value_t = false)]
    mem: bool,
}

fn main() -> Result<()> {
    init_env_logger()?;

    let args = Args::parse();

    let seq = EncodedSeq::load(&args.seq)?;
    let len = seq.len()?;

    println!("length:           {}", len);
    println!("regular:          {}", seq.num_regular());
    println!("special:          {}", seq.num_special_positions());
    println!("ranges:           {}", seq.num_ranges());
    println!("bits per regular: {}", seq.packed().bit_width());
    println!("size:             {}", seq.mem_size(SizeFlags::default()));

    if seq.separator_code().is_some() {
        println!("records:          {}", seq.num_records()?);
    }

    if args.mem {
        seq.mem_dbg(DbgFlags::default())?;
    }

    if len == 0 {
        return Ok(());
    }

    let start = args.start.unwrap_or(0);
    let end = args.end.unwrap_or(len - 1);

    println!("region:           [{}..={}]", start, end);
    println!("special prefix:   {}", seq.special_prefix_len()?);
    println!("special suffix:   {}", seq.special_suffix_len()?);
    if seq.separator_code().is_some() {
        println!(
            "records:          {}..={}",
            seq.seq_num_of(start)?,
            seq.seq_num_of(end)?
        );
    }
    let counts = seq.symbol_counts_in_seq_region(start, end)?;
    for (raw, code, class) in seq.alphabet().records() {
        if counts[code as usize] != 0 {
            println!("{} ({}): {}", raw as char, class, counts[code as usize]);
        }
    }
    println!(
        "all special:      {}",
        seq.all_special_symbols_count_in_seq_region(start, end)?
    );

    if args.ranges {
        seq.special_range_index().write_ranges_info(
            std::io::stdout().lock(),
            start,
            end - start + 1,
            None,
        )?;
    }

    if args.print {
        let mut out = vec![];
        seq.extract(start, end, &mut out)?;
        println!("{}", String::from_utf8_lossy(&out));
    }

    Ok(())
}
