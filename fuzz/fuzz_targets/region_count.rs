#![no_main]

use encseq::fuzz::region_count::{harness, Data};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: Data| harness(data));
