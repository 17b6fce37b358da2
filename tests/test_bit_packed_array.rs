/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use encseq::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;

#[test]
fn test_bit_packed_array() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(0);
    for bit_width in 1..=64 {
        let n = 100;
        let mask = u64::MAX >> (64 - bit_width);
        let mut array = BitPackedArray::new(bit_width, n)?;
        assert_eq!(array.as_words().len(), (n * bit_width).div_ceil(64));

        for _ in 0..10 {
            let values = (0..n)
                .map(|_| rng.random::<u64>() & mask)
                .collect::<Vec<_>>();

            let mut indices = (0..n).collect::<Vec<_>>();
            indices.shuffle(&mut rng);

            for &i in &indices {
                array.set(i, values[i])?;
            }

            for (i, &value) in values.iter().enumerate() {
                assert_eq!(array.get(i)?, value, "bit width {} index {}", bit_width, i);
            }

            indices.shuffle(&mut rng);
            for &i in &indices {
                assert_eq!(array.get(i)?, values[i]);
            }

            for from in 0..=array.len() {
                assert!(array.iter_from(from)?.eq(values[from..].iter().copied()));
            }
        }

        // Extremes
        array.set(n - 1, mask)?;
        assert_eq!(array.get(n - 1)?, mask);
        array.set(n - 1, 0)?;
        assert_eq!(array.get(n - 1)?, 0);
    }
    Ok(())
}

#[test]
fn test_all_values_small_widths() -> Result<()> {
    // Every value of every width up to 12, at every index of arrays
    // whose values straddle word boundaries when the width does not divide 64
    for bit_width in 1..=12 {
        let n = 64 * 3 / bit_width + 2;
        let mut array = BitPackedArray::new(bit_width, n)?;
        for value in 0..1u64 << bit_width {
            for i in 0..n {
                array.set(i, value)?;
                assert_eq!(array.get(i)?, value);
            }
        }
    }
    Ok(())
}

#[test]
fn test_neighbours_untouched() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(1);
    for bit_width in [3, 5, 7, 13, 31, 33, 63] {
        let n = 200;
        let mask = u64::MAX >> (64 - bit_width);
        let mut values = (0..n)
            .map(|_| rng.random::<u64>() & mask)
            .collect::<Vec<_>>();
        let mut array = BitPackedArray::new(bit_width, n)?;
        for (i, &v) in values.iter().enumerate() {
            array.set(i, v)?;
        }
        for _ in 0..1000 {
            let i = rng.random_range(0..n);
            let v = rng.random::<u64>() & mask;
            array.set(i, v)?;
            values[i] = v;
        }
        assert!(array.iter().eq(values.iter().copied()));
    }
    Ok(())
}

#[test]
fn test_errors() -> Result<()> {
    assert_eq!(
        BitPackedArray::new(0, 10),
        Err(Error::InvalidBitWidth {
            bit_width: 0,
            word_bits: 64
        })
    );
    assert!(BitPackedArray::new(65, 10).is_err());

    let mut array = BitPackedArray::new(5, 10)?;
    assert_eq!(array.get(10), Err(Error::OutOfBounds { index: 10, len: 10 }));
    assert_eq!(
        array.set(10, 1),
        Err(Error::OutOfBounds { index: 10, len: 10 })
    );
    // Values are rejected, not masked
    assert_eq!(
        array.set(3, 32),
        Err(Error::ValueOutOfRange {
            value: 32,
            bit_width: 5
        })
    );
    assert_eq!(array.get(3)?, 0);
    assert!(array.push(1 << 5).is_err());
    assert_eq!(array.len(), 10);
    assert!(array.iter_from(11).is_err());
    assert_eq!(array.iter_from(10)?.count(), 0);
    Ok(())
}

#[test]
fn test_push_pop() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(2);
    for bit_width in [1, 2, 7, 17, 64] {
        let mask = u64::MAX >> (64 - bit_width);
        let mut array = BitPackedArray::with_capacity(bit_width, 10)?;
        assert!(array.is_empty());
        let mut values = vec![];
        for _ in 0..500 {
            let v = rng.random::<u64>() & mask;
            array.push(v)?;
            values.push(v);
            assert_eq!(array.as_words().len(), (values.len() * bit_width).div_ceil(64));
        }
        assert!(array.iter().eq(values.iter().copied()));

        for _ in 0..250 {
            assert_eq!(array.pop(), values.pop());
        }
        assert_eq!(array.len(), 250);
        assert!((&array).into_iter().eq(values.iter().copied()));

        let fresh = BitPackedArray::from_raw_parts(
            array.as_words().to_vec(),
            bit_width,
            array.len(),
        )?;
        assert_eq!(fresh, array);

        array.reset();
        assert!(array.iter().all(|v| v == 0));
        array.clear();
        assert_eq!(array.pop(), None);
        assert!(array.as_words().is_empty());
    }
    Ok(())
}

#[test]
fn test_raw_parts_validation() -> Result<()> {
    assert!(BitPackedArray::from_raw_parts(vec![0; 2], 7, 9).is_err());
    assert!(BitPackedArray::from_raw_parts(vec![0; 1], 7, 9).is_ok());
    assert!(BitPackedArray::from_raw_parts(vec![0; 2], 7, 10).is_ok());
    let (words, bit_width, len) = BitPackedArray::new(3, 22)?.into_raw_parts();
    assert_eq!((words.len(), bit_width, len), (2, 3, 22));
    Ok(())
}
