/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(unconditional_recursion)]

pub mod alphabet;
pub mod bits;
pub mod error;
pub mod ranges;
pub mod seq;
pub mod traits;

#[cfg(feature = "fuzz")]
pub mod fuzz;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::alphabet::*;
    pub use crate::bits::*;
    pub use crate::error::{Error, Result};
    pub use crate::ranges::*;
    pub use crate::seq::*;
    pub use crate::traits::prelude::*;
}

/// Initializes the `env_logger` logger with a default level of `Info`,
/// which can be overridden with the `RUST_LOG` environment variable.
pub fn init_env_logger() -> anyhow::Result<()> {
    use std::io::Write;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {} [{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()?;
    Ok(())
}
