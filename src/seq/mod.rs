/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Encoded sequences and their serialization.

mod encoded_seq;
pub use encoded_seq::*;

mod parts;
pub use parts::*;
