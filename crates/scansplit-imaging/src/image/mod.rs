// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: page decoding and photo encoding.

pub mod codec;

pub use codec::{decode_page, encode_jpeg, open_page, save_jpeg};
