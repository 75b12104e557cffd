// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Error types for leap-second table loading.
//!
//! Time codecs never error: a bad input yields a sentinel value. The only
//! fallible operation in the crate is reading a leap-second table from the
//! host, and any such failure is recovered by falling back to the built-in
//! table.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableLoadError {
    #[error("cannot read leap-second table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: expected 6 columns, found {found}")]
    Columns { line: usize, found: usize },
    #[error("line {line}: invalid number {token:?}")]
    Number { line: usize, token: String },
    #[error("leap-second table has no entries")]
    Empty,
}

pub type Result<T> = std::result::Result<T, TableLoadError>;
