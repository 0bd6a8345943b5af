// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Lexical-unit rewrite table with identity fallback.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::SadError;

/// A string-to-string mapping loaded from a two-column text file.
///
/// Lookups fall through to the queried unit itself when no mapping is
/// defined, so callers can apply the table unconditionally.
#[derive(Debug, Clone, Default)]
pub struct Mappings {
    entries: HashMap<String, String>,
}

impl Mappings {
    /// Parse mappings from UTF-8 text, one `<source> <target>` pair per line.
    ///
    /// Tokens are separated by ASCII whitespace runs; lines with fewer than
    /// two tokens are skipped silently. Duplicate source keys are rejected.
    pub fn read_from<R: Read>(reader: R) -> Result<Self, SadError> {
        let reader = BufReader::new(reader);
        let mut entries = HashMap::new();
        for line in reader.lines() {
            let line = line?;
            let mut tokens = line.split_whitespace();
            let (Some(source), Some(target)) = (tokens.next(), tokens.next()) else {
                continue;
            };
            if entries
                .insert(source.to_string(), target.to_string())
                .is_some()
            {
                return Err(SadError::InvalidInput(format!(
                    "duplicate mapping key: {source}"
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Load mappings from a file.
    pub fn from_path(path: &Path) -> Result<Self, SadError> {
        Self::read_from(File::open(path)?)
    }

    /// Map a lexical unit, returning the unit itself when absent.
    pub fn lookup<'a>(&'a self, unit: &'a str) -> &'a str {
        self.entries.get(unit).map(String::as_str).unwrap_or(unit)
    }

    /// Number of mappings defined.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
