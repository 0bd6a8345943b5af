// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Phone set: bidirectional mapping between phonetic symbols and byte indices.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::acoustic::MAX_PHONE_SYMBOL_LEN;
use crate::error::SadError;

/// Upper bound on the number of phones (u8 index space, 0xFF reserved).
pub const MAX_PHONES: usize = 254;

/// An injective mapping between phonetic-symbol strings and byte-sized indices.
///
/// The first phone is the silence symbol by convention, so its index is
/// always 0. The set is immutable after construction and can be shared
/// read-only across threads.
#[derive(Debug, Clone)]
pub struct PhoneSet {
    names: Vec<String>,
    indices: HashMap<String, u8>,
}

impl PhoneSet {
    /// Build a phone set from an explicit name list; `names[0]` is silence.
    pub fn new(names: Vec<String>) -> Result<Self, SadError> {
        if names.is_empty() {
            return Err(SadError::InvalidInput(
                "phone set must contain at least the silence symbol".to_string(),
            ));
        }
        if names.len() > MAX_PHONES {
            return Err(SadError::InvalidInput(format!(
                "phone set has {} entries, maximum is {}",
                names.len(),
                MAX_PHONES
            )));
        }

        let mut indices = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() || !name.is_ascii() || name.len() > MAX_PHONE_SYMBOL_LEN {
                return Err(SadError::InvalidInput(format!(
                    "invalid phonetic symbol {:?}: must be non-empty ASCII of at most {} bytes",
                    name, MAX_PHONE_SYMBOL_LEN
                )));
            }
            if indices.insert(name.clone(), i as u8).is_some() {
                return Err(SadError::InvalidInput(format!(
                    "duplicate phonetic symbol {:?}",
                    name
                )));
            }
        }

        Ok(Self { names, indices })
    }

    /// Parse a phone set from UTF-8 text, one phone per line.
    ///
    /// The first non-blank line is the silence symbol. Blank lines are
    /// skipped, so a trailing newline is fine.
    pub fn read_from<R: Read>(reader: R) -> Result<Self, SadError> {
        let reader = BufReader::new(reader);
        let mut names = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let name = line.trim();
            if name.is_empty() {
                continue;
            }
            names.push(name.to_string());
        }
        Self::new(names)
    }

    /// Load a phone set from a file.
    pub fn from_path(path: &Path) -> Result<Self, SadError> {
        Self::read_from(File::open(path)?)
    }

    /// Index of the given phonetic symbol, if present.
    pub fn index(&self, name: &str) -> Option<u8> {
        self.indices.get(name).copied()
    }

    /// Phonetic symbol at the given index, if valid.
    pub fn name(&self, index: u8) -> Option<&str> {
        self.names.get(index as usize).map(String::as_str)
    }

    /// Index of the silence phone.
    pub fn silence(&self) -> u8 {
        0
    }

    /// Number of phones in the set.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
