// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Speech segments and their text-file representation.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SadError;

/// A contiguous run of speech frames, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechSegment {
    pub start: u32,
    pub end: u32,
}

impl SpeechSegment {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Number of frames covered by the segment.
    pub fn frames(&self) -> u32 {
        self.end - self.start + 1
    }
}

/// Write segments as text, one `<start> <end>` pair per line, LF endings.
pub fn write_segments<W: Write>(
    writer: &mut W,
    segments: &[SpeechSegment],
) -> Result<(), SadError> {
    for segment in segments {
        writeln!(writer, "{} {}", segment.start, segment.end)?;
    }
    Ok(())
}

/// Read segments from text. Blank lines are skipped; a line whose start
/// exceeds its end is rejected.
pub fn read_segments<R: Read>(reader: R) -> Result<Vec<SpeechSegment>, SadError> {
    let reader = BufReader::new(reader);
    let mut segments = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let mut tokens = line.split_whitespace();
        let (Some(start), Some(end)) = (tokens.next(), tokens.next()) else {
            if line.trim().is_empty() {
                continue;
            }
            return Err(SadError::InvalidInput(format!(
                "segment file line {}: expected two frame indices",
                number + 1
            )));
        };
        let start: u32 = start.parse().map_err(|_| {
            SadError::InvalidInput(format!(
                "segment file line {}: malformed frame index {start:?}",
                number + 1
            ))
        })?;
        let end: u32 = end.parse().map_err(|_| {
            SadError::InvalidInput(format!(
                "segment file line {}: malformed frame index {end:?}",
                number + 1
            ))
        })?;
        if start > end {
            return Err(SadError::InvalidInput(format!(
                "segment file line {}: inconsistent start and end of segment ({start} > {end})",
                number + 1
            )));
        }
        segments.push(SpeechSegment::new(start, end));
    }
    Ok(segments)
}

/// Load a segment file.
pub fn load_segments(path: &Path) -> Result<Vec<SpeechSegment>, SadError> {
    read_segments(File::open(path)?)
}

/// Store a segment file.
pub fn save_segments(path: &Path, segments: &[SpeechSegment]) -> Result<(), SadError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_segments(&mut writer, segments)?;
    writer.flush()?;
    Ok(())
}
