// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Binary persistence of acoustic-model parameters.
//!
//! The per-state payload is a packed little-endian stream: NUL-padded phone
//! symbol, state index, position code, component count, then per component
//! weight, mean and covariance. Covariance is always written in original
//! (variance) form, even when the in-memory copy is precomputed, so a
//! load → save round-trip of an uninitialized model is byte-identical.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::acoustic::gaussian::{Covariance, Gaussian};
use crate::acoustic::state::HmmState;
use crate::acoustic::{HMM_STATES, MAX_PHONE_SYMBOL_LEN};
use crate::error::SadError;
use crate::phones::PhoneSet;

/// On-disk length of the phone symbol field (NUL-padded).
const PHONE_FIELD_LEN: usize = MAX_PHONE_SYMBOL_LEN + 1;

/// Magic bytes opening a model-set file.
const MODEL_MAGIC: [u8; 4] = *b"SADM";

/// Model-set file format version.
const MODEL_VERSION: u32 = 1;

fn read_u8<R: Read>(reader: &mut R) -> Result<u8, SadError> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32, SadError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, SadError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_f32_vec<R: Read>(reader: &mut R, len: usize) -> Result<Vec<f32>, SadError> {
    let mut bytes = vec![0u8; len * 4];
    reader.read_exact(&mut bytes)?;
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

fn write_f32_slice<W: Write>(writer: &mut W, values: &[f32]) -> Result<(), SadError> {
    for value in values {
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

/// Read one HMM-state payload.
///
/// The phone symbol is resolved against `phones`; covariance comes back in
/// original form with an invalid cache, so the caller must call
/// [`HmmState::initialize`] before evaluation.
pub fn read_state<R: Read>(
    reader: &mut R,
    dim: usize,
    id: i32,
    phones: &PhoneSet,
) -> Result<HmmState, SadError> {
    let mut symbol = [0u8; PHONE_FIELD_LEN];
    reader.read_exact(&mut symbol)?;
    let end = symbol.iter().position(|&b| b == 0).unwrap_or(symbol.len());
    let name = std::str::from_utf8(&symbol[..end])
        .map_err(|_| SadError::InvalidInput("phone symbol is not valid UTF-8".to_string()))?;
    let phone = phones.index(name).ok_or_else(|| {
        SadError::InvalidInput(format!("unknown phone symbol {name:?} in model file"))
    })?;

    let state = read_u8(reader)?;
    if usize::from(state) >= HMM_STATES {
        return Err(SadError::InvalidInput(format!(
            "state index {state} out of range (phone {name:?})"
        )));
    }
    let position = read_u8(reader)?;

    let count = read_i32(reader)?;
    if count <= 0 {
        return Err(SadError::InvalidInput(format!(
            "non-positive component count {count} (phone {name:?})"
        )));
    }

    let mut components = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mut weight = [0u8; 4];
        reader.read_exact(&mut weight)?;
        let weight = f32::from_le_bytes(weight);
        let mean = read_f32_vec(reader, dim)?;
        let variances = read_f32_vec(reader, dim)?;
        components.push(Gaussian::new(-1, weight, mean, variances));
    }

    HmmState::new(phone, state, position, id, dim, components)
}

/// Write one HMM-state payload.
///
/// Precomputed covariance is inverted back to variances on the way out:
/// `σ² = 1/(2·precovar)`.
pub fn write_state<W: Write>(
    writer: &mut W,
    state: &HmmState,
    phones: &PhoneSet,
) -> Result<(), SadError> {
    let name = phones.name(state.phone()).ok_or_else(|| {
        SadError::InvalidInput(format!(
            "hmm state {}: phone index {} not in phone set",
            state.id(),
            state.phone()
        ))
    })?;
    let mut symbol = [0u8; PHONE_FIELD_LEN];
    symbol[..name.len()].copy_from_slice(name.as_bytes());
    writer.write_all(&symbol)?;

    writer.write_all(&[state.state_index(), state.position()])?;
    writer.write_all(&(state.components().len() as i32).to_le_bytes())?;

    for gaussian in state.components() {
        writer.write_all(&gaussian.weight.to_le_bytes())?;
        write_f32_slice(writer, &gaussian.mean)?;
        match &gaussian.covariance {
            Covariance::Original(variances) => write_f32_slice(writer, variances)?,
            Covariance::Precomputed(inverted) => {
                for &value in inverted {
                    let variance = (1.0 / (2.0 * f64::from(value))) as f32;
                    writer.write_all(&variance.to_le_bytes())?;
                }
            }
        }
    }
    Ok(())
}

/// A loaded set of HMM states sharing one feature dimensionality.
///
/// States come out of [`read_from`](AcousticModel::read_from) with original
/// covariance; the SAD engine pools from this form directly, other decoders
/// initialize each state before evaluation.
#[derive(Debug, Clone)]
pub struct AcousticModel {
    dim: usize,
    states: Vec<HmmState>,
}

impl AcousticModel {
    pub fn new(dim: usize, states: Vec<HmmState>) -> Result<Self, SadError> {
        if dim == 0 {
            return Err(SadError::InvalidInput(
                "model dimensionality must be positive".to_string(),
            ));
        }
        if states.is_empty() {
            return Err(SadError::InvalidInput(
                "model contains no HMM states".to_string(),
            ));
        }
        for state in &states {
            if state.dim() != dim {
                return Err(SadError::InvalidInput(format!(
                    "hmm state {} has dimensionality {}, model expects {dim}",
                    state.id(),
                    state.dim()
                )));
            }
        }
        Ok(Self { dim, states })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn states(&self) -> &[HmmState] {
        &self.states
    }

    /// Precompute evaluation constants for every state.
    pub fn initialize(&mut self) -> Result<(), SadError> {
        for state in &mut self.states {
            state.initialize()?;
        }
        Ok(())
    }

    /// Read a model-set stream: magic, version, dimensionality, state count,
    /// then the per-state payloads. State ids are assigned sequentially.
    pub fn read_from<R: Read>(reader: &mut R, phones: &PhoneSet) -> Result<Self, SadError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != MODEL_MAGIC {
            return Err(SadError::InvalidInput(
                "not an acoustic model file (bad magic)".to_string(),
            ));
        }
        let version = read_u32(reader)?;
        if version != MODEL_VERSION {
            return Err(SadError::InvalidInput(format!(
                "unsupported model file version {version}"
            )));
        }
        let dim = read_u32(reader)? as usize;
        let count = read_u32(reader)? as usize;
        if dim == 0 || count == 0 {
            return Err(SadError::InvalidInput(format!(
                "model header declares dim {dim}, {count} states"
            )));
        }

        let mut states = Vec::with_capacity(count);
        for id in 0..count {
            states.push(read_state(reader, dim, id as i32, phones)?);
        }
        tracing::debug!("loaded acoustic model: {count} states, dim {dim}");
        Self::new(dim, states)
    }

    /// Write the model-set stream.
    pub fn write_to<W: Write>(&self, writer: &mut W, phones: &PhoneSet) -> Result<(), SadError> {
        writer.write_all(&MODEL_MAGIC)?;
        writer.write_all(&MODEL_VERSION.to_le_bytes())?;
        writer.write_all(&(self.dim as u32).to_le_bytes())?;
        writer.write_all(&(self.states.len() as u32).to_le_bytes())?;
        for state in &self.states {
            write_state(writer, state, phones)?;
        }
        Ok(())
    }

    /// Load a model-set file.
    pub fn from_path(path: &Path, phones: &PhoneSet) -> Result<Self, SadError> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader, phones)
    }

    /// Store a model-set file.
    pub fn save(&self, path: &Path, phones: &PhoneSet) -> Result<(), SadError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer, phones)?;
        writer.flush()?;
        Ok(())
    }
}
