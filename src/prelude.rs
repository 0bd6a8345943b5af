// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Common re-exports for convenient use of sadkit.
//!
//! ```
//! use sadkit::prelude::*;
//! ```

pub use crate::acoustic::codec::AcousticModel;
pub use crate::acoustic::gaussian::{Covariance, Gaussian};
pub use crate::acoustic::state::HmmState;
pub use crate::acoustic::{DIM, HMM_STATES, LOG_LIKELIHOOD_FLOOR, MAX_PHONE_SYMBOL_LEN};
pub use crate::error::SadError;
pub use crate::mappings::Mappings;
pub use crate::phones::PhoneSet;
pub use crate::sad::engine::{SadEngine, SadSession};
pub use crate::sad::segment::{
    load_segments, read_segments, save_segments, write_segments, SpeechSegment,
};
pub use crate::sad::SadParams;
