// src/core/mod.rs

//! Core data structures and types

pub mod bits;
pub mod error;
pub mod register;
pub mod state;

pub use error::{JobId, QubitId, Result, WalkError};
pub use register::{DimensionSpan, Register, RegisterAllocator, RegisterLayout, RegisterRole};
pub use state::StateVector;

pub mod constants;
pub use constants::walk_constants::{AMPLITUDE_TOLERANCE, PI};
