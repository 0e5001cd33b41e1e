//! Numeric constants used by the coin families and the decoder.

/// Constants shared across the walk compiler
pub mod walk_constants {
    /// Used for phase angles (`e^(iλ)`)
    pub const PI: f64 = std::f64::consts::PI;
    /// Tolerance below which an amplitude or probability is treated as zero.
    pub const AMPLITUDE_TOLERANCE: f64 = 1e-12;
    /// Width of the ancilla register carried by directional boundary controls.
    pub const DIRECTIONAL_ANCILLA_WIDTH: usize = 2;
    /// Counter width of a one-way boundary when none is configured.
    pub const DEFAULT_CYCLE_BITS: usize = 3;
    /// Shots used when a caller does not say otherwise.
    pub const DEFAULT_SHOTS: u64 = 1024;
}
