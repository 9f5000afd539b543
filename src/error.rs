//! Error types for kernel invocation and benchmarking.

use thiserror::Error;

/// Errors produced while allocating buffers, validating operands or
/// configuring a benchmark run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BenchError {
    /// Operand shapes are incompatible with the requested operation.
    #[error("shape mismatch in {op}: {detail}")]
    ShapeMismatch { op: &'static str, detail: String },

    /// A tile or block extent does not evenly divide its dimension.
    #[error("tile size {tile} does not divide {dim} = {extent}")]
    UnsupportedTileSize {
        dim: &'static str,
        extent: usize,
        tile: usize,
    },

    /// Backing storage could not be allocated.
    #[error("out of memory allocating {requested} elements")]
    OutOfMemory { requested: usize },

    /// No kernel is registered under this identifier.
    #[error("unknown kernel variant: {0}")]
    UnknownVariant(String),

    /// Benchmark configuration is unusable.
    #[error("invalid benchmark configuration: {0}")]
    InvalidConfig(String),
}

impl BenchError {
    pub(crate) fn shape(op: &'static str, detail: impl Into<String>) -> Self {
        BenchError::ShapeMismatch {
            op,
            detail: detail.into(),
        }
    }
}

/// Result type for kernel and harness operations.
pub type Result<T> = std::result::Result<T, BenchError>;
