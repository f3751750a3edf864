//! Error type shared by the cells, stacks and the autoencoder pipeline.

use thiserror::Error;

/// Errors raised while building or running ConvLSTM modules.
///
/// Configuration variants are returned at construction time. `Shape` and
/// `EmptySequence` are returned by forward calls whose tensors do not fit the
/// configured layers.
#[derive(Debug, Error)]
pub enum ConvLstmError {
    #[error("kernel_size must be a pair or list of pairs")]
    KernelShape,

    #[error("inconsistent list length: {field} has {got} entries but num_layers is {expected}")]
    LayerCount {
        field: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("num_layers must be at least 1")]
    NoLayers,

    #[error("{field} must be greater than zero")]
    ZeroSized { field: &'static str },

    #[error("kernel_size entries must be odd, got {kernel:?}")]
    EvenKernel { kernel: [usize; 2] },

    #[error("invalid window plan: {0}")]
    Window(String),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("input sequence has no time steps")]
    EmptySequence,

    #[error("shape mismatch for {what}: expected {expected:?}, got {got:?}")]
    Shape {
        what: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },
}

impl ConvLstmError {
    /// Convenience constructor for shape mismatches.
    pub(crate) fn shape(what: &'static str, expected: &[usize], got: &[usize]) -> Self {
        Self::Shape {
            what,
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Whether this error was raised while validating a configuration.
    pub fn is_config(&self) -> bool {
        !matches!(self, Self::Shape { .. } | Self::EmptySequence)
    }
}

pub type Result<T> = std::result::Result<T, ConvLstmError>;
