//! # ConvLSTM Autoencoder
//!
//! Convolutional LSTM cells, multi-layer ConvLSTM stacks and a motion-aware
//! recurrent autoencoder for video clips, built on the Burn framework.
//!
//! ## Features
//!
//! - **ConvLSTMCell**: LSTM gating with one same-padded 2D convolution per step
//! - **ConvLSTM**: stacked layers over `[batch, time, C, H, W]` or
//!   `[time, batch, C, H, W]` sequences, with stateful continuation and an
//!   optional leading window-group axis
//! - **MotionAutoEncoder**: encode four overlapping windows, predict the
//!   latest window's memory, decode one frame
//! - **Serde configs**: per-layer or shared `kernel_size`/`hidden_channels`,
//!   validated once at construction
//!
//! ## Quick Start
//!
//! ```rust
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//! use convlstm_ae::prelude::*;
//!
//! type Backend = NdArray<f32>;
//! let device = Default::default();
//!
//! let stack = ConvLSTMConfig::new(3, 8, [3, 3], 2)
//!     .init::<Backend>(&device)
//!     .unwrap();
//!
//! let input = Tensor::<Backend, 5>::zeros([1, 4, 3, 16, 16], &device);
//! let (outputs, states) = stack.forward(input, None).unwrap();
//!
//! assert_eq!(outputs[0].dims(), [1, 4, 8, 16, 16]);
//! assert_eq!(states[0].hidden.dims(), [1, 8, 16, 16]);
//! ```

pub mod autoencoder;
pub mod cells;
pub mod config;
pub mod error;
pub mod rnn;

pub mod prelude {
    pub use crate::autoencoder::{MotionAutoEncoder, MotionAutoEncoderConfig, WindowPlan};
    pub use crate::cells::{CellState, ConvLSTMCell};
    pub use crate::config::{ConvLSTMConfig, HiddenChannels, KernelSize, LayerConfig};
    pub use crate::error::{ConvLstmError, Result};
    pub use crate::rnn::ConvLSTM;
}
