//! # Recurrent Cell Implementations
//!
//! Single-timestep cells. The stacked, sequence-level layer built on them
//! lives in [`crate::rnn`].
//!
//! ## Tensor Shapes
//!
//! [`ConvLSTMCell`] works on 4D feature maps:
//!
//! | Tensor | Shape | Description |
//! |--------|-------|-------------|
//! | `input` | `[batch, input_channels, height, width]` | Input feature map |
//! | `state.hidden` | `[batch, hidden_channels, height, width]` | Working state `H` |
//! | `state.memory` | `[batch, hidden_channels, height, width]` | Memory state `C` |
//!
//! The gate convolution uses same padding `(kh / 2, kw / 2)`, so odd kernels
//! keep `height` and `width` unchanged.
//!
//! ## Example
//!
//! ```ignore
//! use convlstm_ae::cells::ConvLSTMCell;
//!
//! let cell = ConvLSTMCell::<Backend>::new(3, 16, [3, 3], true, &device);
//! let state = cell.init_state(batch, 64, 64, &device);
//! let state = cell.step(frame, state);
//! // state.hidden: [batch, 16, 64, 64]
//! ```

pub mod conv_lstm_cell;

pub use conv_lstm_cell::{CellState, ConvLSTMCell, GateActivations};
