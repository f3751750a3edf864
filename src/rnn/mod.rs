//! # Recurrent Layers for Sequence Processing
//!
//! [`ConvLSTM`] stacks [`ConvLSTMCell`](crate::cells::ConvLSTMCell)s and
//! handles time iteration, layer chaining and state management.
//!
//! ## Tensor Shapes
//!
//! | Format | Shape | Default |
//! |--------|-------|---------|
//! | Batch-first | `[batch, time, channels, height, width]` | ✓ Yes |
//! | Time-first | `[time, batch, channels, height, width]` | No |
//! | Grouped | `[groups, batch, time, channels, height, width]` | via `forward_grouped` |
//!
//! Outputs are always batch-first. Both returned lists hold one entry per
//! layer with `return_all_layers = true`, and exactly one entry otherwise.
//!
//! ## Stateful Processing
//!
//! ```ignore
//! let stack = ConvLSTMConfig::new(3, 16, [3, 3], 2)
//!     .with_return_all_layers(true)
//!     .init::<Backend>(&device)?;
//!
//! let (_, state) = stack.forward(clip_a, None)?;
//! let (outputs, state) = stack.forward(clip_b, Some(state))?;
//! ```

pub mod conv_lstm;

pub use conv_lstm::{ConvLSTM, GroupedStackOutput, StackOutput};
