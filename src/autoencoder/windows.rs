//! Overlapping frame windows cut from a clip.

use std::ops::Range;

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

use crate::error::{ConvLstmError, Result};

/// How a clip is cut into overlapping windows.
///
/// Window `i` covers frames `i * stride .. i * stride + len`. The default
/// plan cuts a 9-frame clip into `{0,1,2}, {2,3,4}, {4,5,6}, {6,7,8}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPlan {
    pub len: usize,
    pub stride: usize,
    pub count: usize,
}

impl Default for WindowPlan {
    fn default() -> Self {
        Self {
            len: 3,
            stride: 2,
            count: 4,
        }
    }
}

impl WindowPlan {
    pub fn new(len: usize, stride: usize, count: usize) -> Self {
        Self { len, stride, count }
    }

    pub fn validate(&self) -> Result<()> {
        if self.len == 0 {
            return Err(ConvLstmError::Window("window length must be at least 1".into()));
        }
        if self.stride == 0 {
            return Err(ConvLstmError::Window("window stride must be at least 1".into()));
        }
        if self.count < 2 {
            // the predictor needs at least one history window
            return Err(ConvLstmError::Window(format!(
                "need at least 2 windows, got {}",
                self.count
            )));
        }
        Ok(())
    }

    /// Number of frames a clip must have.
    pub fn frames_required(&self) -> usize {
        (self.count - 1) * self.stride + self.len
    }

    /// Frame index range of every window, oldest first.
    pub fn ranges(&self) -> Vec<Range<usize>> {
        (0..self.count)
            .map(|i| {
                let start = i * self.stride;
                start..start + self.len
            })
            .collect()
    }

    /// Cut a `[batch, channels, time, height, width]` clip into windows.
    ///
    /// Returns `[windows, batch, len, channels, height, width]`: the window
    /// axis leads and each window is batch-first with time before channels.
    pub fn slice<B: Backend>(&self, clip: Tensor<B, 5>) -> Result<Tensor<B, 6>> {
        self.validate()?;
        let dims = clip.dims();
        if dims[2] != self.frames_required() {
            return Err(ConvLstmError::shape(
                "clip frames",
                &[dims[0], dims[1], self.frames_required(), dims[3], dims[4]],
                &dims,
            ));
        }

        let windows = self
            .ranges()
            .into_iter()
            .map(|frames| {
                // [B, C, T, H, W] -> [B, T, C, H, W]
                clip.clone()
                    .narrow(2, frames.start, frames.len())
                    .swap_dims(1, 2)
            })
            .collect::<Vec<_>>();

        Ok(Tensor::stack(windows, 0))
    }
}
