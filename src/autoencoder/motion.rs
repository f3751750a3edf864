//! Motion-aware encode → predict → decode pipeline
//!
//! Three single-layer ConvLSTM stacks share one clip:
//! - the **motion encoder** summarizes every window into its final memory state
//! - the **motion predictor** reads the older window codes as a sequence and
//!   predicts the memory state of the most recent window
//! - the **decoder** starts from a zero working state and the predicted
//!   memory, takes the real code of the most recent window as its single
//!   input step, and its new working state is the decoded frame

use burn::module::Module;
use burn::nn::Initializer;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

use super::windows::WindowPlan;
use crate::cells::CellState;
use crate::config::ConvLSTMConfig;
use crate::error::{ConvLstmError, Result};
use crate::rnn::ConvLSTM;

fn default_channels() -> usize {
    3
}

fn default_kernel_size() -> [usize; 2] {
    [3, 3]
}

/// Configuration of a [`MotionAutoEncoder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionAutoEncoderConfig {
    /// Channels of each input frame
    #[serde(default = "default_channels")]
    pub channels: usize,
    /// Channels of every recurrent state, and of the output frame
    #[serde(default = "default_channels")]
    pub hidden_channels: usize,
    #[serde(default = "default_kernel_size")]
    pub kernel_size: [usize; 2],
    #[serde(default)]
    pub window: WindowPlan,
}

impl Default for MotionAutoEncoderConfig {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            hidden_channels: default_channels(),
            kernel_size: default_kernel_size(),
            window: WindowPlan::default(),
        }
    }
}

impl MotionAutoEncoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_hidden_channels(mut self, hidden_channels: usize) -> Self {
        self.hidden_channels = hidden_channels;
        self
    }

    pub fn with_kernel_size(mut self, kernel_size: [usize; 2]) -> Self {
        self.kernel_size = kernel_size;
        self
    }

    pub fn with_window(mut self, window: WindowPlan) -> Self {
        self.window = window;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.window.validate()?;
        self.encoder_config().layers()?;
        self.recurrent_config().layers()?;
        Ok(())
    }

    fn encoder_config(&self) -> ConvLSTMConfig {
        ConvLSTMConfig::new(self.channels, self.hidden_channels, self.kernel_size, 1)
    }

    /// Predictor and decoder both map hidden -> hidden
    fn recurrent_config(&self) -> ConvLSTMConfig {
        ConvLSTMConfig::new(
            self.hidden_channels,
            self.hidden_channels,
            self.kernel_size,
            1,
        )
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<MotionAutoEncoder<B>> {
        self.build(None, device)
    }

    /// Build with every gate convolution initialized by `initializer`.
    pub fn init_with<B: Backend>(
        &self,
        initializer: Initializer,
        device: &B::Device,
    ) -> Result<MotionAutoEncoder<B>> {
        self.build(Some(initializer), device)
    }

    fn build<B: Backend>(
        &self,
        initializer: Option<Initializer>,
        device: &B::Device,
    ) -> Result<MotionAutoEncoder<B>> {
        self.validate()?;

        let init = |config: ConvLSTMConfig| match initializer.clone() {
            Some(initializer) => config.init_with::<B>(initializer, device),
            None => config.init::<B>(device),
        };

        let autoencoder = MotionAutoEncoder {
            motion_encoder: init(self.encoder_config())?,
            motion_predictor: init(self.recurrent_config())?,
            decoder: init(self.recurrent_config())?,
            channels: self.channels,
            window_len: self.window.len,
            window_stride: self.window.stride,
            window_count: self.window.count,
        };

        log::debug!(
            "built MotionAutoEncoder: channels={} hidden={} kernel={:?} windows={:?}",
            self.channels,
            self.hidden_channels,
            self.kernel_size,
            self.window.ranges()
        );

        Ok(autoencoder)
    }
}

/// Recurrent convolutional autoencoder turning a short clip into one frame
///
/// Input: `[batch, channels, time, height, width]` with
/// `time == window.frames_required()` (9 by default).
/// Output: `[batch, hidden_channels, height, width]`.
///
/// Windows are carried on their own axis next to the true batch axis, so any
/// batch size is supported.
#[derive(Module, Debug)]
pub struct MotionAutoEncoder<B: Backend> {
    motion_encoder: ConvLSTM<B>,
    motion_predictor: ConvLSTM<B>,
    decoder: ConvLSTM<B>,
    channels: usize,
    window_len: usize,
    window_stride: usize,
    window_count: usize,
}

impl<B: Backend> MotionAutoEncoder<B> {
    pub fn window_plan(&self) -> WindowPlan {
        WindowPlan::new(self.window_len, self.window_stride, self.window_count)
    }

    pub fn motion_encoder(&self) -> &ConvLSTM<B> {
        &self.motion_encoder
    }

    pub fn motion_predictor(&self) -> &ConvLSTM<B> {
        &self.motion_predictor
    }

    pub fn decoder(&self) -> &ConvLSTM<B> {
        &self.decoder
    }

    /// Cut a `[batch, channels, time, height, width]` clip into
    /// `[windows, batch, window_len, channels, height, width]`.
    pub fn windows(&self, clip: Tensor<B, 5>) -> Result<Tensor<B, 6>> {
        let channels = clip.dims()[1];
        if channels != self.channels {
            return Err(ConvLstmError::shape(
                "clip channels",
                &[self.channels],
                &[channels],
            ));
        }
        self.window_plan().slice(clip)
    }

    /// Encode every window into its final memory state:
    /// `[windows, batch, hidden_channels, height, width]`.
    pub fn encode_windows(&self, windows: Tensor<B, 6>) -> Result<Tensor<B, 5>> {
        let (_, states) = self.motion_encoder.forward_grouped(windows, None)?;
        Ok(final_state(states)?.memory)
    }

    /// Predict the memory state of the most recent window from the codes of
    /// all earlier windows, read in order as one sequence per batch element.
    ///
    /// `codes` is `[windows, batch, hidden_channels, height, width]`; the
    /// result is `[batch, hidden_channels, height, width]`.
    pub fn predict_memory(&self, codes: Tensor<B, 5>) -> Result<Tensor<B, 4>> {
        let windows = codes.dims()[0];
        if windows < 2 {
            return Err(ConvLstmError::shape("window codes (at least 2)", &[2], &[windows]));
        }

        // [windows - 1, B, ...] -> [B, windows - 1, ...]
        let history = codes.narrow(0, 0, windows - 1).swap_dims(0, 1);
        let (_, states) = self.motion_predictor.forward(history, None)?;
        Ok(final_state(states)?.memory)
    }

    /// Decode one frame from the most recent window's code and the predicted
    /// memory. The decoder starts from a zero working state and the
    /// prediction as its memory state, and runs a single step.
    pub fn decode(&self, latest: Tensor<B, 4>, predicted: Tensor<B, 4>) -> Result<Tensor<B, 4>> {
        if latest.dims() != predicted.dims() {
            return Err(ConvLstmError::shape(
                "latest window code",
                &predicted.dims(),
                &latest.dims(),
            ));
        }

        // [B, C, H, W] -> [B, T = 1, C, H, W]
        let input = latest.unsqueeze_dim::<5>(1);
        let state = CellState::new(predicted.zeros_like(), predicted);

        let (_, states) = self.decoder.forward(input, Some(vec![state]))?;
        Ok(final_state(states)?.hidden)
    }

    /// Full pass: clip `[batch, channels, time, height, width]` to frame
    /// `[batch, hidden_channels, height, width]`.
    pub fn forward(&self, clip: Tensor<B, 5>) -> Result<Tensor<B, 4>> {
        log::debug!("MotionAutoEncoder forward: clip {:?}", clip.dims());

        let windows = self.windows(clip)?;
        let codes = self.encode_windows(windows)?;

        let latest_idx = codes.dims()[0] - 1;
        let latest = codes.clone().narrow(0, latest_idx, 1).squeeze::<4>(0);
        let predicted = self.predict_memory(codes)?;

        self.decode(latest, predicted)
    }
}

/// Last layer's state. Stacks always return at least one entry.
fn final_state<B: Backend, const D: usize>(
    mut states: Vec<CellState<B, D>>,
) -> Result<CellState<B, D>> {
    states.pop().ok_or(ConvLstmError::NoLayers)
}
