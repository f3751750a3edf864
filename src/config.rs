//! Serializable configuration for ConvLSTM stacks.
//!
//! `kernel_size` and `hidden_channels` may be given once for every layer or
//! per layer. They are normalized exactly once, in [`ConvLSTMConfig::layers`],
//! into a fixed-length list of [`LayerConfig`] entries.

use serde::{Deserialize, Serialize};

use crate::error::{ConvLstmError, Result};

/// Convolution kernel size as written in a configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KernelSize {
    /// One `[kh, kw]` pair shared by every layer
    Pair([usize; 2]),
    /// One `[kh, kw]` pair per layer
    PerLayer(Vec<[usize; 2]>),
    /// A bare number. Accepted by the parser only so it can be rejected
    /// with a configuration error.
    Scalar(usize),
    /// Anything else, such as `[3, 3, 3]` or `[3]`. Rejected like `Scalar`.
    Other(serde_json::Value),
}

impl KernelSize {
    fn for_layers(&self, num_layers: usize) -> Result<Vec<[usize; 2]>> {
        match self {
            KernelSize::Pair(pair) => Ok(vec![*pair; num_layers]),
            KernelSize::PerLayer(pairs) => Ok(pairs.clone()),
            KernelSize::Scalar(_) | KernelSize::Other(_) => Err(ConvLstmError::KernelShape),
        }
    }
}

/// Hidden channel count, either shared or per layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HiddenChannels {
    Uniform(usize),
    PerLayer(Vec<usize>),
}

impl HiddenChannels {
    fn for_layers(&self, num_layers: usize) -> Vec<usize> {
        match self {
            HiddenChannels::Uniform(channels) => vec![*channels; num_layers],
            HiddenChannels::PerLayer(channels) => channels.clone(),
        }
    }
}

/// Fully resolved settings of one layer's cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub input_channels: usize,
    pub hidden_channels: usize,
    pub kernel_size: [usize; 2],
    pub bias: bool,
}

impl LayerConfig {
    /// Same padding for the configured kernel.
    pub fn padding(&self) -> [usize; 2] {
        [self.kernel_size[0] / 2, self.kernel_size[1] / 2]
    }
}

fn default_true() -> bool {
    true
}

/// Configuration of a multi-layer [`ConvLSTM`](crate::rnn::ConvLSTM) stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvLSTMConfig {
    pub input_channels: usize,
    pub hidden_channels: HiddenChannels,
    pub kernel_size: KernelSize,
    pub num_layers: usize,
    /// `[batch, time, ...]` when true, `[time, batch, ...]` otherwise
    #[serde(default = "default_true")]
    pub batch_first: bool,
    #[serde(default = "default_true")]
    pub bias: bool,
    #[serde(default)]
    pub return_all_layers: bool,
}

impl ConvLSTMConfig {
    /// Stack whose layers all share `hidden_channels` and `kernel_size`.
    pub fn new(
        input_channels: usize,
        hidden_channels: usize,
        kernel_size: [usize; 2],
        num_layers: usize,
    ) -> Self {
        Self {
            input_channels,
            hidden_channels: HiddenChannels::Uniform(hidden_channels),
            kernel_size: KernelSize::Pair(kernel_size),
            num_layers,
            batch_first: true,
            bias: true,
            return_all_layers: false,
        }
    }

    pub fn with_hidden_channels(mut self, hidden_channels: HiddenChannels) -> Self {
        self.hidden_channels = hidden_channels;
        self
    }

    pub fn with_kernel_size(mut self, kernel_size: KernelSize) -> Self {
        self.kernel_size = kernel_size;
        self
    }

    pub fn with_batch_first(mut self, batch_first: bool) -> Self {
        self.batch_first = batch_first;
        self
    }

    pub fn with_bias(mut self, bias: bool) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_return_all_layers(mut self, return_all_layers: bool) -> Self {
        self.return_all_layers = return_all_layers;
        self
    }

    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.layers()?;
        Ok(config)
    }

    /// Broadcast and validate the per-layer settings.
    pub fn layers(&self) -> Result<Vec<LayerConfig>> {
        let kernel_sizes = self.kernel_size.for_layers(self.num_layers)?;
        if self.num_layers == 0 {
            return Err(ConvLstmError::NoLayers);
        }
        if self.input_channels == 0 {
            return Err(ConvLstmError::ZeroSized {
                field: "input_channels",
            });
        }

        let hidden = self.hidden_channels.for_layers(self.num_layers);
        if kernel_sizes.len() != self.num_layers {
            return Err(ConvLstmError::LayerCount {
                field: "kernel_size",
                got: kernel_sizes.len(),
                expected: self.num_layers,
            });
        }
        if hidden.len() != self.num_layers {
            return Err(ConvLstmError::LayerCount {
                field: "hidden_channels",
                got: hidden.len(),
                expected: self.num_layers,
            });
        }
        if kernel_sizes.iter().any(|k| k[0] == 0 || k[1] == 0) {
            return Err(ConvLstmError::ZeroSized {
                field: "kernel_size",
            });
        }
        // k / 2 padding only keeps height and width for odd kernels
        if let Some(kernel) = kernel_sizes.iter().find(|k| k[0] % 2 == 0 || k[1] % 2 == 0) {
            return Err(ConvLstmError::EvenKernel { kernel: *kernel });
        }
        if hidden.contains(&0) {
            return Err(ConvLstmError::ZeroSized {
                field: "hidden_channels",
            });
        }

        let mut layers = Vec::with_capacity(self.num_layers);
        let mut input_channels = self.input_channels;
        for (hidden_channels, kernel_size) in hidden.into_iter().zip(kernel_sizes) {
            layers.push(LayerConfig {
                input_channels,
                hidden_channels,
                kernel_size,
                bias: self.bias,
            });
            input_channels = hidden_channels;
        }
        Ok(layers)
    }
}
