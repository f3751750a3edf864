use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::{Initializer, PaddingConfig2d};
use burn::tensor::activation;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::config::LayerConfig;

/// Working state `H` and memory state `C` of a convolutional LSTM cell.
///
/// Both tensors always share one shape. `D = 4` is the per-step layout
/// `[batch, hidden_channels, height, width]`; grouped stack calls return
/// `D = 5` states with a leading window-group axis.
#[derive(Clone, Debug)]
pub struct CellState<B: Backend, const D: usize = 4> {
    pub hidden: Tensor<B, D>,
    pub memory: Tensor<B, D>,
}

impl<B: Backend, const D: usize> CellState<B, D> {
    pub fn new(hidden: Tensor<B, D>, memory: Tensor<B, D>) -> Self {
        Self { hidden, memory }
    }

    /// Zero-filled state of the given shape.
    pub fn zeros(shape: [usize; D], device: &B::Device) -> Self {
        Self {
            hidden: Tensor::zeros(shape, device),
            memory: Tensor::zeros(shape, device),
        }
    }

    pub fn dims(&self) -> [usize; D] {
        self.hidden.dims()
    }
}

/// Activated gates of one cell step, each `[batch, hidden_channels, height, width]`.
#[derive(Clone, Debug)]
pub struct GateActivations<B: Backend> {
    pub input: Tensor<B, 4>,
    pub forget: Tensor<B, 4>,
    pub output: Tensor<B, 4>,
    pub candidate: Tensor<B, 4>,
}

/// Convolutional LSTM cell
///
/// Same equations as a fully connected LSTM, with the affine maps replaced by
/// a single same-padded 2D convolution over `[x, h]`:
/// - i, f, o, g = split(conv([x, h]), 4)
/// - c' = σ(f) * c + σ(i) * tanh(g)
/// - h' = σ(o) * tanh(c')
#[derive(Module, Debug)]
pub struct ConvLSTMCell<B: Backend> {
    input_channels: usize,
    hidden_channels: usize,
    kernel_size: [usize; 2],
    conv: Conv2d<B>, // [input + hidden] -> 4 * hidden channels
}

impl<B: Backend> ConvLSTMCell<B> {
    /// Create a new cell with Burn's default convolution initializer
    ///
    /// # Arguments
    /// * `input_channels` - Channels of the input feature map
    /// * `hidden_channels` - Channels of the hidden and memory states
    /// * `kernel_size` - `[kh, kw]` of the gate convolution
    /// * `bias` - Whether the convolution carries a bias
    /// * `device` - Device to create the module on
    pub fn new(
        input_channels: usize,
        hidden_channels: usize,
        kernel_size: [usize; 2],
        bias: bool,
        device: &B::Device,
    ) -> Self {
        let layer = LayerConfig {
            input_channels,
            hidden_channels,
            kernel_size,
            bias,
        };
        Self::from_layer(&layer, None, device)
    }

    /// Build the cell for a resolved layer, optionally overriding the
    /// initializer used for the convolution weight and bias.
    pub fn from_layer(
        layer: &LayerConfig,
        initializer: Option<Initializer>,
        device: &B::Device,
    ) -> Self {
        let [pad_h, pad_w] = layer.padding();
        let mut conv_config = Conv2dConfig::new(
            [
                layer.input_channels + layer.hidden_channels,
                4 * layer.hidden_channels,
            ],
            layer.kernel_size,
        )
        .with_padding(PaddingConfig2d::Explicit(pad_h, pad_w))
        .with_bias(layer.bias);
        if let Some(initializer) = initializer {
            conv_config = conv_config.with_initializer(initializer);
        }

        Self {
            input_channels: layer.input_channels,
            hidden_channels: layer.hidden_channels,
            kernel_size: layer.kernel_size,
            conv: conv_config.init(device),
        }
    }

    pub fn input_channels(&self) -> usize {
        self.input_channels
    }

    pub fn hidden_channels(&self) -> usize {
        self.hidden_channels
    }

    pub fn kernel_size(&self) -> [usize; 2] {
        self.kernel_size
    }

    /// The gate convolution
    pub fn conv(&self) -> &Conv2d<B> {
        &self.conv
    }

    /// Zero state for a `[batch, hidden_channels, height, width]` map on `device`.
    pub fn init_state(
        &self,
        batch_size: usize,
        height: usize,
        width: usize,
        device: &B::Device,
    ) -> CellState<B> {
        CellState::zeros([batch_size, self.hidden_channels, height, width], device)
    }

    /// Compute the four activated gates for `input` and the previous working state
    pub fn gates(&self, input: Tensor<B, 4>, hidden: Tensor<B, 4>) -> GateActivations<B> {
        let combined = Tensor::cat(vec![input, hidden], 1);
        let combined_conv = self.conv.forward(combined);

        // Split into 4 gates
        let chunks = combined_conv.chunk(4, 1);
        let input_gate = chunks[0].clone(); // i
        let forget_gate = chunks[1].clone(); // f
        let output_gate = chunks[2].clone(); // o
        let candidate = chunks[3].clone(); // g

        GateActivations {
            input: activation::sigmoid(input_gate),
            forget: activation::sigmoid(forget_gate),
            output: activation::sigmoid(output_gate),
            candidate: candidate.tanh(),
        }
    }

    /// Advance the cell by one time step
    ///
    /// # Arguments
    /// * `input` - Input map of shape `[batch, input_channels, height, width]`
    /// * `state` - Previous state, each of shape `[batch, hidden_channels, height, width]`
    ///
    /// # Returns
    /// The next state; its `hidden` tensor is the cell output
    pub fn step(&self, input: Tensor<B, 4>, state: CellState<B>) -> CellState<B> {
        let CellState { hidden, memory } = state;
        let gates = self.gates(input, hidden);

        let memory = gates.forget * memory + gates.input * gates.candidate;
        let hidden = gates.output * memory.clone().tanh();

        CellState::new(hidden, memory)
    }
}
