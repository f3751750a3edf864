//! Multi-layer convolutional LSTM
//!
//! Runs a stack of [`ConvLSTMCell`]s over a 5D sequence of feature maps,
//! layer by layer: each layer consumes the full output sequence of the layer
//! below it.

use burn::module::Module;
use burn::nn::Initializer;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::cells::{CellState, ConvLSTMCell};
use crate::config::ConvLSTMConfig;
use crate::error::{ConvLstmError, Result};

/// Per-layer output sequences and per-layer final states of a stack call.
///
/// Both lists hold one entry per layer when `return_all_layers` is set and a
/// single entry (the last layer) otherwise.
pub type StackOutput<B> = (Vec<Tensor<B, 5>>, Vec<CellState<B>>);

/// [`StackOutput`] with a leading window-group axis on every tensor.
pub type GroupedStackOutput<B> = (Vec<Tensor<B, 6>>, Vec<CellState<B, 5>>);

/// Convolutional LSTM layer stack
///
/// # Type Parameters
/// * `B` - The backend type
#[derive(Module, Debug)]
pub struct ConvLSTM<B: Backend> {
    /// One cell per layer, built once at construction
    cells: Vec<ConvLSTMCell<B>>,
    /// Channels of the input sequence
    input_channels: usize,
    /// Whether input is `[batch, time, ...]` rather than `[time, batch, ...]`
    batch_first: bool,
    /// Whether to return every layer or only the last one
    return_all_layers: bool,
}

impl ConvLSTMConfig {
    /// Validate the configuration and build the stack with Burn's default
    /// convolution initializer.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<ConvLSTM<B>> {
        self.build(None, device)
    }

    /// Validate the configuration and build the stack, initializing every
    /// gate convolution (weights and bias) with `initializer`.
    pub fn init_with<B: Backend>(
        &self,
        initializer: Initializer,
        device: &B::Device,
    ) -> Result<ConvLSTM<B>> {
        self.build(Some(initializer), device)
    }

    fn build<B: Backend>(
        &self,
        initializer: Option<Initializer>,
        device: &B::Device,
    ) -> Result<ConvLSTM<B>> {
        let layers = self.layers()?;
        let cells = layers
            .iter()
            .map(|layer| ConvLSTMCell::from_layer(layer, initializer.clone(), device))
            .collect::<Vec<_>>();

        log::debug!(
            "built ConvLSTM: {} layer(s), input_channels={}, hidden={:?}, batch_first={}",
            cells.len(),
            self.input_channels,
            layers.iter().map(|l| l.hidden_channels).collect::<Vec<_>>(),
            self.batch_first
        );

        Ok(ConvLSTM {
            cells,
            input_channels: self.input_channels,
            batch_first: self.batch_first,
            return_all_layers: self.return_all_layers,
        })
    }
}

impl<B: Backend> ConvLSTM<B> {
    /// Get the number of stacked layers
    pub fn num_layers(&self) -> usize {
        self.cells.len()
    }

    /// Get the input channel count
    pub fn input_channels(&self) -> usize {
        self.input_channels
    }

    /// Get the hidden channel count of each layer
    pub fn hidden_channels(&self) -> Vec<usize> {
        self.cells.iter().map(|c| c.hidden_channels()).collect()
    }

    /// Set whether input is batch-first, keeping the weights
    pub fn with_batch_first(mut self, batch_first: bool) -> Self {
        self.batch_first = batch_first;
        self
    }

    /// Set whether to return every layer, keeping the weights
    pub fn with_return_all_layers(mut self, return_all_layers: bool) -> Self {
        self.return_all_layers = return_all_layers;
        self
    }

    pub fn batch_first(&self) -> bool {
        self.batch_first
    }

    pub fn return_all_layers(&self) -> bool {
        self.return_all_layers
    }

    /// The per-layer cells, indexed by layer
    pub fn cells(&self) -> &[ConvLSTMCell<B>] {
        &self.cells
    }

    /// Zero state for every layer.
    pub fn init_states(
        &self,
        batch_size: usize,
        height: usize,
        width: usize,
        device: &B::Device,
    ) -> Vec<CellState<B>> {
        self.cells
            .iter()
            .map(|cell| cell.init_state(batch_size, height, width, device))
            .collect()
    }

    /// Forward pass through every layer
    ///
    /// # Arguments
    /// * `input` - Input tensor of shape:
    ///   - `[batch, time, channels, height, width]` if batch_first=true
    ///   - `[time, batch, channels, height, width]` if batch_first=false
    /// * `state` - Optional initial state, one entry per layer, to continue a
    ///   previous sequence. Zero states are used when `None`.
    ///
    /// # Returns
    /// `(layer_outputs, last_states)`. Outputs are always batch-first:
    /// `[batch, time, hidden_channels, height, width]`.
    pub fn forward(
        &self,
        input: Tensor<B, 5>,
        state: Option<Vec<CellState<B>>>,
    ) -> Result<StackOutput<B>> {
        let input = if self.batch_first {
            input
        } else {
            // [time, batch, ...] -> [batch, time, ...]
            input.swap_dims(0, 1)
        };
        self.run(input, state)
    }

    /// Forward pass over several independent sequence groups at once
    ///
    /// The leading axis of `input` is a window-group axis kept separate from
    /// the true batch axis:
    /// - `[groups, batch, time, channels, height, width]` if batch_first=true
    /// - `[groups, time, batch, channels, height, width]` if batch_first=false
    ///
    /// Groups are folded into the batch for a single pass through the cells,
    /// then unfolded again, so outputs are `[groups, batch, time, ...]` and
    /// states are `[groups, batch, hidden_channels, height, width]`.
    pub fn forward_grouped(
        &self,
        input: Tensor<B, 6>,
        state: Option<Vec<CellState<B, 5>>>,
    ) -> Result<GroupedStackOutput<B>> {
        let input = if self.batch_first {
            input
        } else {
            input.swap_dims(1, 2)
        };
        let [groups, batch_size, seq_len, channels, height, width] = input.dims();
        let flat_batch = groups * batch_size;

        let state = match state {
            Some(states) => Some(
                states
                    .into_iter()
                    .map(|s| fold_groups(s, groups, batch_size))
                    .collect::<Result<Vec<_>>>()?,
            ),
            None => None,
        };

        let input = input.reshape([flat_batch, seq_len, channels, height, width]);
        let (layer_outputs, last_states) = self.run(input, state)?;

        let layer_outputs = layer_outputs
            .into_iter()
            .map(|output| {
                let [_, steps, hidden, h, w] = output.dims();
                output.reshape([groups, batch_size, steps, hidden, h, w])
            })
            .collect();
        let last_states = last_states
            .into_iter()
            .map(|s| unfold_groups(s, groups, batch_size))
            .collect();

        Ok((layer_outputs, last_states))
    }

    /// Layer-major recurrence over a batch-first input.
    fn run(&self, input: Tensor<B, 5>, state: Option<Vec<CellState<B>>>) -> Result<StackOutput<B>> {
        let [batch_size, seq_len, channels, height, width] = input.dims();
        if channels != self.input_channels {
            return Err(ConvLstmError::shape(
                "input channels",
                &[self.input_channels],
                &[channels],
            ));
        }
        if seq_len == 0 {
            return Err(ConvLstmError::EmptySequence);
        }

        let device = input.device();
        let states = match state {
            Some(states) => {
                self.check_states(&states, batch_size, height, width)?;
                states
            }
            None => self.init_states(batch_size, height, width, &device),
        };

        log::debug!(
            "ConvLSTM forward: batch={} steps={} layers={} size={}x{}",
            batch_size,
            seq_len,
            self.cells.len(),
            height,
            width
        );

        let mut layer_outputs = Vec::with_capacity(self.cells.len());
        let mut last_states = Vec::with_capacity(self.cells.len());
        let mut layer_input = input;

        for (layer_idx, (cell, mut state)) in self.cells.iter().zip(states).enumerate() {
            let mut outputs = Vec::with_capacity(seq_len);
            for t in 0..seq_len {
                // [batch, t, channels, h, w] -> [batch, channels, h, w]
                let step_input = layer_input.clone().narrow(1, t, 1).squeeze::<4>(1);
                state = cell.step(step_input, state);
                outputs.push(state.hidden.clone());
            }

            let layer_output: Tensor<B, 5> = Tensor::stack(outputs, 1);
            log::trace!("layer {} output {:?}", layer_idx, layer_output.dims());

            layer_input = layer_output.clone();
            layer_outputs.push(layer_output);
            last_states.push(state);
        }

        if !self.return_all_layers {
            let last = self.cells.len() - 1;
            layer_outputs.drain(..last);
            last_states.drain(..last);
        }

        Ok((layer_outputs, last_states))
    }

    fn check_states(
        &self,
        states: &[CellState<B>],
        batch_size: usize,
        height: usize,
        width: usize,
    ) -> Result<()> {
        if states.len() != self.cells.len() {
            return Err(ConvLstmError::shape(
                "initial state layers",
                &[self.cells.len()],
                &[states.len()],
            ));
        }
        for (cell, state) in self.cells.iter().zip(states) {
            let expected = [batch_size, cell.hidden_channels(), height, width];
            if state.hidden.dims() != expected {
                return Err(ConvLstmError::shape(
                    "initial hidden state",
                    &expected,
                    &state.hidden.dims(),
                ));
            }
            if state.memory.dims() != expected {
                return Err(ConvLstmError::shape(
                    "initial memory state",
                    &expected,
                    &state.memory.dims(),
                ));
            }
        }
        Ok(())
    }
}

fn fold_groups<B: Backend>(
    state: CellState<B, 5>,
    groups: usize,
    batch_size: usize,
) -> Result<CellState<B>> {
    let [g, b, channels, height, width] = state.dims();
    if [g, b] != [groups, batch_size] {
        return Err(ConvLstmError::shape(
            "grouped initial hidden state",
            &[groups, batch_size, channels, height, width],
            &state.hidden.dims(),
        ));
    }
    if state.memory.dims() != state.hidden.dims() {
        return Err(ConvLstmError::shape(
            "grouped initial memory state",
            &state.hidden.dims(),
            &state.memory.dims(),
        ));
    }
    let shape = [groups * batch_size, channels, height, width];
    Ok(CellState::new(
        state.hidden.reshape(shape),
        state.memory.reshape(shape),
    ))
}

fn unfold_groups<B: Backend>(
    state: CellState<B>,
    groups: usize,
    batch_size: usize,
) -> CellState<B, 5> {
    let [_, channels, height, width] = state.dims();
    let shape = [groups, batch_size, channels, height, width];
    CellState::new(state.hidden.reshape(shape), state.memory.reshape(shape))
}
