//! Basic usage example of the ConvLSTM stack and the motion autoencoder
//!
//! Run with `cargo run --example basic`.

use burn::backend::NdArray;
use burn::tensor::{Distribution, Tensor};
use convlstm_ae::prelude::*;

fn main() -> Result<()> {
    println!("=== ConvLSTM Basic Example ===\n");

    // Use the NdArray backend (CPU)
    type Backend = NdArray<f32>;
    let device = Default::default();

    // Example 1: Two-layer stack, batch-first
    println!("Example 1: Batch-first sequence");
    let stack = ConvLSTMConfig::new(3, 16, [3, 3], 2)
        .with_hidden_channels(HiddenChannels::PerLayer(vec![16, 8]))
        .with_return_all_layers(true)
        .init::<Backend>(&device)?;

    // Input shape: [batch=2, time=5, channels=3, height=32, width=32]
    let input = Tensor::<Backend, 5>::random(
        [2, 5, 3, 32, 32],
        Distribution::Uniform(0.0, 1.0),
        &device,
    );
    let (outputs, states) = stack.forward(input.clone(), None)?;

    println!("  Input shape:  [2, 5, 3, 32, 32]");
    for (layer, (output, state)) in outputs.iter().zip(&states).enumerate() {
        println!(
            "  Layer {}: output {:?}, state {:?}",
            layer,
            output.dims(),
            state.dims()
        );
    }
    println!();

    // Example 2: Continue from the returned state
    println!("Example 2: Stateful continuation");
    let (outputs, _) = stack.forward(input, Some(states))?;
    println!("  Output shape: {:?}", outputs[1].dims());
    println!();

    // Example 3: Motion autoencoder on a 9-frame clip
    println!("Example 3: Motion autoencoder");
    let model = MotionAutoEncoderConfig::new().init::<Backend>(&device)?;
    println!("  Windows: {:?}", model.window_plan().ranges());

    // Clip shape: [batch=1, channels=3, time=9, height=64, width=64]
    let clip = Tensor::<Backend, 5>::random(
        [1, 3, 9, 64, 64],
        Distribution::Uniform(0.0, 1.0),
        &device,
    );
    let frame = model.forward(clip)?;
    println!("  Decoded frame shape: {:?}", frame.dims());

    println!("\n=== Example completed! ===");
    Ok(())
}
