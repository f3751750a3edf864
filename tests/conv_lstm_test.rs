//! Tests for the multi-layer ConvLSTM stack

use burn::backend::NdArray;
use burn::nn::Initializer;
use burn::tensor::{Distribution, Tensor};
use convlstm_ae::prelude::*;

type Backend = NdArray<f32>;

fn max_abs_diff<const D: usize>(a: Tensor<Backend, D>, b: Tensor<Backend, D>) -> f32 {
    (a - b).abs().max().into_scalar()
}

#[test]
fn test_layer_count_follows_flag() {
    let device = Default::default();
    let input = Tensor::<Backend, 5>::zeros([2, 3, 3, 6, 6], &device);

    for layers in 1..=3 {
        for return_all in [false, true] {
            let stack = ConvLSTMConfig::new(3, 4, [3, 3], layers)
                .with_return_all_layers(return_all)
                .init::<Backend>(&device)
                .unwrap();

            let (outputs, states) = stack.forward(input.clone(), None).unwrap();
            let expected = if return_all { layers } else { 1 };

            assert_eq!(outputs.len(), expected);
            assert_eq!(states.len(), expected);
        }
    }
}

#[test]
fn test_scalar_kernel_is_config_error() {
    let device = Default::default();
    let result = ConvLSTMConfig::new(3, 3, [3, 3], 1)
        .with_kernel_size(KernelSize::Scalar(3))
        .init::<Backend>(&device);

    match result {
        Err(err) => {
            assert!(err.is_config());
            assert_eq!(err.to_string(), "kernel_size must be a pair or list of pairs");
        }
        Ok(_) => panic!("scalar kernel_size should be rejected"),
    }
}

#[test]
fn test_even_kernel_is_config_error() {
    let device = Default::default();
    let result = ConvLSTMConfig::new(3, 4, [2, 2], 1).init::<Backend>(&device);

    match result {
        Err(err) => {
            assert!(err.is_config());
            assert!(matches!(err, ConvLstmError::EvenKernel { kernel: [2, 2] }));
        }
        Ok(_) => panic!("even kernel_size should be rejected"),
    }

    let result = MotionAutoEncoderConfig::new()
        .with_kernel_size([3, 4])
        .init::<Backend>(&device);
    assert!(matches!(result, Err(ConvLstmError::EvenKernel { .. })));
}

#[test]
fn test_wrong_arity_kernel_json_is_config_error() {
    for kernel in ["[3, 3, 3]", "[3]", "[[3, 3], [3, 3, 3]]"] {
        let json = format!(
            r#"{{"input_channels": 3, "hidden_channels": 4, "kernel_size": {}, "num_layers": 1}}"#,
            kernel
        );
        match ConvLSTMConfig::from_json(&json) {
            Err(err) => {
                assert!(err.is_config());
                assert_eq!(err.to_string(), "kernel_size must be a pair or list of pairs");
            }
            Ok(_) => panic!("kernel_size {} should be rejected", kernel),
        }
    }
}

#[test]
fn test_inconsistent_lists_are_config_errors() {
    let device = Default::default();

    let result = ConvLSTMConfig::new(3, 4, [3, 3], 2)
        .with_hidden_channels(HiddenChannels::PerLayer(vec![4, 4]))
        .with_kernel_size(KernelSize::PerLayer(vec![[3, 3], [3, 3], [3, 3]]))
        .init::<Backend>(&device);
    assert!(matches!(result, Err(ConvLstmError::LayerCount { .. })));

    let result = ConvLSTMConfig::new(3, 4, [3, 3], 3)
        .with_hidden_channels(HiddenChannels::PerLayer(vec![4, 4, 4]))
        .init::<Backend>(&device);
    assert!(result.is_ok());
}

#[test]
fn test_per_layer_kernels_keep_spatial_dims() {
    let device = Default::default();
    let stack = ConvLSTMConfig::new(1, 2, [3, 3], 2)
        .with_hidden_channels(HiddenChannels::PerLayer(vec![2, 3]))
        .with_kernel_size(KernelSize::PerLayer(vec![[5, 5], [3, 1]]))
        .with_return_all_layers(true)
        .init::<Backend>(&device)
        .unwrap();

    let input = Tensor::<Backend, 5>::random(
        [1, 2, 1, 9, 7],
        Distribution::Uniform(0.0, 1.0),
        &device,
    );
    let (outputs, _) = stack.forward(input, None).unwrap();

    assert_eq!(outputs[0].dims(), [1, 2, 2, 9, 7]);
    assert_eq!(outputs[1].dims(), [1, 2, 3, 9, 7]);
}

#[test]
fn test_continuation_matches_single_call() {
    let device = Default::default();
    let stack = ConvLSTMConfig::new(2, 4, [3, 3], 2)
        .with_hidden_channels(HiddenChannels::PerLayer(vec![4, 3]))
        .with_return_all_layers(true)
        .init::<Backend>(&device)
        .unwrap();

    let input = Tensor::<Backend, 5>::random(
        [2, 6, 2, 5, 5],
        Distribution::Uniform(-1.0, 1.0),
        &device,
    );

    let (full_outputs, full_states) = stack.forward(input.clone(), None).unwrap();

    let (_, mid_states) = stack.forward(input.clone().narrow(1, 0, 3), None).unwrap();
    let (tail_outputs, tail_states) = stack
        .forward(input.narrow(1, 3, 3), Some(mid_states))
        .unwrap();

    for layer in 0..2 {
        let full_tail = full_outputs[layer].clone().narrow(1, 3, 3);
        assert!(max_abs_diff(full_tail, tail_outputs[layer].clone()) < 1e-5);
        assert!(
            max_abs_diff(
                full_states[layer].memory.clone(),
                tail_states[layer].memory.clone()
            ) < 1e-5
        );
        assert!(
            max_abs_diff(
                full_states[layer].hidden.clone(),
                tail_states[layer].hidden.clone()
            ) < 1e-5
        );
    }
}

#[test]
fn test_time_major_matches_batch_major() {
    let device = Default::default();
    let config = ConvLSTMConfig::new(3, 4, [3, 3], 1);
    let batch_major = config.init::<Backend>(&device).unwrap();
    let time_major = batch_major.clone().with_batch_first(false);

    let input = Tensor::<Backend, 5>::random(
        [2, 4, 3, 5, 5],
        Distribution::Uniform(-1.0, 1.0),
        &device,
    );

    let (a, _) = batch_major.forward(input.clone(), None).unwrap();
    let (b, _) = time_major.forward(input.swap_dims(0, 1), None).unwrap();

    assert_eq!(
        a[0].clone().into_data().to_vec::<f32>().unwrap(),
        b[0].clone().into_data().to_vec::<f32>().unwrap()
    );
}

#[test]
fn test_forward_is_deterministic() {
    let device = Default::default();
    let stack = ConvLSTMConfig::new(3, 5, [3, 3], 2)
        .with_hidden_channels(HiddenChannels::PerLayer(vec![5, 3]))
        .init::<Backend>(&device)
        .unwrap();

    let input = Tensor::<Backend, 5>::random(
        [1, 3, 3, 8, 8],
        Distribution::Uniform(-1.0, 1.0),
        &device,
    );

    let (first, _) = stack.forward(input.clone(), None).unwrap();
    let (second, _) = stack.forward(input, None).unwrap();

    assert_eq!(
        first[0].clone().into_data().to_vec::<f32>().unwrap(),
        second[0].clone().into_data().to_vec::<f32>().unwrap()
    );
}

#[test]
fn test_zero_weights_zero_output() {
    let device = Default::default();
    let stack = ConvLSTMConfig::new(3, 3, [3, 3], 2)
        .with_return_all_layers(true)
        .init_with::<Backend>(Initializer::Zeros, &device)
        .unwrap();

    let input = Tensor::<Backend, 5>::zeros([1, 4, 3, 6, 6], &device);
    let (outputs, states) = stack.forward(input, None).unwrap();

    for (output, state) in outputs.into_iter().zip(states) {
        assert_eq!(output.abs().sum().into_scalar(), 0.0);
        assert_eq!(state.memory.abs().sum().into_scalar(), 0.0);
    }
}

#[test]
fn test_grouped_matches_per_group_calls() {
    let device = Default::default();
    let stack = ConvLSTMConfig::new(3, 4, [3, 3], 1)
        .init::<Backend>(&device)
        .unwrap();

    let input = Tensor::<Backend, 6>::random(
        [3, 2, 4, 3, 5, 5],
        Distribution::Uniform(-1.0, 1.0),
        &device,
    );

    let (grouped_outputs, grouped_states) =
        stack.forward_grouped(input.clone(), None).unwrap();

    for g in 0..3 {
        let group = input.clone().narrow(0, g, 1).squeeze::<5>(0);
        let (outputs, states) = stack.forward(group, None).unwrap();

        let grouped_output = grouped_outputs[0].clone().narrow(0, g, 1).squeeze::<5>(0);
        let grouped_memory = grouped_states[0].memory.clone().narrow(0, g, 1).squeeze::<4>(0);

        assert!(max_abs_diff(grouped_output, outputs[0].clone()) < 1e-6);
        assert!(max_abs_diff(grouped_memory, states[0].memory.clone()) < 1e-6);
    }
}

#[test]
fn test_grouped_state_shape_checked() {
    let device = Default::default();
    let stack = ConvLSTMConfig::new(3, 4, [3, 3], 1)
        .init::<Backend>(&device)
        .unwrap();

    let input = Tensor::<Backend, 6>::zeros([2, 1, 2, 3, 4, 4], &device);
    let wrong = vec![CellState::<Backend, 5>::zeros([3, 1, 4, 4, 4], &device)];

    assert!(matches!(
        stack.forward_grouped(input, Some(wrong)),
        Err(ConvLstmError::Shape { .. })
    ));
}

#[test]
fn test_grouped_time_major_matches_batch_major() {
    let device = Default::default();
    let batch_major = ConvLSTMConfig::new(3, 4, [3, 3], 2)
        .init::<Backend>(&device)
        .unwrap();
    let time_major = batch_major.clone().with_batch_first(false);

    // [groups, batch, time, C, H, W]
    let input = Tensor::<Backend, 6>::random(
        [2, 3, 4, 3, 5, 5],
        Distribution::Uniform(-1.0, 1.0),
        &device,
    );

    let (a_outputs, a_states) = batch_major.forward_grouped(input.clone(), None).unwrap();
    let (b_outputs, b_states) = time_major
        .forward_grouped(input.swap_dims(1, 2), None)
        .unwrap();

    assert_eq!(b_outputs[0].dims(), [2, 3, 4, 4, 5, 5]);
    assert!(max_abs_diff(a_outputs[0].clone(), b_outputs[0].clone()) < 1e-6);
    assert!(max_abs_diff(a_states[0].hidden.clone(), b_states[0].hidden.clone()) < 1e-6);
    assert!(max_abs_diff(a_states[0].memory.clone(), b_states[0].memory.clone()) < 1e-6);
}

#[test]
fn test_grouped_state_mismatch_reports_offending_tensor() {
    let device = Default::default();
    let stack = ConvLSTMConfig::new(3, 4, [3, 3], 1)
        .init::<Backend>(&device)
        .unwrap();
    let input = Tensor::<Backend, 6>::zeros([2, 1, 2, 3, 4, 4], &device);

    let wrong_hidden = CellState::new(
        Tensor::<Backend, 5>::zeros([3, 1, 4, 4, 4], &device),
        Tensor::<Backend, 5>::zeros([2, 1, 4, 4, 4], &device),
    );
    match stack.forward_grouped(input.clone(), Some(vec![wrong_hidden])) {
        Err(ConvLstmError::Shape { what, got, .. }) => {
            assert!(what.contains("hidden"));
            assert_eq!(got, vec![3, 1, 4, 4, 4]);
        }
        other => panic!("expected Shape error, got {:?}", other.map(|_| ())),
    }

    let wrong_memory = CellState::new(
        Tensor::<Backend, 5>::zeros([2, 1, 4, 4, 4], &device),
        Tensor::<Backend, 5>::zeros([2, 1, 4, 5, 5], &device),
    );
    match stack.forward_grouped(input, Some(vec![wrong_memory])) {
        Err(ConvLstmError::Shape { what, got, .. }) => {
            assert!(what.contains("memory"));
            assert_eq!(got, vec![2, 1, 4, 5, 5]);
        }
        other => panic!("expected Shape error, got {:?}", other.map(|_| ())),
    }
}
