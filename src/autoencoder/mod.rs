//! # Motion-Aware Autoencoder
//!
//! Turns a short clip into a single decoded (segmented) frame with three
//! ConvLSTM stacks.
//!
//! ```text
//! clip [B, C, 9, H, W]
//!   │  WindowPlan::slice: {0,1,2} {2,3,4} {4,5,6} {6,7,8}
//!   ▼
//! windows [4, B, 3, C, H, W] ──motion encoder──▶ codes [4, B, Ch, H, W]
//!   codes[0..3] as a 3-step sequence ──motion predictor──▶ predicted C
//!   codes[3] + state (H = 0, C = predicted) ──decoder, 1 step──▶ H
//!   ▼
//! frame [B, Ch, H, W]
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use convlstm_ae::prelude::*;
//!
//! let model = MotionAutoEncoderConfig::new().init::<Backend>(&device)?;
//! let frame = model.forward(clip)?; // [1, 3, 512, 512]
//! ```

pub mod motion;
pub mod windows;

pub use motion::{MotionAutoEncoder, MotionAutoEncoderConfig};
pub use windows::WindowPlan;
