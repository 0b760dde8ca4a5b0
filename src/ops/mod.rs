//! Whole-canvas pixel passes.

pub mod mix;
pub mod sample;
