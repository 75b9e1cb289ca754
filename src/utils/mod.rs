//! Shared helpers

pub mod image;
pub mod math;

use std::time::Instant;

/// Milliseconds elapsed since `start`
pub fn elapsed_ms(start: Instant) -> f32 {
    start.elapsed().as_secs_f32() * 1000.0
}
