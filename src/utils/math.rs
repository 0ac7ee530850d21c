//! Small 2D helpers layered on top of `glam`.

use glam::Vec2;

/// True when both components are finite.
#[inline]
pub fn is_finite(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

/// Scales `v` down so its length is at most `max`. Non-positive `max` is treated as unbounded.
pub fn clamp_length(v: Vec2, max: f32) -> Vec2 {
    if max <= 0.0 || !max.is_finite() {
        return v;
    }
    let len_sq = v.length_squared();
    if len_sq > max * max {
        v * (max / len_sq.sqrt())
    } else {
        v
    }
}

/// Effective per-iteration stiffness so `iterations` Gauss–Seidel passes
/// converge as far as one pass at `stiffness` would with a single iteration.
pub fn per_iteration_stiffness(stiffness: f32, iterations: u32) -> f32 {
    let stiffness = stiffness.clamp(0.0, 1.0);
    if iterations <= 1 || stiffness >= 1.0 {
        return stiffness;
    }
    1.0 - (1.0 - stiffness).powf(1.0 / iterations as f32)
}
