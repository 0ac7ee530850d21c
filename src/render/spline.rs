//! Cardinal spline sampling through chain nodes.
//!
//! `tension` scales the tangent `m_i = tension * (p[i+1] - p[i-1])`, so 0.5 gives
//! a Catmull-Rom curve and 0 gives straight segments with eased spacing.

use glam::Vec2;

use crate::render::style::Smoothing;

fn hermite(p0: Vec2, m0: Vec2, p1: Vec2, m1: Vec2, t: f32) -> Vec2 {
    let t2 = t * t;
    let t3 = t2 * t;
    p0 * (2.0 * t3 - 3.0 * t2 + 1.0)
        + m0 * (t3 - 2.0 * t2 + t)
        + p1 * (-2.0 * t3 + 3.0 * t2)
        + m1 * (t3 - t2)
}

fn tangents(points: &[Vec2], closed: bool, tension: f32) -> Vec<Vec2> {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (prev, next) = if closed {
                (points[(i + n - 1) % n], points[(i + 1) % n])
            } else {
                (points[i.saturating_sub(1)], points[(i + 1).min(n - 1)])
            };
            (next - prev) * tension
        })
        .collect()
}

/// Samples the curve through `points`.
///
/// Every input point appears in the output. Open curves end on the last
/// point; closed curves do not repeat the first point.
pub fn cardinal(points: &[Vec2], closed: bool, tension: f32, samples_per_segment: u32) -> Vec<Vec2> {
    let n = points.len();
    if n < 2 {
        return points.to_vec();
    }
    let samples = samples_per_segment.max(1);
    let segments = if closed { n } else { n - 1 };
    let m = tangents(points, closed, tension);

    let mut out = Vec::with_capacity(segments * samples as usize + 1);
    for i in 0..segments {
        let j = (i + 1) % n;
        out.push(points[i]);
        for k in 1..samples {
            let t = k as f32 / samples as f32;
            out.push(hermite(points[i], m[i], points[j], m[j], t));
        }
    }
    if !closed {
        out.push(points[n - 1]);
    }
    out
}

/// Applies a chain's [`Smoothing`] setting.
pub fn smooth(points: &[Vec2], closed: bool, smoothing: Smoothing) -> Vec<Vec2> {
    match smoothing {
        Smoothing::Linear => points.to_vec(),
        Smoothing::CatmullRom {
            samples_per_segment,
            tension,
        } => cardinal(points, closed, tension, samples_per_segment),
    }
}
