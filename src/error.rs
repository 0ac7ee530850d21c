//! Errors raised while building or mutating a simulation.

use crate::utils::allocator::EntityId;
use glam::Vec2;
use thiserror::Error;

/// Construction and lookup failures.
///
/// Per-frame trouble (degenerate geometry, missing assets, pointers that hit
/// nothing) is never an error; it is skipped and logged instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("stiffness must be in [0, 1], got {0}")]
    InvalidStiffness(f32),
    #[error("damping must be in [0, 1], got {0}")]
    InvalidDamping(f32),
    #[error("mass must be positive and finite, got {0}")]
    InvalidMass(f32),
    #[error("radius must be non-negative and finite, got {0}")]
    InvalidRadius(f32),
    #[error("segment spacing must be positive and finite, got {0}")]
    InvalidSpacing(f32),
    #[error("rest length must be non-negative and finite, got {0}")]
    InvalidRestLength(f32),
    #[error("point {index} is not finite")]
    NonFinitePoint { index: usize },
    #[error("{what} is not finite: {value}")]
    NonFiniteVector { what: &'static str, value: Vec2 },
    #[error("unknown node {0}")]
    UnknownNode(EntityId),
    #[error("unknown constraint {0}")]
    UnknownConstraint(EntityId),
    #[error("unknown chain {0}")]
    UnknownChain(EntityId),
    #[error("unknown tether {0}")]
    UnknownTether(EntityId),
    #[error("node {0} cannot be constrained to itself")]
    SelfConstraint(EntityId),
    #[error("sketch setup failed: {0}")]
    Setup(String),
}

pub type SimResult<T> = Result<T, SimError>;

pub(crate) fn check_unit(value: f32, err: fn(f32) -> SimError) -> SimResult<f32> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(err(value))
    }
}
