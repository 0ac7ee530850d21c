//! Simulation dynamics: integration, external forces, and the constraint solver.

pub mod forces;
pub mod integrator;
pub mod solver;

pub use forces::{AttractorForce, DragForce, ForceGenerator, ForceRegistry, WindForce};
pub use integrator::Integrator;
pub use solver::{ConstraintSolver, SolverStepMetrics};
