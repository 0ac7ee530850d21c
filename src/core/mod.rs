//! Core data: nodes, shapes, constraints, chains, and tethers.

pub mod chain;
pub mod constraints;
pub mod node;
pub mod shape;
pub mod tether;

pub use chain::{Chain, ChainBuilder};
pub use constraints::{Anchor, Constraint};
pub use node::{CollisionFilter, Node};
pub use shape::NodeShape;
pub use tether::{Tether, TetherPolicy, TetherState};
