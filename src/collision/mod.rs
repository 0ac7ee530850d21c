//! Node–node contacts: grid broad-phase, circle narrow-phase, walls, and events.

pub mod broadphase;
pub mod contact;

pub use broadphase::{BroadPhase, SpatialGrid};
pub use contact::{CollisionEvent, Contact, ContactTracker};
