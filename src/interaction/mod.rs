//! Pointer input: queued intents, grab/drag/fling, and canvas-to-world mapping.

pub mod intent;
pub mod pointer;
pub mod view;

pub use intent::{IntentQueue, IntentSender, PointerId, PointerIntent};
pub use pointer::{PointerGrab, PointerLayer, PointerSample, Release};
pub use view::{ViewTransform, Viewport};
