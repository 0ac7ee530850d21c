//! Pointer events queued by input callbacks and consumed at frame start.

use std::{collections::VecDeque, sync::Arc};

use glam::Vec2;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Input pointer identity (mouse = 0, touches use their platform id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointerId(pub u32);

/// Positions are canvas device pixels until the runner maps them to world space.
/// `time` is in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerIntent {
    Grab { pointer: PointerId, position: Vec2, time: f64 },
    Move { pointer: PointerId, position: Vec2, time: f64 },
    Release { pointer: PointerId, position: Vec2, time: f64 },
    Cancel { pointer: PointerId },
}

impl PointerIntent {
    pub fn pointer(&self) -> PointerId {
        match *self {
            PointerIntent::Grab { pointer, .. }
            | PointerIntent::Move { pointer, .. }
            | PointerIntent::Release { pointer, .. }
            | PointerIntent::Cancel { pointer } => pointer,
        }
    }

    /// Same intent with its position passed through `f`.
    pub fn map_position(self, f: impl FnOnce(Vec2) -> Vec2) -> Self {
        match self {
            PointerIntent::Grab { pointer, position, time } => PointerIntent::Grab {
                pointer,
                position: f(position),
                time,
            },
            PointerIntent::Move { pointer, position, time } => PointerIntent::Move {
                pointer,
                position: f(position),
                time,
            },
            PointerIntent::Release { pointer, position, time } => PointerIntent::Release {
                pointer,
                position: f(position),
                time,
            },
            cancel @ PointerIntent::Cancel { .. } => cancel,
        }
    }
}

type SharedQueue = Arc<Mutex<VecDeque<PointerIntent>>>;

/// Cloneable handle for event callbacks. Never touches the world.
#[derive(Debug, Clone)]
pub struct IntentSender {
    queue: SharedQueue,
}

impl IntentSender {
    pub fn push(&self, intent: PointerIntent) {
        self.queue.lock().push_back(intent);
    }

    pub fn grab(&self, pointer: PointerId, position: Vec2, time: f64) {
        self.push(PointerIntent::Grab { pointer, position, time });
    }

    pub fn move_to(&self, pointer: PointerId, position: Vec2, time: f64) {
        self.push(PointerIntent::Move { pointer, position, time });
    }

    pub fn release(&self, pointer: PointerId, position: Vec2, time: f64) {
        self.push(PointerIntent::Release { pointer, position, time });
    }

    pub fn cancel(&self, pointer: PointerId) {
        self.push(PointerIntent::Cancel { pointer });
    }
}

/// FIFO of pending intents, drained once per frame by the runner.
#[derive(Debug, Default)]
pub struct IntentQueue {
    queue: SharedQueue,
}

impl IntentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sender(&self) -> IntentSender {
        IntentSender {
            queue: Arc::clone(&self.queue),
        }
    }

    /// Takes everything queued so far, oldest first.
    pub fn drain(&self) -> Vec<PointerIntent> {
        self.queue.lock().drain(..).collect()
    }

    pub fn clear(&self) {
        self.queue.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
