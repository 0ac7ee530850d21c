//! Attach/detach state machine over a single constraint.

use serde::{Deserialize, Serialize};

use crate::utils::allocator::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TetherState {
    /// Constraint active.
    Attached,
    /// Constraint disabled; the node moves freely.
    Detached,
}

/// What moves a tether between states on its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TetherPolicy {
    /// Only explicit `attach`/`detach` calls.
    Manual,
    /// Snap when stretched past `break_at`, re-pin once within `snap_within`.
    Distance { break_at: f32, snap_within: f32 },
    /// Re-attach `reattach_after` seconds after detaching.
    Timer { reattach_after: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tether {
    pub constraint: EntityId,
    pub policy: TetherPolicy,
    state: TetherState,
    detached_for: f32,
}

impl Tether {
    pub fn new(constraint: EntityId, policy: TetherPolicy) -> Self {
        Self {
            constraint,
            policy,
            state: TetherState::Attached,
            detached_for: 0.0,
        }
    }

    pub fn state(&self) -> TetherState {
        self.state
    }

    pub fn is_attached(&self) -> bool {
        self.state == TetherState::Attached
    }

    /// Seconds spent detached since the last transition.
    pub fn detached_for(&self) -> f32 {
        self.detached_for
    }

    pub(crate) fn set_state(&mut self, state: TetherState) -> bool {
        if self.state == state {
            return false;
        }
        self.state = state;
        self.detached_for = 0.0;
        true
    }

    /// Advances the policy given the constraint's current `length`.
    ///
    /// Returns the new state when a transition fired.
    pub fn evaluate(&mut self, length: f32, dt: f32) -> Option<TetherState> {
        if self.state == TetherState::Detached {
            self.detached_for += dt;
        }

        let next = match (self.state, self.policy) {
            (_, TetherPolicy::Manual) => None,
            (TetherState::Attached, TetherPolicy::Distance { break_at, .. })
                if length > break_at =>
            {
                Some(TetherState::Detached)
            }
            (TetherState::Detached, TetherPolicy::Distance { snap_within, .. })
                if length <= snap_within =>
            {
                Some(TetherState::Attached)
            }
            (TetherState::Detached, TetherPolicy::Timer { reattach_after })
                if self.detached_for >= reattach_after =>
            {
                Some(TetherState::Attached)
            }
            _ => None,
        }?;

        self.set_state(next).then_some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tether(policy: TetherPolicy) -> Tether {
        Tether::new(EntityId::new(0, 0), policy)
    }

    #[test]
    fn distance_policy_breaks_and_resnaps() {
        let mut t = tether(TetherPolicy::Distance {
            break_at: 100.0,
            snap_within: 20.0,
        });
        assert_eq!(t.evaluate(90.0, 0.1), None);
        assert_eq!(t.evaluate(120.0, 0.1), Some(TetherState::Detached));
        assert_eq!(t.evaluate(50.0, 0.1), None);
        assert_eq!(t.evaluate(10.0, 0.1), Some(TetherState::Attached));
    }

    #[test]
    fn timer_policy_reattaches() {
        let mut t = tether(TetherPolicy::Timer { reattach_after: 0.5 });
        assert!(t.set_state(TetherState::Detached));
        assert_eq!(t.evaluate(0.0, 0.25), None);
        assert_eq!(t.evaluate(0.0, 0.25), Some(TetherState::Attached));
        assert_eq!(t.detached_for(), 0.0);
    }

    #[test]
    fn manual_policy_never_fires() {
        let mut t = tether(TetherPolicy::Manual);
        assert_eq!(t.evaluate(1e9, 10.0), None);
        assert!(t.is_attached());
    }
}
