//! Gating for resources that arrive after setup (fonts, samples, path data).
//!
//! Features read [`AssetSlot::get`] every frame and stay inactive until the
//! slot is `Ready`. A failed load is logged once and never retried.

use std::{fmt::Display, sync::Arc};

use log::{debug, warn};
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum AssetState<T> {
    Pending,
    Ready(T),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct AssetSlot<T> {
    name: String,
    state: AssetState<T>,
}

impl<T> AssetSlot<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: AssetState::Pending,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &AssetState<T> {
        &self.state
    }

    /// Settles a pending slot with a load result. Settled slots ignore later results.
    pub fn resolve<E: Display>(&mut self, result: Result<T, E>) -> bool {
        match result {
            Ok(value) => self.fulfill(value),
            Err(err) => self.fail(err),
        }
    }

    pub fn fulfill(&mut self, value: T) -> bool {
        if !self.is_pending() {
            debug!("asset '{}' already settled, ignoring value", self.name);
            return false;
        }
        self.state = AssetState::Ready(value);
        debug!("asset '{}' ready", self.name);
        true
    }

    pub fn fail(&mut self, reason: impl Display) -> bool {
        if !self.is_pending() {
            return false;
        }
        let reason = reason.to_string();
        warn!("asset '{}' failed to load: {reason}", self.name);
        self.state = AssetState::Failed(reason);
        true
    }

    pub fn get(&self) -> Option<&T> {
        match &self.state {
            AssetState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, AssetState::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, AssetState::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, AssetState::Failed(_))
    }
}

/// Shared slot a loader on another thread can settle.
#[derive(Debug)]
pub struct AssetHandle<T> {
    slot: Arc<Mutex<AssetSlot<T>>>,
}

impl<T> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> AssetHandle<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(AssetSlot::new(name))),
        }
    }

    pub fn resolve<E: Display>(&self, result: Result<T, E>) -> bool {
        self.slot.lock().resolve(result)
    }

    pub fn is_ready(&self) -> bool {
        self.slot.lock().is_ready()
    }

    pub fn is_failed(&self) -> bool {
        self.slot.lock().is_failed()
    }

    /// Runs `f` on the value if it is ready.
    pub fn with_ready<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.slot.lock().get().map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_until_resolved() {
        let mut slot: AssetSlot<u32> = AssetSlot::new("font");
        assert!(slot.is_pending());
        assert_eq!(slot.get(), None);
        assert!(slot.resolve::<String>(Ok(7)));
        assert_eq!(slot.get(), Some(&7));
    }

    #[test]
    fn failure_is_permanent() {
        let mut slot: AssetSlot<u32> = AssetSlot::new("sample");
        assert!(slot.fail("404"));
        assert!(!slot.fulfill(1));
        assert_eq!(slot.state(), &AssetState::Failed("404".to_string()));
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn handle_settles_from_another_thread() {
        let handle: AssetHandle<Vec<u8>> = AssetHandle::new("path");
        let loader = handle.clone();
        std::thread::spawn(move || loader.resolve::<String>(Ok(vec![1, 2, 3])))
            .join()
            .unwrap();
        assert_eq!(handle.with_ready(|bytes| bytes.len()), Some(3));
    }
}
