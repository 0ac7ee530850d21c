use serde::{Deserialize, Serialize};
use std::fmt;

/// Generational handle for anything stored in an [`Arena`].
///
/// A handle stays valid until its slot is removed; after that the slot's
/// generation is bumped and the stale handle resolves to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    pub const NULL: EntityId = EntityId {
        index: u32::MAX,
        generation: 0,
    };

    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Generational arena with stable ids and index-ordered iteration.
///
/// Iteration always walks slots in index order, which keeps every pass over
/// the arena deterministic regardless of insertion/removal history.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> EntityId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return EntityId::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        EntityId::new(index, 0)
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.value.as_mut())
    }

    /// Mutable access to two distinct live entries at once.
    pub fn get2_mut(&mut self, a: EntityId, b: EntityId) -> Option<(&mut T, &mut T)> {
        if a.index() == b.index() || !self.contains(a) || !self.contains(b) {
            return None;
        }

        let (low, high, flipped) = if a.index() < b.index() {
            (a.index(), b.index(), false)
        } else {
            (b.index(), a.index(), true)
        };
        let (left, right) = self.slots.split_at_mut(high);
        let first = left[low].value.as_mut()?;
        let second = right[0].value.as_mut()?;

        if flipped {
            Some((second, first))
        } else {
            Some((first, second))
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation() {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(value)
    }

    /// Drops every entry. Outstanding ids become stale.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        // Lowest index is reused first, so a rebuilt world iterates in build order.
        self.free = (0..self.slots.len() as u32).rev().collect();
        self.live = 0;
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (EntityId::new(index as u32, slot.generation), value))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.value
                .as_mut()
                .map(|value| (EntityId::new(index as u32, generation), value))
        })
    }

    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.slots.iter().filter_map(|slot| slot.value.as_ref())
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.slots.iter_mut().filter_map(|slot| slot.value.as_mut())
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.iter().map(|(id, _)| id)
    }
}

#[cfg(feature = "parallel")]
impl<T: Send> Arena<T> {
    /// Runs `f` over every live value on the rayon pool.
    pub fn par_for_each_mut<F>(&mut self, f: F)
    where
        F: Fn(&mut T) + Send + Sync,
    {
        use rayon::prelude::*;

        self.slots
            .par_iter_mut()
            .filter_map(|slot| slot.value.as_mut())
            .for_each(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_ids_do_not_resolve_after_reuse() {
        let mut arena = Arena::new();
        let first = arena.insert("a");
        assert_eq!(arena.remove(first), Some("a"));

        let second = arena.insert("b");
        assert_eq!(first.index(), second.index());
        assert_ne!(first.generation(), second.generation());
        assert!(arena.get(first).is_none());
        assert_eq!(arena.get(second), Some(&"b"));
    }

    #[test]
    fn get2_mut_rejects_aliasing() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);
        assert!(arena.get2_mut(a, a).is_none());

        let (x, y) = arena.get2_mut(b, a).expect("distinct ids");
        assert_eq!((*x, *y), (2, 1));
    }

    #[test]
    fn clear_invalidates_everything() {
        let mut arena = Arena::new();
        let ids: Vec<_> = (0..4).map(|i| arena.insert(i)).collect();
        arena.clear();
        assert!(arena.is_empty());
        assert!(ids.iter().all(|id| !arena.contains(*id)));
    }
}
