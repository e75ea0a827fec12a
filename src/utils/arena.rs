use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Stable identifier for a live body.
///
/// Copyable and cheap to pass around. Generation-checked: once the body is
/// destroyed, lookups through the old handle miss instead of aliasing a
/// recycled slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Generational slot arena backing the body registry.
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    generations: Vec<u32>,
    free: VecDeque<usize>,
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
            generations: Vec::new(),
            free: VecDeque::new(),
        }
    }

    pub fn insert(&mut self, item: T) -> BodyHandle {
        if let Some(index) = self.free.pop_front() {
            let generation = self.generations[index];
            self.slots[index] = Some(item);
            return BodyHandle::new(index as u32, generation);
        }

        let index = self.slots.len();
        self.slots.push(Some(item));
        self.generations.push(0);
        BodyHandle::new(index as u32, 0)
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&T> {
        if self.is_valid(handle) {
            self.slots.get(handle.index()).and_then(|slot| slot.as_ref())
        } else {
            None
        }
    }

    /// Frees the slot and bumps its generation so the handle goes stale.
    pub fn remove(&mut self, handle: BodyHandle) -> Option<T> {
        if !self.is_valid(handle) {
            return None;
        }
        let slot = self.slots.get_mut(handle.index())?;
        if slot.is_some() {
            self.generations[handle.index()] = self.generations[handle.index()].wrapping_add(1);
            self.free.push_back(handle.index());
        }
        slot.take()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(|slot| slot.as_ref())
    }

    pub fn ids(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref()
                .map(|_| BodyHandle::new(index as u32, self.generations[index]))
        })
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    fn is_valid(&self, handle: BodyHandle) -> bool {
        self.generations
            .get(handle.index())
            .copied()
            .map(|generation| generation == handle.generation())
            .unwrap_or(false)
    }
}
