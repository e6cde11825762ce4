//! Fixed-capacity slot pools with generation-counted handles.
//!
//! Categories, rows, and transactions live in pools sized at startup and are
//! returned to the free list on removal. Handles embed the slot generation so
//! a handle to a removed node stops resolving once the slot is reused.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::errors::{BudgetError, Result};

/// Index into a [`Pool`], valid only while the slot generation matches.
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot arena with a free list and a hard capacity.
#[derive(Debug)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    capacity: usize,
    kind: &'static str,
    live: usize,
}

impl<T> Pool<T> {
    pub fn with_capacity(kind: &'static str, capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            capacity,
            kind,
            live: 0,
        }
    }

    /// Allocates a slot for `value`, reusing freed slots first. Fails with a
    /// recoverable capacity error when the pool is full.
    pub fn insert(&mut self, value: T) -> Result<Handle<T>> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            self.live += 1;
            return Ok(Handle::new(index, slot.generation));
        }
        if self.slots.len() >= self.capacity {
            return Err(BudgetError::PoolExhausted {
                kind: self.kind,
                capacity: self.capacity,
            });
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        self.live += 1;
        Ok(Handle::new(index, 0))
    }

    /// Unlinks the value and returns the slot to the free list. Stale handles
    /// return `None`.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation || slot.value.is_none() {
            return None;
        }
        let value = slot.value.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
        value
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_mut()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut pool: Pool<String> = Pool::with_capacity("test", 4);
        let a = pool.insert("alpha".into()).unwrap();
        let b = pool.insert("beta".into()).unwrap();
        assert_eq!(pool.get(a).unwrap(), "alpha");
        assert_eq!(pool.get(b).unwrap(), "beta");
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn capacity_exceeded_is_an_error() {
        let mut pool: Pool<u32> = Pool::with_capacity("test", 2);
        pool.insert(1).unwrap();
        pool.insert(2).unwrap();
        let err = pool.insert(3).unwrap_err();
        assert!(matches!(
            err,
            BudgetError::PoolExhausted { capacity: 2, .. }
        ));
    }

    #[test]
    fn freed_slots_are_reusable_and_stale_handles_miss() {
        let mut pool: Pool<u32> = Pool::with_capacity("test", 1);
        let first = pool.insert(10).unwrap();
        assert_eq!(pool.remove(first), Some(10));
        let second = pool.insert(20).unwrap();
        assert_eq!(pool.get(first), None);
        assert_eq!(pool.remove(first), None);
        assert_eq!(pool.get(second), Some(&20));
    }
}
