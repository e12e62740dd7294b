use std::collections::TryReserveError;

use rustc_hash::FxHashMap;

/// Fixed-size slot store addressed by position `0..capacity`.
///
/// A slot is either empty or holds exactly one value. Implementations know
/// nothing about ring semantics, callers are responsible for passing indices
/// inside `0..capacity`.
pub trait Storage<T>: Sized {
    /// Creates a store with `capacity` empty slots
    fn with_capacity(capacity: usize) -> Self;

    /// Like [`Storage::with_capacity`], but reports capacities that cannot be allocated
    fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError>;

    fn capacity(&self) -> usize;

    fn get(&self, index: usize) -> Option<&T>;

    fn get_mut(&mut self, index: usize) -> Option<&mut T>;

    /// Overwrites slot `index`, dropping whatever was there
    fn set(&mut self, index: usize, value: T);

    /// Moves the value out of slot `index`, leaving it empty
    fn take(&mut self, index: usize) -> Option<T>;

    /// Empties every slot
    fn fill_empty(&mut self);
}

/// Dense storage, one `Option<T>` per slot in a single allocation.
#[derive(Debug, Clone)]
pub struct ArrayStorage<T> {
    slots: Box<[Option<T>]>,
}

impl<T> Storage<T> for ArrayStorage<T> {
    fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        Self {
            slots: slots.into_boxed_slice(),
        }
    }

    fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;
        slots.resize_with(capacity, || None);

        Ok(Self {
            slots: slots.into_boxed_slice(),
        })
    }

    #[inline(always)]
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline(always)]
    fn get(&self, index: usize) -> Option<&T> {
        self.slots[index].as_ref()
    }

    #[inline(always)]
    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots[index].as_mut()
    }

    #[inline(always)]
    fn set(&mut self, index: usize, value: T) {
        self.slots[index] = Some(value);
    }

    #[inline(always)]
    fn take(&mut self, index: usize) -> Option<T> {
        self.slots[index].take()
    }

    fn fill_empty(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
    }
}

/// Sparse storage keyed by slot position. A missing key is an empty slot.
#[derive(Debug, Clone)]
pub struct HashStorage<T> {
    slots: FxHashMap<usize, T>,
    capacity: usize,
}

impl<T> Storage<T> for HashStorage<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
        }
    }

    fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut slots = FxHashMap::default();
        slots.try_reserve(capacity)?;

        Ok(Self { slots, capacity })
    }

    #[inline(always)]
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn get(&self, index: usize) -> Option<&T> {
        debug_assert!(index < self.capacity);
        self.slots.get(&index)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        debug_assert!(index < self.capacity);
        self.slots.get_mut(&index)
    }

    fn set(&mut self, index: usize, value: T) {
        debug_assert!(index < self.capacity);
        self.slots.insert(index, value);
    }

    fn take(&mut self, index: usize) -> Option<T> {
        debug_assert!(index < self.capacity);
        self.slots.remove(&index)
    }

    fn fill_empty(&mut self) {
        self.slots.clear();
    }
}
