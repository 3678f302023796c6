//! # Slot Pool
//!
//! Fixed-capacity slot array handing out the **lowest** free index.
//!
//! Light lists live here: the slot index is the handle returned to the
//! caller of an emission, so it must be small, stable for the list's
//! lifetime, and reused first-free once the list drains.

/// Handle to an occupied slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotHandle {
    index: usize,
}

impl SlotHandle {
    /// Wraps a raw slot index.
    #[inline]
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self { index }
    }

    /// The slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }
}

/// A fixed-capacity pool of optional values.
///
/// All storage is allocated up front; `insert` never grows it.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool: SlotPool<&str> = SlotPool::new(2);
/// let a = pool.insert("a").unwrap();
/// let b = pool.insert("b").unwrap();
/// assert!(pool.insert("c").is_none());
/// pool.remove(a);
/// assert_eq!(pool.insert("c"), Some(a)); // lowest free slot reused
/// ```
pub struct SlotPool<T> {
    storage: Box<[Option<T>]>,
    occupied: usize,
}

impl<T> SlotPool<T> {
    /// Creates a pool with `capacity` empty slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let storage: Vec<Option<T>> = (0..capacity).map(|_| None).collect();
        Self {
            storage: storage.into_boxed_slice(),
            occupied: 0,
        }
    }

    /// Total number of slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Number of occupied slots.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.occupied
    }

    /// Whether no slot is occupied.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Lowest free slot, if any.
    #[must_use]
    pub fn first_free(&self) -> Option<SlotHandle> {
        self.storage
            .iter()
            .position(Option::is_none)
            .map(SlotHandle::new)
    }

    /// Stores `value` in the lowest free slot.
    ///
    /// # Returns
    ///
    /// The slot handle, or None if the pool is full.
    pub fn insert(&mut self, value: T) -> Option<SlotHandle> {
        let handle = self.first_free()?;
        self.storage[handle.index] = Some(value);
        self.occupied += 1;
        Some(handle)
    }

    /// Replaces the value in an existing or empty slot.
    ///
    /// # Returns
    ///
    /// The previous value, or None if the slot was empty or out of range.
    pub fn replace(&mut self, handle: SlotHandle, value: T) -> Option<T> {
        let slot = self.storage.get_mut(handle.index)?;
        let previous = slot.replace(value);
        if previous.is_none() {
            self.occupied += 1;
        }
        previous
    }

    /// Empties a slot.
    ///
    /// # Returns
    ///
    /// The removed value, or None if the handle was invalid or empty.
    pub fn remove(&mut self, handle: SlotHandle) -> Option<T> {
        let value = self.storage.get_mut(handle.index)?.take()?;
        self.occupied -= 1;
        Some(value)
    }

    /// Gets a reference to an occupied slot.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: SlotHandle) -> Option<&T> {
        self.storage.get(handle.index)?.as_ref()
    }

    /// Gets a mutable reference to an occupied slot.
    #[inline]
    pub fn get_mut(&mut self, handle: SlotHandle) -> Option<&mut T> {
        self.storage.get_mut(handle.index)?.as_mut()
    }

    /// Empties every slot.
    pub fn clear(&mut self) {
        for slot in self.storage.iter_mut() {
            *slot = None;
        }
        self.occupied = 0;
    }

    /// Iterates over occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotHandle, &T)> {
        self.storage
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|v| (SlotHandle::new(index), v)))
    }

    /// Iterates mutably over occupied slots in index order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotHandle, &mut T)> {
        self.storage
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_mut().map(|v| (SlotHandle::new(index), v)))
    }
}
