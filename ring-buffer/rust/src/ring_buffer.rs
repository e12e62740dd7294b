use std::{
    fmt::{self, Debug, Display, Formatter},
    iter::FusedIterator,
    marker::PhantomData,
};
use thiserror::Error;
use tracing::debug;

use crate::storage::{ArrayStorage, Storage};

/// Capacity used by [`RingBuffer::new`] and [`Default`]
pub const DEFAULT_CAPACITY: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RingBufferError {
    #[error("The ring buffer is empty")]
    Empty,
    #[error("Index {index} is out of range for a ring buffer of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

type Error = RingBufferError;
type Result<T> = std::result::Result<T, Error>;

/// Fixed capacity circular buffer that overwrites its oldest element once full.
///
/// Elements are addressed by logical index, `0` being the oldest element.
/// Live elements occupy the physical slots `[tail, tail + len) mod capacity`,
/// and `head == (tail + len) mod capacity` holds between operations.
#[derive(Clone)]
pub struct RingBuffer<T, S = ArrayStorage<T>> {
    storage: S,
    head: usize,
    tail: usize,
    len: usize,
    capacity: usize,
    _marker: PhantomData<T>,
}

impl<T, S: Storage<T>> RingBuffer<T, S> {
    /// Creates an empty `RingBuffer` holding up to [`DEFAULT_CAPACITY`] elements
    ///
    /// ```
    /// use ringbuf::RingBuffer;
    ///
    /// let rb = RingBuffer::<usize>::new();
    /// assert_eq!(10, rb.capacity());
    /// assert!(rb.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::from_storage(S::with_capacity(DEFAULT_CAPACITY))
    }

    /// Creates an empty `RingBuffer` holding up to `capacity` elements
    /// Returns `RingBufferError::InvalidArgument` if `capacity` is zero or cannot be allocated
    ///
    /// ```
    /// use ringbuf::RingBuffer;
    /// use ringbuf::storage::HashStorage;
    ///
    /// let rb = RingBuffer::<usize, HashStorage<usize>>::with_capacity(4).unwrap();
    /// assert_eq!(4, rb.capacity());
    /// assert!(RingBuffer::<usize>::with_capacity(0).is_err());
    /// ```
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self::from_storage(allocate::<T, S>(capacity)?))
    }

    /// Creates a `RingBuffer` of the given capacity and appends `elements` in order.
    /// When there are more elements than capacity, the leading ones are overwritten
    /// just as they would be by repeated [`RingBuffer::append`] calls.
    ///
    /// ```
    /// use ringbuf::RingBuffer;
    ///
    /// let rb = RingBuffer::<&str>::from_elements(3, ["a", "b", "c", "d"]).unwrap();
    /// assert_eq!("MAX 3: [b, c, d]", rb.to_string());
    /// ```
    pub fn from_elements<I>(capacity: usize, elements: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let mut rb = Self::with_capacity(capacity)?;
        rb.extend(elements);
        Ok(rb)
    }

    fn from_storage(storage: S) -> Self {
        let capacity = storage.capacity();
        Self {
            storage,
            head: 0,
            tail: 0,
            len: 0,
            capacity,
            _marker: PhantomData,
        }
    }

    /// Appends `elem` as the newest element, overwriting the oldest one when full
    pub fn append(&mut self, elem: T) {
        self.storage.set(self.head, elem);
        self.head = self.wrap_add(self.head, 1);

        if self.len < self.capacity {
            self.len += 1;
        } else {
            self.tail = self.wrap_add(self.tail, 1);
        }
    }

    /// Returns the oldest element
    /// Can return either of
    /// * `Result::Err(RingBufferError::Empty)`
    /// * `Result::Ok(&T)`
    pub fn first(&self) -> Result<&T> {
        if self.is_empty() {
            return Err(Error::Empty);
        }

        self.storage.get(self.tail).ok_or(Error::Empty)
    }

    /// Returns the newest element
    /// Can return either of
    /// * `Result::Err(RingBufferError::Empty)`
    /// * `Result::Ok(&T)`
    pub fn last(&self) -> Result<&T> {
        if self.is_empty() {
            return Err(Error::Empty);
        }

        self.storage.get(self.last_slot()).ok_or(Error::Empty)
    }

    /// Discards the oldest element. The slot keeps its value until overwritten.
    pub fn drop_first(&mut self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::Empty);
        }

        self.tail = self.wrap_add(self.tail, 1);
        self.len -= 1;
        Ok(())
    }

    /// Discards the newest element. The slot keeps its value until overwritten.
    pub fn drop_last(&mut self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::Empty);
        }

        self.head = self.last_slot();
        self.len -= 1;
        Ok(())
    }

    /// Removes and returns the oldest element
    ///
    /// ```
    /// use ringbuf::RingBuffer;
    ///
    /// let mut rb = RingBuffer::<usize>::from_elements(4, [1, 2]).unwrap();
    /// assert_eq!(Ok(1), rb.pop_first());
    /// assert_eq!(1, rb.len());
    /// ```
    pub fn pop_first(&mut self) -> Result<T> {
        if self.is_empty() {
            return Err(Error::Empty);
        }

        let value = self.storage.take(self.tail).ok_or(Error::Empty)?;
        self.tail = self.wrap_add(self.tail, 1);
        self.len -= 1;
        Ok(value)
    }

    /// Removes and returns the newest element
    pub fn pop_last(&mut self) -> Result<T> {
        if self.is_empty() {
            return Err(Error::Empty);
        }

        let slot = self.last_slot();
        let value = self.storage.take(slot).ok_or(Error::Empty)?;
        self.head = slot;
        self.len -= 1;
        Ok(value)
    }

    /// Returns the element at logical `index`, `0` being the oldest
    pub fn get(&self, index: usize) -> Result<&T> {
        let slot = self.slot_of(index)?;
        self.storage.get(slot).ok_or_else(|| self.out_of_range(index))
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let slot = self.slot_of(index)?;
        let err = self.out_of_range(index);
        self.storage.get_mut(slot).ok_or(err)
    }

    /// Replaces the element at logical `index`, only live positions can be set
    pub fn set(&mut self, index: usize, elem: T) -> Result<()> {
        let slot = self.slot_of(index)?;
        self.storage.set(slot, elem);
        Ok(())
    }

    pub fn contains(&self, elem: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|e| e == elem)
    }

    /// Removes the first occurrence of `elem`, or every occurrence when
    /// `all_occurrences` is set, keeping the order of the remaining elements.
    /// Returns how many elements were removed.
    ///
    /// ```
    /// use ringbuf::RingBuffer;
    ///
    /// let mut rb = RingBuffer::<usize>::from_elements(5, [1, 2, 1, 3, 1]).unwrap();
    /// assert_eq!(1, rb.remove_entry(&1, false));
    /// assert_eq!("MAX 5: [2, 1, 3, 1]", rb.to_string());
    /// assert_eq!(2, rb.remove_entry(&1, true));
    /// assert_eq!("MAX 5: [2, 3]", rb.to_string());
    /// ```
    pub fn remove_entry(&mut self, elem: &T, all_occurrences: bool) -> usize
    where
        T: PartialEq,
    {
        if self.is_empty() || !self.contains(elem) {
            return 0;
        }

        let mut removed = 0;
        self.rebuild(S::with_capacity(self.capacity), |_, value| {
            if value == *elem && (all_occurrences || removed == 0) {
                removed += 1;
                None
            } else {
                Some(value)
            }
        });

        removed
    }

    /// Removes and returns the element at logical `index`, keeping the order of the rest
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        self.slot_of(index)?;

        let mut removed = None;
        self.rebuild(S::with_capacity(self.capacity), |i, value| {
            if i == index {
                removed = Some(value);
                None
            } else {
                Some(value)
            }
        });

        removed.ok_or(Error::IndexOutOfRange {
            index,
            len: self.len,
        })
    }

    /// Changes the capacity, keeping as many elements as fit.
    /// When shrinking below the current length the oldest elements are kept
    /// and the newest are discarded.
    ///
    /// ```
    /// use ringbuf::RingBuffer;
    ///
    /// let mut rb = RingBuffer::<usize>::from_elements(3, [1, 2, 3]).unwrap();
    /// rb.resize(2).unwrap();
    /// assert_eq!("MAX 2: [1, 2]", rb.to_string());
    /// ```
    pub fn resize(&mut self, capacity: usize) -> Result<()> {
        check_capacity(capacity)?;
        if capacity == self.capacity {
            return Ok(());
        }

        let storage = allocate::<T, S>(capacity)?;
        let (from, len) = (self.capacity, self.len);
        self.rebuild(storage, |_, value| Some(value));
        debug!(
            from,
            to = capacity,
            discarded = len - self.len,
            "resized ring buffer"
        );

        Ok(())
    }

    /// Empties the buffer, keeping its capacity
    pub fn reset(&mut self) {
        self.storage.fill_empty();
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }

    /// Empties the buffer and changes its capacity
    pub fn reset_with_capacity(&mut self, capacity: usize) -> Result<()> {
        check_capacity(capacity)?;
        if capacity == self.capacity {
            self.reset();
            return Ok(());
        }

        let storage = allocate::<T, S>(capacity)?;
        debug!(from = self.capacity, to = capacity, "reset ring buffer");
        *self = Self::from_storage(storage);
        Ok(())
    }

    /// Returns the maximum number of elements of the `RingBuffer`
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of elements currently in the `RingBuffer`
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn has_elements(&self) -> bool {
        self.len > 0
    }

    /// Returns true when the next append overwrites the oldest element
    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Iterates from the oldest to the newest element
    pub fn iter(&self) -> Iter<'_, T, S> {
        Iter {
            rb: self,
            front: 0,
            back: self.len,
        }
    }

    /// Moves the live elements, oldest first, into the empty `storage` and adopts it.
    /// `keep` sees every logical index and value and returns the value to keep it.
    /// Stops once the new storage is full, the rest is dropped with the old storage.
    fn rebuild<F>(&mut self, mut storage: S, mut keep: F)
    where
        F: FnMut(usize, T) -> Option<T>,
    {
        let capacity = storage.capacity();
        let mut kept = 0;

        for index in 0..self.len {
            if kept == capacity {
                break;
            }

            let Some(value) = self.storage.take(self.physical(index)) else {
                continue;
            };
            if let Some(value) = keep(index, value) {
                storage.set(kept, value);
                kept += 1;
            }
        }

        self.storage = storage;
        self.capacity = capacity;
        self.tail = 0;
        self.len = kept;
        self.head = kept % capacity;
    }

    fn slot_of(&self, index: usize) -> Result<usize> {
        if index >= self.len {
            return Err(self.out_of_range(index));
        }

        Ok(self.physical(index))
    }

    fn out_of_range(&self, index: usize) -> Error {
        Error::IndexOutOfRange {
            index,
            len: self.len,
        }
    }

    #[inline(always)]
    fn physical(&self, index: usize) -> usize {
        self.wrap_add(self.tail, index)
    }

    #[inline(always)]
    fn last_slot(&self) -> usize {
        self.wrap_add(self.head, self.capacity - 1)
    }

    #[inline(always)]
    fn wrap_add(&self, index: usize, addend: usize) -> usize {
        (index + addend) % self.capacity
    }
}

fn allocate<T, S: Storage<T>>(capacity: usize) -> Result<S> {
    check_capacity(capacity)?;
    S::try_with_capacity(capacity).map_err(|err| {
        Error::InvalidArgument(format!("capacity {capacity} cannot be allocated: {err}"))
    })
}

fn check_capacity(capacity: usize) -> Result<()> {
    if capacity == 0 {
        return Err(Error::InvalidArgument(
            "capacity must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

impl<T, S: Storage<T>> Default for RingBuffer<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S: Storage<T>> Extend<T> for RingBuffer<T, S> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for elem in iter {
            self.append(elem);
        }
    }
}

/// Buffers are equal when both are empty, or when they share capacity and
/// hold equal elements in the same logical order. The storage backend is not compared.
impl<T, S, R> PartialEq<RingBuffer<T, R>> for RingBuffer<T, S>
where
    T: PartialEq,
    S: Storage<T>,
    R: Storage<T>,
{
    fn eq(&self, other: &RingBuffer<T, R>) -> bool {
        if self.is_empty() && other.is_empty() {
            return true;
        }

        self.capacity == other.capacity
            && self.len == other.len
            && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq, S: Storage<T>> Eq for RingBuffer<T, S> {}

impl<T: Display, S: Storage<T>> Display for RingBuffer<T, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "MAX {}: [", self.capacity)?;
        for (i, elem) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{elem}")?;
        }
        f.write_str("]")
    }
}

impl<T: Debug, S: Storage<T>> Debug for RingBuffer<T, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("elements", &Elements(self))
            .field("capacity", &self.capacity)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("len", &self.len)
            .finish()
    }
}

struct Elements<'a, T, S>(&'a RingBuffer<T, S>);

impl<T: Debug, S: Storage<T>> Debug for Elements<'_, T, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// Borrowing iterator over a [`RingBuffer`] in logical order
pub struct Iter<'a, T, S> {
    rb: &'a RingBuffer<T, S>,
    front: usize,
    back: usize,
}

impl<'a, T, S: Storage<T>> Iterator for Iter<'a, T, S> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }

        let rb = self.rb;
        let value = rb.storage.get(rb.physical(self.front));
        self.front += 1;
        value
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T, S: Storage<T>> DoubleEndedIterator for Iter<'_, T, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }

        self.back -= 1;
        let rb = self.rb;
        rb.storage.get(rb.physical(self.back))
    }
}

impl<T, S: Storage<T>> ExactSizeIterator for Iter<'_, T, S> {}

impl<T, S: Storage<T>> FusedIterator for Iter<'_, T, S> {}

impl<'a, T, S: Storage<T>> IntoIterator for &'a RingBuffer<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
