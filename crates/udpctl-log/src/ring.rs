use crate::error::{LogError, Result};

/// Smallest usable capacity. One slot always stays empty.
pub const MIN_CAPACITY: usize = 2;

/// Fixed-capacity circular store that overwrites its oldest entry.
///
/// `head` is the next write slot and `tail` the oldest live slot. The ring is
/// empty when they are equal, so at most `capacity - 1` entries are live.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    tail: usize,
}

impl<T> RingBuffer<T> {
    /// Preallocate `capacity` slots.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < MIN_CAPACITY {
            return Err(LogError::InvalidCapacity {
                capacity,
                min: MIN_CAPACITY,
            });
        }
        Ok(Self {
            slots: std::iter::repeat_with(|| None).take(capacity).collect(),
            head: 0,
            tail: 0,
        })
    }

    /// Write `item` at `head`. Returns the entry evicted to make room, if any.
    pub fn push(&mut self, item: T) -> Option<T> {
        self.slots[self.head] = Some(item);
        self.head = self.advance(self.head);
        if self.head == self.tail {
            let evicted = self.slots[self.tail].take();
            self.tail = self.advance(self.tail);
            return evicted;
        }
        None
    }

    /// Live entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let mut index = self.tail;
        std::iter::from_fn(move || {
            if index == self.head {
                return None;
            }
            let slot = self.slots[index].as_ref();
            index = self.advance(index);
            Some(slot)
        })
        .flatten()
    }

    pub fn len(&self) -> usize {
        (self.head + self.capacity() - self.tail) % self.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Maximum number of live entries.
    pub fn max_len(&self) -> usize {
        self.capacity() - 1
    }

    fn advance(&self, index: usize) -> usize {
        if index + 1 < self.capacity() {
            index + 1
        } else {
            0
        }
    }
}
