// Fixed-capacity ring buffer for rolling display windows
//
// Behaves like a drop-oldest circular buffer: once full, every push evicts the
// oldest element. Elements stay in arrival order, which is not necessarily
// device-timestamp order since the device clock can jump.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Counters describing a series' lifetime traffic
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesMetrics {
    pub total_pushed: u64,
    pub total_evicted: u64,
    pub current_size: usize,
    pub capacity: usize,
}

#[derive(Debug, Clone)]
pub struct BoundedSeries<T> {
    items: VecDeque<T>,
    capacity: usize,
    total_pushed: u64,
    total_evicted: u64,
}

impl<T> BoundedSeries<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            total_pushed: 0,
            total_evicted: 0,
        }
    }

    /// Append an item, returning the evicted oldest item when at capacity.
    pub fn push(&mut self, item: T) -> Option<T> {
        self.total_pushed += 1;
        if self.capacity == 0 {
            self.total_evicted += 1;
            return Some(item);
        }

        let evicted = if self.items.len() == self.capacity {
            self.total_evicted += 1;
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn metrics(&self) -> SeriesMetrics {
        SeriesMetrics {
            total_pushed: self.total_pushed,
            total_evicted: self.total_evicted,
            current_size: self.items.len(),
            capacity: self.capacity,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> BoundedSeries<T> {
    /// Owned copy of the contents, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}
