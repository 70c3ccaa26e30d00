//! Fixed-capacity undo stack.

use std::collections::VecDeque;

/// A stack that keeps at most `capacity` entries, dropping the oldest when full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Pushes `entry`, evicting the oldest entry if the stack is full. A zero capacity
    /// keeps nothing.
    pub fn push(&mut self, entry: T) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Removes and returns the most recent entry.
    pub fn pop(&mut self) -> Option<T> {
        self.entries.pop_back()
    }

    pub fn peek(&self) -> Option<&T> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_is_lifo() {
        let mut history = History::new(4);
        history.push(1);
        history.push(2);
        history.push(3);

        assert_eq!(history.peek(), Some(&3));
        assert_eq!(history.pop(), Some(3));
        assert_eq!(history.pop(), Some(2));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut history = History::new(2);
        for i in 0..5 {
            history.push(i);
        }

        assert_eq!(history.len(), 2);
        assert_eq!(history.pop(), Some(4));
        assert_eq!(history.pop(), Some(3));
        assert_eq!(history.pop(), None);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut history = History::new(0);
        history.push('a');

        assert!(history.is_empty());
        assert_eq!(history.capacity(), 0);
    }
}
