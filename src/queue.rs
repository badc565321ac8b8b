use std::collections::VecDeque;

/// A first-in first-out queue.
///
/// Used by the tree to walk its nodes breadth first.
#[derive(Debug, Clone)]
pub struct Queue<T> {
    items: VecDeque<T>,
}

impl<T> Queue<T> {
    /// Creates an empty queue.
    /// No memory is allocated until the first item is enqueued.
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Creates an empty queue with room for at least `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// Returns true if the queue holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items in the queue.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Appends an item at the back of the queue.
    pub fn enqueue(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Removes the item at the front of the queue and returns it.
    pub fn dequeue(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Returns a reference to the item at the front of the queue.
    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Queue;

    #[test]
    fn test_fifo_order() {
        let mut queue = Queue::new();
        assert!(queue.is_empty());
        for value in 0..100 {
            queue.enqueue(value);
        }
        assert_eq!(queue.len(), 100);
        for value in 0..100 {
            assert_eq!(queue.front(), Some(&value));
            assert_eq!(queue.dequeue(), Some(value));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_empty() {
        let mut queue = Queue::<String>::with_capacity(4);
        assert!(queue.front().is_none());
        assert!(queue.dequeue().is_none());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_interleaved() {
        let mut queue = Queue::default();
        queue.enqueue('a');
        queue.enqueue('b');
        assert_eq!(queue.dequeue(), Some('a'));
        queue.enqueue('c');
        assert_eq!(queue.front(), Some(&'b'));
        assert_eq!(queue.dequeue(), Some('b'));
        assert_eq!(queue.dequeue(), Some('c'));
        assert_eq!(queue.dequeue(), None);
    }
}
