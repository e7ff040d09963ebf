//! A bounded queue of unsigned 16-bit values.
//!
//! Backed by a heap allocated [`CircularBuffer`]. Unlike the buffer itself, the queue
//! never overwrites unread data: a full queue rejects further values with
//! [`QueueError::Overflow`], and reading an empty queue yields [`QueueError::Underflow`].

use circular_buffer::CircularBuffer;

use crate::error::QueueError;

pub struct Queue<const N: usize> {
    buffer: Box<CircularBuffer<N, u16>>,
}

impl<const N: usize> Queue<N> {
    pub fn new() -> Self {
        Self {
            buffer: CircularBuffer::boxed(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Adds a value at the back of the queue.
    pub fn enqueue(&mut self, value: u16) -> Result<(), QueueError> {
        if self.buffer.is_full() {
            return Err(QueueError::Overflow { capacity: N });
        }
        self.buffer.push_back(value);
        Ok(())
    }

    /// Removes the value at the front of the queue.
    pub fn dequeue(&mut self) -> Result<u16, QueueError> {
        self.buffer.pop_front().ok_or(QueueError::Underflow)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl<const N: usize> Default for Queue<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = Queue::<4>::new();
        queue.enqueue(7).unwrap();
        queue.enqueue(8).unwrap();
        assert_eq!(queue.dequeue(), Ok(7));
        assert_eq!(queue.dequeue(), Ok(8));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_wraps_around() {
        let mut queue = Queue::<3>::new();
        for round in 0..10u16 {
            queue.enqueue(round).unwrap();
            queue.enqueue(round + 100).unwrap();
            assert_eq!(queue.dequeue(), Ok(round));
            assert_eq!(queue.dequeue(), Ok(round + 100));
        }
        assert_eq!(queue.len(), 0);
    }
}
