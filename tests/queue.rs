use pretty_assertions::assert_eq;
use roomwalk::error::QueueError;
use roomwalk::queue::Queue;
use speculoos::prelude::*;

#[test]
fn test_overflow_rejects_and_keeps_contents() {
    let mut queue = Queue::<3>::new();
    for value in [1, 2, 3] {
        queue.enqueue(value).unwrap();
    }

    assert_eq!(queue.enqueue(4), Err(QueueError::Overflow { capacity: 3 }));
    assert_eq!(queue.len(), 3);
    assert_eq!(queue.dequeue(), Ok(1));
    queue.enqueue(4).unwrap();

    let drained: Vec<u16> = std::iter::from_fn(|| queue.dequeue().ok()).collect();
    assert_eq!(drained, vec![2, 3, 4]);
}

#[test]
fn test_underflow() {
    let mut queue = Queue::<2>::new();
    assert_eq!(queue.dequeue(), Err(QueueError::Underflow));

    queue.enqueue(u16::MAX).unwrap();
    assert_eq!(queue.dequeue(), Ok(u16::MAX));
    assert_eq!(queue.dequeue(), Err(QueueError::Underflow));
}

#[test]
fn test_clear_empties_the_queue() {
    let mut queue = Queue::<4>::default();
    queue.enqueue(5).unwrap();
    queue.enqueue(6).unwrap();
    queue.clear();

    assert_that(&queue.is_empty()).is_true();
    assert_eq!(queue.capacity(), 4);
    assert_eq!(queue.dequeue(), Err(QueueError::Underflow));
}
