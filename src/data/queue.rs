/// Fixed-capacity FIFO ring buffer.
///
/// The queue knows nothing about what it stores; callers are expected to serialize access and to
/// make room with [`Queue::pop`] before pushing into a full queue.
pub struct Queue<T> {
    content: Vec<Option<T>>,
    read_head: usize,
    write_head: usize,
    len: usize,
}

impl<T> Queue<T> {
    /// Creates an empty queue holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Queue<T> {
        let mut content = Vec::with_capacity(capacity);
        content.resize_with(capacity, || None);

        Queue {
            content,
            read_head: 0,
            write_head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize { self.content.len() }

    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }

    pub fn is_full(&self) -> bool { self.len >= self.content.len() }

    /// Adds an entry at the write end.
    ///
    /// Hands the entry back if the queue is full.
    pub fn push(&mut self, entry: T) -> Result<(), T> {
        if self.is_full() {
            return Err(entry);
        }

        self.content[self.write_head] = Some(entry);
        self.write_head = (self.write_head + 1) % self.content.len();
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the oldest entry, or `None` if the queue is empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let entry = self.content[self.read_head].take();
        self.read_head = (self.read_head + 1) % self.content.len();
        self.len -= 1;
        entry
    }

    /// Returns the oldest entry without removing it.
    pub fn peek(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }

        self.content[self.read_head].as_ref()
    }

    /// Iterates over the entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let capacity = self.content.len();
        (0..self.len).filter_map(move |i| self.content[(self.read_head + i) % capacity].as_ref())
    }

    pub fn clear(&mut self) {
        for slot in self.content.iter_mut() {
            *slot = None;
        }
        self.read_head = 0;
        self.write_head = 0;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::Queue;

    #[test]
    fn test_queue_fills_up() {
        let mut queue = Queue::new(3);
        assert!(queue.is_empty());
        assert!(!queue.is_full());

        assert!(queue.push(1).is_ok());
        assert!(queue.push(2).is_ok());
        assert!(queue.push(3).is_ok());
        assert!(queue.is_full());
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.push(4), Err(4));
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_queue_pop_makes_room() {
        let mut queue = Queue::new(2);
        queue.push("a").unwrap();
        queue.push("b").unwrap();
        assert!(queue.push("c").is_err());

        assert_eq!(queue.pop(), Some("a"));
        assert!(!queue.is_full());
        assert!(queue.push("c").is_ok());

        let drained: Vec<_> = queue.iter().cloned().collect();
        assert_eq!(drained, vec!["b", "c"]);
    }

    #[test]
    fn test_queue_empty_signals() {
        let mut queue: Queue<u8> = Queue::new(4);
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.peek(), None);

        queue.push(7).unwrap();
        assert_eq!(queue.peek(), Some(&7));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop(), Some(7));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_queue_wraps_around() {
        let mut queue = Queue::new(3);
        for round in 0..10 {
            queue.push(round).unwrap();
            if queue.is_full() {
                queue.pop();
            }
        }

        let values: Vec<_> = queue.iter().cloned().collect();
        assert_eq!(values, vec![8, 9]);
        assert_eq!(queue.peek(), Some(&8));
    }

    #[test]
    fn test_queue_zero_capacity() {
        let mut queue = Queue::new(0);
        assert!(queue.is_full());
        assert!(queue.is_empty());
        assert_eq!(queue.push(1), Err(1));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_queue_clear() {
        let mut queue = Queue::new(2);
        queue.push(1).unwrap();
        queue.push(2).unwrap();
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.push(3).is_ok());
        assert_eq!(queue.peek(), Some(&3));
    }
}
