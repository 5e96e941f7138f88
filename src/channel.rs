use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Blocking hand-off channel with latest-value-wins delivery.
///
/// `send` never blocks. `receive` waits for at least one buffered message,
/// takes the most recent one and throws away everything older. This makes
/// it a notification primitive, not a task queue: a slow receiver sees the
/// newest state, never a backlog.
pub struct Channel<T> {
    queue: Mutex<Vec<T>>,
    item_ready: Condvar,
}

impl<T> Channel<T> {
    pub const fn new() -> Self {
        Self {
            queue: Mutex::new(Vec::new()),
            item_ready: Condvar::new(),
        }
    }

    pub fn send(&self, message: T) {
        self.lock().push(message);
        self.item_ready.notify_one();
    }

    /// Blocks until a message is available, then returns the newest one.
    pub fn receive(&self) -> T {
        let mut queue = self.lock();
        loop {
            if let Some(message) = take_latest(&mut queue) {
                return message;
            }
            queue = self
                .item_ready
                .wait(queue)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like [`Channel::receive`], but gives up once `timeout` has passed.
    /// A timeout too large to put a deadline on waits like `receive`.
    pub fn receive_timeout(&self, timeout: Duration) -> Option<T> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return Some(self.receive());
        };
        let mut queue = self.lock();
        loop {
            if let Some(message) = take_latest(&mut queue) {
                return Some(message);
            }
            let remaining = deadline.checked_duration_since(Instant::now())?;
            if remaining.is_zero() {
                return None;
            }
            queue = self
                .item_ready
                .wait_timeout(queue, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    pub fn try_receive(&self) -> Option<T> {
        take_latest(&mut self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // push 와 drain 은 lock 안에서 끝나서 poison 되어도 버퍼는 온전함
    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn take_latest<T>(queue: &mut Vec<T>) -> Option<T> {
    let message = queue.pop()?;
    queue.clear();
    Some(message)
}
