use std::sync::{Condvar, Mutex};

/// A set-once boolean. Once [`Signal::set`] is called, every past and future
/// call to [`Signal::wait`] returns immediately. Never clears.
#[derive(Default)]
pub struct Signal {
    state: Mutex<bool>,
    condvar: Condvar,
}

impl Signal {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Non-blocking read of the current state.
    pub fn poll(&self) -> bool {
        *self.state.lock().expect("signal mutex poisoned")
    }

    /// Blocks the calling thread until the signal is set.
    pub fn wait(&self) {
        let mut guard = self.state.lock().expect("signal mutex poisoned");
        while !*guard {
            guard = self.condvar.wait(guard).expect("signal mutex poisoned");
        }
    }

    /// Sets the signal and wakes every waiter. Idempotent.
    pub fn set(&self) {
        let mut guard = self.state.lock().expect("signal mutex poisoned");
        *guard = true;
        self.condvar.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn wait_returns_immediately_after_set() {
        let s = Signal::new();
        s.set();
        s.wait();
        assert!(s.poll());
    }

    #[test]
    fn wait_blocks_until_another_thread_sets() {
        let s = Arc::new(Signal::new());
        let s2 = Arc::clone(&s);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            s2.set();
        });
        assert!(!s.poll());
        s.wait();
        assert!(s.poll());
        handle.join().unwrap();
    }
}
