use std::collections::VecDeque;
use std::io::Read;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use tracing::trace;

/// How long a read parks waiting for notification data before reporting
/// `WouldBlock`. Short enough that a polling loop above can still observe
/// its own deadline.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

struct Shared {
    state: Mutex<State>,
    available: Condvar,
}

struct State {
    buf: VecDeque<u8>,
    closed: bool,
}

/// Thread-safe byte queue bridging push-style transports into `Read`.
///
/// Asynchronous transports deliver inbound bytes from a callback on their own
/// thread or event loop. The callback side clones the buffer and calls
/// [`push`](NotifyBuffer::push); the consumer side reads. A read drains
/// whatever is buffered immediately, otherwise parks up to the poll interval
/// and then returns `WouldBlock`. After [`close`](NotifyBuffer::close), reads
/// drain the remaining bytes and then return `Ok(0)`.
#[derive(Clone)]
pub struct NotifyBuffer {
    shared: Arc<Shared>,
    poll_interval: Duration,
}

impl NotifyBuffer {
    /// Create an empty buffer with the default poll interval.
    pub fn new() -> Self {
        Self::with_poll_interval(DEFAULT_POLL_INTERVAL)
    }

    /// Create an empty buffer with an explicit poll interval.
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    buf: VecDeque::new(),
                    closed: false,
                }),
                available: Condvar::new(),
            }),
            poll_interval,
        }
    }

    /// Append notification bytes. Safe to call from any thread.
    ///
    /// Bytes pushed after `close` are discarded.
    pub fn push(&self, data: &[u8]) {
        let mut state = self.lock_state();
        if state.closed {
            trace!(len = data.len(), "discarding push after close");
            return;
        }
        state.buf.extend(data);
        self.shared.available.notify_one();
    }

    /// Number of buffered bytes not yet read.
    pub fn pending(&self) -> usize {
        self.lock_state().buf.len()
    }

    /// Mark the channel closed. Readers drain what is buffered, then see EOF.
    pub fn close(&self) {
        let mut state = self.lock_state();
        state.closed = true;
        self.shared.available.notify_all();
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, State> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for NotifyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Read for NotifyBuffer {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut state = self.lock_state();
        if state.buf.is_empty() && !state.closed {
            let (guard, _timeout) = self
                .shared
                .available
                .wait_timeout(state, self.poll_interval)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            state = guard;
        }

        if state.buf.is_empty() {
            return if state.closed {
                Ok(0)
            } else {
                Err(std::io::Error::from(std::io::ErrorKind::WouldBlock))
            };
        }

        let n = state.buf.len().min(buf.len());
        for (slot, byte) in buf.iter_mut().zip(state.buf.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}
