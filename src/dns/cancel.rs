/// Cancellation of long-running zone operations
///
/// A `CancelSignal` is shared between the thread that runs a save and any
/// thread that wants to stop it. Waiting on the signal doubles as the sleep
/// between polls, so cancelling wakes the saver immediately.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
struct Inner {
    cancelled: Mutex<bool>,
    wakeup: Condvar,
}

/// Cloneable handle; all clones observe the same cancellation
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    inner: Arc<Inner>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and wake every waiter
    pub fn cancel(&self) {
        let mut cancelled = self.inner.cancelled.lock();
        if !*cancelled {
            *cancelled = true;
            log::info!("Cancellation requested");
        }
        self.inner.wakeup.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.lock()
    }

    /// Sleep for up to `timeout`. Returns `true` if cancellation was
    /// requested before or during the wait.
    pub fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut cancelled = self.inner.cancelled.lock();
        while !*cancelled {
            match deadline {
                Some(deadline) => {
                    if self.inner.wakeup.wait_until(&mut cancelled, deadline).timed_out() {
                        break;
                    }
                }
                // Too far out to represent, wait for cancellation only
                None => self.inner.wakeup.wait(&mut cancelled),
            }
        }
        *cancelled
    }
}
