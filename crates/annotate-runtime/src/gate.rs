//! Blocking hand-off between a caller waiting for an answer and the HTTP
//! handler that eventually supplies it.
//!
//! The signaled flag ([`GateLatch`]) lives inside the owner's locked cell,
//! so a state transition and the signal that announces it happen in the
//! same critical section. Waiting releases that lock atomically through the
//! condition variable, which rules out lost wake-ups.

use parking_lot::{Condvar, MutexGuard};

/// The signaled condition. Keep it under the same lock as the state it
/// announces.
#[derive(Debug, Default)]
pub struct GateLatch {
    signaled: bool,
}

impl GateLatch {
    pub fn is_signaled(&self) -> bool {
        self.signaled
    }
}

impl AsRef<GateLatch> for GateLatch {
    fn as_ref(&self) -> &GateLatch {
        self
    }
}

/// A reusable binary gate.
///
/// One logical waiter at a time. Callers must [`arm`](Self::arm) before
/// exposing the gate to a new waiter and again after each wait returns, so
/// a stray signal cannot release a later, unrelated wait.
#[derive(Debug, Default)]
pub struct SynchronizationGate {
    released: Condvar,
}

impl SynchronizationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the gate to the unsignaled condition.
    pub fn arm(&self, latch: &mut GateLatch) {
        latch.signaled = false;
    }

    /// Release the waiter. With no waiter, the next wait returns at once.
    pub fn signal(&self, latch: &mut GateLatch) {
        latch.signaled = true;
        self.released.notify_all();
    }

    /// Block until signaled. The guard's lock is released while blocked and
    /// held again on return. No timeout.
    pub fn wait<T: AsRef<GateLatch>>(&self, guard: &mut MutexGuard<'_, T>) {
        while !guard.as_ref().is_signaled() {
            self.released.wait(guard);
        }
    }

    /// Block until signaled or until `timeout` elapses. Returns whether the
    /// gate was signaled.
    #[cfg(test)]
    pub(crate) fn wait_for<T: AsRef<GateLatch>>(
        &self,
        guard: &mut MutexGuard<'_, T>,
        timeout: std::time::Duration,
    ) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        while !guard.as_ref().is_signaled() {
            if self.released.wait_until(guard, deadline).timed_out() {
                return guard.as_ref().is_signaled();
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_signal_before_wait_returns_immediately() {
        let gate = SynchronizationGate::new();
        let latch = Mutex::new(GateLatch::default());

        let mut guard = latch.lock();
        gate.signal(&mut guard);
        gate.wait(&mut guard);
        assert!(guard.is_signaled());
    }

    #[test]
    fn test_arm_clears_stray_signal() {
        let gate = SynchronizationGate::new();
        let latch = Mutex::new(GateLatch::default());

        let mut guard = latch.lock();
        gate.signal(&mut guard);
        gate.arm(&mut guard);
        assert!(!gate.wait_for(&mut guard, Duration::from_millis(20)));
    }

    #[test]
    fn test_signal_from_other_thread_releases_waiter() {
        let shared = Arc::new((SynchronizationGate::new(), Mutex::new(GateLatch::default())));

        let mut guard = shared.1.lock();
        shared.0.arm(&mut guard);

        let signaler = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                let mut guard = shared.1.lock();
                shared.0.signal(&mut guard);
            })
        };

        // The signaler can only take the lock once we are waiting.
        assert!(shared.0.wait_for(&mut guard, Duration::from_secs(5)));
        drop(guard);
        signaler.join().unwrap();
    }

    #[test]
    fn test_gate_is_reusable() {
        let shared = Arc::new((SynchronizationGate::new(), Mutex::new(GateLatch::default())));

        for _ in 0..3 {
            let mut guard = shared.1.lock();
            shared.0.arm(&mut guard);

            let shared2 = Arc::clone(&shared);
            let signaler = thread::spawn(move || {
                let mut guard = shared2.1.lock();
                shared2.0.signal(&mut guard);
            });

            assert!(shared.0.wait_for(&mut guard, Duration::from_secs(5)));
            shared.0.arm(&mut guard);
            drop(guard);
            signaler.join().unwrap();
        }
    }
}
