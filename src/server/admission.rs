//! Admission control
//!
//! Caps the number of live connections. A slot is reserved atomically before a
//! connection is admitted and released when its permit is dropped, so the
//! bound holds even when accepts and disconnects interleave.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Live connection counter with a fixed upper bound.
#[derive(Debug)]
pub struct AdmissionControl {
    live: AtomicUsize,
    capacity: usize,
}

impl AdmissionControl {
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            live: AtomicUsize::new(0),
            capacity,
        })
    }

    /// Reserves a slot, or returns `None` when the server is at capacity.
    pub fn try_admit(self: &Arc<Self>) -> Option<AdmissionPermit> {
        self.live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                (live < self.capacity).then_some(live + 1)
            })
            .ok()
            .map(|_| AdmissionPermit {
                control: Arc::clone(self),
            })
    }

    pub fn live_count(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A reserved connection slot. Dropping it decrements the live count.
#[derive(Debug)]
pub struct AdmissionPermit {
    control: Arc<AdmissionControl>,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.control.live.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_past_capacity() {
        let control = AdmissionControl::new(2);
        let first = control.try_admit().unwrap();
        let _second = control.try_admit().unwrap();
        assert!(control.try_admit().is_none());
        assert_eq!(control.live_count(), 2);

        drop(first);
        assert_eq!(control.live_count(), 1);
        assert!(control.try_admit().is_some());
    }

    #[test]
    fn test_concurrent_admission_never_exceeds_capacity() {
        let control = AdmissionControl::new(10);
        let permits: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..50)
                .map(|_| scope.spawn(|| control.try_admit()))
                .collect();
            handles
                .into_iter()
                .filter_map(|h| h.join().unwrap())
                .collect()
        });

        assert_eq!(permits.len(), 10);
        assert_eq!(control.live_count(), 10);
        drop(permits);
        assert_eq!(control.live_count(), 0);
    }
}
