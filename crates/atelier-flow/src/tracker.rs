use parking_lot::Mutex;

use atelier_core::work::AnonymousWork;

use crate::traits::AnonWorkStore;

/// In-memory anonymous work store: a single last-write-wins slot.
///
/// Reconciliation consumes the slot at most once. Clearing an already-empty
/// slot is a no-op, so a second overlapping consumer simply observes "no
/// anonymous work" and falls through to the other landing branches.
#[derive(Default)]
pub struct AnonWorkTracker {
    slot: Mutex<Option<AnonymousWork>>,
}

impl AnonWorkTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tracker pre-populated with an optional snapshot.
    pub fn seeded(work: Option<AnonymousWork>) -> Self {
        Self {
            slot: Mutex::new(work),
        }
    }

    /// Replace the stored snapshot.
    pub fn record(&self, work: AnonymousWork) {
        *self.slot.lock() = Some(work);
    }
}

impl AnonWorkStore for AnonWorkTracker {
    fn get(&self) -> Option<AnonymousWork> {
        self.slot.lock().clone()
    }

    fn clear(&self) {
        *self.slot.lock() = None;
    }
}
