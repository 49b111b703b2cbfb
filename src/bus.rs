// Poller → render loop handoff primitives

use std::sync::{Mutex, MutexGuard};

/// Lock that survives a poisoned mutex; the protected values are plain data
/// and stay consistent even if a holder panicked.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Single-slot mailbox with latest-wins semantics. `publish` overwrites any
/// unconsumed value; `try_take` returns `None` when nothing new has arrived
/// since the last take. The lock is held only for the move in either
/// direction, so the render loop never waits on poller I/O.
#[derive(Debug, Default)]
pub struct SnapshotSlot<T> {
    pending: Mutex<Option<T>>,
}

impl<T> SnapshotSlot<T> {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(None),
        }
    }

    pub fn publish(&self, value: T) {
        *lock(&self.pending) = Some(value);
    }

    pub fn try_take(&self) -> Option<T> {
        lock(&self.pending).take()
    }
}

/// Shared current-value cell for state the render loop reads every frame
/// (WAN status, printer snapshot). Writers replace the whole value; readers
/// get a clone.
#[derive(Debug, Default)]
pub struct StateCell<T: Clone> {
    value: Mutex<T>,
}

impl<T: Clone> StateCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
        }
    }

    pub fn set(&self, value: T) {
        *lock(&self.value) = value;
    }

    /// Mutate in place under the lock; used where only some fields change.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut lock(&self.value));
    }

    pub fn get(&self) -> T {
        lock(&self.value).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_is_empty_until_published() {
        let slot: SnapshotSlot<u32> = SnapshotSlot::new();
        assert_eq!(slot.try_take(), None);
        slot.publish(7);
        assert_eq!(slot.try_take(), Some(7));
        assert_eq!(slot.try_take(), None);
    }

    #[test]
    fn slot_keeps_latest_only() {
        let slot = SnapshotSlot::new();
        slot.publish(1);
        slot.publish(2);
        assert_eq!(slot.try_take(), Some(2));
    }

    #[test]
    fn cell_roundtrips_updates() {
        let cell = StateCell::new(10u32);
        assert_eq!(cell.get(), 10);
        cell.set(11);
        cell.update(|v| *v += 1);
        assert_eq!(cell.get(), 12);
    }
}
