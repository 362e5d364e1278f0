use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type SlotMap = DashMap<String, Arc<Mutex<()>>>;

/// Reference-counted registry of per-identity locks
///
/// A slot is created on first use and removed as soon as the last holder
/// or waiter for that identity goes away, so the map never grows beyond
/// the number of identities currently in flight.
#[derive(Debug, Clone, Default)]
pub struct IdentityLocks {
    slots: Arc<SlotMap>,
}

impl IdentityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access for `identity`
    ///
    /// Dropping the returned guard releases the lock. Dropping the future
    /// before it resolves gives up the place in line and still cleans up.
    pub async fn lock(&self, identity: &str) -> IdentityGuard {
        let slot = Slot::acquire(&self.slots, identity);
        let guard = slot.mutex.clone().lock_owned().await;
        IdentityGuard {
            _guard: guard,
            _slot: slot,
        }
    }

    /// Number of identities currently holding or waiting
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Held lock for one identity
///
/// Field order matters: the mutex guard must drop before the slot so the
/// slot sees the final reference count.
#[derive(Debug)]
pub struct IdentityGuard {
    _guard: OwnedMutexGuard<()>,
    _slot: Slot,
}

#[derive(Debug)]
struct Slot {
    slots: Arc<SlotMap>,
    identity: String,
    mutex: Arc<Mutex<()>>,
}

impl Slot {
    fn acquire(slots: &Arc<SlotMap>, identity: &str) -> Self {
        let mutex = slots
            .entry(identity.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();

        Self {
            slots: Arc::clone(slots),
            identity: identity.to_string(),
            mutex,
        }
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        // Runs under the shard lock, so no other task can clone the mutex
        // out of the map between the count check and the removal.
        // The map holds one reference and this slot the other.
        self.slots.remove_if(&self.identity, |_, mutex| {
            Arc::ptr_eq(mutex, &self.mutex) && Arc::strong_count(mutex) == 2
        });
    }
}
