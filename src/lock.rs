//! Advisory, non-blocking rebuild lock.
//!
//! Only one full rebuild should run at a time. A caller that finds the
//! lock taken is told so immediately; nobody waits or queues. The lock
//! carries a TTL so a holder that dies without releasing it cannot block
//! rebuilds forever.
//!
//! Every successful acquire hands out a [`LockLease`]. Releasing needs the
//! lease, so a holder whose TTL ran out and was taken over cannot free the
//! lock of the caller that replaced it.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Proof of ownership returned by a successful acquire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LockLease(u64);

impl LockLease {
    /// Build a lease from a backend-specific token.
    #[must_use]
    pub fn new(token: u64) -> Self {
        Self(token)
    }

    /// Backend-specific token.
    #[must_use]
    pub fn token(&self) -> u64 {
        self.0
    }
}

/// Compare-and-set flag guarding full rule rebuilds.
pub trait RebuildLock {
    /// Take the lock for at most `ttl` if it is free (or its previous
    /// holder's TTL ran out). Returns `None` without blocking otherwise.
    fn try_acquire(&self, ttl: Duration) -> Option<LockLease>;

    /// Free the lock if `lease` still owns it. Returns whether anything
    /// was released.
    fn release(&self, lease: LockLease) -> bool;

    /// Whether an unexpired holder exists.
    fn is_held(&self) -> bool;
}

impl<L: RebuildLock + ?Sized> RebuildLock for Arc<L> {
    fn try_acquire(&self, ttl: Duration) -> Option<LockLease> {
        (**self).try_acquire(ttl)
    }

    fn release(&self, lease: LockLease) -> bool {
        (**self).release(lease)
    }

    fn is_held(&self) -> bool {
        (**self).is_held()
    }
}

#[derive(Debug, Default)]
struct LockState {
    /// Current lease and its deadline
    holder: Option<(LockLease, Instant)>,
    /// Last token handed out
    generation: u64,
}

/// Process-local [`RebuildLock`].
#[derive(Debug, Default)]
pub struct InMemoryRebuildLock {
    state: Mutex<LockState>,
}

impl InMemoryRebuildLock {
    /// Create a free lock
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, LockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RebuildLock for InMemoryRebuildLock {
    fn try_acquire(&self, ttl: Duration) -> Option<LockLease> {
        let now = Instant::now();
        let mut state = self.state();
        match state.holder {
            Some((_, until)) if until > now => None,
            stale => {
                if let Some((lease, _)) = stale {
                    tracing::warn!(
                        stale_lease = lease.token(),
                        "rebuild lock expired without release, taking over"
                    );
                }
                state.generation = state.generation.wrapping_add(1);
                let lease = LockLease(state.generation);
                state.holder = Some((lease, now + ttl));
                Some(lease)
            }
        }
    }

    fn release(&self, lease: LockLease) -> bool {
        let mut state = self.state();
        match state.holder {
            Some((current, _)) if current == lease => {
                state.holder = None;
                true
            }
            _ => {
                tracing::debug!(
                    lease = lease.token(),
                    "ignoring release from a lease that no longer holds the lock"
                );
                false
            }
        }
    }

    fn is_held(&self) -> bool {
        self.state()
            .holder
            .is_some_and(|(_, until)| until > Instant::now())
    }
}

/// Holds a [`RebuildLock`] and releases its own lease on drop, on every
/// exit path.
#[must_use = "dropping the guard releases the lock immediately"]
pub struct RebuildGuard<'a, L: RebuildLock + ?Sized> {
    lock: &'a L,
    lease: LockLease,
}

impl<'a, L: RebuildLock + ?Sized> RebuildGuard<'a, L> {
    /// Acquire `lock` for `ttl`, or `None` if another rebuild holds it.
    pub fn try_acquire(lock: &'a L, ttl: Duration) -> Option<Self> {
        lock.try_acquire(ttl).map(|lease| Self { lock, lease })
    }

    /// Lease held by this guard.
    #[must_use]
    pub fn lease(&self) -> LockLease {
        self.lease
    }
}

impl<L: RebuildLock + ?Sized> Drop for RebuildGuard<'_, L> {
    fn drop(&mut self) {
        self.lock.release(self.lease);
    }
}

impl<L: RebuildLock + ?Sized> std::fmt::Debug for RebuildGuard<'_, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RebuildGuard")
            .field("lease", &self.lease)
            .finish_non_exhaustive()
    }
}
