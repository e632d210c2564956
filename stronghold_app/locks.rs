use std::{
    collections::HashMap,
    sync::{Arc, Mutex as SyncMutex, PoisonError},
};

use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = Arc<SyncMutex<HashMap<u32, Arc<Mutex<()>>>>>;

/// One async mutex per village id. Holding a guard makes the caller the only
/// writer of that village until the guard is dropped. Entries nobody holds or
/// waits on are dropped with the last guard.
#[derive(Default)]
pub struct VillageLocks {
    locks: LockMap,
}

pub struct VillageGuards {
    ids: Vec<u32>,
    guards: Vec<OwnedMutexGuard<()>>,
    locks: LockMap,
}

impl VillageLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, village_id: u32) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(village_id).or_default().clone()
    }

    /// Locks all the given villages. Ids are taken in ascending order so two
    /// callers locking the same pair can never deadlock.
    pub async fn acquire(&self, village_ids: &[u32]) -> VillageGuards {
        let mut ids = village_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for &id in &ids {
            let lock = self.lock_for(id);
            guards.push(lock.lock_owned().await);
        }
        VillageGuards {
            ids,
            guards,
            locks: self.locks.clone(),
        }
    }

    /// Number of villages with a live lock entry.
    pub fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Drop for VillageGuards {
    fn drop(&mut self) {
        self.guards.clear();
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        for id in &self.ids {
            if locks.get(id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
                locks.remove(id);
            }
        }
    }
}
