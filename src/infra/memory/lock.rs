use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

pub(super) fn read_table<'a, T>(
    lock: &'a RwLock<T>,
    table: &'static str,
) -> RwLockReadGuard<'a, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                target = "coursehub::infra::memory",
                table,
                lock_kind = "rwlock.read",
                result = "poisoned_recovered",
                "Recovered from poisoned table lock"
            );
            poisoned.into_inner()
        }
    }
}

pub(super) fn write_table<'a, T>(
    lock: &'a RwLock<T>,
    table: &'static str,
) -> RwLockWriteGuard<'a, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                target = "coursehub::infra::memory",
                table,
                lock_kind = "rwlock.write",
                result = "poisoned_recovered",
                "Recovered from poisoned table lock"
            );
            poisoned.into_inner()
        }
    }
}
