use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

/// One async mutex per dataset file so read-merge-write never interleaves
/// for the same path, even when fetches run in parallel.
#[derive(Clone, Default)]
pub struct KeyLocks {
    locks: Arc<DashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        self.locks
            .entry(path.to_path_buf())
            .or_default()
            .value()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_path_shares_one_mutex() {
        let locks = KeyLocks::new();
        let a = locks.lock_for(Path::new("db/common/1/zinee.csv"));
        let b = locks.lock_for(Path::new("db/common/1/zinee.csv"));
        let c = locks.lock_for(Path::new("db/offers/common/1/zinee.csv"));

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[tokio::test]
    async fn held_lock_blocks_second_writer() {
        let locks = KeyLocks::new();
        let path = Path::new("db/common/1/zinee.csv");

        let first = locks.lock_for(path);
        let _guard = first.lock().await;

        let second = locks.lock_for(path);
        assert!(second.try_lock().is_err());
    }
}
