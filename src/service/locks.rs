use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use crate::data_types::TableId;

/// Reader/writer lock per logical table. Schema updates take the write half,
/// row reads and writes the read half. Entries are created on first use and
/// kept for the lifetime of the service, so callers only lock ids of tables
/// that exist.
#[derive(Debug, Default)]
pub struct TableLocks {
    locks: DashMap<TableId, Arc<RwLock<()>>>,
}

impl TableLocks {
    fn lock(&self, table_id: TableId) -> Arc<RwLock<()>> {
        // Clone the Arc out so the DashMap shard isn't held while we wait
        self.locks.entry(table_id).or_default().value().clone()
    }

    pub async fn read(&self, table_id: TableId) -> OwnedRwLockReadGuard<()> {
        self.lock(table_id).read_owned().await
    }

    pub async fn write(&self, table_id: TableId) -> OwnedRwLockWriteGuard<()> {
        self.lock(table_id).write_owned().await
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.len()
    }
}
