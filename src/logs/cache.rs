use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::sync::{Mutex, RwLock};
use tracing::info;

use super::parser::{ParsedLog, read_logs};

/// The materialized event table. Loaded on first access, rebuilt by [`LogCache::refresh`].
///
/// A rebuild parses into a fresh table before taking the write lock, so a reader holds
/// either the previous table or the new one, never a partial one. Refreshes run one at a
/// time, so the last refresh to start is the one that stays installed.
pub struct LogCache {
    path: PathBuf,
    table: RwLock<Option<Arc<ParsedLog>>>,
    refresh_lock: Mutex<()>,
}

impl LogCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get(&self) -> Arc<ParsedLog> {
        if let Some(table) = self.table.read().await.as_ref() {
            return table.clone();
        }

        let mut slot = self.table.write().await;
        // Another request may have loaded it while we waited.
        if let Some(table) = slot.as_ref() {
            return table.clone();
        }
        let table = Arc::new(read_logs(&self.path).await);
        *slot = Some(table.clone());
        table
    }

    pub async fn refresh(&self) -> Arc<ParsedLog> {
        let _guard = self.refresh_lock.lock().await;
        let fresh = Arc::new(read_logs(&self.path).await);
        *self.table.write().await = Some(fresh.clone());
        info!(records = fresh.records.len(), "Log cache refreshed");
        fresh
    }
}
