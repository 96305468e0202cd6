//! Single-slot, staleness-aware dataset cache.
//!
//! Fitting the TF-IDF space is the expensive part of serving a search
//! (tokenization plus vocabulary fit over every row), so the table/index
//! pair is memoized keyed by the identity of the newest uploaded file.
//! There is no file watcher and no background thread: the first request
//! after an upload discovers the staleness and pays the rebuild cost.
//!
//! One mutex guards the slot's read-modify-write, so a concurrent
//! `invalidate` can never interleave with an in-flight rebuild, and readers
//! never observe a torn (table, index) pair — they work from an `Arc`
//! snapshot taken under the lock.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::dataset::DatasetTable;
use crate::error::Result;
use crate::ingest;
use crate::models::SourceIdentity;
use crate::tfidf::TfidfIndex;

/// The cached (source identity, table, index) triple. Replaced atomically
/// as a unit; the table/index pairing is never split.
#[derive(Debug)]
pub struct CacheEntry {
    pub source: SourceIdentity,
    pub table: DatasetTable,
    pub index: TfidfIndex,
}

#[derive(Debug)]
pub struct DataCache {
    upload_dir: PathBuf,
    search_columns: Vec<String>,
    slot: Mutex<Option<Arc<CacheEntry>>>,
    rebuilds: AtomicU64,
}

impl DataCache {
    pub fn new(upload_dir: PathBuf, search_columns: Vec<String>) -> DataCache {
        DataCache {
            upload_dir,
            search_columns,
            slot: Mutex::new(None),
            rebuilds: AtomicU64::new(0),
        }
    }

    /// Make sure the slot reflects the newest uploaded file.
    ///
    /// No upload present: returns without touching the slot. Cached entry
    /// matching the newest file: cache hit, no I/O beyond the directory
    /// scan. Otherwise the slot is cleared, the table and index are rebuilt
    /// from scratch, and the new entry is stored. On any rebuild failure the
    /// slot stays empty so the next call retries the full rebuild, and the
    /// error propagates to the caller.
    pub fn ensure_fresh(&self) -> Result<()> {
        let mut slot = self.slot.lock().expect("cache lock poisoned");

        let Some(source) = ingest::newest_upload(&self.upload_dir)? else {
            tracing::warn!("no files in upload directory; skipping cache load");
            return Ok(());
        };

        if let Some(entry) = slot.as_ref() {
            if entry.source == source {
                tracing::debug!("cache hit for {}", source.path.display());
                return Ok(());
            }
        }

        tracing::info!(
            "cache stale or empty; rebuilding from {}",
            source.path.display()
        );

        // Clear first: a failed rebuild must leave the slot empty, never a
        // stale-but-mismatched entry.
        *slot = None;

        let entry = match self.rebuild(source) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::error!("rebuild failed: {}", e);
                return Err(e);
            }
        };

        self.rebuilds.fetch_add(1, Ordering::Relaxed);
        tracing::info!("cached {} rows", entry.table.len());
        *slot = Some(Arc::new(entry));
        Ok(())
    }

    fn rebuild(&self, source: SourceIdentity) -> Result<CacheEntry> {
        let table = DatasetTable::load(&source.path, &self.search_columns)?;
        let index = TfidfIndex::fit(table.search_text());
        debug_assert_eq!(index.len(), table.len());
        Ok(CacheEntry {
            source,
            table,
            index,
        })
    }

    /// Reset the slot to empty. Called once per successful upload; the next
    /// `ensure_fresh` performs a full rebuild.
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().expect("cache lock poisoned");
        *slot = None;
        tracing::info!("cache invalidated");
    }

    /// Cheap consistent view for readers; `None` when nothing is cached.
    pub fn snapshot(&self) -> Option<Arc<CacheEntry>> {
        self.slot.lock().expect("cache lock poisoned").clone()
    }

    /// Whether any upload is present, regardless of cache state.
    pub fn has_upload(&self) -> Result<bool> {
        Ok(ingest::newest_upload(&self.upload_dir)?.is_some())
    }

    pub fn upload_dir(&self) -> &std::path::Path {
        &self.upload_dir
    }

    /// Number of completed rebuilds since startup.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds.load(Ordering::Relaxed)
    }
}
