//! Atomically swappable rule list with optional hot-reload.
//!
//! Readers take an `Arc` snapshot of the current list and evaluate against
//! it without holding any lock; a reload builds a complete new list and
//! swaps the pointer, so a concurrent reader sees either the old list or the
//! new one, never a mix.

use std::sync::{Arc, Mutex, RwLock};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use crate::loader::{is_rule_change, LoadReport, Result, RuleError, RuleLoader};
use crate::schema::Rule;

struct StoreInner {
    loader: RwLock<RuleLoader>,
    active: RwLock<Arc<Vec<Rule>>>,
    /// Serializes clone-load-swap so a slow reload never lands after a newer one.
    reloading: Mutex<()>,
}

impl StoreInner {
    fn reload(&self) -> LoadReport {
        let _guard = self.reloading.lock().expect("reload lock poisoned");
        // Readers only contend for the final swap, never for file I/O.
        let loader = self.loader.read().expect("loader lock poisoned").clone();
        let report = loader.load();
        let rules = Arc::new(report.rules.clone());
        *self.active.write().expect("rules lock poisoned") = rules;
        report
    }
}

/// The active, priority-ordered rule list.
pub struct RuleStore {
    inner: Arc<StoreInner>,
    /// Active filesystem watcher (held to keep it alive).
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl RuleStore {
    /// Run the loader once and keep the result.
    pub fn new(loader: RuleLoader) -> Self {
        Self::load(loader).0
    }

    /// Like [`new`](Self::new), also returning the per-item load report.
    pub fn load(loader: RuleLoader) -> (Self, LoadReport) {
        let store = Self {
            inner: Arc::new(StoreInner {
                loader: RwLock::new(loader),
                active: RwLock::new(Arc::new(Vec::new())),
                reloading: Mutex::new(()),
            }),
            watcher: Mutex::new(None),
        };
        let report = store.inner.reload();
        (store, report)
    }

    /// Current rule list. Cheap; later reloads do not affect the returned snapshot.
    pub fn snapshot(&self) -> Arc<Vec<Rule>> {
        Arc::clone(&self.inner.active.read().expect("rules lock poisoned"))
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Re-run the full load pipeline and swap the active list.
    pub fn reload(&self) -> LoadReport {
        self.inner.reload()
    }

    /// Replace the synced source with a freshly pulled JSON array and reload.
    pub fn update_synced(&self, json: impl Into<String>) -> LoadReport {
        self.inner
            .loader
            .write()
            .expect("loader lock poisoned")
            .set_synced_json(json);
        self.inner.reload()
    }

    /// A copy of the loader configuration currently in effect.
    pub fn loader(&self) -> RuleLoader {
        self.inner.loader.read().expect("loader lock poisoned").clone()
    }

    /// Watch the custom rules directory and reload on any YAML change.
    ///
    /// Calling it again replaces the previous watcher.
    pub fn watch(&self) -> Result<()> {
        let dir = self
            .loader()
            .custom_dir()
            .map(|d| d.to_path_buf())
            .ok_or_else(|| RuleError::Validation("no custom rules directory configured".to_string()))?;

        let inner = Arc::clone(&self.inner);
        let mut watcher = notify::recommended_watcher(move |res: std::result::Result<notify::Event, notify::Error>| {
            match res {
                Ok(event) if is_rule_change(&event) => {
                    let report = inner.reload();
                    info!(total = report.loaded(), "reloaded rules after file change");
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "filesystem watcher error"),
            }
        })?;

        watcher.watch(&dir, RecursiveMode::Recursive)?;

        info!(path = %dir.display(), "watching custom rules directory for changes");
        *self.watcher.lock().expect("watcher lock poisoned") = Some(watcher);
        Ok(())
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.lock().expect("watcher lock poisoned").is_some()
    }
}
