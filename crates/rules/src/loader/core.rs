//! Core [`RuleLoader`]: assembles the three rule sources into one ordered list.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use driftguard_core::config::RuleSourceSettings;
use tracing::info;

use crate::schema::{Rule, RuleSource};

use super::error::LoadResult;
use super::synced::SyncedSource;
use super::{builtin, custom, synced};

/// Everything one pass of the load pipeline produced.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Merged rules, ascending by priority; ties keep builtin, synced, custom order.
    pub rules: Vec<Rule>,
    /// One entry per rule, skipped file or failure, in load order.
    pub results: Vec<LoadResult>,
}

impl LoadReport {
    pub fn loaded(&self) -> usize {
        self.rules.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &LoadResult> {
        self.results.iter().filter(|r| r.is_failed())
    }

    /// Loaded rule count per source; every source is present.
    pub fn by_source(&self) -> BTreeMap<RuleSource, usize> {
        let mut counts: BTreeMap<RuleSource, usize> = RuleSource::ALL.iter().map(|s| (*s, 0)).collect();
        for rule in &self.rules {
            *counts.entry(rule.source).or_default() += 1;
        }
        counts
    }
}

/// Describes where rules come from and runs the load/merge/sort pipeline.
///
/// The loader holds no rules itself; every [`load`](Self::load) re-reads all
/// sources, so calling it again is a full reload.
#[derive(Debug, Clone)]
pub struct RuleLoader {
    builtin: bool,
    synced: SyncedSource,
    custom_dir: Option<PathBuf>,
}

impl Default for RuleLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleLoader {
    /// Builtin catalog only.
    pub fn new() -> Self {
        Self {
            builtin: true,
            synced: SyncedSource::None,
            custom_dir: None,
        }
    }

    pub fn from_settings(settings: &RuleSourceSettings) -> Self {
        let mut loader = Self::new();
        loader.builtin = settings.builtin_enabled;
        if let Some(path) = &settings.synced_path {
            loader.synced = SyncedSource::File(path.clone());
        }
        loader.custom_dir = settings.custom_dir.clone();
        loader
    }

    pub fn without_builtin(mut self) -> Self {
        self.builtin = false;
        self
    }

    /// Read synced rules from a JSON file on every load.
    pub fn with_synced_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.synced = SyncedSource::File(path.into());
        self
    }

    /// Use an in-memory JSON array as the synced source.
    pub fn with_synced_json(mut self, json: impl Into<String>) -> Self {
        self.synced = SyncedSource::Inline(json.into());
        self
    }

    pub fn with_custom_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.custom_dir = Some(dir.into());
        self
    }

    /// Replace the synced source with a freshly pulled JSON array.
    pub fn set_synced_json(&mut self, json: impl Into<String>) {
        self.synced = SyncedSource::Inline(json.into());
    }

    pub fn builtin_enabled(&self) -> bool {
        self.builtin
    }

    pub fn synced(&self) -> &SyncedSource {
        &self.synced
    }

    pub fn custom_dir(&self) -> Option<&Path> {
        self.custom_dir.as_deref()
    }

    /// Run the pipeline: builtin, then synced, then custom, then a stable
    /// sort by ascending priority.
    ///
    /// Never fails as a whole; unreadable sources and bad entries show up as
    /// [`LoadStatus::Failed`](super::LoadStatus::Failed) results.
    pub fn load(&self) -> LoadReport {
        let mut rules = Vec::new();
        let mut results = Vec::new();

        if self.builtin {
            builtin::load(&mut rules, &mut results);
        }
        synced::load(&self.synced, &mut rules, &mut results);
        if let Some(dir) = &self.custom_dir {
            custom::load_dir(dir, &mut rules, &mut results);
        }

        rules.sort_by_key(|r| r.priority);

        let report = LoadReport { rules, results };
        let counts = report.by_source();
        info!(
            total = report.loaded(),
            builtin = counts[&RuleSource::Builtin],
            synced = counts[&RuleSource::Synced],
            custom = counts[&RuleSource::Custom],
            failed = report.failures().count(),
            "rules loaded"
        );
        report
    }
}
