//! Locally authored YAML rules: directory scan and multi-document parsing.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value as YamlValue;
use tracing::{debug, warn};

use crate::schema::{Rule, RuleRecord, RuleSource};

use super::error::{LoadResult, Result};

pub(crate) fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "yml" || e == "yaml")
        .unwrap_or(false)
}

pub(crate) fn is_dotfile(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

/// Load every YAML file under `dir`, recursively, in sorted path order.
pub(super) fn load_dir(dir: &Path, rules: &mut Vec<Rule>, results: &mut Vec<LoadResult>) {
    if !dir.is_dir() {
        debug!(path = %dir.display(), "custom rules directory not found");
        results.push(LoadResult::skipped(
            RuleSource::Custom,
            dir.display().to_string(),
            "directory not found",
        ));
        return;
    }

    let mut files = Vec::new();
    collect_files(dir, &mut files, results);
    files.sort();

    for path in files {
        let origin = path.display().to_string();
        match fs::read_to_string(&path) {
            Ok(text) => parse_yaml_rules(&text, RuleSource::Custom, &origin, rules, results),
            Err(e) => {
                warn!(path = %origin, error = %e, "failed to read rule file");
                results.push(LoadResult::failed(RuleSource::Custom, origin, e));
            }
        }
    }
}

/// Recursively gather candidate files, recording skips for dotfiles and non-YAML.
fn collect_files(dir: &Path, files: &mut Vec<PathBuf>, results: &mut Vec<LoadResult>) {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "failed to read directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if is_dotfile(&path) {
            if path.is_file() {
                results.push(LoadResult::skipped(RuleSource::Custom, path.display().to_string(), "dotfile"));
            }
            continue;
        }

        if path.is_dir() {
            collect_files(&path, files, results);
            continue;
        }

        if !is_yaml(&path) {
            results.push(LoadResult::skipped(
                RuleSource::Custom,
                path.display().to_string(),
                "not a YAML file",
            ));
            continue;
        }

        files.push(path);
    }
}

/// Parse a YAML text holding one or more `---` documents.
///
/// Each document is either a single rule mapping or a mapping with a
/// `rules:` list. A syntax error anywhere rejects the whole text; a bad
/// entry only rejects itself.
pub(super) fn parse_yaml_rules(
    text: &str,
    source: RuleSource,
    origin: &str,
    rules: &mut Vec<Rule>,
    results: &mut Vec<LoadResult>,
) {
    let documents = match split_documents(text) {
        Ok(docs) => docs,
        Err(e) => {
            warn!(source = %source, origin = %origin, error = %e, "failed to parse rule file");
            results.push(LoadResult::failed(source, origin, e));
            return;
        }
    };

    for doc in documents {
        for entry in entries_of(doc) {
            match entry {
                Entry::Empty => results.push(LoadResult::skipped(source, origin, "empty document")),
                Entry::Record(value) => {
                    let parsed = serde_yaml::from_value::<RuleRecord>(value)
                        .map_err(|e| e.to_string())
                        .and_then(|record| record.into_rule(source));
                    match parsed {
                        Ok(rule) => {
                            debug!(rule_id = %rule.id, source = %source, origin = %origin, "loaded rule");
                            results.push(LoadResult::loaded(source, origin, &rule.id));
                            rules.push(rule);
                        }
                        Err(e) => {
                            warn!(source = %source, origin = %origin, error = %e, "skipping invalid rule");
                            results.push(LoadResult::failed(source, origin, e));
                        }
                    }
                }
            }
        }
    }
}

fn split_documents(text: &str) -> Result<Vec<YamlValue>> {
    let mut docs = Vec::new();
    for de in serde_yaml::Deserializer::from_str(text) {
        docs.push(YamlValue::deserialize(de)?);
    }
    Ok(docs)
}

enum Entry {
    Empty,
    Record(YamlValue),
}

fn entries_of(doc: YamlValue) -> Vec<Entry> {
    match doc {
        YamlValue::Null => vec![Entry::Empty],
        YamlValue::Mapping(mut map) => match map.remove("rules") {
            Some(YamlValue::Sequence(items)) => items.into_iter().map(Entry::Record).collect(),
            Some(YamlValue::Null) if map.is_empty() => vec![Entry::Empty],
            Some(other) => {
                // `rules` used as a plain field; treat the document as one rule.
                map.insert(YamlValue::from("rules"), other);
                vec![Entry::Record(YamlValue::Mapping(map))]
            }
            None => vec![Entry::Record(YamlValue::Mapping(map))],
        },
        // Anything else fails record deserialization with a useful message.
        other => vec![Entry::Record(other)],
    }
}
