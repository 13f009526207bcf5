use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::ForwardError;

/// Trigger id -> chat thread name, plus the day the mapping was last reset.
///
/// Stored as a flat JSON object: `{"date": "05-06-2024", "42": "spaces/x/threads/y"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(flatten)]
    pub threads: BTreeMap<String, String>,
}

impl ThreadMapping {
    pub fn thread_for(&self, trigger_id: &str) -> Option<&str> {
        self.threads.get(trigger_id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.threads.is_empty()
    }
}

/// Formats a day the way it is kept under the `date` key (`DD-MM-YYYY`).
pub fn day_key(day: NaiveDate) -> String {
    day.format("%d-%m-%Y").to_string()
}

/// Clears the mapping when its `date` is set and differs from `today`.
///
/// A mapping without a `date` only gets one; its threads are kept.
/// Returns the mapping and whether it changed.
pub fn reset_if_new_day(mut mapping: ThreadMapping, today: &str) -> (ThreadMapping, bool) {
    let same_day = mapping.date.as_deref().map(|date| date == today);
    match same_day {
        Some(true) => (mapping, false),
        Some(false) => (
            ThreadMapping {
                date: Some(today.to_string()),
                threads: BTreeMap::new(),
            },
            true,
        ),
        None => {
            mapping.date = Some(today.to_string());
            (mapping, true)
        }
    }
}

/// JSON file backed trigger -> thread mapping.
///
/// The whole file is read and rewritten on every operation. Writes go to a
/// temporary file in the same directory which is then renamed over the target.
/// Concurrent writers race; the last rename wins.
#[derive(Debug, Clone)]
pub struct ThreadStore {
    path: PathBuf,
}

impl ThreadStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the mapping. Any failure yields an empty mapping.
    pub fn load(&self) -> ThreadMapping {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!("No thread mapping at {}: {}", self.path.display(), e);
                return ThreadMapping::default();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!(
                "Ignoring unreadable thread mapping {}: {}",
                self.path.display(),
                e
            );
            ThreadMapping::default()
        })
    }

    /// Loads the mapping with the daily reset applied in memory. Nothing is written.
    pub fn load_for_day(&self, today: &str) -> ThreadMapping {
        let (mapping, _) = reset_if_new_day(self.load(), today);
        mapping
    }

    /// Stores `thread` for `trigger_id` unless the trigger already has one.
    ///
    /// The mapping is reloaded and reset for `today` first, so a stale day is
    /// cleared in the same write. Returns `true` when a new entry was added.
    pub fn record_thread(
        &self,
        trigger_id: &str,
        thread: &str,
        today: &str,
    ) -> Result<bool, ForwardError> {
        let (mut mapping, reset) = reset_if_new_day(self.load(), today);

        if let Some(existing) = mapping.thread_for(trigger_id) {
            debug!(
                "Trigger {} already mapped to {}, keeping it over {}",
                trigger_id, existing, thread
            );
            if reset {
                self.save(&mapping)?;
            }
            return Ok(false);
        }

        mapping
            .threads
            .insert(trigger_id.to_string(), thread.to_string());
        self.save(&mapping)?;

        Ok(true)
    }

    pub fn save(&self, mapping: &ThreadMapping) -> Result<(), ForwardError> {
        let store_err = |e: std::io::Error| {
            ForwardError::Store(format!("{}: {}", self.path.display(), e))
        };

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(store_err)?;

        let json = serde_json::to_string(mapping)
            .map_err(|e| ForwardError::Store(e.to_string()))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(store_err)?;
        tmp.write_all(json.as_bytes()).map_err(store_err)?;
        tmp.persist(&self.path).map_err(|e| store_err(e.error))?;

        Ok(())
    }
}
