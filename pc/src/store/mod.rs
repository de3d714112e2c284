//! Pitch history store
//!
//! An append-only JSONL file of generated pitches. Optional: generation never
//! depends on it, and callers only log its failures.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::PitchResult;

/// File name of the history log inside the store directory
pub const HISTORY_FILE: &str = "pitches.jsonl";

/// Default and maximum page sizes for [`PitchStore::list`]
pub const DEFAULT_PAGE_LIMIT: usize = 10;
pub const MAX_PAGE_LIMIT: usize = 100;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// One stored pitch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchRecord {
    pub id: String,
    pub idea: String,
    pub name: String,
    pub elevator: String,
    pub slides: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// One page of records, newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub items: Vec<PitchRecord>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// JSONL-backed pitch history
#[derive(Debug)]
pub struct PitchStore {
    /// Path to `pitches.jsonl`
    path: PathBuf,
    /// Serialises appends from concurrent requests
    write_lock: Mutex<()>,
}

impl PitchStore {
    /// Open or create a store in the given directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(HISTORY_FILE);
        info!("Opened pitch store at {}", path.display());
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Append a pitch and return the stored record
    pub fn save(&self, idea: &str, pitch: &PitchResult) -> Result<PitchRecord, StoreError> {
        debug!(name = %pitch.name, "PitchStore::save: called");
        let record = PitchRecord {
            id: Uuid::now_v7().to_string(),
            idea: idea.trim().to_string(),
            name: pitch.name.clone(),
            elevator: pitch.elevator.clone(),
            slides: pitch.slides.clone(),
            timestamp: Utc::now(),
        };

        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut file = fs::OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;

        debug!(id = %record.id, "PitchStore::save: appended");
        Ok(record)
    }

    /// Look up a record by id
    pub fn get(&self, id: &str) -> Result<Option<PitchRecord>, StoreError> {
        debug!(%id, "PitchStore::get: called");
        Ok(self.read_all()?.into_iter().find(|r| r.id == id))
    }

    /// List records newest first
    ///
    /// `page` is 1-based and clamped to at least 1; `limit` is clamped to
    /// `1..=MAX_PAGE_LIMIT`. A page past the end is empty.
    pub fn list(&self, page: usize, limit: usize) -> Result<Page, StoreError> {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_LIMIT);
        debug!(%page, %limit, "PitchStore::list: called");

        let mut records = self.read_all()?;
        records.reverse();

        let total = records.len();
        let offset = (page - 1).saturating_mul(limit);
        let items = records.into_iter().skip(offset).take(limit).collect();

        Ok(Page {
            items,
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit),
        })
    }

    fn read_all(&self) -> Result<Vec<PitchRecord>, StoreError> {
        if !self.path.exists() {
            debug!("PitchStore::read_all: no history file yet");
            return Ok(Vec::new());
        }

        let reader = BufReader::new(fs::File::open(&self.path)?);
        let mut records = Vec::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<PitchRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping corrupt history line {}: {}", n + 1, e),
            }
        }
        Ok(records)
    }
}
