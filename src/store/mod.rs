//! Persistent analysis store on redb
//!
//! One file holds two tables: analyses keyed by a monotonically increasing
//! id, and the embedding vector of each analysis under the same id. Values
//! are JSON so stored reports stay readable by later versions that add
//! optional fields.

use anyhow::{Context, Result};
use chrono::Utc;
use redb::{Database, ReadableTable, TableDefinition};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::ai::cosine_similarity;
use crate::models::{AnalysisReport, StoredAnalysis};

// redb table definitions
const ANALYSES_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("analyses");
const EMBEDDINGS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("embeddings");
const META_TABLE: TableDefinition<&str, u64> = TableDefinition::new("meta");

/// Next id to hand out; ids are never reused even after deletes
const NEXT_ID_KEY: &str = "next_id";

const DB_FILE_NAME: &str = "eudalens.redb";

/// Default database location: `<data dir>/eudalens/eudalens.redb`
pub fn default_db_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("eudalens").join(DB_FILE_NAME))
}

pub struct AnalysisStore {
    db: Database,
    path: PathBuf,
}

impl AnalysisStore {
    /// Open or create the database file, creating parent directories as needed
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
        }
        let db = Database::create(path)
            .with_context(|| format!("Failed to open redb database at {}", path.display()))?;
        debug!("Opened analysis store at {}", path.display());
        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a report under the next id
    pub fn insert(&self, report: AnalysisReport) -> Result<StoredAnalysis> {
        let write_txn = self.db.begin_write()?;
        let stored = {
            let mut meta = write_txn.open_table(META_TABLE)?;
            let id = match meta.get(NEXT_ID_KEY)? {
                Some(next) => next.value(),
                None => 1,
            };
            meta.insert(NEXT_ID_KEY, id + 1)?;

            let mut table = write_txn.open_table(ANALYSES_TABLE)?;
            let stored = StoredAnalysis {
                id,
                file_name: report.file_name(),
                created_at: Utc::now(),
                report,
            };
            let value = serde_json::to_vec(&stored)?;
            table.insert(id, value.as_slice())?;
            stored
        };
        write_txn.commit()?;

        info!("Stored analysis #{} ({})", stored.id, stored.file_name);
        Ok(stored)
    }

    /// Replace an existing analysis, e.g. after attaching a summary
    pub fn update(&self, analysis: &StoredAnalysis) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(ANALYSES_TABLE)?;
            let value = serde_json::to_vec(analysis)?;
            let previous = table.insert(analysis.id, value.as_slice())?;
            previous.is_some()
        };
        write_txn.commit()?;
        Ok(existed)
    }

    /// All stored analyses, newest first
    pub fn list(&self) -> Result<Vec<StoredAnalysis>> {
        let read_txn = self.db.begin_read()?;
        let table = match read_txn.open_table(ANALYSES_TABLE) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut out = Vec::new();
        for item in table.iter()?.rev() {
            let (_, value) = item?;
            out.push(serde_json::from_slice(value.value()).context("Corrupt analysis record")?);
        }
        Ok(out)
    }

    pub fn get(&self, id: u64) -> Result<Option<StoredAnalysis>> {
        let read_txn = self.db.begin_read()?;
        let table = match read_txn.open_table(ANALYSES_TABLE) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match table.get(id)? {
            Some(value) => Ok(Some(
                serde_json::from_slice(value.value()).context("Corrupt analysis record")?,
            )),
            None => Ok(None),
        }
    }

    /// Delete an analysis and its embedding. Returns whether it existed.
    pub fn delete(&self, id: u64) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(ANALYSES_TABLE)?;
            let removed = table.remove(id)?.is_some();
            let mut embeddings = write_txn.open_table(EMBEDDINGS_TABLE)?;
            embeddings.remove(id)?;
            removed
        };
        write_txn.commit()?;

        if removed {
            info!("Deleted analysis #{}", id);
        }
        Ok(removed)
    }

    pub fn put_embedding(&self, id: u64, embedding: &[f32]) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(EMBEDDINGS_TABLE)?;
            let value = serde_json::to_vec(embedding)?;
            table.insert(id, value.as_slice())?;
        }
        write_txn.commit()?;
        debug!("Stored {}-dim embedding for analysis #{}", embedding.len(), id);
        Ok(())
    }

    /// Analyses ranked by cosine similarity of their embedding to `query`.
    ///
    /// Analyses without an embedding are not ranked.
    pub fn search_similar(&self, query: &[f32], limit: usize) -> Result<Vec<(StoredAnalysis, f32)>> {
        let read_txn = self.db.begin_read()?;
        let table = match read_txn.open_table(EMBEDDINGS_TABLE) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut scores: Vec<(u64, f32)> = Vec::new();
        for item in table.iter()? {
            let (key, value) = item?;
            let embedding: Vec<f32> =
                serde_json::from_slice(value.value()).context("Corrupt embedding record")?;
            scores.push((key.value(), cosine_similarity(query, &embedding)));
        }
        drop(table);
        drop(read_txn);

        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scores.truncate(limit);

        let mut out = Vec::with_capacity(scores.len());
        for (id, score) in scores {
            if let Some(analysis) = self.get(id)? {
                out.push((analysis, score));
            }
        }
        Ok(out)
    }
}

// redb::Database handles cleanup on Drop automatically

#[cfg(test)]
mod tests;
