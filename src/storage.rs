use crate::error::{CongressError, Result};
use crate::types::{FlatRow, MemberTerm};
use chrono::{DateTime, Local};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Storage for named tables of flat JSON rows
pub trait Storage: Send + Sync {
    fn save_rows(&self, table: &str, rows: &[Value]) -> Result<()>;
    fn load_rows(&self, table: &str) -> Result<Vec<Value>>;
    /// When the table was last written, `None` if it doesn't exist.
    fn modified_at(&self, table: &str) -> Result<Option<DateTime<Local>>>;

    fn exists(&self, table: &str) -> Result<bool> {
        Ok(self.modified_at(table)?.is_some())
    }
}

/// Tables as pretty-printed JSON arrays, one `<table>.json` per table
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.json"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Storage for JsonFileStorage {
    fn save_rows(&self, table: &str, rows: &[Value]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.table_path(table);
        let json_content = serde_json::to_string_pretty(rows)?;
        fs::write(&path, json_content)?;
        debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }

    fn load_rows(&self, table: &str) -> Result<Vec<Value>> {
        let path = self.table_path(table);
        let content = fs::read_to_string(&path).map_err(|e| {
            CongressError::Storage(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        let rows: Vec<Value> = serde_json::from_str(&content)?;
        debug!("Loaded {} rows from {}", rows.len(), path.display());
        Ok(rows)
    }

    fn modified_at(&self, table: &str) -> Result<Option<DateTime<Local>>> {
        let path = self.table_path(table);
        match fs::metadata(&path) {
            Ok(meta) => Ok(Some(DateTime::<Local>::from(meta.modified()?))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

type Tables = HashMap<String, (Vec<Value>, DateTime<Local>)>;

/// In-memory storage implementation for development/testing
#[derive(Default)]
pub struct InMemoryStorage {
    tables: Mutex<Tables>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| CongressError::Storage("in-memory storage lock poisoned".to_string()))
    }
}

impl Storage for InMemoryStorage {
    fn save_rows(&self, table: &str, rows: &[Value]) -> Result<()> {
        self.lock()?
            .insert(table.to_string(), (rows.to_vec(), Local::now()));
        debug!("Stored {} rows in table {}", rows.len(), table);
        Ok(())
    }

    fn load_rows(&self, table: &str) -> Result<Vec<Value>> {
        self.lock()?
            .get(table)
            .map(|(rows, _)| rows.clone())
            .ok_or_else(|| CongressError::Storage(format!("Table '{table}' not found")))
    }

    fn modified_at(&self, table: &str) -> Result<Option<DateTime<Local>>> {
        Ok(self.lock()?.get(table).map(|(_, at)| *at))
    }
}

/// Loads a table of member terms, failing on the first malformed row.
pub fn load_members(storage: &dyn Storage, table: &str) -> Result<Vec<MemberTerm>> {
    storage
        .load_rows(table)?
        .iter()
        .enumerate()
        .map(|(index, row)| MemberTerm::from_row(index, row))
        .collect()
}

pub fn save_members(storage: &dyn Storage, table: &str, terms: &[MemberTerm]) -> Result<()> {
    let rows = terms
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    storage.save_rows(table, &rows)
}

/// Loads a table whose rows must all be JSON objects.
pub fn load_flat_rows(storage: &dyn Storage, table: &str) -> Result<Vec<FlatRow>> {
    storage
        .load_rows(table)?
        .into_iter()
        .enumerate()
        .map(|(index, row)| match row {
            Value::Object(map) => Ok(map),
            other => Err(CongressError::MalformedRecord {
                index,
                reason: format!("expected an object, found {other}"),
            }),
        })
        .collect()
}

pub fn save_flat_rows(storage: &dyn Storage, table: &str, rows: Vec<FlatRow>) -> Result<()> {
    let rows: Vec<Value> = rows.into_iter().map(Value::Object).collect();
    storage.save_rows(table, &rows)
}
