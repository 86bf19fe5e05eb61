//! Persisted session identity: the API credential and the id of the most
//! recently purchased email, kept in an append-only `KEY=value` file.
//!
//! Records are only ever appended. Loading folds over the whole log and the
//! last record for a key wins, so stale entries left by earlier runs are
//! harmless.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use log::{debug, warn};

use crate::error::{Error, Result};

/// The two keys the session tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Credential,
    ActiveEmail,
}

impl Key {
    pub fn as_str(&self) -> &'static str {
        match self {
            Key::Credential => "API_KEY",
            Key::ActiveEmail => "EMAIL_ID",
        }
    }
}

/// Raw record log underneath the config store.
pub trait RecordStore {
    /// Every record in append order. A missing store yields no records.
    fn records(&self) -> Result<Vec<(String, String)>>;

    /// Append one record without touching earlier ones.
    fn append(&mut self, key: &str, value: &str) -> Result<()>;

    /// Last value recorded for `key`.
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|(k, _)| k == key)
            .last()
            .map(|(_, v)| v))
    }
}

/// A dotenv-style file on disk.
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
}

impl EnvFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// True when the file has content that does not end in a newline, in
    /// which case the next record must start on a fresh line.
    fn needs_line_break(&self) -> bool {
        match fs::read(&self.path) {
            Ok(bytes) => bytes.last().is_some_and(|b| *b != b'\n'),
            Err(_) => false,
        }
    }
}

impl RecordStore for EnvFile {
    fn records(&self) -> Result<Vec<(String, String)>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let iter = dotenvy::from_path_iter(&self.path)
            .map_err(|e| Error::Store(format!("reading {}: {e}", self.path.display())))?;

        let mut records = Vec::new();
        for item in iter {
            match item {
                Ok(pair) => records.push(pair),
                Err(e @ dotenvy::Error::LineParse(..)) => {
                    warn!("skipping unreadable line in {}: {e}", self.path.display())
                }
                Err(e) => {
                    return Err(Error::Store(format!(
                        "reading {}: {e}",
                        self.path.display()
                    )))
                }
            }
        }
        Ok(records)
    }

    fn append(&mut self, key: &str, value: &str) -> Result<()> {
        let value = quote(value)?;
        let leading = if self.needs_line_break() { "\n" } else { "" };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::Store(format!("opening {}: {e}", self.path.display())))?;
        writeln!(file, "{leading}{key}={value}")
            .map_err(|e| Error::Store(format!("appending to {}: {e}", self.path.display())))?;
        debug!("appended {key} to {}", self.path.display());
        Ok(())
    }
}

/// Wrap `value` in single quotes, which dotenv reads back verbatim: no
/// escapes, no `$` substitution, no comments. A value holding a single
/// quote or a line break has no such form and is refused.
fn quote(value: &str) -> Result<String> {
    if value.contains(['\'', '\n', '\r']) {
        return Err(Error::Store(
            "value contains a quote or line break and cannot be stored".into(),
        ));
    }
    Ok(format!("'{value}'"))
}

/// In-memory record log, used where no file should be touched.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<(String, String)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: &[(&str, &str)]) -> Self {
        Self {
            records: records
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl RecordStore for MemoryStore {
    fn records(&self) -> Result<Vec<(String, String)>> {
        Ok(self.records.clone())
    }

    fn append(&mut self, key: &str, value: &str) -> Result<()> {
        self.records.push((key.to_string(), value.to_string()));
        Ok(())
    }
}

/// Identity carried across the whole process lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// API key; set at most once per process.
    pub credential: Option<String>,
    /// Id of the most recently purchased email address.
    pub active_email_id: Option<String>,
}

impl SessionState {
    /// Let non-empty values from the process environment take precedence,
    /// the way a dotenv loader never overrides variables already set.
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let present = |key: Key| lookup(key.as_str()).filter(|v| !v.trim().is_empty());
        if let Some(credential) = present(Key::Credential) {
            self.credential = Some(credential);
        }
        if let Some(id) = present(Key::ActiveEmail) {
            self.active_email_id = Some(id);
        }
        self
    }
}

/// Load/persist facade over a [`RecordStore`].
#[derive(Debug)]
pub struct ConfigStore<S> {
    records: S,
}

impl<S: RecordStore> ConfigStore<S> {
    pub fn new(records: S) -> Self {
        Self { records }
    }

    /// Fold the log last-write-wins. An unreadable store is treated as
    /// empty; a blank value counts as absent.
    pub fn load(&self) -> SessionState {
        let records = match self.records.records() {
            Ok(records) => records,
            Err(e) => {
                warn!("ignoring persisted state: {e}");
                return SessionState::default();
            }
        };

        records
            .into_iter()
            .fold(SessionState::default(), |mut state, (key, value)| {
                let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
                if key == Key::Credential.as_str() {
                    state.credential = value;
                } else if key == Key::ActiveEmail.as_str() {
                    state.active_email_id = value;
                }
                state
            })
    }

    /// Append a new record for `key`.
    pub fn persist(&mut self, key: Key, value: &str) -> Result<()> {
        self.records.append(key.as_str(), value)
    }

    pub fn records(&self) -> &S {
        &self.records
    }
}
