//! Persistence of ledgers and preferences behind a key/value [`Repository`].
//!
//! Values are stored as JSON in the same shape the browser version used, so
//! its `localStorage` content can be dropped into a data directory as-is.

use serde::{de::DeserializeOwned, Serialize};
use std::{
    collections::HashMap,
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use strum_macros::{AsRefStr, Display};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum StorageKey {
    #[strum(serialize = "dividends")]
    Dividends,
    #[strum(serialize = "shares")]
    Shares,
    #[strum(serialize = "tickerPrices")]
    TickerPrices,
    #[strum(serialize = "isFormOpen")]
    DividendFormOpen,
    #[strum(serialize = "isSharesFormOpen")]
    SharesFormOpen,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to access `{key}`")]
    Io {
        key: StorageKey,
        #[source]
        source: std::io::Error,
    },
    #[error("Stored `{key}` is not valid")]
    Json {
        key: StorageKey,
        #[source]
        source: serde_json::Error,
    },
}

pub trait Repository {
    /// `Ok(None)` when nothing has been stored under `key` yet.
    fn load<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>, StorageError>;
    fn save<T: Serialize>(&mut self, key: StorageKey, value: &T) -> Result<(), StorageError>;
}

/// Loads `key`, falling back to `default` when it is absent or unreadable.
pub fn load_or_default<T, R>(repo: &R, key: StorageKey, default: T) -> T
where
    T: DeserializeOwned,
    R: Repository,
{
    match repo.load(key) {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(err) => {
            error!(%key, error = ?err, "failed to load, using default");
            default
        }
    }
}

/// One pretty-printed JSON file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    dir: PathBuf,
}

impl JsonFileRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Repository for JsonFileRepository {
    fn load<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>, StorageError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(&path).map_err(|source| StorageError::Io { key, source })?;
        serde_json::from_reader(BufReader::new(file))
            .map(Some)
            .map_err(|source| StorageError::Json { key, source })
    }

    fn save<T: Serialize>(&mut self, key: StorageKey, value: &T) -> Result<(), StorageError> {
        let io_err = |source: std::io::Error| StorageError::Io { key, source };
        fs::create_dir_all(&self.dir).map_err(io_err)?;

        let path = self.path(key);
        let mut writer = BufWriter::new(File::create(&path).map_err(io_err)?);
        serde_json::to_writer_pretty(&mut writer, value)
            .map_err(|source| StorageError::Json { key, source })?;
        writer.flush().map_err(io_err)?;
        debug!(%key, path = %path.display(), "saved");
        Ok(())
    }
}

/// In-memory repository, values are kept serialized so loads behave like
/// they would against a file.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    values: HashMap<StorageKey, String>,
}

impl MemoryRepository {
    pub fn insert_raw(&mut self, key: StorageKey, json: impl Into<String>) {
        self.values.insert(key, json.into());
    }
}

impl Repository for MemoryRepository {
    fn load<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>, StorageError> {
        self.values
            .get(&key)
            .map(|json| serde_json::from_str(json))
            .transpose()
            .map_err(|source| StorageError::Json { key, source })
    }

    fn save<T: Serialize>(&mut self, key: StorageKey, value: &T) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(value).map_err(|source| StorageError::Json { key, source })?;
        self.values.insert(key, json);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Dividends,
    Shares,
}

impl Form {
    fn key(self) -> StorageKey {
        match self {
            Form::Dividends => StorageKey::DividendFormOpen,
            Form::Shares => StorageKey::SharesFormOpen,
        }
    }
}

/// Whether each entry form is expanded. Both default to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormState {
    pub dividends_open: bool,
    pub shares_open: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            dividends_open: true,
            shares_open: true,
        }
    }
}

impl FormState {
    pub fn load<R: Repository>(repo: &R) -> Self {
        Self {
            dividends_open: load_or_default(repo, Form::Dividends.key(), true),
            shares_open: load_or_default(repo, Form::Shares.key(), true),
        }
    }

    pub fn is_open(&self, form: Form) -> bool {
        match form {
            Form::Dividends => self.dividends_open,
            Form::Shares => self.shares_open,
        }
    }

    /// Flips one flag and persists it.
    pub fn toggle<R: Repository>(mut self, repo: &mut R, form: Form) -> Result<Self, StorageError> {
        let open = !self.is_open(form);
        match form {
            Form::Dividends => self.dividends_open = open,
            Form::Shares => self.shares_open = open,
        }
        repo.save(form.key(), &open)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PriceMap, ShareLedger};

    #[test]
    fn keys_match_browser_storage() {
        assert_eq!(StorageKey::TickerPrices.as_ref(), "tickerPrices");
        assert_eq!(StorageKey::SharesFormOpen.to_string(), "isSharesFormOpen");
    }

    #[test]
    fn missing_key_loads_as_none() {
        let repo = MemoryRepository::default();
        assert!(repo.load::<ShareLedger>(StorageKey::Shares).unwrap().is_none());
    }

    #[test]
    fn corrupt_value_falls_back_to_default() {
        let mut repo = MemoryRepository::default();
        repo.insert_raw(StorageKey::TickerPrices, "{\"AAPL\": \"cheap\"}");
        assert!(matches!(
            repo.load::<PriceMap>(StorageKey::TickerPrices),
            Err(StorageError::Json { key: StorageKey::TickerPrices, .. })
        ));
        assert_eq!(
            load_or_default(&repo, StorageKey::TickerPrices, PriceMap::default()),
            PriceMap::default()
        );
    }

    #[test]
    fn file_repository_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = JsonFileRepository::new(dir.path().join("nested"));
        let prices = PriceMap::from_iter([("AAPL", 175.5)]);

        repo.save(StorageKey::TickerPrices, &prices).unwrap();
        assert!(dir.path().join("nested").join("tickerPrices.json").exists());
        assert_eq!(
            repo.load::<PriceMap>(StorageKey::TickerPrices).unwrap(),
            Some(prices)
        );
    }

    #[test]
    fn file_repository_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("shares.json"), "[{").unwrap();
        let repo = JsonFileRepository::new(dir.path());
        assert!(matches!(
            repo.load::<ShareLedger>(StorageKey::Shares),
            Err(StorageError::Json { .. })
        ));
    }

    #[test]
    fn form_state_defaults_open_and_toggles() {
        let mut repo = MemoryRepository::default();
        let state = FormState::load(&repo);
        assert_eq!(state, FormState::default());

        let state = state.toggle(&mut repo, Form::Shares).unwrap();
        assert!(!state.shares_open);
        assert!(state.dividends_open);
        assert_eq!(FormState::load(&repo), state);
    }
}
