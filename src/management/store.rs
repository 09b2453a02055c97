use std::{
    collections::BTreeMap,
    io::Error,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    types::{Credential, ShowInfo, TokenResponse},
    utils,
};

/// Keys of the show response that are never persisted.
const STRIPPED_SHOW_KEYS: [&str; 2] = ["available_markets", "episodes"];

#[derive(Debug)]
pub enum StoreError {
    IoError(Error),
    SerdeError(serde_json::Error),
}

impl From<Error> for StoreError {
    fn from(err: Error) -> Self {
        StoreError::IoError(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerdeError(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::IoError(e) => write!(f, "cache file i/o: {e}"),
            StoreError::SerdeError(e) => write!(f, "cache file format: {e}"),
        }
    }
}

/// The persistence unit: every cached show plus the user credential.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheDocument {
    #[serde(default)]
    pub podcasts: BTreeMap<String, ShowInfo>,
    #[serde(default)]
    pub user: Credential,
}

/// Holds the cache document in memory and flushes it to disk after every
/// mutation.
///
/// Persistence is best effort. Reading never fails (a missing or corrupt
/// file yields an empty document) and write failures are logged and
/// dropped.
pub struct CredentialStore {
    path: PathBuf,
    document: CacheDocument,
}

impl CredentialStore {
    /// An empty store bound to `path`. Nothing is read until [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document: CacheDocument::default(),
        }
    }

    /// Creates a store and loads it right away.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self::new(path);
        store.load();
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&mut self) {
        self.document = match self.read() {
            Ok(document) => document,
            Err(StoreError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No cache file at {}", self.path.display());
                CacheDocument::default()
            }
            Err(e) => {
                log::error!("Cannot read {}: {}", self.path.display(), e);
                CacheDocument::default()
            }
        };
    }

    fn read(&self) -> Result<CacheDocument, StoreError> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) {
        if let Err(e) = self.write() {
            log::error!("Cannot write {}: {}", self.path.display(), e);
        }
    }

    fn write(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string(&self.document)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn document(&self) -> &CacheDocument {
        &self.document
    }

    pub fn get_user(&self) -> &Credential {
        &self.document.user
    }

    /// Merges the recognized fields of a token response into the stored
    /// credential and saves.
    ///
    /// `expires_in` is relative; it becomes an absolute `expires_at` measured
    /// from now, not from when the response was produced.
    pub fn set_user_info(&mut self, response: &TokenResponse) {
        let user = &mut self.document.user;

        if let Some(access_token) = &response.access_token {
            user.access_token = Some(access_token.clone());
        }
        if let Some(refresh_token) = &response.refresh_token {
            user.refresh_token = Some(refresh_token.clone());
        }
        if let Some(scope) = &response.scope {
            user.scope = Some(scope.clone());
        }
        if let Some(expires_in) = response.expires_in {
            user.expires_at = Some(utils::now_seconds() + expires_in);
        }

        self.save();
    }

    pub fn get_podcast(&self, show_id: &str) -> Option<&ShowInfo> {
        self.document.podcasts.get(show_id)
    }

    /// Stores a copy of `info` without the bulky keys and saves.
    pub fn set_podcast_info(&mut self, show_id: &str, info: &ShowInfo) {
        let mut info = info.clone();
        for key in STRIPPED_SHOW_KEYS {
            info.extra.remove(key);
        }

        self.document.podcasts.insert(show_id.to_string(), info);
        self.save();
    }

    pub fn delete_podcast_info(&mut self, show_id: &str) {
        if self.document.podcasts.remove(show_id).is_some() {
            self.save();
        }
    }
}
