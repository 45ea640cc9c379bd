// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! File-backed store for [`ConfigState`].
//!
//! Each mutating operation updates the in-memory state and then writes the
//! whole file back with an explicit `save`.

use crate::models::{ConfigState, Credentials};
use crate::store::StoreError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Config store bound to one file path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the config file. The file must already exist.
    pub fn load(&self) -> Result<ConfigState, StoreError> {
        let content = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let state = ConfigState::parse(&content)?;

        tracing::debug!(
            path = %self.path.display(),
            connected = state.is_connected(),
            "Loaded config"
        );
        Ok(state)
    }

    /// Overwrite the config file with `state`.
    pub fn save(&self, state: &ConfigState) -> Result<(), StoreError> {
        let content = state.to_file_string()?;
        fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), "Saved config");
        Ok(())
    }

    /// Load the config file, creating it with defaults first if it is missing.
    pub fn init(&self) -> Result<ConfigState, StoreError> {
        match self.load() {
            Err(StoreError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                let state = ConfigState::default();
                self.save(&state)?;
                tracing::info!(path = %self.path.display(), "Created default config file");
                Ok(state)
            }
            other => other,
        }
    }

    /// Replace the four credential fields and persist.
    pub fn set_credentials(
        &self,
        state: &mut ConfigState,
        credentials: Credentials,
    ) -> Result<(), StoreError> {
        self.update(state, |next| next.set_credentials(credentials))
    }

    /// Record a completed login (email and credentials) and persist.
    pub fn connect(
        &self,
        state: &mut ConfigState,
        email: &str,
        credentials: Credentials,
    ) -> Result<(), StoreError> {
        self.update(state, |next| next.connect(email, credentials))
    }

    /// Clear the email and credentials and persist.
    pub fn clear_credentials(&self, state: &mut ConfigState) -> Result<(), StoreError> {
        self.update(state, ConfigState::clear_credentials)
    }

    /// Flip the notification flag, persist, and return the new value.
    pub fn toggle_notification(&self, state: &mut ConfigState) -> Result<bool, StoreError> {
        self.update(state, ConfigState::toggle_notification)
    }

    /// Flip the favorites-only flag, persist, and return the new value.
    pub fn toggle_favorite_only(&self, state: &mut ConfigState) -> Result<bool, StoreError> {
        self.update(state, ConfigState::toggle_favorite_only)
    }

    /// Apply `change` to a copy of `state`, save it, then commit it.
    ///
    /// `state` is left as it was if the save fails.
    fn update<T>(
        &self,
        state: &mut ConfigState,
        change: impl FnOnce(&mut ConfigState) -> T,
    ) -> Result<T, StoreError> {
        let mut next = state.clone();
        let value = change(&mut next);
        self.save(&next)?;
        *state = next;
        Ok(value)
    }
}
