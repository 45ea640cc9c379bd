// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistence layer (flat `key:value` config file).

pub mod config_file;

pub use config_file::ConfigStore;

use std::path::PathBuf;

/// Errors from reading or writing the config file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Config file {path} could not be accessed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config line {line}: {content:?} (expected exactly one ':')")]
    Format { line: usize, content: String },

    #[error("Invalid boolean for {key}: {value:?}")]
    InvalidBool { key: String, value: String },

    #[error("Value for {key} contains a reserved character (':' or line break)")]
    ReservedCharacter { key: String },
}
