use std::path::PathBuf;

use thiserror::Error;

use crate::types::StoreKind;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("index root must be an absolute path, got {path}")]
    RootNotAbsolute { path: PathBuf },

    #[error("failed to create index root {path}: {source}")]
    RootCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open {kind} store at {path}: {source}")]
    StoreOpen {
        kind: StoreKind,
        path: PathBuf,
        #[source]
        source: redb::DatabaseError,
    },

    #[error("{kind} store sync failed: {source}")]
    StoreSync {
        kind: StoreKind,
        #[source]
        source: redb::Error,
    },

    #[error("failed to spawn thread {name}: {source}")]
    ThreadSpawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

pub type IndexResult<T> = Result<T, IndexError>;
