//! Concurrent cross-reference indexing for C/C++ codebases.
//!
//! Translation units are parsed through an external Clang-side unit cache;
//! the engine extracts inclusions, definitions, references and symbol-name
//! permutations and persists them into four key/value stores with
//! set-union semantics, so downstream navigation tools ("go to
//! definition", "find references", symbol search) can answer queries
//! cheaply.

pub mod config;
pub mod error;
pub mod indexing;
pub mod logging;
pub mod parsing;
pub mod resource;
pub mod storage;
pub mod types;

pub use config::{IndexingConfig, LoggingConfig, Settings};
pub use error::{IndexError, IndexResult};
pub use indexing::Indexer;
pub use parsing::{
    AcquireOptions, AstCursor, CachedUnit, CursorKind, Diagnostic, Inclusion, Severity,
    TranslationUnit, UnitCache, UnitOrigin,
};
pub use resource::{NoResources, ResourceProvider};
pub use storage::{Accumulator, AccumulatorSet, CrossRefStore, SharedAccumulator, SyncStats, Synchronizer};
pub use types::{IndexMode, JobId, SourceLocation, StoreKind};
