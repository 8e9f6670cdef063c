//! exam-engine-providers — Question banks, PDF extraction, and sync backends.
//!
//! Implements the capability traits from `exam-engine-core`: an in-memory
//! question bank and PDF extractor, plus in-memory and directory-backed
//! sync stores, along with configuration loading.

pub mod config;
pub mod directory;
pub mod error;
pub mod mock;

pub use config::{create_sync, load_config, load_config_from, ExamEngineConfig, SyncConfig};
pub use directory::DirectorySync;
pub use error::ProviderError;
pub use mock::{MemorySync, MockPdfExtractor, MockQuestionBank};
