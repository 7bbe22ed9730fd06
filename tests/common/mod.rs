//! Common test utilities for rust-daxmodel tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use rust_daxmodel::source::{self, Database};

/// Path of a file under tests/fixtures
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load a fixture as a source database
pub fn load_fixture(name: &str) -> Database {
    source::load_database(&fixture_path(name)).expect("Failed to load fixture")
}

/// Parse an inline database document
pub fn parse(json: &str) -> Database {
    source::parse_database(json).expect("Invalid test model")
}

/// Test context with a temporary model folder acting as a server
pub struct TestContext {
    /// Kept to prevent temp directory cleanup until TestContext is dropped
    _temp_dir: TempDir,
    pub server_dir: PathBuf,
}

impl TestContext {
    /// Create an empty model folder
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let server_dir = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            server_dir,
        }
    }

    /// Create a model folder holding copies of the given fixtures
    pub fn with_fixtures(fixture_names: &[&str]) -> Self {
        let ctx = Self::new();
        for name in fixture_names {
            fs::copy(fixture_path(name), ctx.server_dir.join(name))
                .expect("Failed to copy fixture");
        }
        ctx
    }

    /// Write a model file into the folder
    pub fn write_model(&self, file_name: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.server_dir.join(file_name);
        fs::write(&path, content).expect("Failed to write model file");
        path
    }

    /// Server address of the folder
    pub fn server(&self) -> String {
        path_str(&self.server_dir)
    }

    /// Connection string naming `database` on this folder
    pub fn connection_string(&self, database: &str) -> String {
        format!(
            "Provider=MSOLAP;Data Source={};Initial Catalog={}",
            self.server(),
            database
        )
    }
}

fn path_str(path: &Path) -> String {
    path.to_str().expect("Non UTF-8 temp path").to_string()
}
