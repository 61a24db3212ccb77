//! Test support utilities for stash integration tests.
//!
//! Provides reusable test environment setup and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;

#[allow(unused_imports)]
pub use assertions::*;

use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// Each test gets its own project dir and home dir. The home dir holds the
/// sync state and the local store emulation, so nothing leaks between tests.
pub struct Test {
    /// Temporary directory for the test project
    pub dir: TempDir,
    /// Temporary home directory
    pub home: TempDir,
}

impl Test {
    /// Create a new empty test environment.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");

        Self { dir, home }
    }

    /// Create a test environment with files already synced.
    pub fn with_synced(files: &[(&str, &str)], service: &str) -> Self {
        let t = Self::new();
        for (path, contents) in files {
            t.write(path, contents);
        }
        let mut args = vec!["sync", "--context", "app", "--no-clean", "-s", service];
        args.extend(files.iter().map(|(p, _)| *p));
        assert_success(&t.run(&args));
        t
    }

    /// Absolute path of a project file.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a project file, creating parent directories.
    pub fn write(&self, name: &str, contents: &str) {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(path, contents).expect("failed to write file");
    }

    /// Read a project file.
    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path(name)).expect("failed to read file")
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    /// Raw catalog contents.
    pub fn catalog(&self) -> String {
        self.read("stash.yml")
    }
}
