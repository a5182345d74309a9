//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait lets the bridge resolver walk the real `/proc` and
//! `/sys` trees on Linux, or an in-memory tree in tests and on other hosts.

use std::io;
use std::path::{Path, PathBuf};

/// Abstraction for filesystem operations.
///
/// This trait allows the resolver to read from the real filesystem or from
/// a mock implementation for testing purposes.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Lists entries in a directory.
    ///
    /// # Returns
    /// A vector of paths to entries in the directory, or an I/O error.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Reads the target of a symbolic link.
    ///
    /// Used for namespace handles such as `/proc/[pid]/ns/net`, whose
    /// target (`net:[4026531992]`) identifies the namespace.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }
}
