//! Narrow filesystem seam used by the collectors.
//!
//! Everything under `/proc` and `/sys` is read through [`FileSystem`], so the
//! scanners can be driven by [`RealFs`] on a live host or by an in-memory
//! tree in tests.

use std::ffi::OsString;
use std::io;
use std::path::Path;
use tracing::warn;

/// Read-only access to the files and directories the collectors consult.
pub trait FileSystem: Send + Sync {
    /// Reads the whole file at `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Lists the entry names of the directory at `path`, in the order the
    /// underlying filesystem returns them.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<String>>;

    /// Reads a single-value attribute file and trims surrounding whitespace.
    fn read_attr(&self, path: &Path) -> io::Result<String> {
        let raw = self.read(path)?;
        Ok(String::from_utf8_lossy(&raw).trim().to_string())
    }
}

/// Delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl FileSystem for RealFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let entries = std::fs::read_dir(path)?.map(|entry| entry.map(|e| e.file_name()));
        Ok(collect_names(path, entries))
    }
}

/// Entry names from a directory walk. An entry that errors (e.g. removed
/// mid-listing) is skipped so the rest of the listing survives.
fn collect_names<I>(dir: &Path, entries: I) -> Vec<String>
where
    I: IntoIterator<Item = io::Result<OsString>>,
{
    let mut names = Vec::new();
    for entry in entries {
        match entry {
            Ok(name) => names.push(name.to_string_lossy().into_owned()),
            Err(e) => warn!(dir = %dir.display(), error = %e, "skipping unreadable directory entry"),
        }
    }
    names
}
