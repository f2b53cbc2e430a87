//! In-memory filesystem for driving the collectors in tests.

use super::fs::FileSystem;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Files and directories held in memory. Directory listings keep insertion
/// order so tests can pin the order sysfs would report.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    files: HashMap<PathBuf, Vec<u8>>,
    dirs:  HashMap<PathBuf, Vec<String>>,
}

impl MockFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, creating parent directories as needed.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> &mut Self {
        let path = path.as_ref().to_path_buf();
        self.register(&path);
        self.files.insert(path, content.into());
        self
    }

    /// Adds an (empty) directory, creating parents as needed.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) -> &mut Self {
        let path = path.as_ref().to_path_buf();
        self.register(&path);
        self.dirs.entry(path).or_default();
        self
    }

    /// Removes a file or directory entry, as if the kernel tore it down.
    pub fn remove(&mut self, path: impl AsRef<Path>) -> &mut Self {
        let path = path.as_ref();
        self.files.remove(path);
        self.dirs.remove(path);
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            if let Some(children) = self.dirs.get_mut(parent) {
                let name = name.to_string_lossy();
                children.retain(|c| *c != name);
            }
        }
        self
    }

    fn register(&mut self, path: &Path) {
        let mut child = path;
        while let Some(parent) = child.parent() {
            let Some(name) = child.file_name() else { break };
            let name = name.to_string_lossy().into_owned();
            let children = self.dirs.entry(parent.to_path_buf()).or_default();
            if children.contains(&name) {
                break;
            }
            children.push(name);
            child = parent;
        }
    }
}

impl FileSystem for MockFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("file not found: {:?}", path))
        })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        self.dirs.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("directory not found: {:?}", path))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_keeps_insertion_order() {
        let mut fs = MockFs::new();
        fs.add_dir("/sys/block/md0/slaves/sata2p1")
          .add_dir("/sys/block/md0/slaves/nvme0n1p1")
          .add_dir("/sys/block/md0/slaves/sata1p1");

        let names = fs.read_dir(Path::new("/sys/block/md0/slaves")).unwrap();
        assert_eq!(names, vec!["sata2p1", "nvme0n1p1", "sata1p1"]);
        assert_eq!(fs.read_dir(Path::new("/sys/block")).unwrap(), vec!["md0"]);
    }

    #[test]
    fn remove_drops_file_and_listing_entry() {
        let mut fs = MockFs::new();
        fs.add_file("/sys/block/md0/md/level", "raid1\n");
        fs.remove("/sys/block/md0/md/level");

        assert!(fs.read(Path::new("/sys/block/md0/md/level")).is_err());
        assert!(fs.read_dir(Path::new("/sys/block/md0/md")).unwrap().is_empty());
    }
}
