use std::path::{Path, PathBuf};

pub const SYS_BLOCK: &str = "/sys/block";

/// Where one member device of an array lives, in /dev and in sysfs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPaths {
    pub block:      String,    // "/dev/sata1p1"
    pub sysfs_dir:  PathBuf,   // "/sys/block/md0/md/dev-sata1p1"
    pub state:      PathBuf,   // "<sysfs_dir>/state"
}

/// Name of the per-member directory under `<array>/md/`: the device path with
/// every `/` turned into `-`, minus the leading `-`.
///
/// `"/dev/sata1p1"` becomes `"dev-sata1p1"`.
pub fn sysfs_member_name(device_path: &str) -> String {
    device_path.replace('/', "-").trim_start_matches('-').to_string()
}

/// Resolve the paths for `slave` (an entry of `<array>/slaves`) under `root`.
pub fn resolve_in(root: &Path, array: &str, slave: &str) -> MemberPaths {
    let block = format!("/dev/{}", slave);
    let sysfs_dir = root.join(array).join("md").join(sysfs_member_name(&block));
    let state = sysfs_dir.join("state");
    MemberPaths { block, sysfs_dir, state }
}

/// [`resolve_in`] under the default `/sys/block` root.
#[cfg(test)]
pub fn resolve(array: &str, slave: &str) -> MemberPaths {
    resolve_in(Path::new(SYS_BLOCK), array, slave)
}

/// A `/sys/block`-style root. Tests and `--sys-block` point it elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysBlock {
    root: PathBuf,
}

impl Default for SysBlock {
    fn default() -> Self {
        Self::new(SYS_BLOCK)
    }
}

impl SysBlock {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn slaves_dir(&self, array: &str) -> PathBuf {
        self.root.join(array).join("slaves")
    }

    pub fn array_state(&self, array: &str) -> PathBuf {
        self.root.join(array).join("md").join("array_state")
    }

    pub fn level(&self, array: &str) -> PathBuf {
        self.root.join(array).join("md").join("level")
    }

    pub fn degraded(&self, array: &str) -> PathBuf {
        self.root.join(array).join("md").join("degraded")
    }

    pub fn member(&self, array: &str, slave: &str) -> MemberPaths {
        resolve_in(&self.root, array, slave)
    }
}
