use super::fs::FileSystem;
use super::md_paths::SysBlock;
use super::mdstat::{self, ArrayBlock};
use crate::error::CaptureError;
use crate::models::raid::{EnrichmentIssue, IssueKind, MemberDevice, RaidArray, Snapshot};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

pub const PROC_MDSTAT: &str = "/proc/mdstat";

/// Read `mdstat_path`, split it and enrich every block from sysfs.
///
/// Only the mdstat read itself can fail. Arrays or devices that vanish while
/// sysfs is walked come back with empty fields and an entry in `issues`.
pub fn capture<F: FileSystem>(fs: &F, sys: &SysBlock, mdstat_path: &Path) -> Result<Snapshot, CaptureError> {
    let raw = fs.read(mdstat_path).map_err(|source| CaptureError::ReadMdstat {
        path: mdstat_path.to_path_buf(),
        source,
    })?;

    let captured_at = chrono::Local::now();
    let arrays: Vec<RaidArray> = mdstat::split(&raw)
        .into_iter()
        .map(|block| enrich(fs, sys, block))
        .collect();

    let snapshot = Snapshot { captured_at, arrays };
    info!(
        arrays = snapshot.arrays.len(),
        devices = snapshot.device_count(),
        "captured md snapshot"
    );
    Ok(snapshot)
}

/// Same as [`capture`] but gives up after `timeout`. A zero timeout waits forever.
///
/// The read runs on a worker thread; on expiry the worker is left to finish
/// on its own and its result is discarded.
pub fn capture_with_deadline<F>(
    fs: F,
    sys: SysBlock,
    mdstat_path: PathBuf,
    timeout: Duration,
) -> Result<Snapshot, CaptureError>
where
    F: FileSystem + 'static,
{
    if timeout.is_zero() {
        return capture(&fs, &sys, &mdstat_path);
    }

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(capture(&fs, &sys, &mdstat_path));
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            warn!(?timeout, "md capture timed out");
            Err(CaptureError::Timeout { after: timeout })
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(CaptureError::Worker),
    }
}

/// Fill one split block from sysfs: members (`slaves/` + per-member `state`),
/// `md/array_state`, `md/level` and `md/degraded`. Each read is attempted
/// independently.
pub fn enrich<F: FileSystem>(fs: &F, sys: &SysBlock, block: ArrayBlock) -> RaidArray {
    let mut array = RaidArray {
        name:      block.name,
        index:     block.index,
        raw_lines: block.lines,
        ..Default::default()
    };

    let slaves_dir = sys.slaves_dir(&array.name);
    match fs.read_dir(&slaves_dir) {
        Ok(slaves) => {
            for slave in slaves {
                let device = read_member(fs, sys, &mut array, &slave);
                array.devices.push(device);
            }
        }
        Err(e) => record(&mut array, IssueKind::Slaves, slaves_dir, &e),
    }

    let state_path = sys.array_state(&array.name);
    match fs.read_attr(&state_path) {
        Ok(state) => array.state = state,
        Err(e)    => record(&mut array, IssueKind::ArrayState, state_path, &e),
    }

    let level_path = sys.level(&array.name);
    match fs.read_attr(&level_path) {
        Ok(level) => array.level = level,
        Err(e)    => record(&mut array, IssueKind::Level, level_path, &e),
    }

    read_degraded(fs, sys, &mut array);
    array
}

/// `md/degraded` only exists for redundant personalities, so a missing file
/// is not an issue. A present but unparsable one is.
fn read_degraded<F: FileSystem>(fs: &F, sys: &SysBlock, array: &mut RaidArray) {
    let path = sys.degraded(&array.name);
    match fs.read_attr(&path) {
        Ok(count) => match count.parse() {
            Ok(n)  => array.degraded = Some(n),
            Err(e) => {
                let err = io::Error::new(io::ErrorKind::InvalidData, format!("{:?}: {}", count, e));
                record(array, IssueKind::Degraded, path, &err);
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(array = %array.name, "no md/degraded attribute");
        }
        Err(e) => record(array, IssueKind::Degraded, path, &e),
    }
}

fn read_member<F: FileSystem>(fs: &F, sys: &SysBlock, array: &mut RaidArray, slave: &str) -> MemberDevice {
    let paths = sys.member(&array.name, slave);
    let mut device = MemberDevice {
        name: slave.to_string(),
        path: paths.block,
        ..Default::default()
    };
    trace!(array = %array.name, device = slave, dir = %paths.sysfs_dir.display(), "reading member state");

    match fs.read_attr(&paths.state) {
        Ok(state) => device.state = state,
        Err(e) => {
            let kind = IssueKind::DeviceState { device: slave.to_string() };
            record(array, kind, paths.state, &e);
        }
    }
    device
}

fn record(array: &mut RaidArray, kind: IssueKind, path: PathBuf, err: &io::Error) {
    let issue = EnrichmentIssue { kind, path, message: err.to_string() };
    warn!(array = %array.name, error = %err, "{}", issue);
    array.issues.push(issue);
}
