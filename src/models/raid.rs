use chrono::{DateTime, Local};
use std::fmt;
use std::path::PathBuf;

/// One point-in-time read of every array listed in /proc/mdstat.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub captured_at: DateTime<Local>,
    pub arrays:      Vec<RaidArray>,   // order of appearance in /proc/mdstat
}

impl Snapshot {
    /// The last array printed under `name`, i.e. the most recent view when the
    /// kernel emitted several blocks for it.
    pub fn latest(&self, name: &str) -> Option<&RaidArray> {
        self.arrays.iter().rev().find(|a| a.name == name)
    }

    /// Names that appear in more than one block, in first-seen order.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut dups: Vec<&str> = Vec::new();
        for (i, a) in self.arrays.iter().enumerate() {
            let seen_before = self.arrays[..i].iter().any(|b| b.name == a.name);
            if seen_before && !dups.contains(&a.name.as_str()) {
                dups.push(&a.name);
            }
        }
        dups
    }

    pub fn device_count(&self) -> usize {
        self.arrays.iter().map(|a| a.devices.len()).sum()
    }
}

/// One software RAID array, as enriched from sysfs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaidArray {
    pub name:      String,   // "md0"
    pub index:     u32,
    pub raw_lines: Vec<String>,
    pub state:     String,   // md/array_state: "clean", "active", "inactive", ...
    pub level:     String,   // md/level: "raid0", "raid1", "linear", ...
    pub degraded:  Option<u32>,   // md/degraded: missing members; None when not exposed
    pub devices:   Vec<MemberDevice>,
    pub issues:    Vec<EnrichmentIssue>,
}

impl RaidArray {
    /// True when `flag` is one of the comma/space separated words of `state`.
    pub fn has_state(&self, flag: &str) -> bool {
        has_token(&self.state, flag)
    }

    /// Members missing according to `md/degraded`, falling back to a
    /// `degraded` word in `state` when the count is unavailable.
    pub fn is_degraded(&self) -> bool {
        match self.degraded {
            Some(n) => n > 0,
            None    => self.has_state("degraded"),
        }
    }

    /// Whether sysfs answered every read for this array.
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }
}

/// One member of an array, named after its `slaves/` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberDevice {
    pub name:  String,   // "sata1p1"
    pub path:  String,   // "/dev/sata1p1"
    pub state: String,   // "in_sync", "faulty", "spare", "active sync", ...
}

impl MemberDevice {
    pub fn has_flag(&self, flag: &str) -> bool {
        has_token(&self.state, flag)
    }

    pub fn is_faulty(&self) -> bool { self.has_flag("faulty") }

    pub fn is_rebuilding(&self) -> bool {
        self.has_flag("rebuilding") || self.has_flag("recovering") || self.has_flag("replacement")
    }
}

fn has_token(value: &str, flag: &str) -> bool {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .any(|t| t.eq_ignore_ascii_case(flag))
}

// ── Partial enrichment ───────────────────────────────────────────────

/// Which sysfs read failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    Slaves,
    ArrayState,
    Level,
    Degraded,
    DeviceState { device: String },
}

impl IssueKind {
    pub fn label(&self) -> String {
        match self {
            IssueKind::Slaves                 => "slaves".into(),
            IssueKind::ArrayState             => "array_state".into(),
            IssueKind::Level                  => "level".into(),
            IssueKind::Degraded               => "degraded".into(),
            IssueKind::DeviceState { device } => format!("state of {}", device),
        }
    }
}

/// A sysfs read that failed while enriching an array. The matching field is
/// left empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentIssue {
    pub kind:    IssueKind,
    pub path:    PathBuf,
    pub message: String,
}

impl fmt::Display for EnrichmentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "can not read {} ({}): {}", self.kind.label(), self.path.display(), self.message)
    }
}
