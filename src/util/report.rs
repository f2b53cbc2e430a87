use crate::alerts::Alert;
use crate::models::raid::Snapshot;
use serde_json::{json, Value};
use tracing::info;

/// Emit a snapshot to the log sink: one event per raw mdstat line and one per
/// member device.
pub fn log_snapshot(snapshot: &Snapshot) {
    info!(count = snapshot.arrays.len(), "Total mds");
    for array in &snapshot.arrays {
        for line in &array.raw_lines {
            info!(name = %array.name, state = %array.state, "{}", line);
        }
        for dev in &array.devices {
            info!(
                name = %array.name,
                device = %dev.name,
                path = %dev.path,
                state = %dev.state,
                "{} {}", array.name, array.level
            );
        }
    }
}

/// Human-readable report as a String.
pub fn generate(snapshot: &Snapshot, alerts: &[Alert]) -> String {
    let mut out = String::new();
    let rule = "═".repeat(47);

    out.push_str(&format!("{}\n", rule));
    out.push_str(&format!("  md RAID Report — {}\n", snapshot.captured_at.format("%Y-%m-%d %H:%M:%S")));
    out.push_str(&format!("{}\n\n", rule));

    // ── Alerts ─────────────────────────────────────────────────────────
    out.push_str(&format!("── Alerts ({}) ────────────────────────────────\n", alerts.len()));
    if alerts.is_empty() {
        out.push_str("  ● All arrays nominal\n");
    } else {
        for a in alerts {
            out.push_str(&format!("  [{}]  {}{}\n", a.severity.label(), a.prefix(), a.message));
        }
    }
    out.push('\n');

    // ── Arrays ─────────────────────────────────────────────────────────
    out.push_str(&format!("── Arrays ({}) ────────────────────────────────\n", snapshot.arrays.len()));
    for array in &snapshot.arrays {
        let missing = match array.degraded {
            Some(n) if n > 0 => format!("  missing: {}", n),
            _                => String::new(),
        };
        out.push_str(&format!(
            "  {:6}  {:8}  state: {}{}\n",
            array.name, or_dash(&array.level), or_dash(&array.state), missing
        ));
        for line in &array.raw_lines {
            out.push_str(&format!("    | {}\n", line));
        }
        if array.devices.is_empty() {
            out.push_str("    (no member devices)\n");
        }
        for dev in &array.devices {
            out.push_str(&format!("    {:<12} {:<18} {}\n", dev.name, dev.path, or_dash(&dev.state)));
        }
        for issue in &array.issues {
            out.push_str(&format!("    ! {}\n", issue));
        }
        out.push('\n');
    }

    out.push_str(&format!("{}\n", rule));
    out
}

/// JSON view of a snapshot for `--json`.
pub fn to_json(snapshot: &Snapshot) -> Value {
    let arrays: Vec<Value> = snapshot.arrays.iter().map(|a| {
        json!({
            "name":      a.name,
            "index":     a.index,
            "level":     a.level,
            "state":     a.state,
            "degraded":  a.degraded,
            "raw_lines": a.raw_lines,
            "devices": a.devices.iter().map(|d| json!({
                "name":  d.name,
                "path":  d.path,
                "state": d.state,
            })).collect::<Vec<_>>(),
            "issues": a.issues.iter().map(|i| json!({
                "read":    i.kind.label(),
                "path":    i.path.display().to_string(),
                "message": i.message,
            })).collect::<Vec<_>>(),
        })
    }).collect();

    json!({
        "mdpeek_version": env!("CARGO_PKG_VERSION"),
        "captured_at":    snapshot.captured_at.to_rfc3339(),
        "arrays":         arrays,
    })
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "—" } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::Severity;
    use crate::models::raid::{EnrichmentIssue, IssueKind, MemberDevice, RaidArray};
    use std::path::PathBuf;

    fn sample() -> Snapshot {
        Snapshot {
            captured_at: chrono::Local::now(),
            arrays: vec![
                RaidArray {
                    name:      "md0".into(),
                    index:     0,
                    raw_lines: vec!["md0 : active raid1 sda1[0] sdb1[1](F)".into(), "100 blocks [2/1] [U_]".into()],
                    state:     "clean".into(),
                    level:     "raid1".into(),
                    degraded:  Some(1),
                    devices:   vec![
                        MemberDevice { name: "sda1".into(), path: "/dev/sda1".into(), state: "in_sync".into() },
                        MemberDevice { name: "sdb1".into(), path: "/dev/sdb1".into(), state: "faulty".into() },
                    ],
                    issues:    vec![],
                },
                RaidArray {
                    name:   "md1".into(),
                    index:  1,
                    level:  "raid0".into(),
                    issues: vec![EnrichmentIssue {
                        kind:    IssueKind::ArrayState,
                        path:    PathBuf::from("/sys/block/md1/md/array_state"),
                        message: "gone".into(),
                    }],
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn report_lists_arrays_devices_and_issues() {
        let snap = sample();
        let alerts = vec![Alert {
            severity: Severity::Critical,
            array:    "md0".into(),
            device:   Some("sdb1".into()),
            message:  "/dev/sdb1 is faulty".into(),
        }];
        let text = generate(&snap, &alerts);

        assert!(text.contains("── Alerts (1)"));
        assert!(text.contains("[CRIT]  [md0/sdb1] /dev/sdb1 is faulty"));
        assert!(text.contains("    | md0 : active raid1 sda1[0] sdb1[1](F)"));
        assert!(text.contains("/dev/sdb1"));
        assert!(text.contains("state: clean  missing: 1"));
        assert!(text.contains("state: —"));
        assert!(text.contains("(no member devices)"));
        assert!(text.contains("! can not read array_state (/sys/block/md1/md/array_state): gone"));
    }

    #[test]
    fn report_without_alerts() {
        let text = generate(&sample(), &[]);
        assert!(text.contains("All arrays nominal"));
    }

    #[test]
    fn json_shape() {
        let v = to_json(&sample());
        assert_eq!(v["arrays"].as_array().unwrap().len(), 2);
        assert_eq!(v["arrays"][0]["devices"][1]["state"], "faulty");
        assert_eq!(v["arrays"][0]["raw_lines"][1], "100 blocks [2/1] [U_]");
        assert_eq!(v["arrays"][1]["issues"][0]["read"], "array_state");
        assert_eq!(v["arrays"][1]["state"], "");
        assert_eq!(v["arrays"][0]["degraded"], 1);
        assert!(v["arrays"][1]["degraded"].is_null());
        assert!(v["captured_at"].is_string());
    }

    #[test]
    fn log_snapshot_without_subscriber_is_silent() {
        log_snapshot(&sample());
    }
}
