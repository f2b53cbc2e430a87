use crate::models::raid::{RaidArray, Snapshot};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info     => "INFO",
            Severity::Warning  => "WARN",
            Severity::Critical => "CRIT",
        }
    }

    /// Nagios-style plugin exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Severity::Info     => 0,
            Severity::Warning  => 1,
            Severity::Critical => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Alert {
    pub severity: Severity,
    pub array:    String,
    pub device:   Option<String>,
    pub message:  String,
}

impl Alert {
    pub fn prefix(&self) -> String {
        match &self.device {
            Some(d) => format!("[{}/{}] ", self.array, d),
            None    => format!("[{}] ", self.array),
        }
    }

    fn array(severity: Severity, array: &RaidArray, message: String) -> Self {
        Alert { severity, array: array.name.clone(), device: None, message }
    }
}

/// Array states that mean the array is not serving I/O.
const STOPPED_STATES: &[&str] = &["inactive", "clear", "broken"];

/// Evaluate array health. Each array name is judged once, on its most recent
/// block. Returns a list sorted Critical → Warning → Info.
pub fn evaluate(snapshot: &Snapshot) -> Vec<Alert> {
    let mut alerts: Vec<Alert> = Vec::new();
    let mut judged: Vec<&str> = Vec::new();

    for name in snapshot.arrays.iter().map(|a| a.name.as_str()) {
        if judged.contains(&name) { continue; }
        judged.push(name);
        if let Some(array) = snapshot.latest(name) {
            evaluate_array(array, &mut alerts);
        }
    }

    for name in snapshot.duplicate_names() {
        let blocks = snapshot.arrays.iter().filter(|a| a.name == name).count();
        alerts.push(Alert {
            severity: Severity::Warning,
            array:    name.to_string(),
            device:   None,
            message:  format!("listed {} times in mdstat (state changing)", blocks),
        });
    }

    alerts.sort_by(|a, b| b.severity.cmp(&a.severity));
    alerts
}

fn evaluate_array(array: &RaidArray, alerts: &mut Vec<Alert>) {
    if let Some(s) = STOPPED_STATES.iter().find(|s| array.has_state(s)) {
        alerts.push(Alert::array(Severity::Critical, array, format!("array is {}", s)));
    }
    if array.is_degraded() {
        let message = match array.degraded {
            Some(1) => "array is degraded (1 member missing)".to_string(),
            Some(n) => format!("array is degraded ({} members missing)", n),
            None    => "array is degraded".to_string(),
        };
        alerts.push(Alert::array(Severity::Warning, array, message));
    }

    for dev in &array.devices {
        let severity = if dev.is_faulty() {
            Severity::Critical
        } else if dev.is_rebuilding() {
            Severity::Warning
        } else {
            continue;
        };
        alerts.push(Alert {
            severity,
            array:   array.name.clone(),
            device:  Some(dev.name.clone()),
            message: format!("{} is {}", dev.path, dev.state),
        });
    }

    for issue in &array.issues {
        alerts.push(Alert::array(Severity::Warning, array, issue.to_string()));
    }

    if array.devices.is_empty() && array.is_complete() {
        alerts.push(Alert::array(Severity::Info, array, "array has no member devices".into()));
    }
}
