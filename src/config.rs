use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub capture: CaptureConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Kernel md status file
    pub mdstat: PathBuf,
    /// Root of the per-block-device sysfs tree
    pub sys_block: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Console level: trace, debug, info, warn, error
    pub level: String,
    /// Full operation log (every level, appended). Empty = `<executable>.full.log`.
    pub file: String,
    /// Write the full operation log at all.
    pub full_log: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Give up on a capture after this many milliseconds. 0 = no deadline.
    pub timeout_ms: u64,
}

impl CaptureConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ── Defaults ─────────────────────────────────────────────────────────

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            mdstat:    PathBuf::from(crate::collectors::mdraid::PROC_MDSTAT),
            sys_block: PathBuf::from(crate::collectors::md_paths::SYS_BLOCK),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".into(), file: String::new(), full_log: true }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self { timeout_ms: 2000 }
    }
}

// ── Load / Save ───────────────────────────────────────────────────────

impl Config {
    pub fn load() -> Self {
        match try_load() {
            Ok(c)  => c,
            Err(_) => {
                // Write defaults on first run (best-effort)
                let _ = try_write_defaults();
                Config::default()
            }
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mdpeek").join("mdpeek.toml"))
    }
}

fn try_load() -> Result<Config> {
    let path = Config::config_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    let text = fs::read_to_string(path)?;
    parse(&text)
}

fn parse(text: &str) -> Result<Config> {
    Ok(toml::from_str(text)?)
}

fn try_write_defaults() -> Result<()> {
    let path = Config::config_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(&Config::default())?;
    fs::write(path, format!("# mdpeek configuration\n# Generated on first run — edit freely\n\n{}", text))?;
    Ok(())
}
