use crate::config::LogConfig;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber: console on stderr at the configured level
/// (`RUST_LOG` wins), plus an optional full log file that records everything.
pub fn init(cfg: &LogConfig, verbose: bool) {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_directive(&cfg.level, verbose)));
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let exe = std::env::current_exe().ok();
    let full_log = full_log_path(cfg, exe.as_deref())
        .and_then(|path| open_full_log(&path))
        .map(|file| {
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(LevelFilter::TRACE)
        });

    tracing_subscriber::registry().with(console).with(full_log).init();
}

fn console_directive(level: &str, verbose: bool) -> String {
    let level = if verbose { "debug" } else { level };
    format!("mdpeek={}", level)
}

/// Where the full log goes: the configured file, else `<exe>.full.log`
/// next to the running binary. `None` when `full_log` is off.
fn full_log_path(cfg: &LogConfig, exe: Option<&Path>) -> Option<PathBuf> {
    if !cfg.full_log {
        return None;
    }
    if !cfg.file.is_empty() {
        return Some(PathBuf::from(&cfg.file));
    }
    let mut name = exe?.as_os_str().to_os_string();
    name.push(".full.log");
    Some(PathBuf::from(name))
}

/// Open (append) the full log and write a start banner. An unopenable file
/// is reported on stderr and skipped.
fn open_full_log(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let mut file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("!!! can not open {}: {} — full log will not be recorded", path.display(), e);
            return None;
        }
    };

    let banner = serde_json::json!({
        "started_at":   chrono::Local::now().to_rfc3339(),
        "command_line": std::env::args().collect::<Vec<_>>().join(" "),
    });
    if let Err(e) = writeln!(file, "\n{}", banner) {
        eprintln!("!!! can not write log banner: {}", e);
    }
    Some(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_forces_debug() {
        assert_eq!(console_directive("warn", false), "mdpeek=warn");
        assert_eq!(console_directive("warn", true), "mdpeek=debug");
    }

    fn log_cfg(file: &str, full_log: bool) -> LogConfig {
        LogConfig { file: file.into(), full_log, ..Default::default() }
    }

    #[test]
    fn full_log_defaults_next_to_executable() {
        let exe = Path::new("/usr/local/bin/mdpeek");
        assert_eq!(
            full_log_path(&log_cfg("", true), Some(exe)),
            Some(PathBuf::from("/usr/local/bin/mdpeek.full.log"))
        );
        assert_eq!(full_log_path(&log_cfg("", true), None), None);
    }

    #[test]
    fn configured_file_wins() {
        let exe = Path::new("/usr/local/bin/mdpeek");
        assert_eq!(
            full_log_path(&log_cfg("/var/log/md.log", true), Some(exe)),
            Some(PathBuf::from("/var/log/md.log"))
        );
    }

    #[test]
    fn full_log_off_writes_nothing() {
        let exe = Path::new("/usr/local/bin/mdpeek");
        assert_eq!(full_log_path(&log_cfg("", false), Some(exe)), None);
        assert_eq!(full_log_path(&log_cfg("/var/log/md.log", false), Some(exe)), None);
    }

    #[test]
    fn full_log_appends_banner() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("mdpeek.full.log");

        drop(open_full_log(&path).unwrap());
        drop(open_full_log(&path).unwrap());

        let text = fs::read_to_string(&path).unwrap();
        let banners: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(banners.len(), 2);
        let v: serde_json::Value = serde_json::from_str(banners[0]).unwrap();
        assert!(v["started_at"].is_string());
        assert!(v["command_line"].is_string());
    }
}
