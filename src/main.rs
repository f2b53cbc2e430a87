mod alerts;
mod collectors;
mod config;
mod error;
mod models;
mod util;

use anyhow::Result;
use clap::Parser;
use collectors::fs::RealFs;
use collectors::md_paths::SysBlock;
use collectors::mdraid;
use models::raid::Snapshot;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mdpeek", about = "Inspect Linux software RAID arrays", version)]
struct Cli {
    /// Print a human-readable report to stdout and exit
    #[arg(long)]
    report: bool,

    /// Print a one-shot JSON snapshot of all arrays and exit
    #[arg(long)]
    json: bool,

    /// Health check: exit 0=OK, 1=WARNING, 2=CRITICAL, 3=UNKNOWN (nagios/cron compatible)
    #[arg(long)]
    check: bool,

    /// Print config file path and current values, then exit
    #[arg(long)]
    config: bool,

    /// Read this file instead of /proc/mdstat
    #[arg(long, value_name = "PATH")]
    mdstat: Option<PathBuf>,

    /// Use this directory instead of /sys/block
    #[arg(long, value_name = "DIR")]
    sys_block: Option<PathBuf>,

    /// Append the full (trace level) log to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<String>,

    /// Capture deadline in milliseconds (0 = none)
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Debug output on the console
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(&self, cfg: &mut config::Config) {
        if let Some(p) = &self.mdstat     { cfg.paths.mdstat = p.clone(); }
        if let Some(p) = &self.sys_block  { cfg.paths.sys_block = p.clone(); }
        if let Some(f) = &self.log_file   { cfg.log.file = f.clone(); }
        if let Some(t) = self.timeout_ms  { cfg.capture.timeout_ms = t; }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = config::Config::load();
    cli.apply(&mut cfg);

    if cli.config {
        return run_print_config(&cfg);
    }

    util::logging::init(&cfg.log, cli.verbose);

    if cli.check {
        run_check(&cfg);
    }

    let snapshot = capture(&cfg)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&util::report::to_json(&snapshot))?);
    } else if cli.report {
        let alerts = alerts::evaluate(&snapshot);
        print!("{}", util::report::generate(&snapshot, &alerts));
    } else {
        util::report::log_snapshot(&snapshot);
    }
    Ok(())
}

fn capture(cfg: &config::Config) -> Result<Snapshot> {
    let snapshot = mdraid::capture_with_deadline(
        RealFs,
        SysBlock::new(&cfg.paths.sys_block),
        cfg.paths.mdstat.clone(),
        cfg.capture.timeout(),
    )?;
    Ok(snapshot)
}

fn run_check(cfg: &config::Config) -> ! {
    let snapshot = match capture(cfg) {
        Ok(s) => s,
        Err(e) => {
            println!("UNKNOWN — {:#}", e);
            std::process::exit(3);
        }
    };

    let active_alerts = alerts::evaluate(&snapshot);
    let worst = active_alerts.iter().map(|a| &a.severity).max();
    let code = worst.map(|s| s.exit_code()).unwrap_or(0);

    if code == 0 {
        println!("OK — {} array(s), {} device(s)", snapshot.arrays.len(), snapshot.device_count());
    }
    for a in active_alerts.iter().filter(|a| a.severity.exit_code() > 0) {
        println!("[{}] {}{}", a.severity.label(), a.prefix(), a.message);
    }
    std::process::exit(code);
}

fn run_print_config(cfg: &config::Config) -> Result<()> {
    let path = config::Config::config_path()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(unknown)".to_string());
    println!("Config: {}", path);
    println!();
    println!("[paths]");
    println!("  mdstat     = {}", cfg.paths.mdstat.display());
    println!("  sys_block  = {}", cfg.paths.sys_block.display());
    println!();
    println!("[log]");
    println!("  level      = {}", cfg.log.level);
    let file = if cfg.log.file.is_empty() { "(next to executable)" } else { cfg.log.file.as_str() };
    println!("  file       = {}", file);
    println!("  full_log   = {}", cfg.log.full_log);
    println!();
    println!("[capture]");
    println!("  timeout_ms = {}", cfg.capture.timeout_ms);
    Ok(())
}
