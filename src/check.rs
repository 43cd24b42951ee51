//! Environment check: report optional capabilities and directory health.

use anyhow::{bail, Result};

use crate::capability::{self, Capabilities, Capability};
use crate::config::NotebookConfig;
use crate::resolve::can_write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub capabilities: Vec<(Capability, bool)>,
    pub data_dir_writable: bool,
    pub results_dir_writable: bool,
}

impl CheckReport {
    pub fn missing(&self) -> Vec<Capability> {
        self.capabilities
            .iter()
            .filter(|(_, ok)| !ok)
            .map(|(cap, _)| *cap)
            .collect()
    }
}

pub fn check(config: &NotebookConfig, caps: &Capabilities) -> CheckReport {
    CheckReport {
        capabilities: Capability::ALL.iter().map(|&c| (c, caps.has(c))).collect(),
        data_dir_writable: can_write(&config.data_dir),
        results_dir_writable: can_write(&config.results_dir),
    }
}

fn mark(ok: bool) -> &'static str {
    if ok { "\u{2705}" } else { "\u{26a0}\u{fe0f} " }
}

/// slidekit check
pub fn run() -> Result<()> {
    let config = &crate::config::settings().notebook;
    let caps = capability::detected();
    let report = check(config, caps);

    println!("Capabilities:");
    for (cap, ok) in &report.capabilities {
        println!("  {} {}", mark(*ok), cap.name());
    }
    if let Some(stock) = caps.stock() {
        println!("  stock images from {}", stock.dir().display());
    }
    println!();
    println!("Directories:");
    println!("  {} data     {}", mark(report.data_dir_writable), config.data_dir.display());
    println!("  {} results  {}", mark(report.results_dir_writable), config.results_dir.display());

    let missing = report.missing();
    if !missing.is_empty() {
        println!();
        println!(
            "Optional capabilities unavailable: {}. Samples will be synthesized where needed.",
            missing.iter().map(|c| c.name()).collect::<Vec<_>>().join(", ")
        );
    }

    if !report.data_dir_writable {
        bail!("Data directory {} is not writable", config.data_dir.display());
    }
    Ok(())
}
