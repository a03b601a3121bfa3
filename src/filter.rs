use std::time::Duration;

use clap::ValueEnum;

use crate::config::FilterConfig;
use crate::format::format_bytes;
use crate::system::{ProcessSnapshot, ProcessState, SystemProbe};

const MIB: u64 = 1024 * 1024;

/// A rule applied uniformly to every process in a snapshot.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterCriterion {
    ByStatus(ProcessState),
    /// Keep processes using strictly more than this many bytes.
    ByMemoryThreshold(u64),
    /// Keep processes using strictly more than this CPU percentage.
    ByCpuThreshold(f32),
}

impl FilterCriterion {
    pub fn matches(&self, process: &ProcessSnapshot) -> bool {
        match self {
            FilterCriterion::ByStatus(status) => process.status == *status,
            FilterCriterion::ByMemoryThreshold(bytes) => process.memory_bytes > *bytes,
            FilterCriterion::ByCpuThreshold(percent) => process.cpu_percent > *percent,
        }
    }

    pub fn needs_cpu_window(&self) -> bool {
        matches!(self, FilterCriterion::ByCpuThreshold(_))
    }
}

/// The filter options offered by the menu and `--filter`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FilterKind {
    Running,
    Memory,
    Zombie,
    Sleeping,
    Cpu,
}

impl FilterKind {
    pub const ALL: [FilterKind; 5] = [
        FilterKind::Running,
        FilterKind::Memory,
        FilterKind::Zombie,
        FilterKind::Sleeping,
        FilterKind::Cpu,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterKind::Running => "Filter Running",
            FilterKind::Memory => "Filter Memory Usage",
            FilterKind::Zombie => "Filter Zombie",
            FilterKind::Sleeping => "Filter Sleeping",
            FilterKind::Cpu => "Filter Cpu Usage",
        }
    }

    /// Sub-menu option number, "1" through "5".
    pub fn from_menu_choice(choice: &str) -> Option<Self> {
        let n: usize = choice.trim().parse().ok()?;
        Self::ALL.get(n.checked_sub(1)?).copied()
    }

    /// Builds the criterion. `threshold` is in MiB for memory and percent for
    /// CPU; when absent the configured default applies. Status filters ignore it.
    pub fn criterion(self, threshold: Option<f64>, config: &FilterConfig) -> FilterCriterion {
        match self {
            FilterKind::Running => FilterCriterion::ByStatus(ProcessState::Running),
            FilterKind::Zombie => FilterCriterion::ByStatus(ProcessState::Zombie),
            FilterKind::Sleeping => FilterCriterion::ByStatus(ProcessState::Sleeping),
            FilterKind::Memory => {
                let mb = threshold.unwrap_or(config.memory_threshold_mb as f64).max(0.0);
                FilterCriterion::ByMemoryThreshold((mb * MIB as f64) as u64)
            }
            FilterKind::Cpu => {
                let pct = threshold.unwrap_or(f64::from(config.cpu_threshold_percent));
                FilterCriterion::ByCpuThreshold(pct.max(0.0) as f32)
            }
        }
    }
}

/// Every process matching `criterion`, in snapshot order. Every process is
/// examined; the result does not depend on how the snapshot is sorted.
pub fn apply(criterion: &FilterCriterion, snapshot: &[ProcessSnapshot]) -> Vec<ProcessSnapshot> {
    snapshot
        .iter()
        .filter(|p| criterion.matches(p))
        .cloned()
        .collect()
}

#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub matches: Vec<ProcessSnapshot>,
    /// Processes that could not be inspected and were left out.
    pub skipped: usize,
}

/// One complete filter pass against the live process table. CPU criteria
/// take a single whole-system measurement window up front.
pub async fn run_pass<P: SystemProbe>(
    probe: &mut P,
    criterion: &FilterCriterion,
    cpu_window: Duration,
) -> FilterOutcome {
    if criterion.needs_cpu_window() {
        probe.mark_cpu_window();
        if !cpu_window.is_zero() {
            tokio::time::sleep(cpu_window).await;
        }
    }

    let batch = probe.list_processes();
    let skipped = batch.log_errors("filter");
    let matches = apply(criterion, &batch.items);

    match criterion {
        FilterCriterion::ByMemoryThreshold(threshold) => {
            for p in &matches {
                tracing::info!(
                    pid = p.pid,
                    name = %p.name,
                    "using {} which is more than the threshold: {}",
                    format_bytes(p.memory_bytes),
                    format_bytes(*threshold)
                );
            }
        }
        FilterCriterion::ByCpuThreshold(threshold) => {
            for p in &matches {
                tracing::info!(
                    pid = p.pid,
                    name = %p.name,
                    "has high cpu usage {:.1}% (threshold {threshold}%)",
                    p.cpu_percent
                );
            }
        }
        FilterCriterion::ByStatus(status) => {
            tracing::info!(status = %status, matched = matches.len(), "status filter");
        }
    }

    FilterOutcome { matches, skipped }
}
