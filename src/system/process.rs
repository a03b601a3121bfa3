use std::fmt;

/// Scheduler state of a process, reduced to the states the console filters on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Sleeping,
    Zombie,
    /// Any other state, keeping the platform's label for display.
    Other(String),
}

impl ProcessState {
    pub fn label(&self) -> &str {
        match self {
            ProcessState::Running => "running",
            ProcessState::Sleeping => "sleeping",
            ProcessState::Zombie => "zombie",
            ProcessState::Other(label) => label,
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<sysinfo::ProcessStatus> for ProcessState {
    fn from(status: sysinfo::ProcessStatus) -> Self {
        match status {
            sysinfo::ProcessStatus::Run => ProcessState::Running,
            sysinfo::ProcessStatus::Sleep => ProcessState::Sleeping,
            sysinfo::ProcessStatus::Zombie => ProcessState::Zombie,
            other => ProcessState::Other(other.to_string().to_lowercase()),
        }
    }
}

/// Point-in-time facts about one process. A fresh listing replaces the
/// previous one wholesale; snapshots are never patched in place.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessSnapshot {
    pub pid: u32,
    pub name: String,
    pub status: ProcessState,
    pub memory_bytes: u64,
    pub cpu_percent: f32,
    pub owner: String,
}
