use std::net::SocketAddr;

use super::error::ProbeError;
use super::process::ProcessState;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HostMemory {
    pub total: u64,
    pub used: u64,
    pub available: u64,
    pub free: u64,
}

impl HostMemory {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.used as f64 / self.total as f64 * 100.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DiskUsage {
    pub device: String,
    pub mount_point: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
    Tcp6,
    Udp6,
}

impl Protocol {
    pub fn label(self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Tcp6 => "TCP6",
            Protocol::Udp6 => "UDP6",
        }
    }
}

/// One socket owned by a process. `remote_address` is `None` for listening
/// or unconnected sockets, which is a normal state rather than a failure.
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionRecord {
    pub pid: u32,
    pub process_name: String,
    pub status: ProcessState,
    pub protocol: Protocol,
    pub local_address: SocketAddr,
    pub remote_address: Option<SocketAddr>,
}

/// Result of a batch enumeration: everything that could be read, plus the
/// per-entity failures that were skipped along the way.
#[derive(Debug)]
pub struct ProbeBatch<T> {
    pub items: Vec<T>,
    pub errors: Vec<ProbeError>,
}

impl<T> ProbeBatch<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(items: Vec<T>, errors: Vec<ProbeError>) -> Self {
        Self { items, errors }
    }

    /// Logs every skipped entity and returns how many there were.
    pub fn log_errors(&self, operation: &str) -> usize {
        for err in &self.errors {
            tracing::debug!(operation, error = %err, "skipped entity");
        }
        if !self.errors.is_empty() {
            tracing::warn!(
                operation,
                skipped = self.errors.len(),
                "some entities could not be inspected"
            );
        }
        self.errors.len()
    }
}

impl<T> Default for ProbeBatch<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
