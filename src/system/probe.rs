use super::error::ProbeError;
use super::process::ProcessSnapshot;
use super::snapshot::{ConnectionRecord, DiskUsage, HostMemory, ProbeBatch};

/// Synchronous query interface over the operating system's process and
/// resource tables.
///
/// CPU figures are averaged over a measurement window: callers invoke
/// [`SystemProbe::mark_cpu_window`], wait out the window, then read
/// [`SystemProbe::global_cpu_percent`] or [`SystemProbe::list_processes`].
/// One window covers a whole pass; nothing waits per process.
pub trait SystemProbe {
    /// Starts a CPU measurement window.
    fn mark_cpu_window(&mut self);

    fn list_processes(&mut self) -> ProbeBatch<ProcessSnapshot>;

    /// Whole-system CPU utilisation since the last window mark, 0..=100.
    fn global_cpu_percent(&mut self) -> f32;

    fn host_memory(&mut self) -> HostMemory;

    fn disk_partitions(&mut self) -> ProbeBatch<DiskUsage>;

    fn connections(&mut self) -> ProbeBatch<ConnectionRecord>;

    /// Terminates `pid`. Fails with [`ProbeError::NoSuchProcess`] when the
    /// process vanished and [`ProbeError::AccessDenied`] when the signal was
    /// refused; the process table is unchanged in both cases.
    fn terminate(&mut self, pid: u32) -> Result<(), ProbeError>;
}
