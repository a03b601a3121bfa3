use std::collections::HashMap;

use sysinfo::{
    Disks, Pid, ProcessRefreshKind, ProcessesToUpdate, Signal, System, UpdateKind, Users,
};

use super::error::ProbeError;
use super::kill::{send_signal, signal_name};
use super::platform::{self, OwnerInfo};
use super::probe::SystemProbe;
use super::process::{ProcessSnapshot, ProcessState};
use super::snapshot::{ConnectionRecord, DiskUsage, HostMemory, ProbeBatch};

/// [`SystemProbe`] backed by `sysinfo`.
pub struct Collector {
    sys: System,
    kill_signal: Signal,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new(Signal::Kill)
    }
}

impl Collector {
    pub fn new(kill_signal: Signal) -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::everything(),
        );
        Collector { sys, kill_signal }
    }

    pub fn system(&self) -> &System {
        &self.sys
    }

    fn refresh_processes(&mut self) {
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing()
                .with_memory()
                .with_cpu()
                .with_user(UpdateKind::OnlyIfNotSet),
        );
    }
}

impl SystemProbe for Collector {
    fn mark_cpu_window(&mut self) {
        self.sys.refresh_cpu_all();
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_cpu(),
        );
    }

    /// Lists every process sysinfo could read. sysinfo leaves out a process
    /// whose `/proc` entry vanished or could not be parsed during the refresh,
    /// and unreadable fields come back as defaults, so this batch never
    /// carries per-process errors. Fields we derive ourselves fall back to
    /// `N/A` instead of failing the entry.
    fn list_processes(&mut self) -> ProbeBatch<ProcessSnapshot> {
        self.refresh_processes();
        let users = Users::new_with_refreshed_list();

        let mut processes: Vec<ProcessSnapshot> = self
            .sys
            .processes()
            .iter()
            .map(|(pid, process)| {
                let owner = process
                    .user_id()
                    .and_then(|uid| users.get_user_by_id(uid))
                    .map(|user| user.name().to_string())
                    .unwrap_or_else(|| "N/A".to_string());
                ProcessSnapshot {
                    pid: pid.as_u32(),
                    name: process.name().to_string_lossy().to_string(),
                    status: ProcessState::from(process.status()),
                    memory_bytes: process.memory(),
                    cpu_percent: process.cpu_usage(),
                    owner,
                }
            })
            .collect();
        // Enumeration order follows the pid table, as the OS reports it.
        processes.sort_by_key(|p| p.pid);

        ProbeBatch::new(processes)
    }

    fn global_cpu_percent(&mut self) -> f32 {
        self.sys.refresh_cpu_all();
        self.sys.global_cpu_usage()
    }

    fn host_memory(&mut self) -> HostMemory {
        self.sys.refresh_memory();
        HostMemory {
            total: self.sys.total_memory(),
            used: self.sys.used_memory(),
            available: self.sys.available_memory(),
            free: self.sys.free_memory(),
        }
    }

    fn disk_partitions(&mut self) -> ProbeBatch<DiskUsage> {
        let disks = Disks::new_with_refreshed_list();
        let items = disks
            .iter()
            .map(|disk| {
                let total = disk.total_space();
                let free = disk.available_space();
                DiskUsage {
                    device: disk.name().to_string_lossy().to_string(),
                    mount_point: disk.mount_point().display().to_string(),
                    total,
                    used: total.saturating_sub(free),
                    free,
                }
            })
            .collect();
        ProbeBatch::new(items)
    }

    fn connections(&mut self) -> ProbeBatch<ConnectionRecord> {
        self.refresh_processes();
        let owners: HashMap<u32, OwnerInfo> = self
            .sys
            .processes()
            .iter()
            .map(|(pid, process)| {
                (
                    pid.as_u32(),
                    OwnerInfo {
                        name: process.name().to_string_lossy().to_string(),
                        status: ProcessState::from(process.status()),
                    },
                )
            })
            .collect();
        platform::connections(&owners)
    }

    fn terminate(&mut self, pid: u32) -> Result<(), ProbeError> {
        let pids = [Pid::from_u32(pid)];
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&pids),
            true,
            ProcessRefreshKind::nothing(),
        );
        send_signal(&self.sys, pid, self.kill_signal)?;
        tracing::info!(pid, signal = signal_name(self.kill_signal), "signal sent");
        Ok(())
    }
}
