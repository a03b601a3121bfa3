#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use color_eyre::Result;
use procwatch::console::{PresentationSink, Prompt, Reply};
use procwatch::sampling::LiveCharts;
use procwatch::system::{
    ConnectionRecord, DiskUsage, HostMemory, ProbeBatch, ProbeError, ProcessSnapshot,
    ProcessState, SystemProbe,
};
use procwatch::table::Table;
use tokio::time::Instant;

pub const GIB: u64 = 1024 * 1024 * 1024;

pub fn process(pid: u32, name: &str, status: ProcessState, memory_mb: u64, cpu: f32) -> ProcessSnapshot {
    ProcessSnapshot {
        pid,
        name: name.to_string(),
        status,
        memory_bytes: memory_mb * 1024 * 1024,
        cpu_percent: cpu,
        owner: "tester".to_string(),
    }
}

/// In-memory probe. `terminate` removes the process and records the call.
pub struct FakeProbe {
    pub processes: Vec<ProcessSnapshot>,
    pub memory: HostMemory,
    pub cpu: f32,
    pub disks: Vec<DiskUsage>,
    pub connections: Vec<ConnectionRecord>,
    pub skipped: Vec<ProbeError>,
    pub refuse: Vec<u32>,
    pub terminated: Vec<u32>,
    pub windows_marked: usize,
    /// Renames a pid right after the next listing, as if it exited and was reused.
    pub rename_on_list: Option<(u32, String)>,
}

impl FakeProbe {
    pub fn new(processes: Vec<ProcessSnapshot>) -> Self {
        Self {
            processes,
            memory: HostMemory {
                total: 8 * GIB,
                used: 2 * GIB,
                available: 6 * GIB,
                free: 5 * GIB,
            },
            cpu: 12.5,
            disks: Vec::new(),
            connections: Vec::new(),
            skipped: Vec::new(),
            refuse: Vec::new(),
            terminated: Vec::new(),
            windows_marked: 0,
            rename_on_list: None,
        }
    }
}

impl SystemProbe for FakeProbe {
    fn mark_cpu_window(&mut self) {
        self.windows_marked += 1;
    }

    fn list_processes(&mut self) -> ProbeBatch<ProcessSnapshot> {
        let batch = ProbeBatch::with_errors(self.processes.clone(), self.skipped.clone());
        if let Some((pid, name)) = self.rename_on_list.take() {
            for p in self.processes.iter_mut().filter(|p| p.pid == pid) {
                p.name = name.clone();
            }
        }
        batch
    }

    fn global_cpu_percent(&mut self) -> f32 {
        self.cpu
    }

    fn host_memory(&mut self) -> HostMemory {
        self.memory
    }

    fn disk_partitions(&mut self) -> ProbeBatch<DiskUsage> {
        ProbeBatch::new(self.disks.clone())
    }

    fn connections(&mut self) -> ProbeBatch<ConnectionRecord> {
        ProbeBatch::new(self.connections.clone())
    }

    fn terminate(&mut self, pid: u32) -> Result<(), ProbeError> {
        if self.refuse.contains(&pid) {
            return Err(ProbeError::AccessDenied { pid });
        }
        let before = self.processes.len();
        self.processes.retain(|p| p.pid != pid);
        if self.processes.len() == before {
            return Err(ProbeError::NoSuchProcess { pid });
        }
        self.terminated.push(pid);
        Ok(())
    }
}

/// Replays scripted answers. Live views are cancelled `cancel_after` after
/// they start, measured on the tokio clock.
pub struct ScriptedPrompt {
    replies: VecDeque<Reply>,
    pub prompts: Vec<String>,
    cancel_after: Duration,
    deadline: Option<Instant>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: lines.into_iter().map(|l| Reply::Line(l.into())).collect(),
            prompts: Vec::new(),
            cancel_after: Duration::from_secs(1),
            deadline: None,
        }
    }

    pub fn with_replies(replies: Vec<Reply>) -> Self {
        Self {
            replies: replies.into(),
            prompts: Vec::new(),
            cancel_after: Duration::from_secs(1),
            deadline: None,
        }
    }

    pub fn cancel_after(mut self, after: Duration) -> Self {
        self.cancel_after = after;
        self
    }
}

impl Prompt for ScriptedPrompt {
    async fn read_line(&mut self, prompt: &str) -> Result<Reply> {
        self.prompts.push(prompt.to_string());
        Ok(self.replies.pop_front().unwrap_or(Reply::Closed))
    }

    async fn wait_for_cancel(&mut self) {
        let deadline = *self
            .deadline
            .get_or_insert_with(|| Instant::now() + self.cancel_after);
        tokio::time::sleep_until(deadline).await;
        self.deadline = None;
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub notices: Vec<String>,
    pub tables: Vec<Table>,
    pub clears: usize,
    pub chart_sessions: usize,
    pub chart_frames: Vec<(Vec<f64>, Vec<f64>)>,
    pub charts_open: bool,
}

impl RecordingSink {
    pub fn saw(&self, needle: &str) -> bool {
        self.notices.iter().any(|n| n.contains(needle))
    }
}

impl PresentationSink for RecordingSink {
    fn notice(&mut self, text: &str) -> Result<()> {
        self.notices.push(text.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.clears += 1;
        Ok(())
    }

    fn render_table(&mut self, table: &Table) -> Result<()> {
        self.tables.push(table.clone());
        Ok(())
    }

    fn begin_charts(&mut self) -> Result<()> {
        self.chart_sessions += 1;
        self.charts_open = true;
        Ok(())
    }

    fn redraw_charts(&mut self, charts: &LiveCharts) -> Result<()> {
        let values = |b: &procwatch::sampling::SamplingBuffer| {
            b.snapshot().iter().map(|p| p.value).collect::<Vec<_>>()
        };
        self.chart_frames
            .push((values(&charts.cpu), values(&charts.memory)));
        Ok(())
    }

    fn end_charts(&mut self) -> Result<()> {
        self.charts_open = false;
        Ok(())
    }
}
