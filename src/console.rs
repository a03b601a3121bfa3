use color_eyre::Result;
use tokio::time::MissedTickBehavior;

use crate::config::Config;
use crate::control::{
    Confirmation, GateDecision, KillResult, PendingKill, ProcessController, ProcessHandle,
};
use crate::filter::{self, FilterCriterion, FilterKind};
use crate::format::{format_bytes, key_value_line};
use crate::sampling::LiveCharts;
use crate::system::{ProbeError, SystemProbe};
use crate::table::{self, Table};

/// What the operator typed in answer to a prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Line(String),
    /// Ctrl+C or Esc while typing.
    Cancelled,
    /// Input is gone (Ctrl+D on an empty line, or the terminal closed).
    Closed,
}

/// Source of operator input, kept apart from the loop so the loop can be
/// driven by a script.
#[allow(async_fn_in_trait)]
pub trait Prompt {
    async fn read_line(&mut self, prompt: &str) -> Result<Reply>;

    /// Resolves once the operator cancels a running view or input closes.
    /// Must be cancel-safe: it is raced against timers and dropped often.
    async fn wait_for_cancel(&mut self);
}

/// Where tables, messages and charts go.
pub trait PresentationSink {
    fn notice(&mut self, text: &str) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
    fn render_table(&mut self, table: &Table) -> Result<()>;
    fn begin_charts(&mut self) -> Result<()>;
    /// Called once per tick with both streams.
    fn redraw_charts(&mut self, charts: &LiveCharts) -> Result<()>;
    fn end_charts(&mut self) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuChoice {
    ListProcesses,
    Filter,
    Start,
    Kill,
    Search,
    Memory,
    Charts,
    Connections,
    Disks,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 10] = [
        MenuChoice::ListProcesses,
        MenuChoice::Filter,
        MenuChoice::Start,
        MenuChoice::Kill,
        MenuChoice::Search,
        MenuChoice::Memory,
        MenuChoice::Charts,
        MenuChoice::Connections,
        MenuChoice::Disks,
        MenuChoice::Exit,
    ];

    /// Menu numbers run from "1" to "10".
    pub fn parse(input: &str) -> Option<Self> {
        let n: usize = input.trim().parse().ok()?;
        Self::ALL.get(n.checked_sub(1)?).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuChoice::ListProcesses => "Show all Processes",
            MenuChoice::Filter => "Filter Processes",
            MenuChoice::Start => "Start Process",
            MenuChoice::Kill => "Kill Process",
            MenuChoice::Search => "Search For Process",
            MenuChoice::Memory => "Provide Memory info",
            MenuChoice::Charts => "Display cpu utilization/Memory usage",
            MenuChoice::Connections => "Show Process network connections",
            MenuChoice::Disks => "Show Disk usage",
            MenuChoice::Exit => "Exit",
        }
    }

    pub fn needs_sub_input(self) -> bool {
        matches!(
            self,
            MenuChoice::Filter | MenuChoice::Start | MenuChoice::Kill | MenuChoice::Search
        )
    }

    /// The command for choices that need no further input.
    pub fn immediate_command(self) -> Option<Command> {
        match self {
            MenuChoice::ListProcesses => Some(Command::ListProcesses),
            MenuChoice::Memory => Some(Command::Memory),
            MenuChoice::Charts => Some(Command::Charts),
            MenuChoice::Connections => Some(Command::Connections),
            MenuChoice::Disks => Some(Command::Disks),
            _ => None,
        }
    }
}

const BANNER_TITLE: &str = "procwatch";
const BANNER_SUBTITLE: &str = "Process & Network Monitor - processes, resources and connections";

/// Box-drawn banner shown above the main menu.
pub fn banner_text() -> String {
    let width = BANNER_TITLE.len().max(BANNER_SUBTITLE.len()) + 4;
    let rule = "═".repeat(width);
    format!(
        "╔{rule}╗\n║{:^width$}║\n║{:^width$}║\n╚{rule}╝",
        BANNER_TITLE, BANNER_SUBTITLE
    )
}

pub fn menu_text() -> String {
    let mut text = String::from("**enter what you want to monitor");
    for (i, choice) in MenuChoice::ALL.iter().enumerate() {
        text.push_str(&format!("\n{}:{}", i + 1, choice.label()));
    }
    text
}

fn filter_menu_text() -> String {
    let mut text = String::from("these are your filter options");
    for (i, kind) in FilterKind::ALL.iter().enumerate() {
        text.push_str(&format!("\n{}-{}", i + 1, kind.label()));
    }
    text
}

/// A fully specified action, whether it came from the menu or the command line.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    ListProcesses,
    Filter(FilterCriterion),
    Start(String),
    Kill(String),
    Search(String),
    Memory,
    Charts,
    Connections,
    Disks,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsoleState {
    Idle,
    AwaitingMenuChoice,
    AwaitingSubInput(MenuChoice),
    Exiting,
}

/// The interactive console: reads a menu choice, gathers whatever the
/// choice needs, runs it, and comes back to the menu until told to exit.
pub struct ConsoleLoop<P, I, S> {
    config: Config,
    probe: P,
    prompt: I,
    sink: S,
    charts: LiveCharts,
    state: ConsoleState,
    launched: Vec<ProcessHandle>,
}

impl<P, I, S> ConsoleLoop<P, I, S>
where
    P: SystemProbe,
    I: Prompt,
    S: PresentationSink,
{
    pub fn new(config: Config, probe: P, prompt: I, sink: S) -> Self {
        let charts = LiveCharts::new(config.general.chart_window.max(1));
        Self {
            config,
            probe,
            prompt,
            sink,
            charts,
            state: ConsoleState::Idle,
            launched: Vec::new(),
        }
    }

    pub fn state(&self) -> &ConsoleState {
        &self.state
    }

    pub fn charts(&self) -> &LiveCharts {
        &self.charts
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn launched(&self) -> &[ProcessHandle] {
        &self.launched
    }

    /// Monitor mode: loops until the operator exits.
    pub async fn run(&mut self) -> Result<()> {
        tracing::info!("entering monitor mode");
        self.sink.notice("**Entering monitor mode")?;
        self.state = ConsoleState::Idle;
        while self.state != ConsoleState::Exiting {
            self.step().await?;
        }
        tracing::info!("leaving monitor mode");
        Ok(())
    }

    /// Argument mode: runs exactly one command, then exits.
    pub async fn run_once(&mut self, command: Command) -> Result<()> {
        self.execute(command).await?;
        self.state = ConsoleState::Exiting;
        Ok(())
    }

    /// Advances the state machine by one transition.
    pub async fn step(&mut self) -> Result<()> {
        self.reap_launched();

        let next = match self.state.clone() {
            ConsoleState::Idle => ConsoleState::AwaitingMenuChoice,
            ConsoleState::AwaitingMenuChoice => self.read_menu_choice().await?,
            ConsoleState::AwaitingSubInput(choice) => {
                match self.collect_command(choice).await? {
                    Some(command) => self.execute(command).await?,
                    None => tracing::info!(choice = choice.label(), "input abandoned"),
                }
                ConsoleState::AwaitingMenuChoice
            }
            ConsoleState::Exiting => ConsoleState::Exiting,
        };
        self.state = next;
        Ok(())
    }

    async fn read_menu_choice(&mut self) -> Result<ConsoleState> {
        self.sink.notice(&banner_text())?;
        self.sink.notice(&menu_text())?;
        let next = match self.prompt.read_line("enter your option: ").await? {
            Reply::Line(input) => match MenuChoice::parse(&input) {
                Some(MenuChoice::Exit) => {
                    self.sink.notice("****Close Program***")?;
                    ConsoleState::Exiting
                }
                Some(choice) if choice.needs_sub_input() => ConsoleState::AwaitingSubInput(choice),
                Some(choice) => {
                    if let Some(command) = choice.immediate_command() {
                        self.execute(command).await?;
                    }
                    ConsoleState::AwaitingMenuChoice
                }
                None => {
                    tracing::warn!(input = %input, "unrecognised menu choice");
                    self.sink.notice("no valid option was provided")?;
                    ConsoleState::Exiting
                }
            },
            Reply::Cancelled => {
                tracing::info!("monitoring was stopped");
                ConsoleState::AwaitingMenuChoice
            }
            Reply::Closed => ConsoleState::Exiting,
        };
        Ok(next)
    }

    async fn collect_command(&mut self, choice: MenuChoice) -> Result<Option<Command>> {
        let command = match choice {
            MenuChoice::Filter => return self.collect_filter().await,
            MenuChoice::Start => self
                .read_argument("enter a Process to Start: ")
                .await?
                .map(Command::Start),
            MenuChoice::Kill => self
                .read_argument("enter a Process to Terminate: ")
                .await?
                .map(Command::Kill),
            MenuChoice::Search => self
                .read_argument("enter a Process to search for: ")
                .await?
                .map(Command::Search),
            other => other.immediate_command(),
        };
        Ok(command)
    }

    async fn read_argument(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.prompt.read_line(prompt).await? {
            Reply::Line(text) if !text.trim().is_empty() => Ok(Some(text.trim().to_string())),
            Reply::Line(_) => {
                self.sink.notice("nothing was entered")?;
                Ok(None)
            }
            Reply::Cancelled | Reply::Closed => Ok(None),
        }
    }

    async fn collect_filter(&mut self) -> Result<Option<Command>> {
        self.sink.notice(&filter_menu_text())?;
        let Reply::Line(choice) = self.prompt.read_line("enter a filter option: ").await? else {
            return Ok(None);
        };
        let Some(kind) = FilterKind::from_menu_choice(&choice) else {
            tracing::info!(choice = %choice, "no valid filter option selected");
            self.sink
                .notice("nothing was selected or user chose an invalid input")?;
            return Ok(None);
        };

        let mut threshold = None;
        if kind == FilterKind::Cpu {
            match self
                .prompt
                .read_line("enter the threshold you wish to use: ")
                .await?
            {
                Reply::Line(text) if text.trim().is_empty() => {}
                Reply::Line(text) => match text.trim().parse::<f64>() {
                    Ok(value) => threshold = Some(value),
                    Err(_) => {
                        self.sink.notice("the threshold must be a number")?;
                        return Ok(None);
                    }
                },
                Reply::Cancelled | Reply::Closed => return Ok(None),
            }
        }
        Ok(Some(Command::Filter(
            kind.criterion(threshold, &self.config.filter),
        )))
    }

    pub async fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::ListProcesses => self.list_live().await,
            Command::Filter(criterion) => self.filter(criterion).await,
            Command::Start(command) => self.start(&command),
            Command::Kill(name) => self.kill(&name).await,
            Command::Search(name) => self.search(&name),
            Command::Memory => self.memory(),
            Command::Charts => self.live_charts().await,
            Command::Connections => self.connections(),
            Command::Disks => self.disks(),
        }
    }

    async fn list_live(&mut self) -> Result<()> {
        let refresh = self.config.general.list_refresh();
        loop {
            let batch = self.probe.list_processes();
            batch.log_errors("list");
            self.sink.clear()?;
            self.sink
                .render_table(&table::process_table(&batch.items))?;
            self.sink.notice("press Esc or Ctrl+C to stop")?;

            tokio::select! {
                biased;
                _ = self.prompt.wait_for_cancel() => break,
                _ = tokio::time::sleep(refresh) => {}
            }
        }
        tracing::info!("monitoring was stopped");
        self.sink.notice("monitoring was stopped")
    }

    async fn filter(&mut self, criterion: FilterCriterion) -> Result<()> {
        let window = self.config.general.cpu_sample_window();
        let outcome = filter::run_pass(&mut self.probe, &criterion, window).await;
        let rendered = match criterion {
            FilterCriterion::ByStatus(_) => table::status_table(&outcome.matches),
            FilterCriterion::ByMemoryThreshold(_) => table::memory_table(&outcome.matches),
            FilterCriterion::ByCpuThreshold(_) => table::cpu_table(&outcome.matches),
        };
        self.sink.render_table(&rendered)?;
        if outcome.skipped > 0 {
            self.sink.notice(&format!(
                "{} processes could not be inspected and were skipped",
                outcome.skipped
            ))?;
        }
        Ok(())
    }

    fn start(&mut self, command: &str) -> Result<()> {
        let started = ProcessController::new(&mut self.probe).start(command);
        match started {
            Ok(handle) => {
                tracing::info!(pid = handle.pid, command, "started process");
                self.sink.notice(&format!(
                    "successfully started {command} with PID:{}",
                    handle.pid
                ))?;
                self.launched.push(handle);
            }
            Err(err) => {
                tracing::error!(error = %err, "unable to start process");
                self.sink.notice(&err.to_string())?;
            }
        }
        Ok(())
    }

    fn search(&mut self, name: &str) -> Result<()> {
        let found = ProcessController::new(&mut self.probe).search(name);
        if found.is_empty() {
            tracing::info!(name, "search found no process");
            return self.sink.notice(&format!("no process named {name} was found"));
        }
        for p in &found {
            tracing::info!(pid = p.pid, "{name} successfully found");
        }
        self.sink.render_table(&table::search_table(&found))
    }

    async fn kill(&mut self, name: &str) -> Result<()> {
        let first = ProcessController::new(&mut self.probe).kill(name, false);
        let pending = match first {
            KillResult::ConfirmationRequired(pending) => pending,
            KillResult::Ambiguous(candidates) => {
                self.sink.notice(&format!(
                    "{} processes are named {name}; choose one by PID",
                    candidates.len()
                ))?;
                self.sink
                    .render_table(&table::search_table(&candidates))?;
                let Reply::Line(answer) =
                    self.prompt.read_line("enter the PID to terminate: ").await?
                else {
                    return self.cancelled_kill(name);
                };
                let chosen = answer
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|pid| candidates.iter().any(|c| c.pid == *pid));
                let Some(pid) = chosen else {
                    tracing::info!(name, answer = %answer, "kill target not among candidates");
                    return self
                        .sink
                        .notice("that PID is not one of the listed processes");
                };
                PendingKill::new(name, pid)
            }
            other => return self.report_kill(name, other),
        };

        self.sink.notice(&format!(
            "Are you sure you want to kill {} (pid {})\n1 -Yes\n2-No",
            pending.target_name, pending.pid
        ))?;
        let answer = match self.prompt.read_line("enter your option: ").await? {
            Reply::Line(text) => Confirmation::from_answer(&text),
            Reply::Cancelled | Reply::Closed => Confirmation::No,
        };
        let target = pending.target_name.clone();
        match pending.resolve(answer) {
            GateDecision::Proceed { pid } => {
                let result = ProcessController::new(&mut self.probe).kill_confirmed(&target, pid);
                self.report_kill(name, result)
            }
            GateDecision::Cancelled => self.cancelled_kill(name),
        }
    }

    fn cancelled_kill(&mut self, name: &str) -> Result<()> {
        tracing::info!(name, "kill cancelled by user");
        self.sink.notice("Cancelled by user")
    }

    fn report_kill(&mut self, name: &str, result: KillResult) -> Result<()> {
        let message = match result {
            KillResult::Terminated { pid } => {
                tracing::info!(pid, name, "process killed");
                format!("killed {name} successfully with the pid {pid}")
            }
            KillResult::NotFound => {
                tracing::error!(name, "could not find process, error in terminating");
                format!("could not find process {name}; nothing was terminated")
            }
            KillResult::Refused { pid } => {
                format!("not permitted to terminate {name} (pid {pid})")
            }
            KillResult::ConfirmationRequired(_) | KillResult::Ambiguous(_) => {
                format!("{name} was not terminated")
            }
        };
        self.sink.notice(&message)
    }

    fn memory(&mut self) -> Result<()> {
        let mem = self.probe.host_memory();
        let lines = [
            "Memory info *********".to_string(),
            key_value_line("Total", &format_bytes(mem.total)),
            key_value_line("Available", &format_bytes(mem.available)),
            key_value_line("Percent", &format!("{:.1}%", mem.percent())),
            key_value_line("Used", &format_bytes(mem.used)),
            key_value_line("Free", &format_bytes(mem.free)),
        ];
        self.sink.notice(&lines.join("\n"))
    }

    async fn live_charts(&mut self) -> Result<()> {
        let window = self.config.general.cpu_sample_window();
        let mut ticker = tokio::time::interval(self.config.general.tick());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.sink.begin_charts()?;
        let mut outcome = Ok(());
        loop {
            // A cancel that is due wins over a tick that is due.
            tokio::select! {
                biased;
                _ = self.prompt.wait_for_cancel() => break,
                _ = ticker.tick() => {
                    self.charts.tick(&mut self.probe, window).await;
                    if let Err(err) = self.sink.redraw_charts(&self.charts) {
                        outcome = Err(err);
                        break;
                    }
                }
            }
        }
        self.sink.end_charts()?;
        outcome
    }

    fn connections(&mut self) -> Result<()> {
        let batch = self.probe.connections();
        let skipped = batch.log_errors("connections");
        self.sink.notice("****show connections***")?;
        self.sink
            .render_table(&table::connection_table(&batch.items))?;
        if let Some(ProbeError::Unsupported(what)) = batch
            .errors
            .iter()
            .find(|e| matches!(e, ProbeError::Unsupported(_)))
        {
            self.sink
                .notice(&format!("{what} is not available on this platform"))?;
        } else if skipped > 0 {
            self.sink.notice(&format!(
                "{skipped} processes could not be inspected (elevated privileges may be required)"
            ))?;
        }
        Ok(())
    }

    fn disks(&mut self) -> Result<()> {
        let batch = self.probe.disk_partitions();
        batch.log_errors("disks");
        self.sink.notice("Disk Usage")?;
        self.sink.render_table(&table::disk_table(&batch.items))
    }

    fn reap_launched(&mut self) {
        self.launched.retain_mut(|handle| match handle.try_reap() {
            Some(status) => {
                tracing::info!(pid = handle.pid, %status, "started process exited");
                false
            }
            None => true,
        });
    }
}
