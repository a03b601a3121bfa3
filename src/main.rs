use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use color_eyre::Result;
use procwatch::config::{Config, load_config, load_config_from_path};
use procwatch::console::{Command, ConsoleLoop};
use procwatch::filter::FilterKind;
use procwatch::logging;
use procwatch::system::Collector;
use procwatch::system::kill::signal_from_config;
use procwatch::terminal::{self, RawModeGuard, TerminalPrompt, TerminalSink};

#[derive(Parser)]
#[command(
    name = "procwatch",
    about = "Process and resource console with live CPU and memory charts"
)]
struct Cli {
    /// Kill a process by name (asks for confirmation)
    #[arg(long, value_name = "NAME")]
    kill: Option<String>,

    /// Search for processes by exact name
    #[arg(long, value_name = "NAME")]
    search: Option<String>,

    /// Start a process (program followed by its arguments)
    #[arg(long, value_name = "COMMAND")]
    start: Option<String>,

    /// List all processes, refreshing until Esc or Ctrl+C
    #[arg(long)]
    list: bool,

    /// Filter processes
    #[arg(long, value_enum, value_name = "KIND")]
    filter: Option<FilterKind>,

    /// Show host memory usage
    #[arg(long)]
    memory: bool,

    /// Enter the interactive menu
    #[arg(long)]
    monitor: bool,

    /// Live CPU and memory charts
    #[arg(long)]
    graph: bool,

    /// Show per-process network connections
    #[arg(long)]
    connections: bool,

    /// Show disk usage per partition
    #[arg(long)]
    disks: bool,

    /// Threshold for --filter memory (MiB) or --filter cpu (percent)
    #[arg(long)]
    threshold: Option<f64>,

    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chart tick in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Append the event log to this file instead of the configured one
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// What to do, picked from the flags. When several are given the first in
/// this order wins: monitor, filter, memory, start, search, graph, kill,
/// list, connections, disks.
#[derive(Debug, PartialEq)]
enum Mode {
    Monitor,
    Once(Command),
}

impl Cli {
    fn mode(&self, config: &Config) -> Option<Mode> {
        if self.monitor {
            return Some(Mode::Monitor);
        }
        let command = if let Some(kind) = self.filter {
            Command::Filter(kind.criterion(self.threshold, &config.filter))
        } else if self.memory {
            Command::Memory
        } else if let Some(cmd) = &self.start {
            Command::Start(cmd.clone())
        } else if let Some(name) = &self.search {
            Command::Search(name.clone())
        } else if self.graph {
            Command::Charts
        } else if let Some(name) = &self.kill {
            Command::Kill(name.clone())
        } else if self.list {
            Command::ListProcesses
        } else if self.connections {
            Command::Connections
        } else if self.disks {
            Command::Disks
        } else {
            return None;
        };
        Some(Mode::Once(command))
    }
}

fn needs_keyboard(mode: &Mode) -> bool {
    matches!(
        mode,
        Mode::Monitor
            | Mode::Once(Command::ListProcesses | Command::Charts | Command::Kill(_))
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);

    let Some(mode) = cli.mode(&config) else {
        Cli::command().print_help()?;
        return Ok(ExitCode::from(2));
    };

    logging::init(&config.log)?;
    tracing::info!(log = %config.log.path().display(), "procwatch starting");

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        terminal::restore();
        original_hook(panic_info);
    }));

    let _raw = if needs_keyboard(&mode) {
        Some(RawModeGuard::enable()?)
    } else {
        None
    };

    let probe = Collector::new(signal_from_config(&config.general.kill_signal));
    let mut console = ConsoleLoop::new(config, probe, TerminalPrompt::new(), TerminalSink::new());
    match mode {
        Mode::Monitor => console.run().await?,
        Mode::Once(command) => console.run_once(command).await?,
    }

    Ok(ExitCode::SUCCESS)
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(tick) = cli.tick_ms {
        config.general.tick_ms = tick;
    }
    if let Some(path) = &cli.log_file {
        config.log.dir = path.parent().map(PathBuf::from);
        if let Some(name) = path.file_name() {
            config.log.file = name.to_string_lossy().into_owned();
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use procwatch::filter::FilterCriterion;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["procwatch"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("arguments should parse")
    }

    #[test]
    fn no_primary_flag_has_no_mode() {
        let cli = parse(&["--threshold", "5"]);
        assert_eq!(cli.mode(&Config::default()), None);
    }

    #[test]
    fn monitor_wins_over_everything_else() {
        let cli = parse(&["--kill", "x", "--list", "--monitor"]);
        assert_eq!(cli.mode(&Config::default()), Some(Mode::Monitor));
    }

    #[test]
    fn search_is_picked_before_kill() {
        let cli = parse(&["--kill", "x", "--search", "y"]);
        assert_eq!(
            cli.mode(&Config::default()),
            Some(Mode::Once(Command::Search("y".to_string())))
        );
    }

    #[test]
    fn filter_is_picked_before_memory_and_uses_the_threshold() {
        let cli = parse(&["--memory", "--filter", "memory", "--threshold", "5"]);
        assert_eq!(
            cli.mode(&Config::default()),
            Some(Mode::Once(Command::Filter(
                FilterCriterion::ByMemoryThreshold(5 * 1024 * 1024)
            )))
        );
    }

    #[test]
    fn cpu_filter_falls_back_to_the_configured_threshold() {
        let cli = parse(&["--filter", "cpu"]);
        assert_eq!(
            cli.mode(&Config::default()),
            Some(Mode::Once(Command::Filter(FilterCriterion::ByCpuThreshold(10.0))))
        );
    }

    #[test]
    fn unknown_filter_kind_is_rejected() {
        assert!(Cli::try_parse_from(["procwatch", "--filter", "idle"]).is_err());
    }

    #[test]
    fn only_interactive_modes_take_the_keyboard() {
        assert!(needs_keyboard(&Mode::Monitor));
        assert!(needs_keyboard(&Mode::Once(Command::Kill("x".to_string()))));
        assert!(needs_keyboard(&Mode::Once(Command::Charts)));
        assert!(!needs_keyboard(&Mode::Once(Command::Memory)));
        assert!(!needs_keyboard(&Mode::Once(Command::Disks)));
    }

    #[test]
    fn command_line_overrides_tick_and_log_file() {
        let cli = parse(&[
            "--config",
            "/nonexistent/procwatch/config.toml",
            "--tick-ms",
            "250",
            "--log-file",
            "/tmp/pw/events.log",
        ]);
        let config = load_config_for_cli(&cli);
        assert_eq!(config.general.tick_ms, 250);
        assert_eq!(config.log.dir, Some(PathBuf::from("/tmp/pw")));
        assert_eq!(config.log.file, "events.log");
    }
}
