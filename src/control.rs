use std::process::{Child, Command, ExitStatus, Stdio};

use thiserror::Error;

use crate::system::{ProbeError, ProcessSnapshot, SystemProbe};

#[derive(Debug, Error)]
pub enum StartError {
    #[error("no command given")]
    Empty,
    #[error("unable to start process {command}: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// A process launched from the console. The child is kept so it can be
/// reaped once it exits.
#[derive(Debug)]
pub struct ProcessHandle {
    pub pid: u32,
    pub command: String,
    child: Child,
}

impl ProcessHandle {
    /// Returns the exit status once the child has finished.
    pub fn try_reap(&mut self) -> Option<ExitStatus> {
        self.child.try_wait().ok().flatten()
    }
}

/// A kill that has been requested but not yet confirmed. It is consumed by
/// [`PendingKill::resolve`], so an unanswered request cannot linger.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingKill {
    pub target_name: String,
    pub pid: u32,
    pub awaiting_confirmation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
}

impl Confirmation {
    /// "1" (or yes/y) confirms; anything else declines.
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "1" | "y" | "yes" => Confirmation::Yes,
            _ => Confirmation::No,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Proceed { pid: u32 },
    Cancelled,
}

impl PendingKill {
    pub fn new(target_name: impl Into<String>, pid: u32) -> Self {
        Self {
            target_name: target_name.into(),
            pid,
            awaiting_confirmation: true,
        }
    }

    pub fn resolve(self, answer: Confirmation) -> GateDecision {
        match answer {
            Confirmation::Yes => GateDecision::Proceed { pid: self.pid },
            Confirmation::No => GateDecision::Cancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KillResult {
    /// Exactly one match; re-invoke with `confirmed = true` to act on it.
    ConfirmationRequired(PendingKill),
    /// Several processes share the name. Nothing was done; pick one by pid.
    Ambiguous(Vec<ProcessSnapshot>),
    Terminated { pid: u32 },
    NotFound,
    /// The process exists but refused the signal.
    Refused { pid: u32 },
}

/// Start, kill and search against the live process set.
pub struct ProcessController<'a, P> {
    probe: &'a mut P,
}

impl<'a, P: SystemProbe> ProcessController<'a, P> {
    pub fn new(probe: &'a mut P) -> Self {
        Self { probe }
    }

    /// Every process whose name equals `name` exactly (case-sensitive).
    pub fn search(&mut self, name: &str) -> Vec<ProcessSnapshot> {
        let batch = self.probe.list_processes();
        batch.log_errors("search");
        batch.items.into_iter().filter(|p| p.name == name).collect()
    }

    /// Launches `command` directly, without a shell. The first word is the
    /// program and the rest are its arguments. No retries.
    pub fn start(&mut self, command: &str) -> Result<ProcessHandle, StartError> {
        let mut words = command.split_whitespace();
        let program = words.next().ok_or(StartError::Empty)?;
        let child = Command::new(program)
            .args(words)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| StartError::Launch {
                command: command.to_string(),
                source,
            })?;
        Ok(ProcessHandle {
            pid: child.id(),
            command: command.to_string(),
            child,
        })
    }

    /// Kills the process called `name`. Without `confirmed` this only looks
    /// the process up and asks for confirmation; nothing is signalled.
    pub fn kill(&mut self, name: &str, confirmed: bool) -> KillResult {
        let mut matches = self.search(name);
        match matches.len() {
            0 => KillResult::NotFound,
            1 => {
                let target = matches.remove(0);
                if confirmed {
                    self.kill_confirmed(name, target.pid)
                } else {
                    KillResult::ConfirmationRequired(PendingKill::new(name, target.pid))
                }
            }
            _ => KillResult::Ambiguous(matches),
        }
    }

    /// Kills `pid` after confirmation, but only if it still belongs to a
    /// process called `name`. A pid that exited and was handed to another
    /// process while the operator was answering yields `NotFound`.
    pub fn kill_confirmed(&mut self, name: &str, pid: u32) -> KillResult {
        let still_ours = self
            .probe
            .list_processes()
            .items
            .iter()
            .any(|p| p.pid == pid && p.name == name);
        if !still_ours {
            tracing::warn!(pid, name, "kill target changed before the signal was sent");
            return KillResult::NotFound;
        }
        self.kill_pid(pid, true)
    }

    /// Kills a process chosen by identifier. Without `confirmed` nothing is
    /// signalled.
    pub fn kill_pid(&mut self, pid: u32, confirmed: bool) -> KillResult {
        if !confirmed {
            let name = self
                .probe
                .list_processes()
                .items
                .into_iter()
                .find(|p| p.pid == pid)
                .map(|p| p.name);
            return match name {
                Some(name) => KillResult::ConfirmationRequired(PendingKill::new(name, pid)),
                None => KillResult::NotFound,
            };
        }
        match self.probe.terminate(pid) {
            Ok(()) => KillResult::Terminated { pid },
            Err(ProbeError::NoSuchProcess { .. }) => KillResult::NotFound,
            Err(err) => {
                tracing::error!(pid, error = %err, "error in terminating");
                KillResult::Refused { pid }
            }
        }
    }
}
