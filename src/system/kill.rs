use sysinfo::{Pid, Signal, System};

use super::error::ProbeError;

/// Parses the `kill_signal` config value; anything unrecognised is a hard kill.
pub fn signal_from_config(s: &str) -> Signal {
    match s.to_lowercase().as_str() {
        "term" | "sigterm" => Signal::Term,
        _ => Signal::Kill,
    }
}

pub fn signal_name(signal: Signal) -> &'static str {
    match signal {
        Signal::Term => "SIGTERM",
        Signal::Kill => "SIGKILL",
        _ => "signal",
    }
}

/// Sends `signal` to `pid` as seen by the last refresh of `sys`.
pub fn send_signal(sys: &System, pid: u32, signal: Signal) -> Result<(), ProbeError> {
    let Some(process) = sys.process(Pid::from_u32(pid)) else {
        return Err(ProbeError::NoSuchProcess { pid });
    };
    match process.kill_with(signal) {
        Some(true) => Ok(()),
        Some(false) => Err(ProbeError::AccessDenied { pid }),
        None => {
            // Signal not supported on this platform, fall back to kill()
            if process.kill() {
                Ok(())
            } else {
                Err(ProbeError::AccessDenied { pid })
            }
        }
    }
}
