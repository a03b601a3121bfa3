use thiserror::Error;

/// Failure to inspect or act on a single entity. Batch queries collect these
/// and keep going; they never abort the rest of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("access denied to process {pid}")]
    AccessDenied { pid: u32 },
    #[error("process {pid} no longer exists")]
    NoSuchProcess { pid: u32 },
    #[error("{0} is not supported on this platform")]
    Unsupported(String),
}

impl ProbeError {
    /// Classifies an I/O error raised while reading a process's entries.
    pub fn from_io(pid: u32, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ProbeError::NoSuchProcess { pid },
            _ => ProbeError::AccessDenied { pid },
        }
    }
}
