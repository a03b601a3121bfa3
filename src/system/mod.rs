pub mod collector;
pub mod error;
pub mod kill;
pub mod platform;
pub mod probe;
pub mod process;
pub mod snapshot;

pub use collector::Collector;
pub use error::ProbeError;
pub use probe::SystemProbe;
pub use process::{ProcessSnapshot, ProcessState};
pub use snapshot::{ConnectionRecord, DiskUsage, HostMemory, ProbeBatch, Protocol};
