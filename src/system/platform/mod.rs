use std::collections::HashMap;

use super::process::ProcessState;
use super::snapshot::{ConnectionRecord, ProbeBatch};

/// What the connection table needs to know about a socket's owner.
#[derive(Clone, Debug)]
pub struct OwnerInfo {
    pub name: String,
    pub status: ProcessState,
}

pub trait PlatformSockets {
    fn connections(owners: &HashMap<u32, OwnerInfo>) -> ProbeBatch<ConnectionRecord>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(target_os = "linux"))]
mod other;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(not(target_os = "linux"))]
use other as platform_impl;

/// Lists the sockets held by the given processes, skipping (and reporting)
/// processes whose descriptors cannot be read.
pub fn connections(owners: &HashMap<u32, OwnerInfo>) -> ProbeBatch<ConnectionRecord> {
    platform_impl::Platform::connections(owners)
}
