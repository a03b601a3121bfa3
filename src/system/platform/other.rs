use std::collections::HashMap;

use super::{OwnerInfo, PlatformSockets};
use crate::system::error::ProbeError;
use crate::system::snapshot::{ConnectionRecord, ProbeBatch};

pub struct Platform;

impl PlatformSockets for Platform {
    fn connections(_owners: &HashMap<u32, OwnerInfo>) -> ProbeBatch<ConnectionRecord> {
        ProbeBatch::with_errors(
            Vec::new(),
            vec![ProbeError::Unsupported(
                "per-process connection listing".to_string(),
            )],
        )
    }
}
