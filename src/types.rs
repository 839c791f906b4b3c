use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::probe::ATEM_PORT;

/// Final outcome of a scan, handed to the JSON formatter.
///
/// `addresses` is a set in disguise: order reflects probe completion and must not be relied upon.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanReport {
    pub success: bool,
    pub addresses: Vec<String>,
}

impl ScanReport {
    pub fn found(addresses: Vec<String>) -> Self {
        Self {
            success: true,
            addresses,
        }
    }
}

/// Tunables for one scan. `Default` matches the stock behaviour: 8 workers, /24 burst queue, port 9910, 100ms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub workers: usize,
    pub queue_capacity: usize,
    pub port: u16,
    pub timeout: Duration,
}

impl ScanConfig {
    pub const DEFAULT_WORKERS: usize = 8;
    pub const DEFAULT_QUEUE_CAPACITY: usize = 255;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: Self::DEFAULT_WORKERS,
            queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
            port: ATEM_PORT,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}
