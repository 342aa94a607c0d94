use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const IDLE: u8 = 0;
const PENDING: u8 = 1;
const RESOLVED: u8 = 2;
const REJECTED: u8 = 3;

/// Lifecycle of a single-flight async operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Never started, or the last run was abandoned before settling.
    Idle,
    /// In flight. A second start is refused.
    Pending,
    Resolved,
    Rejected,
}

impl TaskStatus {
    fn from_raw(raw: u8) -> Self {
        match raw {
            PENDING => Self::Pending,
            RESOLVED => Self::Resolved,
            REJECTED => Self::Rejected,
            _ => Self::Idle,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("operation already in flight")]
pub struct Busy;

/// Shared view of one operation's status.
///
/// Clones observe the same status, so a caller can keep a clone to disable
/// its trigger while the owner awaits the operation.
#[derive(Clone, Debug, Default)]
pub struct TaskHandle {
    status: Arc<AtomicU8>,
}

impl TaskHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> TaskStatus {
        TaskStatus::from_raw(self.status.load(Ordering::Acquire))
    }

    pub fn is_pending(&self) -> bool {
        self.status() == TaskStatus::Pending
    }

    /// Marks the operation pending, or refuses if it already is.
    pub fn begin(&self) -> Result<InFlight, Busy> {
        self.status
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                (raw != PENDING).then_some(PENDING)
            })
            .map_err(|_| Busy)?;
        Ok(InFlight {
            handle: self.clone(),
            settled: false,
        })
    }
}

/// Guard for a started operation. Dropping it unsettled returns the handle
/// to [`TaskStatus::Idle`].
#[derive(Debug)]
pub struct InFlight {
    handle: TaskHandle,
    settled: bool,
}

impl InFlight {
    pub fn resolve(self) {
        self.settle(RESOLVED);
    }

    pub fn reject(self) {
        self.settle(REJECTED);
    }

    fn settle(mut self, raw: u8) {
        self.handle.status.store(raw, Ordering::Release);
        self.settled = true;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.settled {
            self.handle.status.store(IDLE, Ordering::Release);
        }
    }
}
