//! Buffer and autosave configuration.

use std::time::Duration;

/// Number of lines guarded by one line-group lock unless configured otherwise.
pub const DEFAULT_LOCK_GROUP_SIZE: usize = 10;

/// Options that control how a [`crate::TextBuffer`] partitions its locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferOptions {
    /// Number of consecutive lines sharing one reader/writer lock.
    ///
    /// A value of `0` is treated as `1`.
    pub lock_group_size: usize,
}

impl BufferOptions {
    /// Set the number of lines per lock group.
    pub fn with_lock_group_size(mut self, lock_group_size: usize) -> Self {
        self.lock_group_size = lock_group_size;
        self
    }

    pub(crate) fn effective_group_size(&self) -> usize {
        self.lock_group_size.max(1)
    }
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self {
            lock_group_size: DEFAULT_LOCK_GROUP_SIZE,
        }
    }
}

/// Options for the background [`crate::Autosave`] worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveOptions {
    /// Time between two dirty checks.
    pub interval: Duration,
}

impl AutosaveOptions {
    /// Set the autosave interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl Default for AutosaveOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
        }
    }
}
