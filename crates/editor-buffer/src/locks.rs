//! Lock Manager
//!
//! Three tiers of locks guard the Line Store:
//!
//! - a whole-buffer [`RwLock`] over the [`LineGroups`] partition. Holding it shared freezes
//!   the *structure* (line count and grouping); holding it exclusively grants full access.
//! - one [`RwLock`] per line group. Line content lives inside these locks, so a content-only
//!   edit needs the whole-buffer lock shared plus its group lock exclusive, and edits on
//!   disjoint groups proceed in parallel.
//! - an escalation [`Mutex`]. A thread that holds the whole-buffer lock shared and needs it
//!   exclusively takes the escalation guard, releases the shared lock, acquires the exclusive
//!   lock, and only then releases the guard. At most one shared-to-exclusive transition is in
//!   flight, and a thread never waits for the guard while still holding its shared lock.
//!
//! Lock order: whole-buffer lock, then the buffer cursor, then at most one group lock.
//! Structural changes rebuild the partition while the exclusive lock is held, so no other
//! thread can observe a partially rebuilt set of group locks.

use crate::lines;
use crate::words::LineSource;
use ropey::Rope;
use std::sync::{
    Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError,
};
use tracing::debug;

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// The line sequence, partitioned into fixed-size groups of consecutive lines.
#[derive(Debug)]
pub(crate) struct LineGroups {
    group_size: usize,
    line_count: usize,
    groups: Vec<RwLock<Vec<Rope>>>,
}

impl LineGroups {
    pub(crate) fn new(lines: Vec<Rope>, group_size: usize) -> Self {
        let mut lines = lines;
        if lines.is_empty() {
            lines.push(lines::empty_line());
        }
        let group_size = group_size.max(1);
        Self {
            group_size,
            line_count: lines.len(),
            groups: partition(lines, group_size),
        }
    }

    pub(crate) fn line_count(&self) -> usize {
        self.line_count
    }

    pub(crate) fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Clamp a line index into `0..line_count`.
    pub(crate) fn clamp_line(&self, line: usize) -> usize {
        line.min(self.line_count.saturating_sub(1))
    }

    /// Map a line index to `(group, offset within group)`.
    fn locate(&self, line: usize) -> Option<(usize, usize)> {
        if line >= self.line_count {
            return None;
        }
        Some((line / self.group_size, line % self.group_size))
    }

    /// Iterate over the group locks in line order, with the index of each group's first line.
    pub(crate) fn groups(&self) -> impl Iterator<Item = (usize, &RwLock<Vec<Rope>>)> {
        self.groups
            .iter()
            .enumerate()
            .map(|(idx, group)| (idx * self.group_size, group))
    }

    /// Run `f` on a line while holding its group lock shared.
    pub(crate) fn with_line<R>(&self, line: usize, f: impl FnOnce(&Rope) -> R) -> Option<R> {
        let (group, offset) = self.locate(line)?;
        let guard = read_lock(&self.groups[group]);
        guard.get(offset).map(f)
    }

    /// Run `f` on a line while holding its group lock exclusively.
    ///
    /// `f` must not add or remove terminators: structural changes go through
    /// [`LineGroups::restructure`].
    pub(crate) fn with_line_mut<R>(
        &self,
        line: usize,
        f: impl FnOnce(&mut Rope) -> R,
    ) -> Option<R> {
        let (group, offset) = self.locate(line)?;
        let mut guard = write_lock(&self.groups[group]);
        guard.get_mut(offset).map(f)
    }

    /// Apply a structural change to the flat line sequence and rebuild the partition.
    ///
    /// Requires exclusive access, which callers obtain through the whole-buffer write guard.
    pub(crate) fn restructure<R>(&mut self, f: impl FnOnce(&mut Vec<Rope>) -> R) -> R {
        let old_groups = self.groups.len();
        let mut flat: Vec<Rope> = Vec::with_capacity(self.line_count + 1);
        for group in std::mem::take(&mut self.groups) {
            flat.extend(group.into_inner().unwrap_or_else(PoisonError::into_inner));
        }

        let result = f(&mut flat);

        if flat.is_empty() {
            flat.push(lines::empty_line());
        }
        self.line_count = flat.len();
        self.groups = partition(flat, self.group_size);

        debug!(
            lines = self.line_count,
            old_groups,
            new_groups = self.groups.len(),
            "rebuilt line-group locks"
        );
        result
    }
}

fn partition(lines: Vec<Rope>, group_size: usize) -> Vec<RwLock<Vec<Rope>>> {
    let mut groups = Vec::with_capacity(lines.len().div_ceil(group_size));
    let mut iter = lines.into_iter().peekable();
    while iter.peek().is_some() {
        groups.push(RwLock::new(iter.by_ref().take(group_size).collect()));
    }
    groups
}

impl LineSource for LineGroups {
    fn line_count(&self) -> usize {
        self.line_count
    }

    fn line_len(&self, line: usize) -> usize {
        self.with_line(line, |l| l.len_chars()).unwrap_or(0)
    }

    fn char_at(&self, line: usize, column: usize) -> Option<char> {
        self.with_line(line, |l| l.get_char(column)).flatten()
    }
}

/// Owner of the whole-buffer lock and the escalation guard.
#[derive(Debug)]
pub(crate) struct LockManager {
    file: RwLock<LineGroups>,
    escalation: Mutex<()>,
}

impl LockManager {
    pub(crate) fn new(groups: LineGroups) -> Self {
        Self {
            file: RwLock::new(groups),
            escalation: Mutex::new(()),
        }
    }

    /// Acquire the whole-buffer lock shared.
    pub(crate) fn shared(&self) -> RwLockReadGuard<'_, LineGroups> {
        read_lock(&self.file)
    }

    /// Acquire the whole-buffer lock exclusively.
    pub(crate) fn exclusive(&self) -> RwLockWriteGuard<'_, LineGroups> {
        write_lock(&self.file)
    }

    /// Trade a shared whole-buffer guard for an exclusive one.
    ///
    /// Invariant: the escalation guard is held from before the shared lock is released until
    /// after the exclusive lock is acquired. If another escalation is in flight, the shared
    /// lock is released first and the guard is awaited without it.
    ///
    /// Other writers may run between the release and the acquisition, so callers re-read any
    /// state they derived under the shared lock.
    pub(crate) fn escalate<'a>(
        &'a self,
        shared: RwLockReadGuard<'a, LineGroups>,
    ) -> RwLockWriteGuard<'a, LineGroups> {
        let guard = match self.escalation.try_lock() {
            Ok(guard) => {
                drop(shared);
                guard
            }
            Err(TryLockError::WouldBlock) => {
                drop(shared);
                debug!("waiting for in-flight lock escalation");
                self.escalation
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
            }
            Err(TryLockError::Poisoned(poisoned)) => {
                drop(shared);
                poisoned.into_inner()
            }
        };

        let exclusive = self.exclusive();
        drop(guard);
        exclusive
    }
}
