use alloc::vec::Vec;
use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::Generation;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    /// Advances the elapsed-time counter.
    Tick,
    /// Resolves the pair that was completed before the delay started.
    EvaluatePair,
}

/// Deferred work requested by the engine. The host hands it back through
/// [`Engine::run_task`](crate::Engine::run_task) when it fires.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    pub kind: TaskKind,
    pub generation: Generation,
}

impl Task {
    pub const fn tick(generation: Generation) -> Self {
        Self {
            kind: TaskKind::Tick,
            generation,
        }
    }

    pub const fn evaluate_pair(generation: Generation) -> Self {
        Self {
            kind: TaskKind::EvaluatePair,
            generation,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Timing {
    Once(Duration),
    Every(Duration),
}

/// Timer facility of the host event loop.
pub trait Scheduler {
    fn schedule(&mut self, task: Task, timing: Timing);

    /// Drops every outstanding occurrence of `task`, a no-op when none is scheduled.
    fn cancel(&mut self, task: Task);
}

impl<S: Scheduler + ?Sized> Scheduler for &mut S {
    fn schedule(&mut self, task: Task, timing: Timing) {
        (**self).schedule(task, timing)
    }

    fn cancel(&mut self, task: Task) {
        (**self).cancel(task)
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Entry {
    due: Duration,
    seq: u64,
    task: Task,
    period: Option<Duration>,
}

/// Scheduler running on a virtual clock that only moves when asked to. Tasks due at the same
/// instant fire in the order they were scheduled.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VirtualScheduler {
    now: Duration,
    next_seq: u64,
    entries: Vec<Entry>,
}

impl VirtualScheduler {
    const MIN_PERIOD: Duration = Duration::from_millis(1);

    pub fn new() -> Self {
        Default::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn is_scheduled(&self, task: Task) -> bool {
        self.entries.iter().any(|entry| entry.task == task)
    }

    pub fn scheduled_count(&self) -> usize {
        self.entries.len()
    }

    /// Instant at which the next task fires, if any.
    pub fn next_due(&self) -> Option<Duration> {
        self.entries.iter().map(|entry| entry.due).min()
    }

    /// Removes the earliest task due at or before `until` and moves the clock to its due time.
    /// Repeating tasks are re-armed one period later.
    pub fn pop_due(&mut self, until: Duration) -> Option<Task> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= until)
            .min_by_key(|(_, entry)| (entry.due, entry.seq))
            .map(|(index, _)| index)?;

        let entry = self.entries.swap_remove(index);
        self.now = self.now.max(entry.due);
        if let Some(period) = entry.period {
            self.push(entry.task, entry.due + period, Some(period));
        }
        Some(entry.task)
    }

    /// Moves the clock forward without firing anything.
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    fn push(&mut self, task: Task, due: Duration, period: Option<Duration>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry {
            due,
            seq,
            task,
            period,
        });
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule(&mut self, task: Task, timing: Timing) {
        match timing {
            Timing::Once(delay) => self.push(task, self.now + delay, None),
            Timing::Every(period) => {
                let period = if period < Self::MIN_PERIOD {
                    log::warn!("Period {:?} too short, using {:?}", period, Self::MIN_PERIOD);
                    Self::MIN_PERIOD
                } else {
                    period
                };
                self.push(task, self.now + period, Some(period))
            }
        }
    }

    fn cancel(&mut self, task: Task) {
        self.entries.retain(|entry| entry.task != task);
    }
}
