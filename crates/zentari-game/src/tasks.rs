//! Sponsored task completion.
//!
//! Sponsors publish tasks (visit a link, join a channel) that pay a
//! one-time power reward. Completion is a two-step flow with an
//! anti-cheat delay: the player starts a completion, waits out the
//! task's configured delay, then settles it for the reward. The
//! [`TaskBook`] enforces at most one settlement per (task, player).

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};

use zentari_types::{CompletedTask, PendingCompletion, PlayerId, PlayerState, Task, TaskId};

/// Errors raised by the task completion flow.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// No task with the given ID exists in the catalog.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The task has been deactivated by its sponsor.
    #[error("task is no longer active: {0}")]
    Inactive(TaskId),

    /// The task's expiry has passed.
    #[error("task has expired: {0}")]
    Expired(TaskId),

    /// The player already settled this task.
    #[error("task already completed: {0}")]
    AlreadyCompleted(TaskId),

    /// The player already has a pending completion for this task.
    #[error("completion already pending: {0}")]
    AlreadyPending(TaskId),

    /// The completion delay has not elapsed yet.
    #[error("completion not ready until {settles_at}")]
    NotReady {
        /// Earliest instant the completion may settle.
        settles_at: DateTime<Utc>,
    },

    /// Settlement was attempted with no pending completion on record.
    #[error("no pending completion for task {0}")]
    NothingPending(TaskId),

    /// An arithmetic overflow occurred while crediting the reward.
    #[error("arithmetic overflow in task settlement: {context}")]
    Overflow {
        /// Description of what was being computed.
        context: String,
    },
}

/// The task catalog plus per-player completion bookkeeping.
#[derive(Debug, Default)]
pub struct TaskBook {
    /// All published tasks by ID.
    tasks: BTreeMap<TaskId, Task>,
    /// Started-but-unsettled completions.
    pending: BTreeMap<(TaskId, PlayerId), PendingCompletion>,
    /// Settled completions; at most one per (task, player).
    completed: BTreeMap<(TaskId, PlayerId), CompletedTask>,
}

impl TaskBook {
    /// Create an empty task book.
    pub const fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            pending: BTreeMap::new(),
            completed: BTreeMap::new(),
        }
    }

    /// Publish a task. Replaces any previous task with the same ID.
    pub fn publish(&mut self, task: Task) {
        self.tasks.insert(task.id, task);
    }

    /// Deactivate a task so no new completions can start.
    pub fn deactivate(&mut self, task_id: TaskId) -> Result<(), TaskError> {
        match self.tasks.get_mut(&task_id) {
            Some(task) => {
                task.is_active = false;
                Ok(())
            }
            None => Err(TaskError::NotFound(task_id)),
        }
    }

    /// Look up a task by ID.
    pub fn get(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.get(&task_id)
    }

    /// Tasks currently offered: active and not expired at `now`.
    pub fn active_tasks(&self, now: DateTime<Utc>) -> Vec<&Task> {
        self.tasks
            .values()
            .filter(|task| task.is_active && !is_expired(task, now))
            .collect()
    }

    /// Start a completion for `player_id` at `now`.
    pub fn start(
        &mut self,
        task_id: TaskId,
        player_id: PlayerId,
        now: DateTime<Utc>,
    ) -> Result<PendingCompletion, TaskError> {
        let task = self.tasks.get(&task_id).ok_or(TaskError::NotFound(task_id))?;
        if !task.is_active {
            return Err(TaskError::Inactive(task_id));
        }
        if is_expired(task, now) {
            return Err(TaskError::Expired(task_id));
        }
        let key = (task_id, player_id);
        if self.completed.contains_key(&key) {
            return Err(TaskError::AlreadyCompleted(task_id));
        }
        if self.pending.contains_key(&key) {
            return Err(TaskError::AlreadyPending(task_id));
        }

        let delay_secs =
            i64::try_from(task.completion_delay_secs).map_err(|_err| TaskError::Overflow {
                context: String::from("completion delay out of range"),
            })?;
        let settles_at = now
            .checked_add_signed(TimeDelta::seconds(delay_secs))
            .ok_or_else(|| TaskError::Overflow {
                context: String::from("completion settle time"),
            })?;

        let record = PendingCompletion {
            task_id,
            player_id,
            started_at: now,
            settles_at,
        };
        self.pending.insert(key, record);
        Ok(record)
    }

    /// Settle a pending completion, crediting the reward to `state`.
    ///
    /// Returns the power credited. The pending record is consumed and the
    /// (task, player) pair recorded as completed, so a second settlement
    /// fails with [`TaskError::NothingPending`] (or
    /// [`TaskError::AlreadyCompleted`] at the start of a new attempt).
    pub fn settle(
        &mut self,
        task_id: TaskId,
        state: &mut PlayerState,
        now: DateTime<Utc>,
    ) -> Result<u64, TaskError> {
        let key = (task_id, state.player_id);
        let record = self
            .pending
            .get(&key)
            .copied()
            .ok_or(TaskError::NothingPending(task_id))?;
        if now < record.settles_at {
            return Err(TaskError::NotReady {
                settles_at: record.settles_at,
            });
        }
        let reward = self
            .tasks
            .get(&task_id)
            .map(|task| task.reward_power)
            .ok_or(TaskError::NotFound(task_id))?;
        let power_after = state
            .power
            .checked_add(reward)
            .ok_or_else(|| TaskError::Overflow {
                context: String::from("task reward credit"),
            })?;

        state.power = power_after;
        self.pending.remove(&key);
        self.completed.insert(
            key,
            CompletedTask {
                task_id,
                player_id: state.player_id,
                completed_at: now,
            },
        );
        Ok(reward)
    }

    /// Pending completions for one player.
    pub fn pending_for(&self, player_id: PlayerId) -> Vec<&PendingCompletion> {
        self.pending
            .values()
            .filter(|record| record.player_id == player_id)
            .collect()
    }

    /// Settled completions for one player.
    pub fn completed_for(&self, player_id: PlayerId) -> Vec<&CompletedTask> {
        self.completed
            .values()
            .filter(|record| record.player_id == player_id)
            .collect()
    }
}

fn is_expired(task: &Task, now: DateTime<Utc>) -> bool {
    task.expires_at.is_some_and(|expiry| now > expiry)
}
