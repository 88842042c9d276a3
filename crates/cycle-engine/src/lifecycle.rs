//! Cycle state transitions for a recurring task.
//!
//! A task's cycles form an append-only log. [`CycleManager`] turns an event
//! (creation, completion, skip, overdue detection) into a [`CycleTransition`]:
//! the updated cycle plus, when the schedule continues, the next one. The
//! caller persists both; the manager never stores anything.
//!
//! The next cycle is anchored differently depending on the event:
//!
//! - completion and skip anchor at the current time, so finishing early or late
//!   resets the schedule clock;
//! - overdue rollover anchors at the missed due date, so the schedule does not
//!   drift when a deadline passes unattended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::advanced;
use crate::calendar::{Computed, CycleContext};
use crate::error::{CycleError, Result};
use crate::rule::{DateSystem, TaskRule};
use crate::simple;

// ── Clock ───────────────────────────────────────────────────────────────────

/// Source of "now" for lifecycle transitions.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// ── Model ───────────────────────────────────────────────────────────────────

/// The parts of a task the engine reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub rule: TaskRule,
    #[serde(default)]
    pub date_system: DateSystem,
    #[serde(default)]
    pub auto_restart: bool,
    #[serde(default = "default_recurring")]
    pub recurring: bool,
}

fn default_recurring() -> bool {
    true
}

impl Task {
    pub fn new(id: impl Into<String>, rule: impl Into<TaskRule>) -> Self {
        Self {
            id: id.into(),
            rule: rule.into(),
            date_system: DateSystem::Solar,
            auto_restart: false,
            recurring: true,
        }
    }

    pub fn with_date_system(mut self, date_system: DateSystem) -> Self {
        self.date_system = date_system;
        self
    }

    pub fn with_auto_restart(mut self, auto_restart: bool) -> Self {
        self.auto_restart = auto_restart;
        self
    }

    pub fn with_recurring(mut self, recurring: bool) -> Self {
        self.recurring = recurring;
        self
    }
}

/// One concrete occurrence of a task. `due_date` is always after `start_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCycle {
    pub task_id: String,
    pub start_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub date_system: DateSystem,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_overdue: bool,
    #[serde(default)]
    pub is_skipped: bool,
}

impl TaskCycle {
    /// Still open: neither completed, skipped nor rolled over.
    pub fn is_pending(&self) -> bool {
        !self.is_completed && !self.is_skipped && !self.is_overdue
    }
}

/// A freshly created cycle, with the degradation reason if its due date is a
/// fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCycle {
    pub cycle: TaskCycle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<CycleError>,
}

/// The result of applying an event to a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleTransition {
    pub updated: TaskCycle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<NewCycle>,
}

impl CycleTransition {
    fn unchanged(cycle: &TaskCycle) -> Self {
        Self {
            updated: cycle.clone(),
            next: None,
        }
    }
}

// ── Manager ─────────────────────────────────────────────────────────────────

/// Applies lifecycle events using an injected clock.
#[derive(Debug, Clone, Copy)]
pub struct CycleManager<'a, C: Clock> {
    clock: C,
    ctx: CycleContext<'a>,
}

impl<'a, C: Clock> CycleManager<'a, C> {
    pub fn new(clock: C, ctx: CycleContext<'a>) -> Self {
        Self { clock, ctx }
    }

    /// The first cycle of a newly created task, starting now.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidRule`] if the task's rule is invalid.
    pub fn create(&self, task: &Task) -> Result<NewCycle> {
        let now = self.clock.now();
        let cycle = self.cycle_from(task, now)?;
        tracing::debug!(task_id = %task.id, due = %cycle.cycle.due_date, "cycle created");
        Ok(cycle)
    }

    /// Mark `cycle` completed now.
    ///
    /// With `auto_restart` on a recurring task, the next cycle starts now. A
    /// cycle that already rolled over as overdue has a successor, so none is
    /// created. Completing a completed cycle changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidRule`] if the task's rule is invalid.
    pub fn complete(&self, task: &Task, cycle: &TaskCycle) -> Result<CycleTransition> {
        if cycle.is_completed {
            return Ok(CycleTransition::unchanged(cycle));
        }
        let now = self.clock.now();
        let mut updated = cycle.clone();
        updated.is_completed = true;
        updated.completed_at = Some(now);

        let next = if task.auto_restart && task.recurring && !cycle.is_overdue && !cycle.is_skipped
        {
            Some(self.cycle_from(task, now)?)
        } else {
            None
        };
        tracing::debug!(
            task_id = %task.id,
            due = ?next.as_ref().map(|n| n.cycle.due_date),
            "cycle completed"
        );
        Ok(CycleTransition { updated, next })
    }

    /// Mark `cycle` overdue if its due date has passed.
    ///
    /// Returns `None` when the cycle is not yet due or is no longer pending.
    /// Otherwise a recurring task rolls over to a cycle anchored at the missed
    /// due date, whether or not `auto_restart` is set.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidRule`] if the task's rule is invalid.
    pub fn overdue_check(&self, task: &Task, cycle: &TaskCycle) -> Result<Option<CycleTransition>> {
        if !cycle.is_pending() || self.clock.now() <= cycle.due_date {
            return Ok(None);
        }
        let mut updated = cycle.clone();
        updated.is_overdue = true;

        let next = if task.recurring {
            Some(self.cycle_from(task, cycle.due_date)?)
        } else {
            None
        };
        tracing::debug!(
            task_id = %task.id,
            missed = %cycle.due_date,
            due = ?next.as_ref().map(|n| n.cycle.due_date),
            "cycle overdue"
        );
        Ok(Some(CycleTransition { updated, next }))
    }

    /// Skip `cycle`; a recurring task continues with a cycle starting now.
    ///
    /// Skipping a cycle that is not pending changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidRule`] if the task's rule is invalid.
    pub fn skip(&self, task: &Task, cycle: &TaskCycle) -> Result<CycleTransition> {
        if !cycle.is_pending() {
            return Ok(CycleTransition::unchanged(cycle));
        }
        let mut updated = cycle.clone();
        updated.is_skipped = true;

        let next = if task.recurring {
            Some(self.cycle_from(task, self.clock.now())?)
        } else {
            None
        };
        tracing::debug!(
            task_id = %task.id,
            due = ?next.as_ref().map(|n| n.cycle.due_date),
            "cycle skipped"
        );
        Ok(CycleTransition { updated, next })
    }

    fn cycle_from(&self, task: &Task, anchor: DateTime<Utc>) -> Result<NewCycle> {
        let Computed { date, degraded } = due_for(task, anchor, &self.ctx)?;
        Ok(NewCycle {
            cycle: TaskCycle {
                task_id: task.id.clone(),
                start_date: anchor,
                due_date: date,
                date_system: task.date_system,
                is_completed: false,
                completed_at: None,
                is_overdue: false,
                is_skipped: false,
            },
            degraded,
        })
    }
}

/// Due date for `task` anchored at `anchor`, using the calculator that matches
/// its rule family.
///
/// # Errors
///
/// Returns [`CycleError::InvalidRule`] if the task's rule is invalid.
pub fn due_for(task: &Task, anchor: DateTime<Utc>, ctx: &CycleContext<'_>) -> Result<Computed> {
    match &task.rule {
        TaskRule::Simple(rule) => simple::compute_due(anchor, rule, task.date_system, ctx),
        TaskRule::Advanced(rule) => advanced::compute_due(anchor, rule, task.date_system, ctx),
    }
}

/// The cycle a task is currently on: the incomplete cycle with the latest due
/// date, else the last one appended. Skipped cycles do not count as incomplete.
pub fn current_cycle(cycles: &[TaskCycle]) -> Option<&TaskCycle> {
    cycles
        .iter()
        .filter(|cycle| !cycle.is_completed && !cycle.is_skipped)
        .max_by_key(|cycle| cycle.due_date)
        .or_else(|| cycles.last())
}
