//! # cycle-engine
//!
//! Deterministic recurrence-cycle computation for recurring tasks.
//!
//! Given a recurrence rule and an anchor instant, the engine computes the next
//! cycle's due date (or a cycle's start date from its due date) in either the
//! Gregorian or the Chinese lunisolar calendar, and drives the cycle lifecycle
//! (create, complete, skip, overdue rollover) without touching storage.
//!
//! ## Modules
//!
//! - [`rule`] — Recurrence rule data model and validation
//! - [`lunar`] — Gregorian ↔ lunar conversion over a bundled 1900–2100 table
//! - [`calendar`] — Calculation context, results and the fallback policy
//! - [`simple`] — Due/start dates for the seven basic rule shapes
//! - [`advanced`] — Due/start dates for parametrized rules and special anchors
//! - [`special`] — Festivals and solar terms as recurring anchors
//! - [`lifecycle`] — Cycle transitions with an injectable clock
//! - [`describe`] — Human-readable rule descriptions
//! - [`error`] — Error types

pub mod advanced;
pub mod calendar;
pub mod describe;
pub mod error;
pub mod lifecycle;
pub mod lunar;
pub mod rule;
pub mod simple;
pub mod special;

pub use advanced::{compute_due as compute_advanced_due, compute_start as compute_advanced_start};
pub use calendar::{Computed, CycleContext};
pub use describe::{describe_advanced, describe_rule};
pub use error::CycleError;
pub use lifecycle::{
    current_cycle, due_for, Clock, CycleManager, CycleTransition, FixedClock, NewCycle,
    SystemClock, Task, TaskCycle,
};
pub use lunar::{LunarDate, LunarTable};
pub use rule::{
    weekday_from_index, AdvancedRecurrenceRule, AdvancedUnit, AnchorKind, CompositeDay,
    CompositeRule, CountDirection, CustomUnit, DateSystem, DayOfMonth, RecurrenceRule, RuleKind,
    SpecialAnchorKind, SpecialDateAnchor, TaskRule, WeekOfMonth,
};
pub use simple::{compute_due, compute_start};
pub use special::{builtin_anchor, builtin_anchors};
