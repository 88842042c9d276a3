//! Cycle boundaries for [`AdvancedRecurrenceRule`].
//!
//! The rule's `selected_unit` picks the computation. A `special_anchor`
//! replaces the unit-based path for week, month and year units:
//!
//! | Unit  | Without anchor                                   | With anchor                          |
//! |-------|--------------------------------------------------|--------------------------------------|
//! | day   | ±`day_value` days                                | (anchors do not apply)               |
//! | week  | next/previous `week_day`, then ±(`week_value`−1) weeks | scan to weekend/workday, or fixed jump |
//! | month | ±`month_value` months, day placed by direction   | flat ±1 month                        |
//! | year  | ±`year_value` years, month `month_value`, day placed by direction | ±`year_value` years    |
//!
//! Holiday and solar-term anchors are approximated as 7- and 15-day jumps;
//! no external holiday calendar is consulted.

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};

use crate::calendar::{
    add_days, on_local_date, settle, step_to_weekday, Bound, CalendarSpace, Computed, CycleContext,
    YearMonth,
};
use crate::error::{CycleError, Result};
use crate::rule::{
    AdvancedRecurrenceRule, AdvancedUnit, CountDirection, DateSystem, DayOfMonth,
    SpecialAnchorKind,
};

/// Days a holiday anchor jumps.
pub const HOLIDAY_JUMP_DAYS: i64 = 7;
/// Days a solar-term anchor jumps.
pub const SOLAR_TERM_JUMP_DAYS: i64 = 15;

/// Compute the due date of the cycle that starts at `start`.
///
/// # Errors
///
/// Returns [`CycleError::InvalidRule`] if `rule` fails validation.
pub fn compute_due(
    start: DateTime<Utc>,
    rule: &AdvancedRecurrenceRule,
    system: DateSystem,
    ctx: &CycleContext<'_>,
) -> Result<Computed> {
    compute(start, rule, system, ctx, Bound::Due)
}

/// Compute the start date of the cycle that is due at `due`.
///
/// # Errors
///
/// Returns [`CycleError::InvalidRule`] if `rule` fails validation.
pub fn compute_start(
    due: DateTime<Utc>,
    rule: &AdvancedRecurrenceRule,
    system: DateSystem,
    ctx: &CycleContext<'_>,
) -> Result<Computed> {
    compute(due, rule, system, ctx, Bound::Start)
}

fn compute(
    anchor: DateTime<Utc>,
    rule: &AdvancedRecurrenceRule,
    system: DateSystem,
    ctx: &CycleContext<'_>,
    bound: Bound,
) -> Result<Computed> {
    rule.validate()?;
    let space = ctx.space(system);
    let outcome = on_local_date(anchor, ctx.timezone, |date| shift(date, rule, space, bound));
    settle(anchor, bound, outcome)
}

fn shift(
    date: NaiveDate,
    rule: &AdvancedRecurrenceRule,
    space: CalendarSpace<'_>,
    bound: Bound,
) -> Result<NaiveDate> {
    let sign = bound.sign();

    match (rule.selected_unit, rule.special_anchor) {
        (AdvancedUnit::Day, _) => add_days(date, i64::from(rule.day_value) * sign),

        (AdvancedUnit::Week, None) => {
            let snapped = step_to_weekday(date, rule.week_day, bound)?;
            add_days(snapped, (i64::from(rule.week_value) - 1) * 7 * sign)
        }
        (AdvancedUnit::Week, Some(kind)) => special_week(date, kind, bound),

        (AdvancedUnit::Month, None) => {
            let (ym, _) = space.locate(date)?;
            let target = space.shift_months(ym, i64::from(rule.month_value) * sign)?;
            place_day(space, target, rule)
        }
        (AdvancedUnit::Month, Some(_)) => space.add_months(date, sign),

        (AdvancedUnit::Year, None) => {
            let (ym, _) = space.locate(date)?;
            let target = space.shift_years(ym, i64::from(rule.year_value) * sign)?;
            place_day(space, space.with_month(target, rule.month_value), rule)
        }
        (AdvancedUnit::Year, Some(_)) => space.add_years(date, i64::from(rule.year_value) * sign),
    }
}

/// Forward: `min(day_value, days_in_month)`. Backward: `max(1, days_in_month - day_value)`.
fn place_day(space: CalendarSpace<'_>, ym: YearMonth, rule: &AdvancedRecurrenceRule) -> Result<NaiveDate> {
    let day = u8::try_from(rule.day_value).unwrap_or(u8::MAX);
    let placement = match rule.count_direction {
        CountDirection::Forward => DayOfMonth::Forward(day),
        CountDirection::Backward => DayOfMonth::Backward(day),
    };
    space.place(ym, placement)
}

fn special_week(date: NaiveDate, kind: SpecialAnchorKind, bound: Bound) -> Result<NaiveDate> {
    match kind {
        SpecialAnchorKind::Weekend => scan_until(date, bound, is_weekend),
        SpecialAnchorKind::Workday => scan_until(date, bound, |weekday| !is_weekend(weekday)),
        SpecialAnchorKind::Holiday => add_days(date, HOLIDAY_JUMP_DAYS * bound.sign()),
        SpecialAnchorKind::SolarTerm => add_days(date, SOLAR_TERM_JUMP_DAYS * bound.sign()),
    }
}

fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}

/// Step day by day away from `date` until `accept` holds for the weekday.
fn scan_until(date: NaiveDate, bound: Bound, accept: impl Fn(Weekday) -> bool) -> Result<NaiveDate> {
    let mut current = date;
    for _ in 0..7 {
        current = add_days(current, bound.sign())?;
        if accept(current.weekday()) {
            return Ok(current);
        }
    }
    Err(CycleError::DegradedComputation(format!(
        "no matching day within a week of {date}"
    )))
}
