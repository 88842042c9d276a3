//! Cycle boundaries for the seven basic rule shapes.
//!
//! [`compute_due`] derives a due date from a start anchor; [`compute_start`]
//! derives a start date from a due anchor. The two are inverses only for
//! `daily` and fixed-length `custom` rules. Weekly, monthly and week-of-month
//! rules snap to the nearest matching calendar point in the direction of
//! travel, so going there and back can land on a different day.
//!
//! # Failure policy
//!
//! A rule missing a required field fails with
//! [`CycleError::InvalidRule`]. Any other failure (a lunar date outside the
//! table or an overflow) yields a fallback date with [`Computed::degraded`]
//! set, so one bad rule never stalls scheduling. A wall-clock time that falls
//! into a DST gap is not a failure: it moves forward past the gap.

use chrono::{DateTime, NaiveDate, Utc};

use crate::calendar::{
    add_days, on_local_date, settle, step_to_weekday, Bound, CalendarSpace, Computed, CycleContext,
    YearMonth,
};
use crate::error::{CycleError, Result};
use crate::rule::{CompositeDay, CustomUnit, DateSystem, RecurrenceRule, RuleKind};
use crate::special;

/// Longest run of one-step rolls a composite rule may take to clear its anchor.
const MAX_COMPOSITE_ROLLS: usize = 24;

/// Compute the due date of the cycle that starts at `start`.
///
/// The result is always strictly after `start`.
///
/// # Errors
///
/// Returns [`CycleError::InvalidRule`] if `rule` fails validation.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use cycle_engine::{compute_due, CycleContext, DateSystem, RecurrenceRule};
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 30, 9, 0, 0).unwrap();
/// let due = compute_due(start, &RecurrenceRule::daily(3), DateSystem::Solar, &CycleContext::default()).unwrap();
/// assert_eq!(due.date, Utc.with_ymd_and_hms(2024, 2, 2, 9, 0, 0).unwrap());
/// ```
pub fn compute_due(
    start: DateTime<Utc>,
    rule: &RecurrenceRule,
    system: DateSystem,
    ctx: &CycleContext<'_>,
) -> Result<Computed> {
    compute(start, rule, system, ctx, Bound::Due)
}

/// Compute the start date of the cycle that is due at `due`.
///
/// The result is always strictly before `due`.
///
/// # Errors
///
/// Returns [`CycleError::InvalidRule`] if `rule` fails validation.
pub fn compute_start(
    due: DateTime<Utc>,
    rule: &RecurrenceRule,
    system: DateSystem,
    ctx: &CycleContext<'_>,
) -> Result<Computed> {
    compute(due, rule, system, ctx, Bound::Start)
}

fn compute(
    anchor: DateTime<Utc>,
    rule: &RecurrenceRule,
    system: DateSystem,
    ctx: &CycleContext<'_>,
    bound: Bound,
) -> Result<Computed> {
    rule.validate()?;
    let outcome = boundary(anchor, rule, ctx.space(system), ctx, bound);
    settle(anchor, bound, outcome)
}

fn boundary(
    anchor: DateTime<Utc>,
    rule: &RecurrenceRule,
    space: CalendarSpace<'_>,
    ctx: &CycleContext<'_>,
    bound: Bound,
) -> Result<DateTime<Utc>> {
    let tz = ctx.timezone;
    let steps = i64::from(rule.value) * bound.sign();

    match rule.kind {
        RuleKind::Daily => on_local_date(anchor, tz, |date| add_days(date, steps)),
        RuleKind::Custom => custom(anchor, rule, space, ctx, bound),
        RuleKind::Weekly => on_local_date(anchor, tz, |date| match rule.week_day {
            Some(weekday) => {
                let snapped = step_to_weekday(date, weekday, bound)?;
                add_days(snapped, (i64::from(rule.value) - 1) * 7 * bound.sign())
            }
            None => add_days(date, steps * 7),
        }),
        RuleKind::Monthly => on_local_date(anchor, tz, |date| {
            let (ym, day) = space.locate(date)?;
            let target = space.shift_months(ym, steps)?;
            match rule.month_day {
                Some(month_day) => space.place(target, month_day),
                None => space.clamped(target, day),
            }
        }),
        RuleKind::Yearly => on_local_date(anchor, tz, |date| {
            let (ym, day) = space.locate(date)?;
            let mut target = space.shift_years(ym, steps)?;
            if let Some(month) = rule.month {
                target = space.with_month(target, month);
            }
            match (rule.year_day, rule.month_day) {
                (Some(year_day), _) => space.day_of_year(target.year, year_day),
                (None, Some(month_day)) => space.place(target, month_day),
                (None, None) => space.clamped(target, day),
            }
        }),
        RuleKind::WeekOfMonth => on_local_date(anchor, tz, |date| week_of_month(date, rule, space, bound)),
        RuleKind::Composite => on_local_date(anchor, tz, |date| composite(date, rule, space, bound)),
    }
}

fn custom(
    anchor: DateTime<Utc>,
    rule: &RecurrenceRule,
    space: CalendarSpace<'_>,
    ctx: &CycleContext<'_>,
    bound: Bound,
) -> Result<DateTime<Utc>> {
    let tz = ctx.timezone;
    let steps = i64::from(rule.value) * bound.sign();

    if let Some(pivot) = &rule.special_date_anchor {
        return on_local_date(anchor, tz, |date| {
            let mut current = date;
            for _ in 0..rule.value {
                current = match bound {
                    Bound::Due => special::next_occurrence(pivot, current, ctx.lunar)?,
                    Bound::Start => special::previous_occurrence(pivot, current, ctx.lunar)?,
                };
            }
            Ok(current)
        });
    }

    let unit = rule
        .unit
        .ok_or_else(|| CycleError::InvalidRule("custom rule requires a unit".to_string()))?;
    match unit {
        CustomUnit::Minutes => offset(anchor, chrono::Duration::try_minutes(steps)),
        CustomUnit::Hours => offset(anchor, chrono::Duration::try_hours(steps)),
        CustomUnit::Days => on_local_date(anchor, tz, |date| add_days(date, steps)),
        CustomUnit::Weeks => on_local_date(anchor, tz, |date| add_days(date, steps * 7)),
        CustomUnit::Months => on_local_date(anchor, tz, |date| space.add_months(date, steps)),
        CustomUnit::Years => on_local_date(anchor, tz, |date| space.add_years(date, steps)),
    }
}

fn offset(anchor: DateTime<Utc>, delta: Option<chrono::Duration>) -> Result<DateTime<Utc>> {
    delta
        .and_then(|delta| anchor.checked_add_signed(delta))
        .ok_or_else(|| CycleError::DegradedComputation(format!("offset from {anchor} overflows")))
}

/// Nth weekday of the month (or of a pinned month of the year).
///
/// The first occurrence strictly past the anchor is found, then `value - 1`
/// further months (or years, when pinned) are stepped.
fn week_of_month(
    date: NaiveDate,
    rule: &RecurrenceRule,
    space: CalendarSpace<'_>,
    bound: Bound,
) -> Result<NaiveDate> {
    let (Some(week), Some(weekday)) = (rule.week_of_month, rule.week_day) else {
        return Err(CycleError::InvalidRule(
            "weekOfMonth rule requires weekOfMonth and weekDay".to_string(),
        ));
    };

    let (ym, _) = space.locate(date)?;
    let advance = |cursor: YearMonth, count: i64| match rule.month {
        Some(_) => space.shift_years(cursor, count),
        None => space.shift_months(cursor, count),
    };
    let mut cursor = match rule.month {
        Some(month) => space.with_month(ym, month),
        None => ym,
    };

    let mut found = None;
    for _ in 0..2 {
        let candidate = space.nth_weekday(cursor, week, weekday)?;
        let past = match bound {
            Bound::Due => candidate > date,
            Bound::Start => candidate < date,
        };
        if past {
            found = Some(candidate);
            break;
        }
        cursor = advance(cursor, bound.sign())?;
    }
    let first = found.ok_or_else(|| {
        CycleError::DegradedComputation(format!("no {weekday} occurrence found near {date}"))
    })?;

    if rule.value <= 1 {
        return Ok(first);
    }
    let cursor = advance(cursor, (i64::from(rule.value) - 1) * bound.sign())?;
    space.nth_weekday(cursor, week, weekday)
}

/// Years, then months, then the day target (or plain day offset).
fn composite(
    date: NaiveDate,
    rule: &RecurrenceRule,
    space: CalendarSpace<'_>,
    bound: Bound,
) -> Result<NaiveDate> {
    let offsets = rule
        .composite
        .ok_or_else(|| CycleError::InvalidRule("composite rule requires composite offsets".to_string()))?;
    let sign = bound.sign();

    let (ym, day) = space.locate(date)?;
    let mut cursor = space.shift_years(ym, i64::from(offsets.years) * sign)?;
    cursor = space.shift_months(cursor, i64::from(offsets.months) * sign)?;

    for _ in 0..=MAX_COMPOSITE_ROLLS {
        let candidate = match offsets.target {
            Some(CompositeDay::NthWeekday(week, weekday)) => space.nth_weekday(cursor, week, weekday)?,
            Some(CompositeDay::DayOfMonth(month_day)) => space.place(cursor, month_day)?,
            Some(CompositeDay::DayOfYear(year_day)) => space.day_of_year(cursor.year, year_day)?,
            None => add_days(space.clamped(cursor, day)?, i64::from(offsets.days) * sign)?,
        };
        let past = match bound {
            Bound::Due => candidate > date,
            Bound::Start => candidate < date,
        };
        if past {
            return Ok(candidate);
        }
        cursor = match offsets.target {
            Some(CompositeDay::DayOfYear(_)) => space.shift_years(cursor, sign)?,
            _ => space.shift_months(cursor, sign)?,
        };
    }

    Err(CycleError::DegradedComputation(format!(
        "composite rule did not move past {date}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lunar::LunarTable;
    use crate::rule::{AnchorKind, CompositeRule, DayOfMonth, SpecialDateAnchor, WeekOfMonth};
    use chrono::{Datelike, TimeZone, Weekday};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
    }

    fn due(start: DateTime<Utc>, rule: &RecurrenceRule) -> DateTime<Utc> {
        let computed = compute_due(start, rule, DateSystem::Solar, &CycleContext::default()).unwrap();
        assert!(!computed.is_degraded(), "unexpected degradation: {computed:?}");
        computed.date
    }

    fn start(due: DateTime<Utc>, rule: &RecurrenceRule) -> DateTime<Utc> {
        let computed = compute_start(due, rule, DateSystem::Solar, &CycleContext::default()).unwrap();
        assert!(!computed.is_degraded(), "unexpected degradation: {computed:?}");
        computed.date
    }

    fn lunar_due(start: DateTime<Utc>, rule: &RecurrenceRule) -> Computed {
        compute_due(start, rule, DateSystem::Lunar, &CycleContext::default()).unwrap()
    }

    fn lunar_of(instant: DateTime<Utc>) -> (i32, u32, u32, bool) {
        let lunar = LunarTable::bundled().to_lunar(instant.date_naive()).unwrap();
        (lunar.year, lunar.month, lunar.day, lunar.is_leap_month)
    }

    // ── daily / custom ──────────────────────────────────────────────────

    #[test]
    fn test_daily_crosses_month_boundary() {
        assert_eq!(due(at(2024, 1, 30), &RecurrenceRule::daily(3)), at(2024, 2, 2));
    }

    #[test]
    fn test_daily_start_is_inverse() {
        let rule = RecurrenceRule::daily(3);
        assert_eq!(start(at(2024, 2, 2), &rule), at(2024, 1, 30));
    }

    #[test]
    fn test_custom_hours_and_minutes_are_absolute() {
        let anchor = Utc.with_ymd_and_hms(2024, 3, 1, 22, 30, 0).unwrap();
        let rule = RecurrenceRule::custom(3, CustomUnit::Hours);
        assert_eq!(due(anchor, &rule), Utc.with_ymd_and_hms(2024, 3, 2, 1, 30, 0).unwrap());
        let rule = RecurrenceRule::custom(45, CustomUnit::Minutes);
        assert_eq!(start(anchor, &rule), Utc.with_ymd_and_hms(2024, 3, 1, 21, 45, 0).unwrap());
    }

    #[test]
    fn test_custom_weeks_is_seven_days() {
        let rule = RecurrenceRule::custom(2, CustomUnit::Weeks);
        assert_eq!(due(at(2024, 12, 25), &rule), at(2025, 1, 8));
    }

    #[test]
    fn test_custom_months_clamps_not_spills() {
        let rule = RecurrenceRule::custom(1, CustomUnit::Months);
        assert_eq!(due(at(2024, 1, 31), &rule), at(2024, 2, 29));
        assert_eq!(due(at(2023, 1, 31), &rule), at(2023, 2, 28));
    }

    #[test]
    fn test_custom_years_from_leap_day() {
        let rule = RecurrenceRule::custom(1, CustomUnit::Years);
        assert_eq!(due(at(2024, 2, 29), &rule), at(2025, 2, 28));
    }

    #[test]
    fn test_custom_special_anchor_uses_festival() {
        let rule = RecurrenceRule {
            unit: None,
            ..RecurrenceRule::custom(1, CustomUnit::Years)
        }
        .with_special_anchor(SpecialDateAnchor::new(
            AnchorKind::Festival,
            "Mid-Autumn Festival",
            8,
            15,
            true,
        ));
        assert_eq!(due(at(2024, 1, 1), &rule), at(2024, 9, 17));
        assert_eq!(start(at(2024, 9, 17), &rule), at(2023, 9, 29));
    }

    // ── weekly ──────────────────────────────────────────────────────────

    #[test]
    fn test_weekly_snaps_to_weekday_then_adds_weeks() {
        // 2024-03-06 is a Wednesday.
        let rule = RecurrenceRule::weekly(2, Some(Weekday::Mon));
        assert_eq!(due(at(2024, 3, 6), &rule), at(2024, 3, 18));
    }

    #[test]
    fn test_weekly_anchor_on_weekday_advances_full_week() {
        // 2024-03-11 is a Monday.
        let rule = RecurrenceRule::weekly(1, Some(Weekday::Mon));
        assert_eq!(due(at(2024, 3, 11), &rule), at(2024, 3, 18));
        assert_eq!(start(at(2024, 3, 11), &rule), at(2024, 3, 4));
    }

    #[test]
    fn test_weekly_is_not_an_exact_inverse() {
        let rule = RecurrenceRule::weekly(1, Some(Weekday::Mon));
        let due_date = due(at(2024, 3, 6), &rule);
        assert_eq!(due_date, at(2024, 3, 11));
        assert_eq!(start(due_date, &rule), at(2024, 3, 4));
    }

    #[test]
    fn test_weekly_without_weekday_is_plain_weeks() {
        let rule = RecurrenceRule::weekly(3, None);
        assert_eq!(due(at(2024, 3, 6), &rule), at(2024, 3, 27));
    }

    // ── monthly / yearly ────────────────────────────────────────────────

    #[test]
    fn test_monthly_day_31_clamps_in_leap_february() {
        let rule = RecurrenceRule::monthly(1, Some(DayOfMonth::Forward(31)));
        assert_eq!(due(at(2024, 1, 15), &rule), at(2024, 2, 29));
    }

    #[test]
    fn test_monthly_backward_counts_from_month_end() {
        let rule = RecurrenceRule::monthly(1, Some(DayOfMonth::Backward(0)));
        assert_eq!(due(at(2024, 1, 15), &rule), at(2024, 2, 29));
        let rule = RecurrenceRule::monthly(2, Some(DayOfMonth::Backward(3)));
        assert_eq!(due(at(2024, 1, 15), &rule), at(2024, 3, 28));
    }

    #[test]
    fn test_monthly_without_day_keeps_anchor_day() {
        let rule = RecurrenceRule::monthly(1, None);
        assert_eq!(due(at(2024, 3, 31), &rule), at(2024, 4, 30));
        assert_eq!(start(at(2024, 3, 31), &rule), at(2024, 2, 29));
    }

    #[test]
    fn test_monthly_december_rolls_year() {
        let rule = RecurrenceRule::monthly(2, Some(DayOfMonth::Forward(5)));
        assert_eq!(due(at(2024, 12, 20), &rule), at(2025, 2, 5));
    }

    #[test]
    fn test_yearly_leap_day_clamps() {
        let rule = RecurrenceRule::yearly(1);
        assert_eq!(due(at(2024, 2, 29), &rule), at(2025, 2, 28));
        assert_eq!(start(at(2024, 2, 29), &rule), at(2023, 2, 28));
    }

    #[test]
    fn test_yearly_with_month_and_day() {
        let rule = RecurrenceRule::yearly(1)
            .with_month(6)
            .with_month_day(DayOfMonth::Forward(15));
        assert_eq!(due(at(2024, 9, 1), &rule), at(2025, 6, 15));
    }

    #[test]
    fn test_yearly_with_year_day() {
        let rule = RecurrenceRule::yearly(1).with_year_day(60);
        assert_eq!(due(at(2023, 5, 1), &rule), at(2024, 2, 29));
    }

    // ── week of month ───────────────────────────────────────────────────

    #[test]
    fn test_last_friday_of_june() {
        let rule = RecurrenceRule::week_of_month(1, WeekOfMonth::Last, Weekday::Fri);
        assert_eq!(due(at(2024, 6, 3), &rule), at(2024, 6, 28));
    }

    #[test]
    fn test_week_of_month_passed_rolls_to_next_month() {
        // Second Tuesday of June 2024 is the 11th.
        let rule = RecurrenceRule::week_of_month(1, WeekOfMonth::Second, Weekday::Tue);
        assert_eq!(due(at(2024, 6, 11), &rule), at(2024, 7, 9));
        assert_eq!(due(at(2024, 6, 10), &rule), at(2024, 6, 11));
    }

    #[test]
    fn test_week_of_month_december_rolls_into_january() {
        let rule = RecurrenceRule::week_of_month(1, WeekOfMonth::First, Weekday::Mon);
        assert_eq!(due(at(2024, 12, 10), &rule), at(2025, 1, 6));
    }

    #[test]
    fn test_week_of_month_value_steps_extra_months() {
        let rule = RecurrenceRule::week_of_month(3, WeekOfMonth::First, Weekday::Mon);
        // First upcoming is 2025-01-06, then two more months: 2025-03-03.
        assert_eq!(due(at(2024, 12, 10), &rule), at(2025, 3, 3));
    }

    #[test]
    fn test_week_of_month_start_finds_previous_occurrence() {
        let rule = RecurrenceRule::week_of_month(1, WeekOfMonth::Last, Weekday::Fri);
        assert_eq!(start(at(2024, 6, 28), &rule), at(2024, 5, 31));
    }

    #[test]
    fn test_week_of_month_pinned_month_rolls_by_year() {
        // Fourth Thursday of November.
        let rule = RecurrenceRule::week_of_month(1, WeekOfMonth::Fourth, Weekday::Thu).with_month(11);
        assert_eq!(due(at(2024, 3, 1), &rule), at(2024, 11, 28));
        assert_eq!(due(at(2024, 11, 28), &rule), at(2025, 11, 27));
    }

    #[test]
    fn test_week_of_month_without_weekday_is_invalid() {
        let mut rule = RecurrenceRule::week_of_month(1, WeekOfMonth::Last, Weekday::Fri);
        rule.week_day = None;
        let result = compute_due(at(2024, 6, 3), &rule, DateSystem::Solar, &CycleContext::default());
        assert!(matches!(result, Err(CycleError::InvalidRule(_))));
    }

    // ── composite ───────────────────────────────────────────────────────

    #[test]
    fn test_composite_year_then_month_then_day() {
        let rule = RecurrenceRule::composite(CompositeRule {
            years: 1,
            months: 2,
            days: 0,
            target: Some(CompositeDay::DayOfMonth(DayOfMonth::Forward(10))),
        });
        assert_eq!(due(at(2024, 1, 20), &rule), at(2025, 3, 10));
    }

    #[test]
    fn test_composite_nth_weekday_overrides_day_offset() {
        let rule = RecurrenceRule::composite(CompositeRule {
            years: 0,
            months: 1,
            days: 5,
            target: Some(CompositeDay::NthWeekday(WeekOfMonth::Last, Weekday::Fri)),
        });
        assert_eq!(due(at(2024, 5, 2), &rule), at(2024, 6, 28));
    }

    #[test]
    fn test_composite_plain_day_offset() {
        let rule = RecurrenceRule::composite(CompositeRule {
            years: 0,
            months: 1,
            days: 3,
            target: None,
        });
        assert_eq!(due(at(2024, 1, 31), &rule), at(2024, 3, 3));
    }

    #[test]
    fn test_composite_rolls_until_past_anchor() {
        // Day 5 of the current month is already behind the anchor.
        let rule = RecurrenceRule::composite(CompositeRule {
            target: Some(CompositeDay::DayOfMonth(DayOfMonth::Forward(5))),
            ..Default::default()
        });
        assert_eq!(due(at(2024, 1, 10), &rule), at(2024, 2, 5));
        assert_eq!(start(at(2024, 1, 3), &rule), at(2023, 12, 5));
    }

    #[test]
    fn test_composite_day_of_year_rolls_by_year() {
        let rule = RecurrenceRule::composite(CompositeRule {
            target: Some(CompositeDay::DayOfYear(32)),
            ..Default::default()
        });
        assert_eq!(due(at(2024, 3, 1), &rule), at(2025, 2, 1));
    }

    // ── lunar ───────────────────────────────────────────────────────────

    #[test]
    fn test_lunar_monthly_keeps_lunar_day() {
        // Lunar 2024-01-15 (Lantern Festival) is 2024-02-24.
        let computed = lunar_due(at(2024, 2, 24), &RecurrenceRule::monthly(1, None));
        assert!(!computed.is_degraded());
        assert_eq!(lunar_of(computed.date), (2024, 2, 15, false));
    }

    #[test]
    fn test_lunar_monthly_clamps_to_short_month() {
        let rule = RecurrenceRule::monthly(1, Some(DayOfMonth::Forward(30)));
        // Lunar 2024-11-05 → 12th month has 29 days.
        let anchor = LunarTable::bundled().to_solar(2024, 11, 5, false).unwrap();
        let computed = lunar_due(Utc.from_utc_datetime(&anchor.and_hms_opt(9, 0, 0).unwrap()), &rule);
        assert_eq!(lunar_of(computed.date), (2024, 12, 29, false));
    }

    #[test]
    fn test_lunar_yearly_follows_spring_festival() {
        let computed = lunar_due(at(2024, 2, 10), &RecurrenceRule::yearly(1));
        assert_eq!(computed.date, at(2025, 1, 29));
    }

    #[test]
    fn test_lunar_weekly_matches_solar_weekday() {
        let rule = RecurrenceRule::weekly(2, Some(Weekday::Mon));
        let computed = lunar_due(at(2024, 3, 6), &rule);
        assert_eq!(computed.date, at(2024, 3, 18));
        assert_eq!(computed.date.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_lunar_out_of_range_falls_back_thirty_days() {
        let anchor = at(2101, 1, 10);
        let computed = lunar_due(anchor, &RecurrenceRule::monthly(1, None));
        assert_eq!(computed.date, anchor + chrono::Duration::days(30));
        assert!(matches!(computed.degraded, Some(CycleError::InvalidLunarDate(_))));
    }

    #[test]
    fn test_lunar_start_out_of_range_falls_back_backward() {
        let anchor = at(1900, 1, 5);
        let computed = compute_start(
            anchor,
            &RecurrenceRule::yearly(1),
            DateSystem::Lunar,
            &CycleContext::default(),
        )
        .unwrap();
        assert_eq!(computed.date, anchor - chrono::Duration::days(30));
    }

    // ── time zones ──────────────────────────────────────────────────────

    #[test]
    fn test_local_day_follows_context_timezone() {
        let ctx = CycleContext::new("Asia/Shanghai".parse().unwrap());
        // 2024-01-31 20:00 UTC is Feb 1 04:00 in Shanghai; one month later is Mar 1 local.
        let anchor = Utc.with_ymd_and_hms(2024, 1, 31, 20, 0, 0).unwrap();
        let computed = compute_due(anchor, &RecurrenceRule::monthly(1, None), DateSystem::Solar, &ctx).unwrap();
        assert_eq!(computed.date, Utc.with_ymd_and_hms(2024, 2, 29, 20, 0, 0).unwrap());
    }

    #[test]
    fn test_daily_keeps_wall_clock_across_dst() {
        let ctx = CycleContext::new("America/New_York".parse().unwrap());
        // 09:00 EST on 2024-03-09 → 09:00 EDT on 2024-03-10 (23 hours later).
        let anchor = Utc.with_ymd_and_hms(2024, 3, 9, 14, 0, 0).unwrap();
        let computed = compute_due(anchor, &RecurrenceRule::daily(1), DateSystem::Solar, &ctx).unwrap();
        assert_eq!(computed.date, Utc.with_ymd_and_hms(2024, 3, 10, 13, 0, 0).unwrap());
    }

    #[test]
    fn test_due_in_dst_gap_moves_past_gap() {
        let ctx = CycleContext::new("America/New_York".parse().unwrap());
        // 02:30 EST on 2024-03-03; 02:30 on 2024-03-10 is skipped, 03:30 EDT is 07:30 UTC.
        let anchor = Utc.with_ymd_and_hms(2024, 3, 3, 7, 30, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 3, 10, 7, 30, 0).unwrap();
        for rule in [RecurrenceRule::daily(7), RecurrenceRule::custom(1, CustomUnit::Weeks)] {
            let computed = compute_due(anchor, &rule, DateSystem::Solar, &ctx).unwrap();
            assert!(!computed.is_degraded(), "unexpected degradation: {computed:?}");
            assert_eq!(computed.date, expected);
        }
    }

    #[test]
    fn test_start_in_dst_gap_moves_past_gap() {
        let ctx = CycleContext::new("America/New_York".parse().unwrap());
        // 02:30 EDT on 2024-03-17 back one week lands in the 2024-03-10 gap.
        let anchor = Utc.with_ymd_and_hms(2024, 3, 17, 6, 30, 0).unwrap();
        let computed = compute_start(anchor, &RecurrenceRule::daily(7), DateSystem::Solar, &ctx).unwrap();
        assert!(!computed.is_degraded(), "unexpected degradation: {computed:?}");
        assert_eq!(computed.date, Utc.with_ymd_and_hms(2024, 3, 10, 7, 30, 0).unwrap());
    }
}
