//! Calendar field arithmetic shared by both calculators.
//!
//! Instants are mapped to a local calendar day in the configured time zone,
//! arithmetic runs on that day in either the solar or the lunar calendar, and
//! the result is mapped back to an instant with the original wall-clock time.
//! Weekday matching always happens on solar dates; the lunar calendar has no
//! seven-day week of its own.

use chrono::{
    DateTime, Datelike, LocalResult, NaiveDate, NaiveTime, Offset, TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::{CycleError, Result};
use crate::lunar::LunarTable;
use crate::rule::{DateSystem, DayOfMonth, WeekOfMonth};

/// Days the due date moves past its anchor when lunar conversion fails.
pub const LUNAR_FALLBACK_DAYS: i64 = 30;
/// Days the due date moves past its anchor when a computation degrades.
pub const DEGRADED_FALLBACK_DAYS: i64 = 1;

// ── Configuration ───────────────────────────────────────────────────────────

/// Everything a calculation needs besides the rule and the anchor.
#[derive(Debug, Clone, Copy)]
pub struct CycleContext<'a> {
    /// Time zone whose local calendar day an instant belongs to.
    pub timezone: Tz,
    /// Lunar year table used by lunar-calendar tasks.
    pub lunar: &'a LunarTable,
}

impl CycleContext<'static> {
    /// A context for `timezone` backed by the bundled lunar table.
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            lunar: LunarTable::bundled(),
        }
    }
}

impl<'a> CycleContext<'a> {
    /// A context backed by an explicit lunar table handle.
    pub fn with_table(timezone: Tz, lunar: &'a LunarTable) -> Self {
        Self { timezone, lunar }
    }

    pub(crate) fn space(&self, system: DateSystem) -> CalendarSpace<'a> {
        match system {
            DateSystem::Solar => CalendarSpace::Solar,
            DateSystem::Lunar => CalendarSpace::Lunar(self.lunar),
        }
    }
}

impl Default for CycleContext<'static> {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

// ── Results ─────────────────────────────────────────────────────────────────

/// A computed cycle boundary.
///
/// When `degraded` is set, `date` is a deterministic fallback rather than the
/// rule's true answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Computed {
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<CycleError>,
}

impl Computed {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Which boundary is being derived from the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bound {
    /// Due date from a start anchor; moves forward.
    Due,
    /// Start date from a due anchor; moves backward.
    Start,
}

impl Bound {
    pub(crate) fn sign(self) -> i64 {
        match self {
            Bound::Due => 1,
            Bound::Start => -1,
        }
    }

    fn is_past(self, anchor: DateTime<Utc>, candidate: DateTime<Utc>) -> bool {
        match self {
            Bound::Due => candidate > anchor,
            Bound::Start => candidate < anchor,
        }
    }
}

/// Turn a raw computation into a [`Computed`], applying the fallback policy.
///
/// Invalid rules propagate. Lunar failures fall back by
/// [`LUNAR_FALLBACK_DAYS`]; any other failure, including a result that does not
/// move strictly away from the anchor, falls back by [`DEGRADED_FALLBACK_DAYS`].
pub(crate) fn settle(
    anchor: DateTime<Utc>,
    bound: Bound,
    outcome: Result<DateTime<Utc>>,
) -> Result<Computed> {
    let error = match outcome {
        Ok(date) if bound.is_past(anchor, date) => {
            return Ok(Computed {
                date,
                degraded: None,
            })
        }
        Ok(date) => CycleError::DegradedComputation(format!(
            "{date} does not move {} from anchor {anchor}",
            match bound {
                Bound::Due => "forward",
                Bound::Start => "backward",
            }
        )),
        Err(err @ CycleError::InvalidRule(_)) => return Err(err),
        Err(err) => err,
    };

    let days = match error {
        CycleError::InvalidLunarDate(_) => LUNAR_FALLBACK_DAYS,
        _ => DEGRADED_FALLBACK_DAYS,
    };
    tracing::warn!(%anchor, reason = %error, fallback_days = days, "cycle computation degraded");

    Ok(Computed {
        date: anchor + chrono::Duration::days(days * bound.sign()),
        degraded: Some(error),
    })
}

// ── Instant ↔ local day ─────────────────────────────────────────────────────

/// Split an instant into its local date and wall-clock time.
pub(crate) fn local_parts(instant: DateTime<Utc>, tz: Tz) -> (NaiveDate, NaiveTime) {
    let local = instant.with_timezone(&tz);
    (local.date_naive(), local.time())
}

/// Rebuild an instant from a local date and wall-clock time.
///
/// An ambiguous time (DST fall-back) takes the earlier mapping. A time inside
/// a DST gap is read with the offset in force before the gap, which moves it
/// forward by the gap length (02:30 becomes 03:30 across a one-hour gap).
pub(crate) fn to_instant(date: NaiveDate, time: NaiveTime, tz: Tz) -> Result<DateTime<Utc>> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
        LocalResult::None => {
            let unresolved =
                || CycleError::DegradedComputation(format!("{date} {time} does not exist in {tz}"));
            let before = naive
                .checked_sub_signed(chrono::Duration::days(1))
                .and_then(|earlier| tz.from_local_datetime(&earlier).earliest())
                .ok_or_else(unresolved)?;
            let offset = chrono::Duration::seconds(i64::from(before.offset().fix().local_minus_utc()));
            naive
                .checked_sub_signed(offset)
                .map(|utc| Utc.from_utc_datetime(&utc))
                .ok_or_else(unresolved)
        }
    }
}

/// Run date arithmetic on the anchor's local day, keeping its wall-clock time.
pub(crate) fn on_local_date(
    anchor: DateTime<Utc>,
    tz: Tz,
    shift: impl FnOnce(NaiveDate) -> Result<NaiveDate>,
) -> Result<DateTime<Utc>> {
    let (date, time) = local_parts(anchor, tz);
    let target = shift(date)?;
    to_instant(target, time, tz)
}

pub(crate) fn add_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    chrono::Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or_else(|| CycleError::DegradedComputation(format!("{date} + {days} days overflows")))
}

/// The nearest date strictly after (`Due`) or before (`Start`) `date` that
/// falls on `weekday`. An anchor already on `weekday` moves a full week.
pub(crate) fn step_to_weekday(date: NaiveDate, weekday: Weekday, bound: Bound) -> Result<NaiveDate> {
    let mut current = date;
    for _ in 0..7 {
        current = add_days(current, bound.sign())?;
        if current.weekday() == weekday {
            return Ok(current);
        }
    }
    Err(CycleError::DegradedComputation(format!(
        "no {weekday} within a week of {date}"
    )))
}

// ── Field arithmetic ────────────────────────────────────────────────────────

/// A month in either calendar. `is_leap` is always false for solar months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct YearMonth {
    pub year: i32,
    pub month: u32,
    pub is_leap: bool,
}

impl YearMonth {
    fn solar(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            is_leap: false,
        }
    }
}

/// The arithmetic space a rule is evaluated in.
#[derive(Debug, Clone, Copy)]
pub(crate) enum CalendarSpace<'a> {
    Solar,
    Lunar(&'a LunarTable),
}

impl CalendarSpace<'_> {
    /// The month containing `date`, and the day within it.
    pub(crate) fn locate(&self, date: NaiveDate) -> Result<(YearMonth, u32)> {
        match self {
            CalendarSpace::Solar => Ok((YearMonth::solar(date.year(), date.month()), date.day())),
            CalendarSpace::Lunar(table) => {
                let lunar = table.to_lunar(date)?;
                let ym = YearMonth {
                    year: lunar.year,
                    month: lunar.month,
                    is_leap: lunar.is_leap_month,
                };
                Ok((ym, lunar.day))
            }
        }
    }

    /// The solar date of day `day` in `ym`. The day must be valid for the month.
    pub(crate) fn date(&self, ym: YearMonth, day: u32) -> Result<NaiveDate> {
        match self {
            CalendarSpace::Solar => NaiveDate::from_ymd_opt(ym.year, ym.month, day).ok_or_else(|| {
                CycleError::DegradedComputation(format!(
                    "{}-{:02}-{day:02} is not a valid date",
                    ym.year, ym.month
                ))
            }),
            CalendarSpace::Lunar(table) => table.to_solar(ym.year, ym.month, day, ym.is_leap),
        }
    }

    pub(crate) fn days_in_month(&self, ym: YearMonth) -> Result<u32> {
        match self {
            CalendarSpace::Solar => {
                let first = self.date(ym, 1)?;
                let next = self.date(self.shift_months(ym, 1)?, 1)?;
                Ok((next - first).num_days() as u32)
            }
            CalendarSpace::Lunar(table) => table.days_in_month(ym.year, ym.month, ym.is_leap),
        }
    }

    /// Move `months` months forward (positive) or backward (negative).
    ///
    /// Lunar months are counted over the real month sequence, leap months
    /// included.
    pub(crate) fn shift_months(&self, ym: YearMonth, months: i64) -> Result<YearMonth> {
        match self {
            CalendarSpace::Solar => {
                let index = i64::from(ym.year) * 12 + i64::from(ym.month) - 1 + months;
                let year = i32::try_from(index.div_euclid(12)).map_err(|_| {
                    CycleError::DegradedComputation(format!("shifting {months} months overflows"))
                })?;
                Ok(YearMonth::solar(year, index.rem_euclid(12) as u32 + 1))
            }
            CalendarSpace::Lunar(table) => {
                let span = i64::from(crate::lunar::MAX_YEAR - crate::lunar::MIN_YEAR + 1) * 13;
                if months.abs() > span {
                    return Err(CycleError::InvalidLunarDate(format!(
                        "shifting {months} lunar months leaves the table"
                    )));
                }
                let mut current = (ym.year, ym.month, ym.is_leap);
                for _ in 0..months.abs() {
                    let (year, month, is_leap) = current;
                    current = if months > 0 {
                        table.next_month(year, month, is_leap)?
                    } else {
                        table.previous_month(year, month, is_leap)?
                    };
                }
                let (year, month, is_leap) = current;
                Ok(YearMonth {
                    year,
                    month,
                    is_leap,
                })
            }
        }
    }

    /// Move `years` years keeping the month number. A lunar leap month whose
    /// target year lacks it becomes the regular month.
    pub(crate) fn shift_years(&self, ym: YearMonth, years: i64) -> Result<YearMonth> {
        let year = i64::from(ym.year) + years;
        let year = i32::try_from(year).map_err(|_| {
            CycleError::DegradedComputation(format!("shifting {years} years overflows"))
        })?;
        match self {
            CalendarSpace::Solar => Ok(YearMonth::solar(year, ym.month)),
            CalendarSpace::Lunar(table) => Ok(YearMonth {
                year,
                month: ym.month,
                is_leap: table.resolve_leap(year, ym.month, ym.is_leap)?,
            }),
        }
    }

    /// The regular month `month` of the same year.
    pub(crate) fn with_month(&self, ym: YearMonth, month: u32) -> YearMonth {
        YearMonth {
            year: ym.year,
            month,
            is_leap: false,
        }
    }

    /// Day `day` of `ym`, clamped to the month length.
    pub(crate) fn clamped(&self, ym: YearMonth, day: u32) -> Result<NaiveDate> {
        let len = self.days_in_month(ym)?;
        self.date(ym, day.clamp(1, len))
    }

    pub(crate) fn place(&self, ym: YearMonth, day: DayOfMonth) -> Result<NaiveDate> {
        let len = self.days_in_month(ym)?;
        self.date(ym, day.resolve(len))
    }

    /// Shift a date by whole months keeping its day, clamped to month end.
    pub(crate) fn add_months(&self, date: NaiveDate, months: i64) -> Result<NaiveDate> {
        let (ym, day) = self.locate(date)?;
        self.clamped(self.shift_months(ym, months)?, day)
    }

    /// Shift a date by whole years keeping month and day, clamped to month end.
    pub(crate) fn add_years(&self, date: NaiveDate, years: i64) -> Result<NaiveDate> {
        let (ym, day) = self.locate(date)?;
        self.clamped(self.shift_years(ym, years)?, day)
    }

    /// The `week`-th `weekday` of `ym`, located in solar-weekday space.
    ///
    /// `Last` walks backward from the first day of the following month, so it
    /// always lands within the final seven days of `ym`.
    pub(crate) fn nth_weekday(&self, ym: YearMonth, week: WeekOfMonth, weekday: Weekday) -> Result<NaiveDate> {
        if week == WeekOfMonth::Last {
            let next_first = self.date(self.shift_months(ym, 1)?, 1)?;
            return step_to_weekday(next_first, weekday, Bound::Start);
        }
        let first = self.date(ym, 1)?;
        let first_match = if first.weekday() == weekday {
            first
        } else {
            step_to_weekday(first, weekday, Bound::Due)?
        };
        add_days(first_match, (i64::from(week.index()) - 1) * 7)
    }

    /// The 1-based `day` of `year`, clamped to the year length.
    pub(crate) fn day_of_year(&self, year: i32, day: u16) -> Result<NaiveDate> {
        let first = self.date(YearMonth::solar(year, 1), 1)?;
        let next_first = self.date(YearMonth::solar(year + 1, 1), 1)?;
        let len = (next_first - first).num_days();
        add_days(first, i64::from(day).clamp(1, len) - 1)
    }
}
