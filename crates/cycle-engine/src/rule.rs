//! Recurrence rule data model.
//!
//! Rules are plain data: they carry no behavior beyond [`RecurrenceRule::validate`]
//! and [`AdvancedRecurrenceRule::validate`], which reject shapes the calculators
//! cannot interpret. All types serialize with camelCase field names so the
//! persistence layer can store them as JSON.

use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CycleError, Result};

// ── Shared building blocks ──────────────────────────────────────────────────

/// The calendar in which a task's field arithmetic runs.
///
/// Both calendar systems store absolute instants; this only selects how months
/// and years are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateSystem {
    /// Gregorian calendar.
    #[default]
    Solar,
    /// Chinese lunisolar calendar.
    Lunar,
}

/// A day placement within a month.
///
/// `Forward(d)` means "day `d`, clamped to the month length". `Backward(o)`
/// counts from the end: the effective day is `days_in_month - o`, floored at 1,
/// so `Backward(0)` is the last day of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "direction", content = "day", rename_all = "camelCase")]
pub enum DayOfMonth {
    Forward(u8),
    Backward(u8),
}

impl DayOfMonth {
    /// Resolve to a concrete day for a month with `days_in_month` days.
    pub fn resolve(self, days_in_month: u32) -> u32 {
        match self {
            DayOfMonth::Forward(day) => u32::from(day).clamp(1, days_in_month),
            DayOfMonth::Backward(offset) => {
                days_in_month.saturating_sub(u32::from(offset)).max(1)
            }
        }
    }
}

/// Which occurrence of a weekday inside a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeekOfMonth {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl WeekOfMonth {
    /// Build from the 1-based index used by rule editors (5 = last).
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(WeekOfMonth::First),
            2 => Some(WeekOfMonth::Second),
            3 => Some(WeekOfMonth::Third),
            4 => Some(WeekOfMonth::Fourth),
            5 => Some(WeekOfMonth::Last),
            _ => None,
        }
    }

    /// The 1-based index (5 = last).
    pub fn index(self) -> u8 {
        match self {
            WeekOfMonth::First => 1,
            WeekOfMonth::Second => 2,
            WeekOfMonth::Third => 3,
            WeekOfMonth::Fourth => 4,
            WeekOfMonth::Last => 5,
        }
    }
}

/// Convert a 0-based weekday index (0 = Sunday … 6 = Saturday) into a [`Weekday`].
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// A `weekDay` as rule editors send it: a name (`"Mon"`) or an index (`1`).
#[derive(Deserialize)]
#[serde(untagged)]
enum WeekdayRepr {
    Index(u8),
    Name(Weekday),
}

impl WeekdayRepr {
    fn resolve<E: serde::de::Error>(self) -> std::result::Result<Weekday, E> {
        match self {
            WeekdayRepr::Name(weekday) => Ok(weekday),
            WeekdayRepr::Index(index) => weekday_from_index(index)
                .ok_or_else(|| E::custom(format!("weekday index {index} is outside 0..=6"))),
        }
    }
}

fn weekday_field<'de, D>(deserializer: D) -> std::result::Result<Weekday, D::Error>
where
    D: Deserializer<'de>,
{
    WeekdayRepr::deserialize(deserializer)?.resolve()
}

fn optional_weekday_field<'de, D>(deserializer: D) -> std::result::Result<Option<Weekday>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<WeekdayRepr>::deserialize(deserializer)?
        .map(WeekdayRepr::resolve)
        .transpose()
}

// ── Simple rules ────────────────────────────────────────────────────────────

/// The seven basic rule shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    WeekOfMonth,
    Custom,
    Composite,
}

/// Unit of a free-form `custom` rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

/// Day target of a composite rule, applied after its year and month offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompositeDay {
    /// A day of the resulting month.
    DayOfMonth(DayOfMonth),
    /// A 1-based day of the resulting year, clamped to the year length.
    DayOfYear(u16),
    /// The Nth weekday of the resulting month.
    NthWeekday(WeekOfMonth, Weekday),
}

/// Independently-enabled offsets of a composite rule.
///
/// Offsets apply in order years → months → day. A `target` takes precedence
/// over the plain `days` offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeRule {
    #[serde(default)]
    pub years: u32,
    #[serde(default)]
    pub months: u32,
    #[serde(default)]
    pub days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<CompositeDay>,
}

/// A recurrence rule for one of the seven basic shapes.
///
/// Which optional fields are read depends on `kind`; see the calculator in
/// [`crate::simple`] for the exact interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(default = "default_value")]
    pub value: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<CustomUnit>,
    #[serde(
        default,
        deserialize_with = "optional_weekday_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub week_day: Option<Weekday>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_day: Option<DayOfMonth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_day: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_of_month: Option<WeekOfMonth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<CompositeRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_date_anchor: Option<SpecialDateAnchor>,
}

fn default_value() -> u32 {
    1
}

impl RecurrenceRule {
    fn bare(kind: RuleKind, value: u32) -> Self {
        Self {
            kind,
            value,
            unit: None,
            week_day: None,
            month_day: None,
            year_day: None,
            month: None,
            week_of_month: None,
            composite: None,
            special_date_anchor: None,
        }
    }

    /// Every `value` days.
    pub fn daily(value: u32) -> Self {
        Self::bare(RuleKind::Daily, value)
    }

    /// Every `value` weeks, optionally snapped to a weekday.
    pub fn weekly(value: u32, week_day: Option<Weekday>) -> Self {
        Self {
            week_day,
            ..Self::bare(RuleKind::Weekly, value)
        }
    }

    /// Every `value` months, optionally on a fixed day.
    pub fn monthly(value: u32, month_day: Option<DayOfMonth>) -> Self {
        Self {
            month_day,
            ..Self::bare(RuleKind::Monthly, value)
        }
    }

    /// Every `value` years.
    pub fn yearly(value: u32) -> Self {
        Self::bare(RuleKind::Yearly, value)
    }

    /// The Nth weekday of every `value` months.
    pub fn week_of_month(value: u32, week_of_month: WeekOfMonth, week_day: Weekday) -> Self {
        Self {
            week_of_month: Some(week_of_month),
            week_day: Some(week_day),
            ..Self::bare(RuleKind::WeekOfMonth, value)
        }
    }

    /// Every `value` units.
    pub fn custom(value: u32, unit: CustomUnit) -> Self {
        Self {
            unit: Some(unit),
            ..Self::bare(RuleKind::Custom, value)
        }
    }

    /// A composite of year, month and day offsets.
    pub fn composite(composite: CompositeRule) -> Self {
        Self {
            composite: Some(composite),
            ..Self::bare(RuleKind::Composite, 1)
        }
    }

    /// Pin yearly and week-of-month rules to a month of the year.
    pub fn with_month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    /// Place yearly and monthly rules on a day of the month.
    pub fn with_month_day(mut self, month_day: DayOfMonth) -> Self {
        self.month_day = Some(month_day);
        self
    }

    /// Place yearly rules on a day of the year.
    pub fn with_year_day(mut self, year_day: u16) -> Self {
        self.year_day = Some(year_day);
        self
    }

    /// Make a custom rule follow a named calendar pivot.
    pub fn with_special_anchor(mut self, anchor: SpecialDateAnchor) -> Self {
        self.special_date_anchor = Some(anchor);
        self
    }

    /// Reject rules that are missing a field their kind requires.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidRule`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.kind != RuleKind::Composite && self.value == 0 {
            return Err(invalid(format!("{:?} rule value must be at least 1", self.kind)));
        }
        if let Some(month) = self.month {
            check_month(month)?;
        }
        if let Some(day) = self.month_day {
            check_day_of_month(day)?;
        }
        if let Some(day) = self.year_day {
            check_day_of_year(day)?;
        }
        if let Some(anchor) = &self.special_date_anchor {
            anchor.validate()?;
        }

        match self.kind {
            RuleKind::Daily | RuleKind::Weekly | RuleKind::Monthly | RuleKind::Yearly => Ok(()),
            RuleKind::Custom => {
                if self.unit.is_none() && self.special_date_anchor.is_none() {
                    return Err(invalid("custom rule requires a unit".to_string()));
                }
                Ok(())
            }
            RuleKind::WeekOfMonth => {
                if self.week_day.is_none() {
                    return Err(invalid("weekOfMonth rule requires weekDay".to_string()));
                }
                if self.week_of_month.is_none() {
                    return Err(invalid("weekOfMonth rule requires weekOfMonth".to_string()));
                }
                Ok(())
            }
            RuleKind::Composite => {
                let composite = self
                    .composite
                    .ok_or_else(|| invalid("composite rule requires composite offsets".to_string()))?;
                match composite.target {
                    Some(CompositeDay::DayOfMonth(day)) => check_day_of_month(day)?,
                    Some(CompositeDay::DayOfYear(day)) => check_day_of_year(day)?,
                    Some(CompositeDay::NthWeekday(..)) => {}
                    None => {
                        if composite.years == 0 && composite.months == 0 && composite.days == 0 {
                            return Err(invalid(
                                "composite rule must enable at least one offset".to_string(),
                            ));
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

// ── Advanced rules ──────────────────────────────────────────────────────────

/// Which value of an [`AdvancedRecurrenceRule`] drives the computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdvancedUnit {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

/// Whether day values count from the start or the end of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CountDirection {
    #[default]
    Forward,
    Backward,
}

/// A special-date pivot for advanced rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpecialAnchorKind {
    /// The next Saturday or Sunday.
    Weekend,
    /// The next Monday through Friday.
    Workday,
    /// Approximated as a fixed 7-day jump; no holiday calendar is consulted.
    Holiday,
    /// Approximated as a fixed 15-day jump, the mean spacing of solar terms.
    SolarTerm,
}

/// A parametrized recurrence rule.
///
/// When `special_anchor` is set, the special-anchor path applies; otherwise the
/// unit-based path selected by `selected_unit` does. In year mode
/// `month_value` is the target month of the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedRecurrenceRule {
    pub selected_unit: AdvancedUnit,
    #[serde(default = "default_value")]
    pub year_value: u32,
    #[serde(default = "default_value")]
    pub month_value: u32,
    #[serde(default = "default_value")]
    pub week_value: u32,
    #[serde(default = "default_value")]
    pub day_value: u32,
    #[serde(default)]
    pub count_direction: CountDirection,
    #[serde(default = "default_weekday", deserialize_with = "weekday_field")]
    pub week_day: Weekday,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_anchor: Option<SpecialAnchorKind>,
}

fn default_weekday() -> Weekday {
    Weekday::Mon
}

impl Default for AdvancedRecurrenceRule {
    fn default() -> Self {
        Self {
            selected_unit: AdvancedUnit::Day,
            year_value: 1,
            month_value: 1,
            week_value: 1,
            day_value: 1,
            count_direction: CountDirection::Forward,
            week_day: Weekday::Mon,
            special_anchor: None,
        }
    }
}

impl AdvancedRecurrenceRule {
    /// Reject zero values and, in year mode, months outside 1–12.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidRule`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("yearValue", self.year_value),
            ("monthValue", self.month_value),
            ("weekValue", self.week_value),
            ("dayValue", self.day_value),
        ];
        for (name, value) in checks {
            if value == 0 {
                return Err(invalid(format!("{name} must be at least 1")));
            }
        }
        if self.selected_unit == AdvancedUnit::Year && self.special_anchor.is_none() {
            check_month(self.month_value)?;
        }
        Ok(())
    }
}

/// Either rule family, as attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskRule {
    Simple(RecurrenceRule),
    Advanced(AdvancedRecurrenceRule),
}

impl TaskRule {
    /// Validate whichever rule this holds.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidRule`] from the inner rule.
    pub fn validate(&self) -> Result<()> {
        match self {
            TaskRule::Simple(rule) => rule.validate(),
            TaskRule::Advanced(rule) => rule.validate(),
        }
    }
}

impl From<RecurrenceRule> for TaskRule {
    fn from(rule: RecurrenceRule) -> Self {
        TaskRule::Simple(rule)
    }
}

impl From<AdvancedRecurrenceRule> for TaskRule {
    fn from(rule: AdvancedRecurrenceRule) -> Self {
        TaskRule::Advanced(rule)
    }
}

// ── Special-date anchors ────────────────────────────────────────────────────

/// What a named anchor represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorKind {
    Festival,
    SolarTerm,
}

/// A named calendar pivot such as a festival or a solar term.
///
/// `month`/`day` are lunar when `is_lunar` is set, Gregorian otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialDateAnchor {
    pub kind: AnchorKind,
    pub name: String,
    pub month: u32,
    pub day: u32,
    #[serde(default)]
    pub is_lunar: bool,
}

impl SpecialDateAnchor {
    pub fn new(kind: AnchorKind, name: impl Into<String>, month: u32, day: u32, is_lunar: bool) -> Self {
        Self {
            kind,
            name: name.into(),
            month,
            day,
            is_lunar,
        }
    }

    /// # Errors
    ///
    /// Returns [`CycleError::InvalidRule`] when month or day is out of range.
    pub fn validate(&self) -> Result<()> {
        check_month(self.month)?;
        let max_day = if self.is_lunar { 30 } else { 31 };
        if self.day == 0 || self.day > max_day {
            return Err(invalid(format!(
                "anchor '{}' day {} outside 1-{max_day}",
                self.name, self.day
            )));
        }
        Ok(())
    }
}

// ── Validation helpers ──────────────────────────────────────────────────────

fn invalid(message: String) -> CycleError {
    CycleError::InvalidRule(message)
}

fn check_month(month: u32) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(invalid(format!("month {month} outside 1-12")))
    }
}

fn check_day_of_month(day: DayOfMonth) -> Result<()> {
    match day {
        DayOfMonth::Forward(d) if d == 0 || d > 31 => {
            Err(invalid(format!("month day {d} outside 1-31")))
        }
        DayOfMonth::Backward(offset) if offset > 30 => {
            Err(invalid(format!("backward month offset {offset} exceeds 30")))
        }
        _ => Ok(()),
    }
}

fn check_day_of_year(day: u16) -> Result<()> {
    if day == 0 || day > 366 {
        Err(invalid(format!("year day {day} outside 1-366")))
    } else {
        Ok(())
    }
}
