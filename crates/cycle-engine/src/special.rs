//! Named calendar pivots: festivals and solar terms.
//!
//! A [`SpecialDateAnchor`] names one day per year, either in the lunar or the
//! solar calendar. Days past the end of a month clamp to its last day, so a
//! lunar "12/30" anchor means New Year's Eve even in years whose twelfth month
//! has 29 days.

use chrono::{Datelike, NaiveDate};

use crate::calendar::{CalendarSpace, YearMonth};
use crate::error::Result;
use crate::lunar::LunarTable;
use crate::rule::{AnchorKind, SpecialDateAnchor};

/// The first day strictly after `after` on which `anchor` falls.
///
/// # Errors
///
/// Returns [`CycleError::InvalidLunarDate`](crate::CycleError::InvalidLunarDate)
/// when a lunar anchor leaves the table range.
pub fn next_occurrence(
    anchor: &SpecialDateAnchor,
    after: NaiveDate,
    table: &LunarTable,
) -> Result<NaiveDate> {
    let year = anchor_year(anchor, after, table)?;
    let candidate = occurrence_in(anchor, year, table)?;
    if candidate > after {
        Ok(candidate)
    } else {
        occurrence_in(anchor, year + 1, table)
    }
}

/// The last day strictly before `before` on which `anchor` falls.
///
/// # Errors
///
/// Returns [`CycleError::InvalidLunarDate`](crate::CycleError::InvalidLunarDate)
/// when a lunar anchor leaves the table range.
pub fn previous_occurrence(
    anchor: &SpecialDateAnchor,
    before: NaiveDate,
    table: &LunarTable,
) -> Result<NaiveDate> {
    let year = anchor_year(anchor, before, table)?;
    let candidate = occurrence_in(anchor, year, table)?;
    if candidate < before {
        Ok(candidate)
    } else {
        occurrence_in(anchor, year - 1, table)
    }
}

/// The year, in the anchor's own calendar, that contains `date`.
fn anchor_year(anchor: &SpecialDateAnchor, date: NaiveDate, table: &LunarTable) -> Result<i32> {
    if anchor.is_lunar {
        Ok(table.to_lunar(date)?.year)
    } else {
        Ok(date.year())
    }
}

fn occurrence_in(anchor: &SpecialDateAnchor, year: i32, table: &LunarTable) -> Result<NaiveDate> {
    let space = if anchor.is_lunar {
        CalendarSpace::Lunar(table)
    } else {
        CalendarSpace::Solar
    };
    let ym = YearMonth {
        year,
        month: anchor.month,
        is_leap: false,
    };
    space.clamped(ym, anchor.day)
}

/// Commonly used anchors.
///
/// Solar-term entries use their usual Gregorian dates; the true dates drift
/// by a day between years.
pub fn builtin_anchors() -> Vec<SpecialDateAnchor> {
    vec![
        SpecialDateAnchor::new(AnchorKind::Festival, "Spring Festival", 1, 1, true),
        SpecialDateAnchor::new(AnchorKind::Festival, "Lantern Festival", 1, 15, true),
        SpecialDateAnchor::new(AnchorKind::Festival, "Dragon Boat Festival", 5, 5, true),
        SpecialDateAnchor::new(AnchorKind::Festival, "Qixi Festival", 7, 7, true),
        SpecialDateAnchor::new(AnchorKind::Festival, "Mid-Autumn Festival", 8, 15, true),
        SpecialDateAnchor::new(AnchorKind::Festival, "Double Ninth Festival", 9, 9, true),
        SpecialDateAnchor::new(AnchorKind::Festival, "Laba Festival", 12, 8, true),
        SpecialDateAnchor::new(AnchorKind::Festival, "New Year's Eve", 12, 30, true),
        SpecialDateAnchor::new(AnchorKind::Festival, "New Year's Day", 1, 1, false),
        SpecialDateAnchor::new(AnchorKind::SolarTerm, "Qingming", 4, 5, false),
        SpecialDateAnchor::new(AnchorKind::SolarTerm, "Summer Solstice", 6, 21, false),
        SpecialDateAnchor::new(AnchorKind::SolarTerm, "Winter Solstice", 12, 22, false),
    ]
}

/// Look up a built-in anchor by name, ignoring ASCII case.
pub fn builtin_anchor(name: &str) -> Option<SpecialDateAnchor> {
    builtin_anchors()
        .into_iter()
        .find(|anchor| anchor.name.eq_ignore_ascii_case(name))
}
