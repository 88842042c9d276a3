//! Chinese lunisolar calendar conversion.
//!
//! A thin policy layer over a bundled, immutable year table covering lunar
//! years 1900 through 2100. Every query is a pure function of its inputs and
//! the table; nothing is cached or mutated, so a single [`LunarTable`] can be
//! shared by reference across threads.
//!
//! # Leap-month policy
//!
//! Users pick "leap month" speculatively, so a leap request for a year whose
//! leap month has a different number (or that has none) falls back to the
//! regular month of the same number instead of failing.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::{CycleError, Result};

/// First lunar year covered by the bundled table.
pub const MIN_YEAR: i32 = 1900;
/// Last lunar year covered by the bundled table.
pub const MAX_YEAR: i32 = 2100;

/// Days from 0001-01-01 (day 1) to 1900-01-31, the first day of lunar year 1900.
const EPOCH_DAYS_FROM_CE: i32 = 693_626;

/// Per-year packed month data, 1900–2100.
///
/// Bits 15..4 flag 30-day regular months (bit 15 = month 1), the low nibble is
/// the leap month number (0 = none), and bit 16 flags a 30-day leap month.
const YEAR_INFO: [u32; 201] = [
    0x04bd8, 0x04ae0, 0x0a570, 0x054d5, 0x0d260, 0x0d950, 0x16554, 0x056a0, 0x09ad0, 0x055d2, // 1900
    0x04ae0, 0x0a5b6, 0x0a4d0, 0x0d250, 0x1d255, 0x0b540, 0x0d6a0, 0x0ada2, 0x095b0, 0x14977, // 1910
    0x04970, 0x0a4b0, 0x0b4b5, 0x06a50, 0x06d40, 0x1ab54, 0x02b60, 0x09570, 0x052f2, 0x04970, // 1920
    0x06566, 0x0d4a0, 0x0ea50, 0x16a95, 0x05ad0, 0x02b60, 0x186e3, 0x092e0, 0x1c8d7, 0x0c950, // 1930
    0x0d4a0, 0x1d8a6, 0x0b550, 0x056a0, 0x1a5b4, 0x025d0, 0x092d0, 0x0d2b2, 0x0a950, 0x0b557, // 1940
    0x06ca0, 0x0b550, 0x15355, 0x04da0, 0x0a5b0, 0x14573, 0x052b0, 0x0a9a8, 0x0e950, 0x06aa0, // 1950
    0x0aea6, 0x0ab50, 0x04b60, 0x0aae4, 0x0a570, 0x05260, 0x0f263, 0x0d950, 0x05b57, 0x056a0, // 1960
    0x096d0, 0x04dd5, 0x04ad0, 0x0a4d0, 0x0d4d4, 0x0d250, 0x0d558, 0x0b540, 0x0b6a0, 0x195a6, // 1970
    0x095b0, 0x049b0, 0x0a974, 0x0a4b0, 0x0b27a, 0x06a50, 0x06d40, 0x0af46, 0x0ab60, 0x09570, // 1980
    0x04af5, 0x04970, 0x064b0, 0x074a3, 0x0ea50, 0x06b58, 0x05ac0, 0x0ab60, 0x096d5, 0x092e0, // 1990
    0x0c960, 0x0d954, 0x0d4a0, 0x0da50, 0x07552, 0x056a0, 0x0abb7, 0x025d0, 0x092d0, 0x0cab5, // 2000
    0x0a950, 0x0b4a0, 0x0baa4, 0x0ad50, 0x055d9, 0x04ba0, 0x0a5b0, 0x15176, 0x052b0, 0x0a930, // 2010
    0x07954, 0x06aa0, 0x0ad50, 0x05b52, 0x04b60, 0x0a6e6, 0x0a4e0, 0x0d260, 0x0ea65, 0x0d530, // 2020
    0x05aa0, 0x076a3, 0x096d0, 0x04afb, 0x04ad0, 0x0a4d0, 0x1d0b6, 0x0d250, 0x0d520, 0x0dd45, // 2030
    0x0b5a0, 0x056d0, 0x055b2, 0x049b0, 0x0a577, 0x0a4b0, 0x0aa50, 0x1b255, 0x06d20, 0x0ada0, // 2040
    0x14b63, 0x09370, 0x049f8, 0x04970, 0x064b0, 0x168a6, 0x0ea50, 0x06b20, 0x1a6c4, 0x0aae0, // 2050
    0x092e0, 0x0d2e3, 0x0c960, 0x0d557, 0x0d4a0, 0x0da50, 0x05d55, 0x056a0, 0x0a6d0, 0x055d4, // 2060
    0x052d0, 0x0a9b8, 0x0a950, 0x0b4a0, 0x0b6a6, 0x0ad50, 0x055a0, 0x0aba4, 0x0a5b0, 0x052b0, // 2070
    0x0b273, 0x06930, 0x07337, 0x06aa0, 0x0ad50, 0x14b55, 0x04b60, 0x0a570, 0x054e4, 0x0d160, // 2080
    0x0e968, 0x0d520, 0x0daa0, 0x16aa6, 0x056d0, 0x04ae0, 0x0a9d4, 0x0a2d0, 0x0d150, 0x0f252, // 2090
    0x0d520, // 2100
];

static BUNDLED: LunarTable = LunarTable { years: &YEAR_INFO };

/// A date in the Chinese lunisolar calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LunarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub is_leap_month: bool,
}

/// Read-only handle to the lunar year table.
#[derive(Debug)]
pub struct LunarTable {
    years: &'static [u32],
}

impl LunarTable {
    /// The table compiled into this crate (lunar years 1900–2100).
    pub fn bundled() -> &'static LunarTable {
        &BUNDLED
    }

    fn info(&self, year: i32) -> Result<u32> {
        usize::try_from(year - MIN_YEAR)
            .ok()
            .and_then(|index| self.years.get(index).copied())
            .ok_or_else(|| {
                CycleError::InvalidLunarDate(format!(
                    "year {year} outside supported range {MIN_YEAR}-{MAX_YEAR}"
                ))
            })
    }

    /// The leap month of `year`, if it has one.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidLunarDate`] for years outside the table.
    pub fn leap_month_of(&self, year: i32) -> Result<Option<u32>> {
        let leap = self.info(year)? & 0xf;
        Ok(if leap == 0 { None } else { Some(leap) })
    }

    fn leap_month_days(&self, year: i32) -> Result<u32> {
        let info = self.info(year)?;
        Ok(match info & 0xf {
            0 => 0,
            _ if info & 0x10000 != 0 => 30,
            _ => 29,
        })
    }

    fn regular_month_days(&self, year: i32, month: u32) -> Result<u32> {
        check_month(month)?;
        let info = self.info(year)?;
        Ok(if info & (0x10000 >> month) != 0 { 30 } else { 29 })
    }

    /// Whether a leap request for `(year, month)` actually names a leap month.
    ///
    /// This is the fallback rule: a leap flag that does not match the year's
    /// leap month is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidLunarDate`] for years outside the table.
    pub fn resolve_leap(&self, year: i32, month: u32, is_leap: bool) -> Result<bool> {
        Ok(is_leap && self.leap_month_of(year)? == Some(month))
    }

    /// Number of days (29 or 30) in a lunar month.
    ///
    /// A leap request for a month that is not leap in `year` answers for the
    /// regular month.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidLunarDate`] for years outside the table or
    /// months outside 1–12.
    pub fn days_in_month(&self, year: i32, month: u32, is_leap: bool) -> Result<u32> {
        check_month(month)?;
        if self.resolve_leap(year, month, is_leap)? {
            self.leap_month_days(year)
        } else {
            self.regular_month_days(year, month)
        }
    }

    /// Number of days in a lunar year, leap month included.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidLunarDate`] for years outside the table.
    pub fn days_in_year(&self, year: i32) -> Result<u32> {
        let info = self.info(year)?;
        let long_months = (1..=12)
            .filter(|&month| info & (0x10000 >> month) != 0)
            .count() as u32;
        Ok(12 * 29 + long_months + self.leap_month_days(year)?)
    }

    /// Convert a Gregorian date to its lunar equivalent.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidLunarDate`] for dates before 1900-01-31
    /// or after the end of lunar year 2100.
    pub fn to_lunar(&self, date: NaiveDate) -> Result<LunarDate> {
        let mut offset = date.num_days_from_ce() - EPOCH_DAYS_FROM_CE;
        if offset < 0 {
            return Err(CycleError::InvalidLunarDate(format!(
                "{date} precedes the lunar table"
            )));
        }

        let mut year = MIN_YEAR;
        loop {
            // `days_in_year` fails once we walk past MAX_YEAR.
            let len = self.days_in_year(year)? as i32;
            if offset < len {
                break;
            }
            offset -= len;
            year += 1;
        }

        let leap = self.leap_month_of(year)?;
        for month in 1..=12 {
            let len = self.regular_month_days(year, month)? as i32;
            if offset < len {
                return Ok(lunar_date(year, month, offset, false));
            }
            offset -= len;

            if leap == Some(month) {
                let len = self.leap_month_days(year)? as i32;
                if offset < len {
                    return Ok(lunar_date(year, month, offset, true));
                }
                offset -= len;
            }
        }

        Err(CycleError::InvalidLunarDate(format!(
            "{date} did not resolve inside lunar year {year}"
        )))
    }

    /// Convert a lunar date to the Gregorian calendar.
    ///
    /// A leap flag on a month that is not leap in `year` falls back to the
    /// regular month.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidLunarDate`] for years outside the table,
    /// months outside 1–12, or a day beyond the month length.
    pub fn to_solar(&self, year: i32, month: u32, day: u32, is_leap: bool) -> Result<NaiveDate> {
        let is_leap = self.resolve_leap(year, month, is_leap)?;
        let len = self.days_in_month(year, month, is_leap)?;
        if day == 0 || day > len {
            return Err(CycleError::InvalidLunarDate(format!(
                "day {day} outside lunar month {year}-{month} ({len} days)"
            )));
        }

        let mut offset: i32 = 0;
        for y in MIN_YEAR..year {
            offset += self.days_in_year(y)? as i32;
        }
        let leap = self.leap_month_of(year)?;
        for m in 1..month {
            offset += self.regular_month_days(year, m)? as i32;
            if leap == Some(m) {
                offset += self.leap_month_days(year)? as i32;
            }
        }
        if is_leap {
            offset += self.regular_month_days(year, month)? as i32;
        }
        offset += day as i32 - 1;

        NaiveDate::from_num_days_from_ce_opt(EPOCH_DAYS_FROM_CE + offset).ok_or_else(|| {
            CycleError::InvalidLunarDate(format!("lunar {year}-{month}-{day} overflows"))
        })
    }

    /// The month following `(year, month, is_leap)` in the real month sequence,
    /// stepping through the leap month when the year has one.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidLunarDate`] when stepping leaves the table.
    pub fn next_month(&self, year: i32, month: u32, is_leap: bool) -> Result<(i32, u32, bool)> {
        let is_leap = self.resolve_leap(year, month, is_leap)?;
        if !is_leap && self.leap_month_of(year)? == Some(month) {
            return Ok((year, month, true));
        }
        if month == 12 {
            self.info(year + 1)?;
            Ok((year + 1, 1, false))
        } else {
            Ok((year, month + 1, false))
        }
    }

    /// The month preceding `(year, month, is_leap)` in the real month sequence.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidLunarDate`] when stepping leaves the table.
    pub fn previous_month(&self, year: i32, month: u32, is_leap: bool) -> Result<(i32, u32, bool)> {
        if self.resolve_leap(year, month, is_leap)? {
            return Ok((year, month, false));
        }
        let (year, month) = if month == 1 {
            (year - 1, 12)
        } else {
            (year, month - 1)
        };
        let leap = self.leap_month_of(year)? == Some(month);
        Ok((year, month, leap))
    }
}

fn lunar_date(year: i32, month: u32, zero_based_day: i32, is_leap_month: bool) -> LunarDate {
    LunarDate {
        year,
        month,
        day: zero_based_day as u32 + 1,
        is_leap_month,
    }
}

fn check_month(month: u32) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(CycleError::InvalidLunarDate(format!("month {month} outside 1-12")))
    }
}
