//! Human-readable rule descriptions.
//!
//! Descriptions read the same fields the calculators read, in the same
//! precedence, so "every month on day 31" really means "day 31, clamped".

use chrono::Weekday;

use crate::advanced::{HOLIDAY_JUMP_DAYS, SOLAR_TERM_JUMP_DAYS};
use crate::rule::{
    AdvancedRecurrenceRule, AdvancedUnit, CompositeDay, CompositeRule, CountDirection, CustomUnit,
    DayOfMonth, RecurrenceRule, RuleKind, SpecialAnchorKind, WeekOfMonth,
};

/// Describe a basic rule, e.g. `"every 2 weeks on Monday"`.
pub fn describe_rule(rule: &RecurrenceRule) -> String {
    let value = rule.value;
    match rule.kind {
        RuleKind::Daily => every(value, "day"),
        RuleKind::Weekly => match rule.week_day {
            Some(weekday) => format!("{} on {}", every(value, "week"), weekday_name(weekday)),
            None => every(value, "week"),
        },
        RuleKind::Monthly => {
            let base = every(value, "month");
            match rule.month_day {
                Some(day) => format!("{base}{}", month_day_phrase(day)),
                None => base,
            }
        }
        RuleKind::Yearly => {
            let base = every(value, "year");
            match (rule.year_day, rule.month, rule.month_day) {
                (Some(year_day), _, _) => format!("{base} on day {year_day} of the year"),
                (None, Some(month), Some(DayOfMonth::Forward(day))) => {
                    format!("{base} on the {} of month {month}", ordinal(u32::from(day)))
                }
                (None, Some(month), Some(day)) => {
                    format!("{base} in month {month}{}", month_day_phrase(day))
                }
                (None, Some(month), None) => format!("{base} in month {month}"),
                (None, None, Some(day)) => format!("{base}{}", month_day_phrase(day)),
                (None, None, None) => base,
            }
        }
        RuleKind::WeekOfMonth => match (rule.week_of_month, rule.week_day) {
            (Some(week), Some(weekday)) => {
                let occurrence = format!("the {} {}", week_name(week), weekday_name(weekday));
                match rule.month {
                    Some(month) => format!("{occurrence} of month {month}, {}", every(value, "year")),
                    None if value == 1 => format!("{occurrence} of every month"),
                    None => format!("{occurrence} of every {value} months"),
                }
            }
            _ => every(value, "month"),
        },
        RuleKind::Custom => match (&rule.special_date_anchor, rule.unit) {
            (Some(anchor), _) if value == 1 => format!("every {}", anchor.name),
            (Some(anchor), _) => format!("every {value} occurrences of {}", anchor.name),
            (None, Some(unit)) => every(value, unit_name(unit)),
            (None, None) => every(value, "day"),
        },
        RuleKind::Composite => match &rule.composite {
            Some(composite) => describe_composite(composite),
            None => "composite".to_string(),
        },
    }
}

/// Describe a parametrized rule, e.g. `"every month, 2 days before month end"`.
pub fn describe_advanced(rule: &AdvancedRecurrenceRule) -> String {
    match (rule.selected_unit, rule.special_anchor) {
        (AdvancedUnit::Day, _) => every(rule.day_value, "day"),
        (AdvancedUnit::Week, None) => format!(
            "{} on {}",
            every(rule.week_value, "week"),
            weekday_name(rule.week_day)
        ),
        (AdvancedUnit::Week, Some(kind)) => match kind {
            SpecialAnchorKind::Weekend => "every weekend day".to_string(),
            SpecialAnchorKind::Workday => "every workday".to_string(),
            SpecialAnchorKind::Holiday => {
                format!("every {HOLIDAY_JUMP_DAYS} days (holiday approximation)")
            }
            SpecialAnchorKind::SolarTerm => {
                format!("every {SOLAR_TERM_JUMP_DAYS} days (solar term approximation)")
            }
        },
        (AdvancedUnit::Month, None) => format!(
            "{}{}",
            every(rule.month_value, "month"),
            advanced_day_phrase(rule)
        ),
        (AdvancedUnit::Month, Some(_)) => every(1, "month"),
        (AdvancedUnit::Year, None) => {
            let base = every(rule.year_value, "year");
            match rule.count_direction {
                CountDirection::Forward => format!(
                    "{base} on the {} of month {}",
                    ordinal(rule.day_value),
                    rule.month_value
                ),
                CountDirection::Backward => format!(
                    "{base} in month {}{}",
                    rule.month_value,
                    advanced_day_phrase(rule)
                ),
            }
        }
        (AdvancedUnit::Year, Some(_)) => every(rule.year_value, "year"),
    }
}

fn describe_composite(composite: &CompositeRule) -> String {
    let mut parts = Vec::new();
    for (count, unit) in [(composite.years, "year"), (composite.months, "month")] {
        if count > 0 {
            parts.push(counted(count, unit));
        }
    }
    if composite.target.is_none() && composite.days > 0 {
        parts.push(counted(composite.days, "day"));
    }
    // "every year, 2 months", not "every 1 year, 2 months".
    if let Some(first) = parts.first_mut() {
        if let Some(unit) = first.strip_prefix("1 ").map(str::to_string) {
            *first = unit;
        }
    }

    // With no offsets the calculator rolls by month, or by year for a day of year.
    let base = match parts.as_slice() {
        [] => match composite.target {
            Some(CompositeDay::DayOfYear(_)) => "every year".to_string(),
            _ => "every month".to_string(),
        },
        [single] => format!("every {single}"),
        [init @ .., last] => format!("every {} and {last}", init.join(", ")),
    };

    let target = match composite.target {
        Some(CompositeDay::DayOfMonth(day)) => month_day_phrase(day),
        Some(CompositeDay::DayOfYear(day)) => format!(" on day {day} of the year"),
        Some(CompositeDay::NthWeekday(week, weekday)) => {
            format!(" on the {} {}", week_name(week), weekday_name(weekday))
        }
        None => String::new(),
    };

    format!("{base}{target}")
}

// ── Phrases ─────────────────────────────────────────────────────────────────

fn every(count: u32, unit: &str) -> String {
    if count == 1 {
        format!("every {unit}")
    } else {
        format!("every {count} {unit}s")
    }
}

fn counted(count: u32, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

fn month_day_phrase(day: DayOfMonth) -> String {
    match day {
        DayOfMonth::Forward(day) => format!(" on day {day}"),
        DayOfMonth::Backward(0) => ", on the last day".to_string(),
        DayOfMonth::Backward(1) => ", 1 day before month end".to_string(),
        DayOfMonth::Backward(offset) => format!(", {offset} days before month end"),
    }
}

fn advanced_day_phrase(rule: &AdvancedRecurrenceRule) -> String {
    let day = u8::try_from(rule.day_value).unwrap_or(u8::MAX);
    match rule.count_direction {
        CountDirection::Forward => month_day_phrase(DayOfMonth::Forward(day)),
        CountDirection::Backward => month_day_phrase(DayOfMonth::Backward(day)),
    }
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

fn week_name(week: WeekOfMonth) -> &'static str {
    match week {
        WeekOfMonth::First => "first",
        WeekOfMonth::Second => "second",
        WeekOfMonth::Third => "third",
        WeekOfMonth::Fourth => "fourth",
        WeekOfMonth::Last => "last",
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn unit_name(unit: CustomUnit) -> &'static str {
    match unit {
        CustomUnit::Minutes => "minute",
        CustomUnit::Hours => "hour",
        CustomUnit::Days => "day",
        CustomUnit::Weeks => "week",
        CustomUnit::Months => "month",
        CustomUnit::Years => "year",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{AnchorKind, SpecialDateAnchor};

    #[test]
    fn test_daily_and_weekly() {
        assert_eq!(describe_rule(&RecurrenceRule::daily(1)), "every day");
        assert_eq!(describe_rule(&RecurrenceRule::daily(3)), "every 3 days");
        assert_eq!(
            describe_rule(&RecurrenceRule::weekly(2, Some(Weekday::Mon))),
            "every 2 weeks on Monday"
        );
        assert_eq!(describe_rule(&RecurrenceRule::weekly(1, None)), "every week");
    }

    #[test]
    fn test_monthly_day_placements() {
        let forward = RecurrenceRule::monthly(1, Some(DayOfMonth::Forward(31)));
        assert_eq!(describe_rule(&forward), "every month on day 31");
        let backward = RecurrenceRule::monthly(1, Some(DayOfMonth::Backward(2)));
        assert_eq!(describe_rule(&backward), "every month, 2 days before month end");
        let last = RecurrenceRule::monthly(3, Some(DayOfMonth::Backward(0)));
        assert_eq!(describe_rule(&last), "every 3 months, on the last day");
    }

    #[test]
    fn test_yearly_variants() {
        let rule = RecurrenceRule::yearly(1)
            .with_month(8)
            .with_month_day(DayOfMonth::Forward(15));
        assert_eq!(describe_rule(&rule), "every year on the 15th of month 8");
        let rule = RecurrenceRule::yearly(2).with_year_day(100);
        assert_eq!(describe_rule(&rule), "every 2 years on day 100 of the year");
        assert_eq!(describe_rule(&RecurrenceRule::yearly(1)), "every year");
    }

    #[test]
    fn test_week_of_month() {
        let rule = RecurrenceRule::week_of_month(1, WeekOfMonth::Last, Weekday::Fri);
        assert_eq!(describe_rule(&rule), "the last Friday of every month");
        let rule = RecurrenceRule::week_of_month(2, WeekOfMonth::Second, Weekday::Tue);
        assert_eq!(describe_rule(&rule), "the second Tuesday of every 2 months");
        let rule = RecurrenceRule::week_of_month(1, WeekOfMonth::Last, Weekday::Fri).with_month(6);
        assert_eq!(describe_rule(&rule), "the last Friday of month 6, every year");
    }

    #[test]
    fn test_custom_units_and_anchor() {
        assert_eq!(
            describe_rule(&RecurrenceRule::custom(90, CustomUnit::Minutes)),
            "every 90 minutes"
        );
        assert_eq!(describe_rule(&RecurrenceRule::custom(1, CustomUnit::Years)), "every year");
        let anchor = SpecialDateAnchor::new(AnchorKind::Festival, "Mid-Autumn Festival", 8, 15, true);
        let rule = RecurrenceRule::custom(1, CustomUnit::Years).with_special_anchor(anchor.clone());
        assert_eq!(describe_rule(&rule), "every Mid-Autumn Festival");
        let rule = RecurrenceRule::custom(2, CustomUnit::Years).with_special_anchor(anchor);
        assert_eq!(describe_rule(&rule), "every 2 occurrences of Mid-Autumn Festival");
    }

    #[test]
    fn test_composite_descriptions() {
        let rule = RecurrenceRule::composite(CompositeRule {
            years: 1,
            months: 2,
            days: 3,
            target: None,
        });
        assert_eq!(describe_rule(&rule), "every year, 2 months and 3 days");

        let rule = RecurrenceRule::composite(CompositeRule {
            years: 2,
            months: 1,
            ..CompositeRule::default()
        });
        assert_eq!(describe_rule(&rule), "every 2 years and 1 month");

        let rule = RecurrenceRule::composite(CompositeRule {
            months: 1,
            target: Some(CompositeDay::NthWeekday(WeekOfMonth::First, Weekday::Mon)),
            ..CompositeRule::default()
        });
        assert_eq!(describe_rule(&rule), "every month on the first Monday");

        // A target overrides the plain day offset, as in the calculator.
        let rule = RecurrenceRule::composite(CompositeRule {
            years: 1,
            days: 9,
            target: Some(CompositeDay::DayOfYear(100)),
            ..CompositeRule::default()
        });
        assert_eq!(describe_rule(&rule), "every year on day 100 of the year");
    }

    #[test]
    fn test_composite_target_only_names_its_roll() {
        let target_only = |target: CompositeDay| {
            describe_rule(&RecurrenceRule::composite(CompositeRule {
                target: Some(target),
                ..CompositeRule::default()
            }))
        };
        assert_eq!(
            target_only(CompositeDay::DayOfMonth(DayOfMonth::Forward(5))),
            "every month on day 5"
        );
        assert_eq!(
            target_only(CompositeDay::DayOfMonth(DayOfMonth::Backward(2))),
            "every month, 2 days before month end"
        );
        assert_eq!(
            target_only(CompositeDay::NthWeekday(WeekOfMonth::Last, Weekday::Fri)),
            "every month on the last Friday"
        );
        assert_eq!(
            target_only(CompositeDay::DayOfYear(256)),
            "every year on day 256 of the year"
        );
    }

    #[test]
    fn test_advanced_units() {
        let rule = AdvancedRecurrenceRule {
            selected_unit: AdvancedUnit::Week,
            week_value: 2,
            week_day: Weekday::Wed,
            ..AdvancedRecurrenceRule::default()
        };
        assert_eq!(describe_advanced(&rule), "every 2 weeks on Wednesday");

        let rule = AdvancedRecurrenceRule {
            selected_unit: AdvancedUnit::Month,
            day_value: 2,
            count_direction: CountDirection::Backward,
            ..AdvancedRecurrenceRule::default()
        };
        assert_eq!(describe_advanced(&rule), "every month, 2 days before month end");

        let rule = AdvancedRecurrenceRule {
            selected_unit: AdvancedUnit::Year,
            month_value: 8,
            day_value: 15,
            ..AdvancedRecurrenceRule::default()
        };
        assert_eq!(describe_advanced(&rule), "every year on the 15th of month 8");
    }

    #[test]
    fn test_advanced_special_anchors() {
        let rule = AdvancedRecurrenceRule {
            selected_unit: AdvancedUnit::Week,
            special_anchor: Some(SpecialAnchorKind::Holiday),
            ..AdvancedRecurrenceRule::default()
        };
        assert_eq!(describe_advanced(&rule), "every 7 days (holiday approximation)");
        let rule = AdvancedRecurrenceRule {
            selected_unit: AdvancedUnit::Week,
            special_anchor: Some(SpecialAnchorKind::Workday),
            ..AdvancedRecurrenceRule::default()
        };
        assert_eq!(describe_advanced(&rule), "every workday");
        let rule = AdvancedRecurrenceRule {
            selected_unit: AdvancedUnit::Week,
            special_anchor: Some(SpecialAnchorKind::Weekend),
            ..AdvancedRecurrenceRule::default()
        };
        assert_eq!(describe_advanced(&rule), "every weekend day");
    }

    #[test]
    fn test_ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(31), "31st");
    }
}
