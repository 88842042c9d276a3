use std::hint::black_box;

use chrono::{TimeZone, Utc, Weekday};
use criterion::{criterion_group, criterion_main, Criterion};
use cycle_engine::{
    builtin_anchor, compute_advanced_due, compute_due, AdvancedRecurrenceRule, AdvancedUnit,
    CountDirection, CustomUnit, CycleContext, DateSystem, DayOfMonth, LunarTable, RecurrenceRule,
    WeekOfMonth,
};

fn bench_simple(c: &mut Criterion) {
    let ctx = CycleContext::new(chrono_tz::Asia::Shanghai);
    let start = Utc.with_ymd_and_hms(2024, 1, 31, 9, 0, 0).unwrap();
    let monthly = RecurrenceRule::monthly(1, Some(DayOfMonth::Backward(2)));
    let last_friday = RecurrenceRule::week_of_month(1, WeekOfMonth::Last, Weekday::Fri);

    c.bench_function("monthly_solar", |b| {
        b.iter(|| compute_due(black_box(start), &monthly, DateSystem::Solar, &ctx))
    });
    c.bench_function("monthly_lunar", |b| {
        b.iter(|| compute_due(black_box(start), &monthly, DateSystem::Lunar, &ctx))
    });
    c.bench_function("last_friday_lunar", |b| {
        b.iter(|| compute_due(black_box(start), &last_friday, DateSystem::Lunar, &ctx))
    });

    if let Some(anchor) = builtin_anchor("Mid-Autumn Festival") {
        let festival = RecurrenceRule::custom(5, CustomUnit::Years).with_special_anchor(anchor);
        c.bench_function("mid_autumn_x5", |b| {
            b.iter(|| compute_due(black_box(start), &festival, DateSystem::Lunar, &ctx))
        });
    }
}

fn bench_advanced(c: &mut Criterion) {
    let ctx = CycleContext::default();
    let start = Utc.with_ymd_and_hms(2024, 1, 31, 9, 0, 0).unwrap();
    let rule = AdvancedRecurrenceRule {
        selected_unit: AdvancedUnit::Year,
        month_value: 8,
        day_value: 3,
        count_direction: CountDirection::Backward,
        ..AdvancedRecurrenceRule::default()
    };

    c.bench_function("advanced_year_lunar", |b| {
        b.iter(|| compute_advanced_due(black_box(start), &rule, DateSystem::Lunar, &ctx))
    });
}

fn bench_lunar_conversion(c: &mut Criterion) {
    let table = LunarTable::bundled();
    let date = chrono::NaiveDate::from_ymd_opt(2099, 12, 31).unwrap_or_default();

    c.bench_function("to_lunar_2099", |b| b.iter(|| table.to_lunar(black_box(date))));
}

criterion_group!(benches, bench_simple, bench_advanced, bench_lunar_conversion);
criterion_main!(benches);
