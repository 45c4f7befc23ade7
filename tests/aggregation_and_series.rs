mod common;

use budget_engine::{
    ledger::{Category, Granularity, Ledger, Transaction, Window},
    AverageBasis, CalendarConfig, Flow, PeriodKind, SeriesMetric, SeriesWindow,
};
use chrono::Duration;
use common::{at, day, engine_at, engine_with_calendar};

#[test]
fn month_in_progress_averages_over_elapsed_days() {
    let now = at(2025, 4, 10, 16, 0);
    let mut ledger = Ledger::new();
    ledger.add_transaction(Transaction::expense(120.0, at(2025, 4, 1, 9, 0)));
    ledger.add_transaction(Transaction::expense(80.0, at(2025, 4, 6, 9, 0)));
    ledger.add_transaction(Transaction::expense(50.0, at(2025, 4, 10, 9, 0)));
    ledger.add_transaction(Transaction::expense(999.0, at(2025, 3, 31, 23, 59)));
    let engine = engine_at(ledger, now);

    let window = engine.window(PeriodKind::Month, now);
    let summary = engine.aggregate(window, Some(Flow::Expense), &[], now);

    assert_eq!(summary.breakdown.len(), 30);
    assert_eq!(summary.total, 250.0);
    assert_eq!(summary.average_basis, AverageBasis::Elapsed(10));
    assert_eq!(summary.average, 25.0);
    assert_eq!(summary.active_subperiods, 3);
    assert_eq!(summary.max, 120.0);
}

#[test]
fn week_breakdown_sums_to_window_total() {
    let now = at(2025, 1, 16, 12, 0);
    let mut ledger = Ledger::new();
    let window = engine_at(Ledger::new(), now).window(PeriodKind::Week, now);
    let boundaries = [
        window.start,
        window.start + Duration::days(1),
        window.start + Duration::days(1) - Duration::seconds(1),
        window.start + Duration::days(3) + Duration::hours(12),
        window.end - Duration::seconds(1),
        window.end,
        window.start - Duration::seconds(1),
    ];
    for (index, instant) in boundaries.into_iter().enumerate() {
        let amount = 10.0 + index as f64 * 2.25;
        let txn = if index % 2 == 0 {
            Transaction::income(amount, instant)
        } else {
            Transaction::expense(amount, instant)
        };
        ledger.add_transaction(txn);
    }
    let engine = engine_at(ledger, now);

    let summary = engine.aggregate(window, None, &[], now);
    let breakdown_sum: f64 = summary.breakdown.iter().map(|entry| entry.amount).sum();
    assert_eq!(summary.breakdown.len(), 7);
    assert_eq!(breakdown_sum, summary.total);
    assert_eq!(summary.total, summary.income - summary.expense);
    // Only the five instants inside [start, end) count.
    assert_eq!(summary.income, 10.0 + 14.5 + 19.0);
    assert_eq!(summary.expense, 12.25 + 16.75);
}

#[test]
fn category_filter_is_or_within_and_with_flow() {
    let now = at(2025, 7, 31, 20, 0);
    let mut ledger = Ledger::new();
    let food = ledger.add_category(Category::new("Food", "🍕", false));
    let rent = ledger.add_category(Category::new("Rent", "🏠", false));
    let salary = ledger.add_category(Category::new("Salary", "💼", true));
    ledger.add_transaction(Transaction::expense(25.0, at(2025, 7, 2, 12, 0)).with_category(food));
    ledger.add_transaction(Transaction::expense(700.0, at(2025, 7, 1, 8, 0)).with_category(rent));
    ledger.add_transaction(Transaction::income(40.0, at(2025, 7, 3, 8, 0)).with_category(food));
    ledger.add_transaction(Transaction::income(3000.0, at(2025, 7, 1, 8, 0)).with_category(salary));
    ledger.add_transaction(Transaction::expense(5.0, at(2025, 7, 4, 8, 0)));
    let engine = engine_at(ledger, now);
    let window = engine.window(PeriodKind::Month, now);

    let both = engine.aggregate(window, Some(Flow::Expense), &[food, rent], now);
    assert_eq!(both.total, 725.0);

    let food_only = engine.aggregate(window, None, &[food], now);
    assert_eq!(food_only.total, 15.0);
    assert_eq!(food_only.income, 40.0);
    assert_eq!(food_only.expense, 25.0);

    let everything = engine.aggregate(window, None, &[], now);
    assert_eq!(everything.net, 3000.0 + 40.0 - 700.0 - 25.0 - 5.0);
    assert_eq!(everything.average_basis, AverageBasis::Elapsed(31));
}

#[test]
fn finished_year_uses_twelve_monthly_buckets() {
    let now = at(2025, 3, 1, 9, 0);
    let mut ledger = Ledger::new();
    ledger.add_transaction(Transaction::income(600.0, at(2024, 1, 15, 9, 0)));
    ledger.add_transaction(Transaction::income(600.0, at(2024, 12, 31, 23, 0)));
    let engine = engine_at(ledger, now);

    let window = engine.window(PeriodKind::Year, at(2024, 7, 1, 0, 0));
    assert_eq!(window.granularity, Granularity::Month);
    let summary = engine.aggregate(window, Some(Flow::Income), &[], now);
    assert_eq!(summary.breakdown.len(), 12);
    assert_eq!(summary.average_basis, AverageBasis::Nominal(12));
    assert_eq!(summary.average, 100.0);
    assert_eq!(summary.breakdown[11].bucket.label, "Dec 2024");
}

#[test]
fn custom_month_start_shifts_the_window() {
    let now = at(2025, 3, 10, 12, 0);
    let mut ledger = Ledger::new();
    ledger.add_transaction(Transaction::expense(10.0, at(2025, 2, 14, 12, 0)));
    ledger.add_transaction(Transaction::expense(20.0, at(2025, 2, 15, 0, 0)));
    ledger.add_transaction(Transaction::expense(30.0, at(2025, 3, 14, 23, 0)));
    let engine = engine_with_calendar(ledger, now, CalendarConfig::new(1, 15));

    let window = engine.window(PeriodKind::Month, now);
    assert_eq!(window.start, at(2025, 2, 15, 0, 0));
    assert_eq!(window.end, at(2025, 3, 15, 0, 0));
    let summary = engine.aggregate(window, Some(Flow::Expense), &[], now);
    assert_eq!(summary.total, 50.0);
    assert_eq!(summary.breakdown.len(), 28);
    assert_eq!(summary.average_basis, AverageBasis::Elapsed(24));
}

#[test]
fn seven_day_series_scenario() {
    let now = at(2025, 9, 7, 21, 0);
    let mut ledger = Ledger::new();
    ledger.add_transaction(Transaction::income(50.0, at(2025, 9, 3, 10, 0)));
    let engine = engine_at(ledger, now);

    let cumulative: Vec<f64> = engine
        .build_series(SeriesWindow::LastSevenDays, SeriesMetric::Cumulative, None)
        .map(|point| point.amount)
        .collect();
    assert_eq!(cumulative, vec![0.0, 0.0, 50.0, 50.0, 50.0, 50.0, 50.0]);

    let per_bucket: Vec<f64> = engine
        .build_series(SeriesWindow::LastSevenDays, SeriesMetric::PerBucket, None)
        .map(|point| point.amount)
        .collect();
    assert_eq!(per_bucket, vec![0.0, 0.0, 50.0, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn last_month_series_has_one_point_per_day() {
    let now = at(2025, 5, 31, 8, 0);
    let mut ledger = Ledger::new();
    ledger.add_transaction(Transaction::expense(12.0, at(2025, 5, 1, 8, 0)));
    ledger.add_transaction(Transaction::income(100.0, at(2025, 5, 20, 8, 0)));
    let engine = engine_at(ledger, now);

    let points = engine
        .build_series(SeriesWindow::LastMonth, SeriesMetric::Cumulative, Some(Flow::Expense))
        .into_points();
    assert_eq!(points.len(), 31);
    assert_eq!(points[0].date, day(2025, 5, 1));
    assert_eq!(points[30].date, day(2025, 5, 31));
    assert!(points.iter().all(|point| point.amount == 12.0));
}

#[test]
fn year_to_date_series_is_dated_at_month_ends() {
    let now = at(2025, 4, 2, 8, 0);
    let mut ledger = Ledger::new();
    ledger.add_transaction(Transaction::income(100.0, at(2025, 1, 10, 8, 0)));
    ledger.add_transaction(Transaction::expense(40.0, at(2025, 3, 10, 8, 0)));
    let engine = engine_at(ledger, now);

    let series = engine.build_series(SeriesWindow::YearToDate, SeriesMetric::Cumulative, None);
    assert_eq!(series.len(), 4);
    let points = series.into_points();
    let dates: Vec<_> = points.iter().map(|point| point.date).collect();
    assert_eq!(
        dates,
        vec![day(2025, 1, 31), day(2025, 2, 28), day(2025, 3, 31), day(2025, 4, 30)]
    );
    let amounts: Vec<_> = points.iter().map(|point| point.amount).collect();
    assert_eq!(amounts, vec![100.0, 100.0, 60.0, 60.0]);
}

#[test]
fn explicit_window_can_be_built_by_hand() {
    let now = at(2025, 1, 31, 12, 0);
    let mut ledger = Ledger::new();
    ledger.add_transaction(Transaction::expense(9.0, at(2025, 1, 2, 12, 0)));
    let engine = engine_at(ledger, now);
    let window = Window::new(at(2025, 1, 1, 0, 0), at(2025, 1, 4, 0, 0), Granularity::Day)
        .expect("non-empty window");
    let summary = engine.aggregate(window, None, &[], now);
    assert_eq!(summary.average_basis, AverageBasis::Nominal(3));
    assert_eq!(summary.average, -3.0);
    assert!(Window::new(now, now, Granularity::Day).is_none());
}
