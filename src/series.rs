use crate::calendar::CalendarRange;
use crate::models::{Habit, HabitSummary, SeriesPoint, Tracker};
use chrono::{Duration, NaiveDate};

pub fn aggregate(habit: &Habit, range: &CalendarRange) -> Vec<SeriesPoint> {
    range
        .dates
        .iter()
        .zip(&range.labels)
        .map(|(date, label)| SeriesPoint {
            date: *date,
            label: label.clone(),
            value: habit.value_on(*date),
        })
        .collect()
}

pub fn current_streak(habit: &Habit, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = today;
    while habit.has_entry(day) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

pub fn best_streak(habit: &Habit) -> u32 {
    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in habit.recorded_days() {
        run = match previous {
            Some(prev) if day - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(day);
    }
    best
}

pub fn completion_rate(habit: &Habit, dates: &[NaiveDate]) -> Option<f64> {
    if dates.is_empty() {
        return None;
    }
    let recorded = dates.iter().filter(|date| habit.has_entry(**date)).count();
    Some(recorded as f64 / dates.len() as f64)
}

pub fn summarize(habit: &Habit, range: &CalendarRange, today: NaiveDate) -> HabitSummary {
    let total = match &habit.tracker {
        Tracker::Boolean { completions } => range
            .dates
            .iter()
            .filter(|date| completions.contains(*date))
            .count() as f64,
        Tracker::Numeric { values, .. } => range
            .dates
            .iter()
            .filter_map(|date| values.get(date))
            .sum(),
    };
    HabitSummary {
        current_streak: current_streak(habit, today),
        best_streak: best_streak(habit),
        completion_rate: completion_rate(habit, &range.dates),
        total,
    }
}
