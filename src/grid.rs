use crate::calendar::{date_key, month_days};
use crate::habits::HabitError;
use crate::models::{CellRequest, Habit, Tracker};
use crate::html::escape_html;
use chrono::{Datelike, NaiveDate};
use std::fmt::Write;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum CellState {
    Toggle { done: bool },
    Numeric { value: Option<f64> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellAction {
    Toggle,
    Commit(String),
    Clear,
}

impl From<CellRequest> for CellAction {
    fn from(request: CellRequest) -> Self {
        match request {
            CellRequest::Toggle => Self::Toggle,
            CellRequest::Commit { value } => Self::Commit(value),
            CellRequest::Clear => Self::Clear,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridDay {
    pub date: NaiveDate,
    pub is_today: bool,
}

#[derive(Debug, Clone)]
pub struct GridRow {
    pub habit_id: Uuid,
    pub name: String,
    pub unit: Option<String>,
    pub cells: Vec<CellState>,
}

#[derive(Debug, Clone)]
pub struct GridView {
    pub year: i32,
    pub month: u32,
    pub days: Vec<GridDay>,
    pub rows: Vec<GridRow>,
}

pub fn build_grid(habits: &[Habit], year: i32, month: u32, today: NaiveDate) -> GridView {
    let days: Vec<GridDay> = month_days(year, month)
        .into_iter()
        .map(|date| GridDay {
            date,
            is_today: date == today,
        })
        .collect();

    let rows = habits
        .iter()
        .map(|habit| GridRow {
            habit_id: habit.id,
            name: habit.name.clone(),
            unit: habit.unit().map(str::to_string),
            cells: days.iter().map(|day| cell_state(habit, day.date)).collect(),
        })
        .collect();

    GridView {
        year,
        month,
        days,
        rows,
    }
}

fn cell_state(habit: &Habit, date: NaiveDate) -> CellState {
    match &habit.tracker {
        Tracker::Boolean { completions } => CellState::Toggle {
            done: completions.contains(&date),
        },
        Tracker::Numeric { values, .. } => CellState::Numeric {
            value: values.get(&date).copied(),
        },
    }
}

pub fn apply_cell_action(
    habit: &Habit,
    date: NaiveDate,
    action: &CellAction,
) -> Result<Habit, HabitError> {
    match action {
        CellAction::Toggle => habit.toggled(date),
        CellAction::Commit(raw) => habit.committed(date, raw),
        CellAction::Clear => habit.without_value(date),
    }
}

impl GridView {
    pub fn to_html(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(
            output,
            r#"<table class="habit-grid" data-year="{}" data-month="{}">"#,
            self.year, self.month
        );
        output.push_str("  <thead><tr><th></th>");
        for day in &self.days {
            let class = if day.is_today { r#" class="today""# } else { "" };
            let _ = write!(output, "<th{class}>{}</th>", day.date.day());
        }
        output.push_str("</tr></thead>\n  <tbody>\n");

        for row in &self.rows {
            let name = match &row.unit {
                Some(unit) => format!("{} ({})", escape_html(&row.name), escape_html(unit)),
                None => escape_html(&row.name),
            };
            let _ = write!(output, r#"    <tr data-habit="{}"><th scope="row">{name}</th>"#, row.habit_id);
            for (day, cell) in self.days.iter().zip(&row.cells) {
                let today = if day.is_today { " today" } else { "" };
                let key = date_key(day.date);
                match cell {
                    CellState::Toggle { done } => {
                        let state = if *done { " done" } else { "" };
                        let _ = write!(
                            output,
                            r#"<td><button type="button" class="cell toggle{state}{today}" data-kind="boolean" data-date="{key}" aria-pressed="{done}" title="{key}"></button></td>"#
                        );
                    }
                    CellState::Numeric { value } => {
                        let shown = value.map(|value| value.to_string()).unwrap_or_default();
                        let state = if value.is_some() { " filled" } else { "" };
                        let _ = write!(
                            output,
                            r#"<td><input class="cell numeric{state}{today}" data-kind="numeric" data-date="{key}" inputmode="decimal" value="{shown}" title="{key}" /></td>"#
                        );
                    }
                }
            }
            output.push_str("</tr>\n");
        }

        output.push_str("  </tbody>\n</table>");
        output
    }
}
