use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "track_type", rename_all = "snake_case")]
pub enum Tracker {
    Boolean {
        #[serde(default)]
        completions: BTreeSet<NaiveDate>,
    },
    Numeric {
        #[serde(default)]
        values: BTreeMap<NaiveDate, f64>,
        #[serde(default)]
        unit: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackType {
    Boolean,
    Numeric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub tracker: Tracker,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HabitStore {
    pub habits: Vec<Habit>,
}

#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    pub name: String,
    pub track_type: TrackType,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditHabitRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CellRequest {
    Toggle,
    Commit { value: String },
    Clear,
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    pub range: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub y_label: Option<String>,
    pub gaps: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HabitSummary {
    pub current_streak: u32,
    pub best_streak: u32,
    pub completion_rate: Option<f64>,
    pub total: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HabitResponse {
    #[serde(flatten)]
    pub habit: Habit,
    pub summary: HabitSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub label: String,
    pub value: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeriesResponse {
    pub habit_id: Uuid,
    pub range: String,
    pub points: Vec<SeriesPoint>,
    pub current_streak: u32,
}
