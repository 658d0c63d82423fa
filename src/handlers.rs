use crate::calendar::{CalendarRange, ViewRange, build_range};
use crate::chart::{ChartOptions, GapStyle, build_chart};
use crate::errors::AppError;
use crate::grid::{CellAction, apply_cell_action, build_grid};
use crate::models::{
    CellRequest, ChartQuery, CreateHabitRequest, EditHabitRequest, Habit, HabitResponse,
    HabitStore, RangeQuery, SeriesResponse, TrackType,
};
use crate::series::{aggregate, current_streak, summarize};
use crate::state::AppState;
use crate::storage::persist_store;
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse},
};
use chrono::{Datelike, Local, NaiveDate};
use tracing::info;
use uuid::Uuid;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let today = today();
    let store = state.store.lock().await;
    Html(render_index(&store, today))
}

pub async fn list_habits(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<HabitResponse>>, AppError> {
    let today = today();
    let (_, range) = resolve_range(query.range.as_deref(), query.year, query.month, today)?;
    let store = state.store.lock().await;
    Ok(Json(
        store
            .habits
            .iter()
            .map(|habit| to_response(habit, &range, today))
            .collect(),
    ))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(payload): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<HabitResponse>), AppError> {
    let habit = match payload.track_type {
        TrackType::Boolean => Habit::boolean(&payload.name)?,
        TrackType::Numeric => Habit::numeric(&payload.name, payload.unit.as_deref().unwrap_or(""))?,
    };
    let created = habit.clone();
    replace_store(&state, |store| Ok(store.with_habit(habit))).await?;
    info!(habit = %created.id, name = %created.name, "created habit");

    let today = today();
    let range = build_range(ViewRange::Week, today);
    Ok((StatusCode::CREATED, Json(to_response(&created, &range, today))))
}

pub async fn edit_habit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EditHabitRequest>,
) -> Result<Json<HabitResponse>, AppError> {
    let store = replace_store(&state, |store| {
        Ok(store.update(id, |habit| {
            let mut edited = habit.clone();
            if let Some(name) = &payload.name {
                edited = edited.renamed(name)?;
            }
            if let Some(unit) = &payload.unit {
                edited = edited.with_unit(unit)?;
            }
            Ok(edited)
        })?)
    })
    .await?;
    info!(habit = %id, "edited habit");

    let today = today();
    let range = build_range(ViewRange::Week, today);
    Ok(Json(to_response(store.get(id)?, &range, today)))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    replace_store(&state, |store| Ok(store.without(id)?)).await?;
    info!(habit = %id, "deleted habit");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn cell_action(
    State(state): State<AppState>,
    Path((id, date)): Path<(Uuid, String)>,
    Json(payload): Json<CellRequest>,
) -> Result<Json<HabitResponse>, AppError> {
    let date = parse_date(&date)?;
    let action = CellAction::from(payload);
    let store = replace_store(&state, |store| {
        Ok(store.update(id, |habit| apply_cell_action(habit, date, &action))?)
    })
    .await?;

    let today = today();
    let range = build_range(ViewRange::Month, date);
    Ok(Json(to_response(store.get(id)?, &range, today)))
}

pub async fn get_series(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<SeriesResponse>, AppError> {
    let today = today();
    let (view, range) = resolve_range(query.range.as_deref(), query.year, query.month, today)?;
    let store = state.store.lock().await;
    let habit = store.get(id)?;
    Ok(Json(SeriesResponse {
        habit_id: habit.id,
        range: view.to_string(),
        points: aggregate(habit, &range),
        current_streak: current_streak(habit, today),
    }))
}

pub async fn get_chart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ChartQuery>,
) -> Result<impl IntoResponse, AppError> {
    let today = today();
    let (_, range) = resolve_range(query.range.as_deref(), query.year, query.month, today)?;
    let gaps = match &query.gaps {
        Some(value) => value.parse::<GapStyle>().map_err(AppError::bad_request)?,
        None => GapStyle::default(),
    };

    let store = state.store.lock().await;
    let habit = store.get(id)?;
    let options = ChartOptions {
        y_min: query.y_min,
        y_max: query.y_max,
        y_label: query.y_label.clone().or_else(|| habit.unit().map(str::to_string)),
        unit: habit.unit().map(str::to_string),
        gaps,
        ..ChartOptions::default()
    };
    let chart = build_chart(&aggregate(habit, &range), &options)?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], chart.to_svg()))
}

pub async fn get_grid(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Html<String>, AppError> {
    let today = today();
    let reference = selected_month(query.year, query.month, today)?;
    let store = state.store.lock().await;
    let grid = build_grid(&store.habits, reference.year(), reference.month(), today);
    Ok(Html(grid.to_html()))
}

async fn replace_store(
    state: &AppState,
    next: impl FnOnce(&HabitStore) -> Result<HabitStore, AppError>,
) -> Result<HabitStore, AppError> {
    let mut store = state.store.lock().await;
    let updated = next(&store)?;
    persist_store(state.data_path.as_deref(), &updated).await?;
    *store = updated.clone();
    Ok(updated)
}

fn resolve_range(
    range: Option<&str>,
    year: Option<i32>,
    month: Option<u32>,
    today: NaiveDate,
) -> Result<(ViewRange, CalendarRange), AppError> {
    let view = match range {
        Some(value) => value.parse::<ViewRange>().map_err(AppError::bad_request)?,
        None => ViewRange::default(),
    };
    let reference = match view {
        ViewRange::Week => today,
        _ => selected_month(year, month, today)?,
    };
    Ok((view, build_range(view, reference)))
}

fn selected_month(year: Option<i32>, month: Option<u32>, today: NaiveDate) -> Result<NaiveDate, AppError> {
    let year = year.unwrap_or(today.year());
    let month = month.unwrap_or(today.month());
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::bad_request(format!("invalid year/month: {year}-{month}")))
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::bad_request(format!("date must be YYYY-MM-DD, got '{value}'")))
}

fn to_response(habit: &Habit, range: &CalendarRange, today: NaiveDate) -> HabitResponse {
    HabitResponse {
        habit: habit.clone(),
        summary: summarize(habit, range, today),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
