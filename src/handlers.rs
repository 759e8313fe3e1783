use crate::calendar::{Direction, MonthView, YearMonth};
use crate::date_key::DateKey;
use crate::errors::AppError;
use crate::models::{DayResponse, Suggestion, UpdateRequest};
use crate::panels::AnalysisView;
use crate::refresh::PanelStatus;
use crate::series::{OVERVIEW_WINDOW, SeriesResponse, WEEK_WINDOW, build_response};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
};
use serde::{Deserialize, Serialize};
use tracing::info;

const MAX_WINDOW: usize = 366;

#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    pub date: Option<String>,
    pub window: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub direction: Direction,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub day: u32,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub view: AnalysisView,
    pub status: PanelStatus,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Suggestion>,
    pub status: PanelStatus,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let (month, reference) = {
        let calendar = state.calendar.lock().await;
        let reference = calendar.selected_date().unwrap_or_else(DateKey::today);
        let month = state.records.read(|store| calendar.month_view(store)).await;
        (month, reference)
    };
    let series = state
        .records
        .read(|store| build_response(reference, WEEK_WINDOW, store))
        .await;
    Html(render_index(&month, &series, &state.suggestions.suggestions(), &state.analysis.view()))
}

pub async fn get_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DayResponse>, AppError> {
    let date = parse_key(&date)?;
    let record = state.records.get(&date).await;
    Ok(Json(DayResponse { date, record }))
}

/// Merges a partial record and persists the snapshot. Answers with a status
/// and a short message only.
pub async fn update_day(
    State(state): State<AppState>,
    Json(payload): Json<UpdateRequest>,
) -> Result<(StatusCode, &'static str), AppError> {
    state.records.merge(payload.date, &payload.record).await?;
    info!(date = %payload.date, "day record updated");
    Ok((StatusCode::OK, "Data updated successfully"))
}

pub async fn get_series(
    State(state): State<AppState>,
    Query(query): Query<SeriesQuery>,
) -> Result<Json<SeriesResponse>, AppError> {
    let window = query.window.unwrap_or(WEEK_WINDOW);
    if !(1..=MAX_WINDOW).contains(&window) {
        return Err(AppError::bad_request(format!(
            "window must be between 1 and {MAX_WINDOW}"
        )));
    }
    series(&state, query.date.as_deref(), window).await
}

pub async fn get_overview(
    State(state): State<AppState>,
    Query(query): Query<SeriesQuery>,
) -> Result<Json<SeriesResponse>, AppError> {
    series(&state, query.date.as_deref(), OVERVIEW_WINDOW).await
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthView>, AppError> {
    let calendar = state.calendar.lock().await;
    let view = match (query.year, query.month) {
        (None, None) => state.records.read(|store| calendar.month_view(store)).await,
        (Some(year), Some(month)) => {
            let browse = calendar.browse(YearMonth::new(year, month)?);
            state.records.read(|store| browse.month_view(store)).await
        }
        _ => return Err(AppError::bad_request("year and month must be given together")),
    };
    Ok(Json(view))
}

pub async fn navigate_calendar(
    State(state): State<AppState>,
    Json(payload): Json<NavigateRequest>,
) -> Json<MonthView> {
    let mut calendar = state.calendar.lock().await;
    calendar.navigate(payload.direction);
    Json(state.records.read(|store| calendar.month_view(store)).await)
}

pub async fn select_day(
    State(state): State<AppState>,
    Json(payload): Json<SelectRequest>,
) -> Result<Json<DayResponse>, AppError> {
    let mut calendar = state.calendar.lock().await;
    let (date, record) = state
        .records
        .read(|store| calendar.select_day(payload.day, store))
        .await?;
    Ok(Json(DayResponse { date, record }))
}

pub async fn get_analysis(State(state): State<AppState>) -> Json<AnalysisResponse> {
    Json(AnalysisResponse {
        view: state.analysis.view(),
        status: state.analysis_status.status(),
    })
}

pub async fn get_suggestions(State(state): State<AppState>) -> Json<SuggestionsResponse> {
    Json(SuggestionsResponse {
        suggestions: state.suggestions.suggestions(),
        status: state.suggestions_status.status(),
    })
}

pub async fn start_recording(
    State(state): State<AppState>,
) -> Result<(StatusCode, &'static str), AppError> {
    state.recorder.start().await?;
    Ok((StatusCode::OK, "Recording started"))
}

pub async fn stop_recording(
    State(state): State<AppState>,
) -> Result<(StatusCode, &'static str), AppError> {
    state.recorder.stop().await?;
    Ok((StatusCode::OK, "Recording stopped and processing complete"))
}

/// Pulls the current snapshot and merges it into today's record.
pub async fn ingest_snapshot(State(state): State<AppState>) -> Result<Json<DayResponse>, AppError> {
    let snapshot = state.source.fetch_snapshot().await?;
    let date = DateKey::today();
    let record = state
        .records
        .merge(date, &snapshot.to_partial_record())
        .await?;
    info!(date = %date, "ingested analysis snapshot");
    Ok(Json(DayResponse {
        date,
        record: Some(record),
    }))
}

async fn series(
    state: &AppState,
    date: Option<&str>,
    window: usize,
) -> Result<Json<SeriesResponse>, AppError> {
    let reference = match date {
        Some(raw) => parse_key(raw)?,
        None => state
            .calendar
            .lock()
            .await
            .selected_date()
            .unwrap_or_else(DateKey::today),
    };
    let response = state
        .records
        .read(|store| build_response(reference, window, store))
        .await;
    Ok(Json(response))
}

fn parse_key(raw: &str) -> Result<DateKey, AppError> {
    raw.parse()
        .map_err(|_| AppError::bad_request(format!("{raw:?} is not a YYYY-MM-DD date")))
}
