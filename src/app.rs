use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/update-data", post(handlers::update_day))
        .route("/api/days", post(handlers::update_day))
        .route("/api/days/:date", get(handlers::get_day))
        .route("/api/series", get(handlers::get_series))
        .route("/api/overview", get(handlers::get_overview))
        .route("/api/calendar", get(handlers::get_calendar))
        .route("/api/calendar/navigate", post(handlers::navigate_calendar))
        .route("/api/calendar/select", post(handlers::select_day))
        .route("/api/analysis", get(handlers::get_analysis))
        .route("/api/suggestions", get(handlers::get_suggestions))
        .route("/api/recording/start", post(handlers::start_recording))
        .route("/api/recording/stop", post(handlers::stop_recording))
        .route("/api/ingest", post(handlers::ingest_snapshot))
        .with_state(state)
}
