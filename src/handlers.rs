use crate::errors::AppError;
use crate::models::{
    ActivityEvent, ActivityEventForm, ActivityEventRequest, ActivityEventUpdateRequest, AppData,
    ChartPoint, DeleteForm, PainForm, PainLogRequest, PainLogUpdateRequest, PainReading,
    RangeParams, UserResponse,
};
use crate::query::{
    parse_kind_filter, DateRange, EventQuery, PainQuery, RangePreset, RangeSelection,
    RecordSource,
};
use crate::state::AppState;
use crate::stats::build_chart;
use crate::storage::persist_data;
use crate::ui::{render_dashboard, render_events_page, render_pain_log};
use crate::validate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    Form, Json,
};
use chrono::{Local, Utc};
use tracing::info;

const RECENT_LIMIT: usize = 10;

pub async fn dashboard(State(state): State<AppState>) -> Html<String> {
    let (recent, readings, events) = {
        let data = state.data.lock().await;
        let recent = data
            .query_pain_logs(&PainQuery::for_user(&state.user_id).with_limit(Some(RECENT_LIMIT)));
        let readings = data.query_pain_logs(&PainQuery::for_user(&state.user_id));
        let events = data.query_activity_events(&EventQuery::for_user(&state.user_id));
        (recent, readings, events)
    };

    let points = build_chart(&readings, &events);
    Html(render_dashboard(&state.user_id, Local::now(), &recent, &points))
}

pub async fn pain_log_page(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Html<String>, AppError> {
    let (selection, range) = resolve_range(&params, RangePreset::Last30Days)?;
    let readings = {
        let data = state.data.lock().await;
        data.query_pain_logs(&PainQuery::for_user(&state.user_id).with_range(range))
    };

    Ok(Html(render_pain_log(&state.user_id, &selection, &readings)))
}

pub async fn events_page(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Html<String>, AppError> {
    let kind = parse_kind_filter(params.kind.as_deref())?;
    let events = {
        let data = state.data.lock().await;
        data.query_activity_events(&EventQuery::for_user(&state.user_id).with_kind(kind))
    };

    Ok(Html(render_events_page(
        &state.user_id,
        Local::now(),
        kind,
        &events,
    )))
}

pub async fn get_user(State(state): State<AppState>) -> Json<UserResponse> {
    Json(UserResponse {
        user_id: state.user_id.clone(),
    })
}

pub async fn list_pain(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<PainReading>>, AppError> {
    let (_, range) = resolve_range(&params, RangePreset::All)?;
    let query = PainQuery::for_user(&state.user_id)
        .with_range(range)
        .with_limit(params.limit);

    let data = state.data.lock().await;
    Ok(Json(data.query_pain_logs(&query)))
}

pub async fn create_pain(
    State(state): State<AppState>,
    Json(payload): Json<PainLogRequest>,
) -> Result<(StatusCode, Json<PainReading>), AppError> {
    let new = validate::new_pain_log(payload, Utc::now(), &Local)?;
    let reading = apply_change(&state, |data, user_id| Ok(data.add_pain_log(user_id, new))).await?;

    info!(id = %reading.id, score = reading.score, "pain log recorded");
    Ok((StatusCode::CREATED, Json(reading)))
}

pub async fn update_pain(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<PainLogUpdateRequest>,
) -> Result<Json<PainReading>, AppError> {
    let update = validate::pain_log_update(payload, &Local)?;
    let reading = apply_change(&state, |data, user_id| {
        data.update_pain_log(user_id, &id, update)
            .ok_or_else(|| pain_not_found(&id))
    })
    .await?;

    info!(id = %reading.id, "pain log updated");
    Ok(Json(reading))
}

pub async fn delete_pain(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    remove_pain(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<ActivityEvent>>, AppError> {
    let (_, range) = resolve_range(&params, RangePreset::All)?;
    let kind = parse_kind_filter(params.kind.as_deref())?;
    let query = EventQuery::for_user(&state.user_id)
        .with_range(range)
        .with_kind(kind)
        .with_limit(params.limit);

    let data = state.data.lock().await;
    Ok(Json(data.query_activity_events(&query)))
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(payload): Json<ActivityEventRequest>,
) -> Result<(StatusCode, Json<ActivityEvent>), AppError> {
    let new = validate::new_activity_event(payload, Utc::now(), &Local)?;
    let event =
        apply_change(&state, |data, user_id| Ok(data.add_activity_event(user_id, new))).await?;

    info!(id = %event.id, kind = event.kind.as_str(), "activity event recorded");
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ActivityEventUpdateRequest>,
) -> Result<Json<ActivityEvent>, AppError> {
    let update = validate::activity_event_update(payload, &Local)?;
    let event = apply_change(&state, |data, user_id| {
        data.update_activity_event(user_id, &id, update)
            .ok_or_else(|| event_not_found(&id))
    })
    .await?;

    info!(id = %event.id, "activity event updated");
    Ok(Json(event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    remove_event(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_chart(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<ChartPoint>>, AppError> {
    let (_, range) = resolve_range(&params, RangePreset::All)?;
    let (readings, events) = {
        let data = state.data.lock().await;
        (
            data.query_pain_logs(&PainQuery::for_user(&state.user_id).with_range(range)),
            data.query_activity_events(&EventQuery::for_user(&state.user_id).with_range(range)),
        )
    };

    Ok(Json(build_chart(&readings, &events)))
}

pub async fn submit_pain_form(
    State(state): State<AppState>,
    Form(form): Form<PainForm>,
) -> Result<Redirect, AppError> {
    let new = validate::pain_log_from_form(form, &Local)?;
    let reading = apply_change(&state, |data, user_id| Ok(data.add_pain_log(user_id, new))).await?;

    info!(id = %reading.id, score = reading.score, "pain log recorded");
    Ok(Redirect::to("/"))
}

pub async fn submit_event_form(
    State(state): State<AppState>,
    Form(form): Form<ActivityEventForm>,
) -> Result<Redirect, AppError> {
    let new = validate::activity_event_from_form(form, &Local)?;
    let event =
        apply_change(&state, |data, user_id| Ok(data.add_activity_event(user_id, new))).await?;

    info!(id = %event.id, kind = event.kind.as_str(), "activity event recorded");
    Ok(Redirect::to("/logs/events"))
}

pub async fn delete_pain_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<DeleteForm>,
) -> Result<Redirect, AppError> {
    remove_pain(&state, &id).await?;
    Ok(Redirect::to(local_redirect(form.next.as_deref(), "/")))
}

pub async fn delete_event_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<DeleteForm>,
) -> Result<Redirect, AppError> {
    remove_event(&state, &id).await?;
    Ok(Redirect::to(local_redirect(form.next.as_deref(), "/logs/events")))
}

async fn remove_pain(state: &AppState, id: &str) -> Result<(), AppError> {
    apply_change(state, |data, user_id| {
        if data.delete_pain_log(user_id, id) {
            Ok(())
        } else {
            Err(pain_not_found(id))
        }
    })
    .await?;

    info!(id, "pain log deleted");
    Ok(())
}

async fn remove_event(state: &AppState, id: &str) -> Result<(), AppError> {
    apply_change(state, |data, user_id| {
        if data.delete_activity_event(user_id, id) {
            Ok(())
        } else {
            Err(event_not_found(id))
        }
    })
    .await?;

    info!(id, "activity event deleted");
    Ok(())
}

/// Applies `change` to a copy of the store and swaps it in only once the
/// copy has been written to disk.
async fn apply_change<T>(
    state: &AppState,
    change: impl FnOnce(&mut AppData, &str) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let result = change(&mut next, &state.user_id)?;
    persist_data(&state.data_path, &next).await?;
    *data = next;
    Ok(result)
}

fn resolve_range(
    params: &RangeParams,
    default: RangePreset,
) -> Result<(RangeSelection, DateRange), AppError> {
    let selection = RangeSelection::from_params(params, default)?;
    let range = selection.resolve_in(Local::now().date_naive(), &Local);
    Ok((selection, range))
}

// Only same-site paths; anything else falls back.
fn local_redirect<'a>(next: Option<&'a str>, fallback: &'a str) -> &'a str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => fallback,
    }
}

fn pain_not_found(id: &str) -> AppError {
    AppError::not_found(format!("pain log '{id}' not found"))
}

fn event_not_found(id: &str) -> AppError {
    AppError::not_found(format!("activity event '{id}' not found"))
}
