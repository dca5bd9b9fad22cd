//! Patient record, account and prediction endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use patient_records_core::{PatientRegistry, RecordError, RecordResult};
use patient_records_predict::PremiumInput;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/health", get(health))
        .route("/view", get(view_all))
        .route("/patient/:id", get(view_patient))
        .route("/sort", get(sort_patients))
        .route("/create", post(create_patient))
        .route("/edit_patient/:id", put(edit_patient))
        .route("/delete_patient/:id", delete(delete_patient))
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/predict", post(predict))
        .with_state(state)
}

/// Run a registry call on the blocking pool.
async fn blocking<T, F>(state: &AppState, call: F) -> ApiResult<T>
where
    F: FnOnce(&PatientRegistry) -> RecordResult<T> + Send + 'static,
    T: Send + 'static,
{
    let registry = state.registry.clone();
    let result = tokio::task::spawn_blocking(move || call(&registry))
        .await
        .map_err(|e| ApiError::Task(e.to_string()))?;
    Ok(result?)
}

type Body = Result<Json<Value>, JsonRejection>;

// ==================
// Informational
// ==================

async fn home() -> Json<Value> {
    Json(json!({"message": "Welcome to the Patient Management System API"}))
}

async fn about() -> Json<Value> {
    Json(json!({"message": "API to manage patients with login/signup system"}))
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

// ==================
// Records
// ==================

async fn view_all(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let views = blocking(&state, |registry| registry.list()).await?;

    let mut data = Map::new();
    for view in views {
        let value = serde_json::to_value(&view).map_err(RecordError::from)?;
        data.insert(view.patient.id, value);
    }
    Ok(Json(json!({ "data": data })))
}

async fn view_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let view = blocking(&state, move |registry| registry.get(&id)).await?;
    Ok(Json(serde_json::to_value(view).map_err(RecordError::from)?))
}

#[derive(Debug, Deserialize)]
struct SortParams {
    sort_by: Option<String>,
    #[serde(default = "default_order")]
    order: String,
}

fn default_order() -> String {
    "asc".to_string()
}

async fn sort_patients(
    State(state): State<AppState>,
    params: Result<Query<SortParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = params?;
    let sort_by = params
        .sort_by
        .ok_or_else(|| RecordError::InvalidArgument("sort_by is required".into()))?;

    let sorted = blocking(&state, move |registry| {
        registry.sorted(&sort_by, &params.order)
    })
    .await?;
    Ok(Json(json!({ "sorted": sorted })))
}

async fn create_patient(
    State(state): State<AppState>,
    body: Body,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(raw) = body?;
    let patient = blocking(&state, move |registry| registry.create(&raw)).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Patient Created Successfully",
            "patient": patient,
        })),
    ))
}

async fn edit_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<Value>> {
    let Json(raw) = body?;
    let patient = blocking(&state, move |registry| registry.update(&id, &raw)).await?;
    Ok(Json(json!({
        "message": "Patient Updated Successfully",
        "patient": patient,
    })))
}

async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    blocking(&state, move |registry| registry.delete(&id)).await?;
    Ok(Json(json!({"message": "Patient Deleted Successfully"})))
}

// ==================
// Accounts
// ==================

async fn signup(State(state): State<AppState>, body: Body) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(raw) = body?;
    let outcome = blocking(&state, move |registry| registry.signup(&raw)).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Signup successful!",
            "patient_id": outcome.patient_id,
            "patient_record": outcome.patient,
        })),
    ))
}

async fn login(State(state): State<AppState>, body: Body) -> ApiResult<Json<Value>> {
    let Json(raw) = body?;
    let outcome = blocking(&state, move |registry| registry.login(&raw)).await?;
    Ok(Json(json!({
        "message": "Login successful!",
        "patient_id": outcome.patient_id,
        "name": outcome.name,
    })))
}

// ==================
// Prediction
// ==================

async fn predict(State(state): State<AppState>, body: Body) -> ApiResult<Json<Value>> {
    let Json(raw) = body?;
    let input = PremiumInput::from_raw(&raw)?;
    let row = input.features();
    tracing::debug!(model = state.model.name(), ?row, "predicting premium category");

    let category = state.model.predict(&row)?;
    Ok(Json(json!({ "insurance_premium_category": category })))
}
