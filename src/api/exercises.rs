use crate::api::AppState;
use crate::api::extract::{FormOrJson, QueryParams};
use crate::api::schemas::exercises::{AddExercise, ExerciseAdded, ExerciseLog, LogParams};
use crate::error::Result;
use axum::{
    Json,
    extract::State,
    response::IntoResponse,
};

pub async fn add_exercise(
    State(state): State<AppState>,
    FormOrJson(payload): FormOrJson<AddExercise>,
) -> Result<impl IntoResponse> {
    let added = state.exercise_service.append(payload.into()).await?;
    Ok(Json(ExerciseAdded::from(added)))
}

pub async fn get_log(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<LogParams>,
) -> Result<impl IntoResponse> {
    let log = state.exercise_service.log(params.user_id).await?;
    Ok(Json(ExerciseLog::from(log)))
}
