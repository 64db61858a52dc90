use crate::api::AppState;
use crate::api::extract::FormOrJson;
use crate::api::schemas::users::{NewUser, UserCreated};
use crate::error::Result;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

pub async fn new_user(
    State(state): State<AppState>,
    FormOrJson(payload): FormOrJson<NewUser>,
) -> Result<impl IntoResponse> {
    let user = state.registration_service.register(payload.username).await?;
    Ok((StatusCode::CREATED, Json(UserCreated::from(user))))
}
