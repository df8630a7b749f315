use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::validation::{self, CREATE_AUTHOR_RULES, as_text};
use crate::domain::{Author, DomainError};
use crate::infrastructure::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAuthorRequest {
    #[schema(example = "Frank Herbert")]
    pub name: String,
}

#[utoipa::path(
    get,
    path = "/api/authors",
    responses((status = 200, description = "All authors", body = [Author]))
)]
pub async fn list_authors(State(state): State<AppState>) -> Result<Json<Vec<Author>>, DomainError> {
    let authors = state.author_repo.find_all().await?;
    Ok(Json(authors))
}

#[utoipa::path(
    post,
    path = "/api/authors",
    request_body = CreateAuthorRequest,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 422, description = "Validation failed", body = crate::api::error::ErrorBody)
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, DomainError> {
    let Json(body) = payload?;
    let body = validation::as_object(&body)?;

    validation::validate(body, CREATE_AUTHOR_RULES).into_result()?;
    let name = validation::required(body, "name", as_text)?;

    let author = state.author_repo.create(name).await?;
    tracing::info!(author_id = author.id, "Author created");

    Ok((StatusCode::CREATED, Json(author)))
}

#[utoipa::path(
    get,
    path = "/api/authors/{id}",
    params(("id" = i32, Path, description = "Author id")),
    responses(
        (status = 200, description = "The author", body = Author),
        (status = 404, description = "Author not found", body = crate::api::error::ErrorBody)
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Author>, DomainError> {
    let id: i32 = id.parse().map_err(|_| DomainError::NotFound("Author"))?;

    state
        .author_repo
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or(DomainError::NotFound("Author"))
}
