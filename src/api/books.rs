//! Book API handlers

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::Book;
use crate::services::book_service::{self, ListBooksQuery};

/// Sent back whenever an update uses the singular `author` field.
const AUTHOR_FIELD_WARNING: &str = "299 - \"'author' sets the free-text author credit only; \
     author associations are given as 'authors' (ids) when the book is created\"";

/// Create request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookRequest {
    #[schema(example = "Dune")]
    pub title: String,
    /// Ids of existing authors, at least one
    #[schema(example = json!([1]))]
    pub authors: Vec<i32>,
    #[schema(example = "1965-08-01")]
    pub publish_date: String,
    /// Exactly 13 digits, unique across books
    #[schema(example = "9780441013593")]
    pub isbn: String,
    #[schema(example = 12.99)]
    pub price: f64,
}

/// Partial update body; absent fields keep their value.
///
/// Note the singular `author`: it is a free-text credit stored on the book,
/// unlike the `authors` id list used on create.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    /// Exactly 13 digits, unique among other books
    pub isbn: Option<String>,
    pub is_available: Option<bool>,
}

/// Unparseable ids resolve to nothing, same as ids with no row.
fn parse_book_id(raw: &str) -> Result<i32, DomainError> {
    raw.parse().map_err(|_| DomainError::NotFound("Book"))
}

#[utoipa::path(
    get,
    path = "/api/books",
    params(ListBooksQuery),
    responses(
        (status = 200, description = "Matching books", body = [Book]),
        (status = 400, description = "Unreadable query string", body = crate::api::error::ErrorBody),
        (status = 422, description = "Invalid filter", body = crate::api::error::ErrorBody)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    query: Result<Query<ListBooksQuery>, QueryRejection>,
) -> Result<Json<Vec<Book>>, DomainError> {
    let Query(query) = query?;
    let books = book_service::list_books(&state, query).await?;
    Ok(Json(books))
}

#[utoipa::path(
    post,
    path = "/api/books",
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Malformed JSON", body = crate::api::error::ErrorBody),
        (status = 422, description = "Validation failed", body = crate::api::error::ErrorBody)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, DomainError> {
    let Json(body) = payload?;
    let book = book_service::create_book(&state, &body).await?;
    let location = format!("/api/books/{}", book.id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(book)))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "The book", body = Book),
        (status = 404, description = "Book not found", body = crate::api::error::ErrorBody)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Book>, DomainError> {
    let id = parse_book_id(&id)?;
    let book = book_service::get_book(&state, id).await?;
    Ok(Json(book))
}

#[utoipa::path(
    put,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Updated book row", body = crate::domain::BookRecord),
        (status = 404, description = "Book not found", body = crate::api::error::ErrorBody),
        (status = 422, description = "Validation failed", body = crate::api::error::ErrorBody)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, DomainError> {
    let id = parse_book_id(&id)?;
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            // An unknown book is reported before a malformed body
            book_service::ensure_book_exists(&state, id).await?;
            return Err(rejection.into());
        }
    };

    let book = book_service::update_book(&state, id, &body).await?;

    let mut response = Json(book).into_response();
    if body.get("author").is_some_and(|v| !v.is_null()) {
        response.headers_mut().insert(
            header::WARNING,
            HeaderValue::from_static(AUTHOR_FIELD_WARNING),
        );
    }

    Ok(response)
}

#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found", body = crate::api::error::ErrorBody)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, DomainError> {
    let id = parse_book_id(&id)?;
    book_service::delete_book(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
