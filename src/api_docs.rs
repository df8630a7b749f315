use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::books::list_books,
        api::books::create_book,
        api::books::get_book,
        api::books::update_book,
        api::books::delete_book,
        api::author::list_authors,
        api::author::create_author,
        api::author::get_author,
    ),
    components(
        schemas(
            crate::models::book::Book,
            crate::domain::BookRecord,
            crate::domain::Author,
            api::books::CreateBookRequest,
            api::books::UpdateBookRequest,
            api::author::CreateAuthorRequest,
            api::error::ErrorBody,
        )
    ),
    tags(
        (name = "book-catalog", description = "Books and authors API. Updates take a singular \
            `author` free-text field, while creation takes an `authors` id list.")
    )
)]
pub struct ApiDoc;
