//! Book Service - Pure business logic without HTTP layer
//!
//! Every operation takes the application state explicitly, validates its
//! input up front and only then touches the store.

use serde::Deserialize;
use serde_json::{Map, Value};
use utoipa::IntoParams;

use crate::domain::validation::{
    self, CREATE_BOOK_RULES, LIST_BOOKS_RULES, UPDATE_BOOK_RULES, as_boolean, as_date,
    as_digits, as_direction, as_ids, as_number, as_string, as_text,
};
use crate::domain::{
    BookChanges, BookFilter, BookRecord, BookWithAuthors, DomainError, NewBook, ValidationErrors,
};
use crate::infrastructure::AppState;
use crate::models::Book;

/// Query parameters accepted by the book listing
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListBooksQuery {
    /// Substring to look for in the title
    pub search: Option<String>,
    /// Inclusive lower price bound
    pub min_price: Option<String>,
    /// Inclusive upper price bound
    pub max_price: Option<String>,
    /// Price order: `asc` or `desc`
    pub sort: Option<String>,
}

impl ListBooksQuery {
    /// Validate the raw parameters; empty values are treated as absent.
    pub fn into_filter(self) -> Result<BookFilter, DomainError> {
        let input: Map<String, Value> = [
            ("search", self.search),
            ("min_price", self.min_price),
            ("max_price", self.max_price),
            ("sort", self.sort),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .filter(|v| !v.trim().is_empty())
                .map(|v| (key.to_string(), Value::String(v)))
        })
        .collect();

        validation::validate(&input, LIST_BOOKS_RULES).into_result()?;

        Ok(BookFilter {
            search: validation::optional(&input, "search", as_string),
            min_price: validation::optional(&input, "min_price", as_number),
            max_price: validation::optional(&input, "max_price", as_number),
            sort: validation::optional(&input, "sort", as_direction),
        })
    }
}

/// List books matching the query, with author names resolved in one batch
pub async fn list_books(state: &AppState, query: ListBooksQuery) -> Result<Vec<Book>, DomainError> {
    let filter = query.into_filter()?;

    tracing::info!(
        "List books - Filters: search={:?}, min_price={:?}, max_price={:?}, sort={:?}",
        filter.search,
        filter.min_price,
        filter.max_price,
        filter.sort
    );

    let books = state.book_repo.find_all(filter).await?;
    let ids: Vec<i32> = books.iter().map(|b| b.id).collect();
    let mut names = state.author_repo.names_for_books(&ids).await?;

    tracing::debug!("DB query returned {} books", books.len());

    Ok(books
        .into_iter()
        .map(|book| {
            let authors = names.remove(&book.id).unwrap_or_default();
            Book::from(BookWithAuthors { book, authors })
        })
        .collect())
}

/// Validate and create a book with its author associations
pub async fn create_book(state: &AppState, body: &Value) -> Result<Book, DomainError> {
    let body = validation::as_object(body)?;
    let mut errors = validation::validate(body, CREATE_BOOK_RULES);

    check_isbn_available(state, body, None, &mut errors).await?;

    if !errors.contains("authors")
        && let Some(ids) = validation::optional(body, "authors", as_ids)
    {
        let missing = state.author_repo.find_missing(&ids).await?;
        if !missing.is_empty() {
            let missing: Vec<String> = missing.iter().map(i32::to_string).collect();
            errors.add(
                "authors",
                format!("The selected authors are invalid: {}.", missing.join(", ")),
            );
        }
    }

    errors.into_result()?;

    let input = NewBook {
        title: validation::required(body, "title", as_text)?,
        publish_date: validation::required(body, "publish_date", as_date)?,
        isbn: validation::required(body, "isbn", as_digits)?,
        price: validation::required(body, "price", as_number)?,
        author_ids: validation::required(body, "authors", as_ids)?,
    };

    let book = state.book_repo.create(input).await?;
    tracing::info!(book_id = book.id, isbn = %book.isbn, "Book created");

    with_authors(state, book).await
}

/// Fetch one formatted book
pub async fn get_book(state: &AppState, id: i32) -> Result<Book, DomainError> {
    let book = state
        .book_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound("Book"))?;

    with_authors(state, book).await
}

/// Apply a partial update and return the stored row.
///
/// `author` here is the single free-text credit column; associations made
/// through `authors` on create are left untouched.
pub async fn update_book(state: &AppState, id: i32, body: &Value) -> Result<BookRecord, DomainError> {
    ensure_book_exists(state, id).await?;

    let body = validation::as_object(body)?;
    let mut errors = validation::validate(body, UPDATE_BOOK_RULES);

    check_isbn_available(state, body, Some(id), &mut errors).await?;

    errors.into_result()?;

    let changes = BookChanges {
        title: validation::optional(body, "title", as_text),
        author: validation::optional(body, "author", as_string),
        isbn: validation::optional(body, "isbn", as_digits),
        is_available: validation::optional(body, "is_available", as_boolean),
    };

    let book = state.book_repo.update(id, changes).await?;
    tracing::info!(book_id = id, "Book updated");

    Ok(book)
}

/// `NotFound` unless a book with `id` is stored
pub async fn ensure_book_exists(state: &AppState, id: i32) -> Result<(), DomainError> {
    match state.book_repo.find_by_id(id).await? {
        Some(_) => Ok(()),
        None => Err(DomainError::NotFound("Book")),
    }
}

/// Hard-delete a book and its author links
pub async fn delete_book(state: &AppState, id: i32) -> Result<(), DomainError> {
    state.book_repo.delete(id).await?;
    tracing::info!(book_id = id, "Book deleted");
    Ok(())
}

async fn with_authors(state: &AppState, book: BookRecord) -> Result<Book, DomainError> {
    let authors = state
        .author_repo
        .list_for_book(book.id)
        .await?
        .into_iter()
        .map(|a| a.name)
        .collect();

    Ok(Book::from(BookWithAuthors { book, authors }))
}

/// Adds the uniqueness error when a syntactically valid ISBN is already used.
async fn check_isbn_available(
    state: &AppState,
    body: &Map<String, Value>,
    excluding: Option<i32>,
    errors: &mut ValidationErrors,
) -> Result<(), DomainError> {
    if errors.contains("isbn") {
        return Ok(());
    }

    if let Some(isbn) = validation::optional(body, "isbn", as_digits)
        && state.book_repo.isbn_exists(&isbn, excluding).await?
    {
        errors.add("isbn", validation::taken_message("isbn"));
    }

    Ok(())
}
