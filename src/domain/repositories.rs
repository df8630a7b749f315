//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use super::DomainError;

/// Price ordering for book listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// Filter criteria for book queries, all combined with AND
#[derive(Debug, Default, Clone)]
pub struct BookFilter {
    /// Substring matched against the title
    pub search: Option<String>,
    /// Inclusive lower price bound
    pub min_price: Option<f64>,
    /// Inclusive upper price bound
    pub max_price: Option<f64>,
    /// Order by price; id order when absent
    pub sort: Option<SortDirection>,
}

/// A stored book row, exactly as persisted
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BookRecord {
    pub id: i32,
    pub title: String,
    /// Free-text author credit (set through the update `author` field)
    pub author: Option<String>,
    pub publish_date: String,
    pub isbn: String,
    pub price: f64,
    pub is_available: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A book together with its author names, resolved once
#[derive(Debug, Clone, PartialEq)]
pub struct BookWithAuthors {
    pub book: BookRecord,
    pub authors: Vec<String>,
}

/// Input for creating a book; `author_ids` must be non-empty and distinct
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub publish_date: String,
    pub isbn: String,
    pub price: f64,
    pub author_ids: Vec<i32>,
}

/// Partial update: `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub is_available: Option<bool>,
}

impl BookChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.isbn.is_none()
            && self.is_available.is_none()
    }
}

/// Author data for API responses
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Author {
    pub id: i32,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Repository trait for Author entity
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Find all authors
    async fn find_all(&self) -> Result<Vec<Author>, DomainError>;

    /// Find an author by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Author>, DomainError>;

    /// Return the subset of `ids` that match no author
    async fn find_missing(&self, ids: &[i32]) -> Result<Vec<i32>, DomainError>;

    /// Authors attached to a book, ordered by author id
    async fn list_for_book(&self, book_id: i32) -> Result<Vec<Author>, DomainError>;

    /// Author names for many books in one pass, keyed by book id
    async fn names_for_books(
        &self,
        book_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<String>>, DomainError>;

    /// Create a new author
    async fn create(&self, name: String) -> Result<Author, DomainError>;
}

/// Repository trait for Book entity
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Find all books matching the filter criteria
    async fn find_all(&self, filter: BookFilter) -> Result<Vec<BookRecord>, DomainError>;

    /// Find a single book by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<BookRecord>, DomainError>;

    /// Whether another book already uses `isbn`
    async fn isbn_exists(&self, isbn: &str, excluding: Option<i32>) -> Result<bool, DomainError>;

    /// Insert the book and its author links in one transaction
    async fn create(&self, book: NewBook) -> Result<BookRecord, DomainError>;

    /// Apply a partial update
    async fn update(&self, id: i32, changes: BookChanges) -> Result<BookRecord, DomainError>;

    /// Delete a book and its author links
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}
