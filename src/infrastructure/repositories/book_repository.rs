//! SeaORM implementation of BookRepository

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};

use super::ID_CHUNK;
use crate::domain::validation::taken_message;
use crate::domain::{
    BookChanges, BookFilter, BookRecord, BookRepository, DomainError, NewBook, SortDirection,
};
use crate::models::book::{ActiveModel, Column, Entity as BookEntity};
use crate::models::{author, book_authors};

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// A unique-index hit on `books.isbn` is a validation failure, not a crash.
fn isbn_conflict(err: DbErr) -> DomainError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            DomainError::invalid("isbn", taken_message("isbn"))
        }
        _ => DomainError::Database(err),
    }
}

/// `%term%` with LIKE wildcards in `term` matched literally.
fn contains_literal(term: &str) -> LikeExpr {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    LikeExpr::new(format!("%{}%", escaped)).escape('\\')
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_all(&self, filter: BookFilter) -> Result<Vec<BookRecord>, DomainError> {
        let mut query = BookEntity::find();

        // Apply filters
        if let Some(search) = &filter.search
            && !search.is_empty()
        {
            let title = Expr::col((BookEntity, Column::Title));
            query = query.filter(title.like(contains_literal(search)));
        }

        if let Some(min_price) = filter.min_price {
            query = query.filter(Column::Price.gte(min_price));
        }

        if let Some(max_price) = filter.max_price {
            query = query.filter(Column::Price.lte(max_price));
        }

        // Apply sorting, id breaks ties
        query = match filter.sort {
            Some(SortDirection::Asc) => query.order_by_asc(Column::Price),
            Some(SortDirection::Desc) => query.order_by_desc(Column::Price),
            None => query,
        };

        let books = query.order_by_asc(Column::Id).all(&self.db).await?;

        Ok(books.into_iter().map(BookRecord::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<BookRecord>, DomainError> {
        let book = BookEntity::find_by_id(id).one(&self.db).await?;
        Ok(book.map(BookRecord::from))
    }

    async fn isbn_exists(&self, isbn: &str, excluding: Option<i32>) -> Result<bool, DomainError> {
        let mut query = BookEntity::find().filter(Column::Isbn.eq(isbn));

        if let Some(id) = excluding {
            query = query.filter(Column::Id.ne(id));
        }

        Ok(query.count(&self.db).await? > 0)
    }

    async fn create(&self, book: NewBook) -> Result<BookRecord, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.db.begin().await?;

        // Re-check inside the transaction; the caller's check ran without a lock
        let mut found = 0;
        for chunk in book.author_ids.chunks(ID_CHUNK) {
            found += author::Entity::find()
                .filter(author::Column::Id.is_in(chunk.to_vec()))
                .count(&txn)
                .await?;
        }
        if found != book.author_ids.len() as u64 {
            return Err(DomainError::invalid(
                "authors",
                "The selected authors are invalid.",
            ));
        }

        let new_book = ActiveModel {
            title: Set(book.title),
            author: Set(None),
            publish_date: Set(book.publish_date),
            isbn: Set(book.isbn),
            price: Set(book.price),
            is_available: Set(true),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = new_book.insert(&txn).await.map_err(isbn_conflict)?;

        for chunk in book.author_ids.chunks(ID_CHUNK) {
            let links = chunk.iter().map(|&author_id| book_authors::ActiveModel {
                book_id: Set(model.id),
                author_id: Set(author_id),
            });
            book_authors::Entity::insert_many(links)
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;

        tracing::debug!(book_id = model.id, "book row and author links committed");
        Ok(BookRecord::from(model))
    }

    async fn update(&self, id: i32, changes: BookChanges) -> Result<BookRecord, DomainError> {
        let existing = BookEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound("Book"))?;

        if changes.is_empty() {
            return Ok(BookRecord::from(existing));
        }

        let mut active: ActiveModel = existing.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(author) = changes.author {
            active.author = Set(Some(author));
        }
        if let Some(isbn) = changes.isbn {
            active.isbn = Set(isbn);
        }
        if let Some(is_available) = changes.is_available {
            active.is_available = Set(is_available);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let result = active.update(&self.db).await.map_err(isbn_conflict)?;
        Ok(BookRecord::from(result))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        book_authors::Entity::delete_many()
            .filter(book_authors::Column::BookId.eq(id))
            .exec(&txn)
            .await?;

        let result = BookEntity::delete_by_id(id).exec(&txn).await?;

        if result.rows_affected == 0 {
            // Dropping the transaction rolls it back
            return Err(DomainError::NotFound("Book"));
        }

        txn.commit().await?;
        Ok(())
    }
}
