//! SeaORM implementation of AuthorRepository

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use super::ID_CHUNK;
use crate::domain::{Author, AuthorRepository, DomainError};
use crate::models::author::{ActiveModel, Column, Entity as AuthorEntity, Model};
use crate::models::book_authors;

/// SeaORM-based implementation of AuthorRepository
pub struct SeaOrmAuthorRepository {
    db: DatabaseConnection,
}

impl SeaOrmAuthorRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<Model> for Author {
    fn from(a: Model) -> Self {
        Author {
            id: a.id,
            name: a.name,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[async_trait]
impl AuthorRepository for SeaOrmAuthorRepository {
    async fn find_all(&self) -> Result<Vec<Author>, DomainError> {
        let authors = AuthorEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(authors.into_iter().map(Author::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Author>, DomainError> {
        let author = AuthorEntity::find_by_id(id).one(&self.db).await?;
        Ok(author.map(Author::from))
    }

    async fn find_missing(&self, ids: &[i32]) -> Result<Vec<i32>, DomainError> {
        let mut known = HashSet::with_capacity(ids.len());

        for chunk in ids.chunks(ID_CHUNK) {
            let found: Vec<i32> = AuthorEntity::find()
                .select_only()
                .column(Column::Id)
                .filter(Column::Id.is_in(chunk.to_vec()))
                .into_tuple()
                .all(&self.db)
                .await?;
            known.extend(found);
        }

        Ok(ids.iter().copied().filter(|id| !known.contains(id)).collect())
    }

    async fn list_for_book(&self, book_id: i32) -> Result<Vec<Author>, DomainError> {
        let authors = AuthorEntity::find()
            .inner_join(book_authors::Entity)
            .filter(book_authors::Column::BookId.eq(book_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(authors.into_iter().map(Author::from).collect())
    }

    async fn names_for_books(
        &self,
        book_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<String>>, DomainError> {
        let mut names: HashMap<i32, Vec<String>> = HashMap::new();

        for chunk in book_ids.chunks(ID_CHUNK) {
            let rows: Vec<(i32, String)> = book_authors::Entity::find()
                .select_only()
                .column(book_authors::Column::BookId)
                .column(Column::Name)
                .inner_join(AuthorEntity)
                .filter(book_authors::Column::BookId.is_in(chunk.to_vec()))
                .order_by_asc(book_authors::Column::BookId)
                .order_by_asc(book_authors::Column::AuthorId)
                .into_tuple()
                .all(&self.db)
                .await?;

            for (book_id, name) in rows {
                names.entry(book_id).or_default().push(name);
            }
        }

        Ok(names)
    }

    async fn create(&self, name: String) -> Result<Author, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();

        let author = ActiveModel {
            name: Set(name),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = author.insert(&self.db).await?;

        Ok(Author::from(result))
    }
}
