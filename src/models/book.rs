use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{BookRecord, BookWithAuthors};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    /// Free-text author credit, only written by partial updates
    pub author: Option<String>,
    pub publish_date: String,
    #[sea_orm(unique)]
    pub isbn: String,
    pub price: f64,
    #[sea_orm(default_value = true)]
    pub is_available: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::book_authors::Entity")]
    BookAuthors,
}

impl Related<super::book_authors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookAuthors.def()
    }
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        super::book_authors::Relation::Author.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::book_authors::Relation::Book.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for BookRecord {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            author: model.author,
            publish_date: model.publish_date,
            isbn: model.isbn,
            price: model.price,
            is_available: model.is_available,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

// DTO for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Dune")]
    pub title: String,
    #[schema(example = "1965-08-01")]
    pub publish_date: String,
    #[schema(example = "9780441013593")]
    pub isbn: String,
    #[schema(example = 12.99)]
    pub price: f64,
    /// Names of the associated authors
    #[schema(example = json!(["Frank Herbert"]))]
    pub authors: Vec<String>,
}

impl From<BookWithAuthors> for Book {
    fn from(entry: BookWithAuthors) -> Self {
        let BookWithAuthors { book, authors } = entry;
        Self {
            id: book.id,
            title: book.title,
            publish_date: book.publish_date,
            isbn: book.isbn,
            price: book.price,
            authors,
        }
    }
}
