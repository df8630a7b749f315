//! Repository implementations using SeaORM

/// Keeps `IN (...)` lists and multi-row inserts under SQLite's bound-parameter limit.
const ID_CHUNK: usize = 500;

pub mod author_repository;
pub mod book_repository;

pub use author_repository::SeaOrmAuthorRepository;
pub use book_repository::SeaOrmBookRepository;
