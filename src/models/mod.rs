pub mod author;
pub mod book;
pub mod book_authors;

pub use book::Book;
