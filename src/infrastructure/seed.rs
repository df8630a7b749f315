use crate::domain::{DomainError, NewBook};
use crate::infrastructure::AppState;

/// Insert demo authors and books into an empty catalog.
///
/// Returns `false` without touching anything when authors already exist.
/// "Frank Herbert" is always author 1 on a fresh database.
pub async fn seed_demo_data(state: &AppState) -> Result<bool, DomainError> {
    if !state.author_repo.find_all().await?.is_empty() {
        return Ok(false);
    }

    let mut author_ids = Vec::new();
    for name in ["Frank Herbert", "J.R.R. Tolkien", "Isaac Asimov"] {
        let author = state.author_repo.create(name.to_owned()).await?;
        author_ids.push(author.id);
    }

    let books = [
        ("Dune Messiah", "1969-10-15", "9780593098233", 9.99, author_ids[0]),
        ("The Hobbit", "1937-09-21", "9780547928227", 14.99, author_ids[1]),
        ("Foundation", "1951-06-01", "9780553293357", 8.99, author_ids[2]),
    ];

    for (title, publish_date, isbn, price, author_id) in books {
        state
            .book_repo
            .create(NewBook {
                title: title.to_owned(),
                publish_date: publish_date.to_owned(),
                isbn: isbn.to_owned(),
                price,
                author_ids: vec![author_id],
            })
            .await?;
    }

    Ok(true)
}
