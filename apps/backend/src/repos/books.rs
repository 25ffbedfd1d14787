//! Book repository functions over the record store.
//!
//! Writers must hold `Collection::Books` from `CollectionLocks`.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::ownership::Owned;
use crate::errors::domain::DomainError;
use crate::store::{self, Collection, RecordStore};

/// Persisted book record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub published_year: u32,
    /// Owning user id
    pub user_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

impl Owned for Book {
    const KIND_PLURAL: &'static str = "books";

    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

impl Book {
    /// Case-insensitive substring match on genre.
    pub fn genre_matches(&self, needle: &str) -> bool {
        self.genre.to_lowercase().contains(&needle.to_lowercase())
    }
}

pub async fn list_books(store: &dyn RecordStore) -> Result<Vec<Book>, DomainError> {
    Ok(store::read_all(store, Collection::Books).await?)
}

pub async fn find_book_by_id(
    store: &dyn RecordStore,
    book_id: &str,
) -> Result<Option<Book>, DomainError> {
    let books = list_books(store).await?;
    Ok(books.into_iter().find(|b| b.id == book_id))
}

pub async fn insert_book(store: &dyn RecordStore, book: Book) -> Result<Book, DomainError> {
    let mut books = list_books(store).await?;
    books.push(book.clone());
    store::write_all(store, Collection::Books, &books).await?;
    Ok(book)
}

/// Overwrite the record with `book.id` in place. Returns `false` if absent.
pub async fn replace_book(store: &dyn RecordStore, book: &Book) -> Result<bool, DomainError> {
    let mut books = list_books(store).await?;
    let Some(slot) = books.iter_mut().find(|b| b.id == book.id) else {
        return Ok(false);
    };
    *slot = book.clone();
    store::write_all(store, Collection::Books, &books).await?;
    Ok(true)
}

/// Remove the record with `book_id`, returning it if it existed.
pub async fn remove_book(
    store: &dyn RecordStore,
    book_id: &str,
) -> Result<Option<Book>, DomainError> {
    let mut books = list_books(store).await?;
    let Some(index) = books.iter().position(|b| b.id == book_id) else {
        return Ok(None);
    };
    let removed = books.remove(index);
    store::write_all(store, Collection::Books, &books).await?;
    Ok(Some(removed))
}
