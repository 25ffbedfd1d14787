//! Book catalogue operations. Reads are open to any authenticated caller;
//! update and delete are owner-only.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::auth::ownership::{ensure_can_mutate, Mutation};
use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};
use crate::extractors::current_user::CurrentUser;
use crate::logging::security;
use crate::repos::books::{self, Book};
use crate::state::app_state::AppState;
use crate::store::Collection;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

const MISSING_FIELDS_MESSAGE: &str = "All fields are required: title, author, genre, publishedYear";

/// Create/update body. Everything is optional on the wire so that the
/// validation messages, not the JSON parser, decide what is reported.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub published_year: Option<Value>,
}

/// Fields of a book after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BookFields {
    title: String,
    author: String,
    genre: String,
    published_year: u32,
}

impl BookInput {
    fn validate(self) -> Result<BookFields, DomainError> {
        let missing = || DomainError::validation(ValidationKind::MissingBookFields, MISSING_FIELDS_MESSAGE);

        let title = non_empty(self.title).ok_or_else(missing)?;
        let author = non_empty(self.author).ok_or_else(missing)?;
        let genre = non_empty(self.genre).ok_or_else(missing)?;
        let year = match self.published_year {
            Some(v) if !is_blank(&v) => v,
            _ => return Err(missing()),
        };

        let published_year = whole_year(&year).ok_or_else(|| {
            DomainError::validation(
                ValidationKind::InvalidPublishedYear,
                "Published year must be a valid number",
            )
        })?;

        Ok(BookFields {
            title,
            author,
            genre,
            published_year,
        })
    }
}

/// Non-negative integer that fits `u32`. `2020.0` is the same number as
/// `2020` on the wire and is accepted.
fn whole_year(value: &Value) -> Option<u32> {
    if let Some(y) = value.as_u64() {
        return u32::try_from(y).ok();
    }
    let y = value.as_f64()?;
    if y.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&y) {
        Some(y as u32)
    } else {
        None
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.is_empty())
}

/// `null`, `false`, `0` and `""` count as not provided.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Raw `?genre=&page=&limit=` query. Numbers are parsed here so a bad
/// value yields the pagination message instead of a query parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub genre: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_books: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookPage {
    pub books: Vec<Book>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub books: Vec<Book>,
    pub count: usize,
}

fn parse_positive(raw: Option<&str>, default: u64) -> Result<u64, DomainError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(DomainError::validation(
            ValidationKind::InvalidPagination,
            "Page and limit must be positive integers",
        )),
    }
}

fn filter_by_genre(books: Vec<Book>, genre: Option<&str>) -> Vec<Book> {
    match genre.filter(|g| !g.is_empty()) {
        Some(genre) => books.into_iter().filter(|b| b.genre_matches(genre)).collect(),
        None => books,
    }
}

/// Slice `books` to one page and describe where it sits.
fn paginate(books: Vec<Book>, page: u64, limit: u64) -> BookPage {
    let total = books.len() as u64;
    let start = (page - 1).saturating_mul(limit);
    let end = start.saturating_add(limit);

    let pagination = Pagination {
        current_page: page,
        total_pages: total.div_ceil(limit),
        total_books: total,
        has_next_page: end < total,
        has_prev_page: start > 0,
    };

    let skip = usize::try_from(start).unwrap_or(usize::MAX);
    let take = usize::try_from(limit).unwrap_or(usize::MAX);
    BookPage {
        books: books.into_iter().skip(skip).take(take).collect(),
        pagination,
    }
}

pub async fn list_books(state: &AppState, query: ListQuery) -> Result<BookPage, AppError> {
    let page = parse_positive(query.page.as_deref(), DEFAULT_PAGE)?;
    let limit = parse_positive(query.limit.as_deref(), DEFAULT_LIMIT)?;

    let all = books::list_books(state.store()).await?;
    Ok(paginate(
        filter_by_genre(all, query.genre.as_deref()),
        page,
        limit,
    ))
}

pub async fn search_books(state: &AppState, genre: Option<&str>) -> Result<SearchResult, AppError> {
    let genre = genre.filter(|g| !g.is_empty()).ok_or_else(|| {
        DomainError::validation(ValidationKind::MissingGenre, "Genre parameter is required")
    })?;

    let matches = filter_by_genre(books::list_books(state.store()).await?, Some(genre));
    Ok(SearchResult {
        count: matches.len(),
        books: matches,
    })
}

pub async fn get_book(state: &AppState, book_id: &str) -> Result<Book, AppError> {
    books::find_book_by_id(state.store(), book_id)
        .await?
        .ok_or_else(|| book_not_found().into())
}

pub async fn create_book(
    state: &AppState,
    caller: &CurrentUser,
    input: BookInput,
) -> Result<Book, AppError> {
    let fields = input.validate()?;

    let book = Book {
        id: Uuid::new_v4().to_string(),
        title: fields.title,
        author: fields.author,
        genre: fields.genre,
        published_year: fields.published_year,
        user_id: caller.id.clone(),
        created_at: OffsetDateTime::now_utc(),
        updated_at: None,
    };

    let _guard = state.locks.acquire(Collection::Books).await;
    let book = books::insert_book(state.store(), book).await?;
    info!(book_id = %book.id, user_id = %caller.id, "Book created");
    Ok(book)
}

/// 404, then ownership, then payload validation; nothing is written
/// unless all three pass.
pub async fn update_book(
    state: &AppState,
    caller: &CurrentUser,
    book_id: &str,
    input: BookInput,
) -> Result<Book, AppError> {
    let _guard = state.locks.acquire(Collection::Books).await;

    let mut book = books::find_book_by_id(state.store(), book_id)
        .await?
        .ok_or_else(book_not_found)?;
    authorize(caller, &book, Mutation::Update)?;
    let fields = input.validate()?;

    book.title = fields.title;
    book.author = fields.author;
    book.genre = fields.genre;
    book.published_year = fields.published_year;
    book.updated_at = Some(OffsetDateTime::now_utc());

    if !books::replace_book(state.store(), &book).await? {
        return Err(book_not_found().into());
    }
    info!(book_id = %book.id, user_id = %caller.id, "Book updated");
    Ok(book)
}

pub async fn delete_book(state: &AppState, caller: &CurrentUser, book_id: &str) -> Result<(), AppError> {
    let _guard = state.locks.acquire(Collection::Books).await;

    let book = books::find_book_by_id(state.store(), book_id)
        .await?
        .ok_or_else(book_not_found)?;
    authorize(caller, &book, Mutation::Delete)?;

    books::remove_book(state.store(), book_id)
        .await?
        .ok_or_else(book_not_found)?;
    info!(book_id, user_id = %caller.id, "Book deleted");
    Ok(())
}

fn authorize(caller: &CurrentUser, book: &Book, mutation: Mutation) -> Result<(), DomainError> {
    ensure_can_mutate(caller, book, mutation).inspect_err(|_| {
        security::ownership_denied(&caller.id, &book.id, mutation.verb());
    })
}

fn book_not_found() -> DomainError {
    DomainError::not_found(NotFoundKind::Book, "Book not found")
}
