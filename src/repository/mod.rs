//! Repository layer: persistence of books

pub mod books;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::book::{Book, BookFields, Etag},
};

/// Document store for books with auto-incrementing ids.
///
/// Writes are compare-and-swap on the etag; the store never assigns etags itself.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books ordered by id
    async fn list(&self) -> AppResult<Vec<Book>>;

    /// Book by id
    async fn get(&self, id: i64) -> AppResult<Option<Book>>;

    /// Persist a new book under a fresh id
    async fn insert(&self, etag: Etag, fields: &BookFields) -> AppResult<Book>;

    /// Overwrite `book` (fields, lending and etag) if the stored etag is still `expected`.
    ///
    /// Returns `None` when the book is gone or has been changed in the meantime.
    async fn replace(&self, book: &Book, expected: Etag) -> AppResult<Option<Book>>;

    /// Remove a book permanently. Returns whether it existed.
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

/// Main repository struct holding the configured stores
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
}

impl Repository {
    /// Repository backed by PostgreSQL
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::PgBookStore::new(pool)),
        }
    }

    /// Repository kept in process memory
    pub fn in_memory() -> Self {
        Self {
            books: Arc::new(memory::MemoryBookStore::default()),
        }
    }
}
