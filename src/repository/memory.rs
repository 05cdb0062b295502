//! In-memory book store, used when no database is configured and in tests

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::book::{Book, BookFields, Etag},
};

use super::BookStore;

#[derive(Default)]
struct State {
    last_id: i64,
    books: BTreeMap<i64, Book>,
}

#[derive(Default)]
pub struct MemoryBookStore {
    state: RwLock<State>,
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn list(&self) -> AppResult<Vec<Book>> {
        Ok(self.state.read().await.books.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> AppResult<Option<Book>> {
        Ok(self.state.read().await.books.get(&id).cloned())
    }

    async fn insert(&self, etag: Etag, fields: &BookFields) -> AppResult<Book> {
        let mut state = self.state.write().await;
        state.last_id += 1;

        let book = Book {
            id: state.last_id,
            etag,
            fields: fields.clone(),
            lending: None,
        };
        state.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn replace(&self, book: &Book, expected: Etag) -> AppResult<Option<Book>> {
        let mut state = self.state.write().await;
        match state.books.get_mut(&book.id) {
            Some(stored) if stored.etag == expected => {
                *stored = book.clone();
                Ok(Some(book.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        Ok(self.state.write().await.books.remove(&id).is_some())
    }
}
