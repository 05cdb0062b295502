//! Book catalog and lending management.
//!
//! Every write replaces the book under a fresh etag with a compare-and-swap
//! against the etag that was read, so of two racing writers only one wins.

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{collection_etag, fresh_etag, Book, BookIndex, BookInput, BookView, Etag, Lending, LendingInput},
        identity::Identity,
    },
    repository::Repository,
};

use super::validation::{prepare_book, prepare_lending};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    default_days: i32,
}

/// Fail with a conflict if the client expected another version
fn check_etag(book: &Book, expected: Option<Etag>) -> AppResult<()> {
    match expected {
        Some(expected) if expected != book.etag => Err(AppError::Conflict(format!(
            "Book {} has been modified (etag {} expected, current {})",
            book.id, expected, book.etag
        ))),
        _ => Ok(()),
    }
}

/// Etag different from `previous`
fn next_etag(previous: Etag) -> Etag {
    loop {
        let etag = fresh_etag();
        if etag != previous {
            return etag;
        }
    }
}

impl BooksService {
    pub fn new(repository: Repository, default_days: i32) -> Self {
        Self {
            repository,
            default_days,
        }
    }

    async fn find(&self, id: i64) -> AppResult<Book> {
        self.repository
            .books
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Persist `book` under a fresh etag, provided nobody changed it since it was read
    async fn store(&self, mut book: Book) -> AppResult<Book> {
        let read_etag = book.etag;
        book.etag = next_etag(read_etag);

        match self.repository.books.replace(&book, read_etag).await? {
            Some(stored) => Ok(stored),
            None => {
                // Lost a race: tell apart a concurrent delete from a concurrent update
                self.find(book.id).await?;
                Err(AppError::Conflict(format!(
                    "Book {} was modified concurrently",
                    book.id
                )))
            }
        }
    }

    /// All books visible to `identity` and the collection etag
    pub async fn list(&self, identity: &Identity) -> AppResult<(BookIndex, Etag)> {
        let books = self.repository.books.list().await?;
        let now = Utc::now();

        let index = books
            .iter()
            .map(|book| (book.id, BookView::new(book, identity.can_lend(), now)))
            .collect();

        Ok((BookIndex(index), collection_etag(&books)))
    }

    pub async fn get(&self, identity: &Identity, id: i64) -> AppResult<BookView> {
        let book = self.find(id).await?;
        Ok(BookView::new(&book, identity.can_lend(), Utc::now()))
    }

    pub async fn create(&self, identity: &Identity, input: BookInput) -> AppResult<BookView> {
        identity.require_modify()?;

        let fields = prepare_book(input)?;
        let book = self.repository.books.insert(fresh_etag(), &fields).await?;

        tracing::info!(book_id = book.id, user = %identity.user, "Created book");
        Ok(BookView::new(&book, identity.can_lend(), Utc::now()))
    }

    /// Replace the bibliographic fields of a book. Lending state is kept.
    pub async fn update(
        &self,
        identity: &Identity,
        id: i64,
        input: BookInput,
        expected: Option<Etag>,
    ) -> AppResult<BookView> {
        identity.require_modify()?;

        let mut book = self.find(id).await?;
        check_etag(&book, expected.or(input.etag))?;

        book.fields = prepare_book(input)?;
        let book = self.store(book).await?;

        tracing::info!(book_id = book.id, user = %identity.user, "Updated book");
        Ok(BookView::new(&book, identity.can_lend(), Utc::now()))
    }

    pub async fn delete(&self, identity: &Identity, id: i64) -> AppResult<()> {
        identity.require_delete()?;

        if !self.repository.books.delete(id).await? {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        tracing::info!(book_id = id, user = %identity.user, "Deleted book");
        Ok(())
    }

    /// Current lending of a book
    pub async fn get_lending(&self, identity: &Identity, id: i64) -> AppResult<Book> {
        identity.require_lend()?;

        let book = self.find(id).await?;
        if !book.is_lent() {
            return Err(AppError::LendingNotFound(format!("Book {} is not lent", id)));
        }
        Ok(book)
    }

    /// Lend a book, or renew the lending of its current borrower.
    ///
    /// `since` only moves when the borrower changes. A book lent to someone
    /// else must be returned first.
    pub async fn lend(
        &self,
        identity: &Identity,
        id: i64,
        input: LendingInput,
        expected: Option<Etag>,
    ) -> AppResult<Book> {
        identity.require_lend()?;

        let mut book = self.find(id).await?;
        check_etag(&book, expected.or(input.etag))?;

        if !book.fields.lendable {
            return Err(AppError::PreconditionFailed(format!("Book {} is not lendable", id)));
        }

        let borrower = input.user.as_deref().map(str::trim);
        if let Some(lending) = &book.lending {
            if borrower != Some(lending.user.as_str()) {
                return Err(AppError::PreconditionFailed(format!(
                    "Book {} is lent to another user",
                    id
                )));
            }
        }

        let request = prepare_lending(&input, self.default_days)?;
        let since = book
            .lending
            .as_ref()
            .map_or_else(Utc::now, |lending| lending.since);

        book.lending = Some(Lending {
            user: request.user,
            since,
            days: request.days,
        });
        let book = self.store(book).await?;

        tracing::info!(book_id = id, borrower = ?book.lending.as_ref().map(|l| &l.user), user = %identity.user, "Lent book");
        Ok(book)
    }

    /// Return a lent book
    pub async fn return_book(&self, identity: &Identity, id: i64, expected: Option<Etag>) -> AppResult<Book> {
        identity.require_lend()?;

        let mut book = self.find(id).await?;
        if !book.is_lent() {
            return Err(AppError::LendingNotFound(format!("Book {} is not lent", id)));
        }
        check_etag(&book, expected)?;

        book.lending = None;
        let book = self.store(book).await?;

        tracing::info!(book_id = id, user = %identity.user, "Returned book");
        Ok(book)
    }
}
