//! Book (catalog entry) model, lending sub-resource and request/response types.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Opaque 32-bit version token, regenerated on every mutation of a book
pub type Etag = u32;

/// Generate a fresh random etag
pub fn fresh_etag() -> Etag {
    rand::random::<Etag>()
}

/// Active lending of a book. A book is either not lent (`None`) or carries all three fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Lending {
    /// Borrower identity (e.g. `alice@school`)
    pub user: String,
    /// Start of the lending; kept when the same borrower renews
    pub since: DateTime<Utc>,
    /// Loan duration in days (informational)
    pub days: i32,
}

impl Lending {
    /// Whether the loan period has elapsed at `now`
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now > self.since + Duration::days(i64::from(self.days))
    }
}

/// Bibliographic fields of a book, trimmed and validated
#[derive(Debug, Clone, PartialEq, Eq, Default, Validate)]
pub struct BookFields {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub authors: String,
    pub topic: String,
    pub keywords: String,
    pub signature: String,
    pub location: String,
    /// Normalized ISBN-10 or ISBN-13, or empty
    pub isbn: String,
    pub year: Option<i32>,
    pub publisher: String,
    pub place_of_publication: String,
    pub volume: String,
    pub edition: String,
    pub lendable: bool,
}

/// Persisted book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub etag: Etag,
    pub fields: BookFields,
    pub lending: Option<Lending>,
}

impl Book {
    /// A book is lent iff it has a borrower
    pub fn is_lent(&self) -> bool {
        self.lending.is_some()
    }
}

/// Row structure for database queries
#[derive(Debug, FromRow)]
pub struct BookRow {
    pub id: i64,
    pub etag: i64,
    pub title: String,
    pub authors: String,
    pub topic: String,
    pub keywords: String,
    pub signature: String,
    pub location: String,
    pub isbn: String,
    pub year: Option<i32>,
    pub publisher: String,
    pub place_of_publication: String,
    pub volume: String,
    pub edition: String,
    pub lendable: bool,
    pub lending_user: Option<String>,
    pub lending_since: Option<DateTime<Utc>>,
    pub lending_days: Option<i32>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        let lending = match (row.lending_user, row.lending_since, row.lending_days) {
            (Some(user), Some(since), Some(days)) => Some(Lending { user, since, days }),
            _ => None,
        };

        Self {
            id: row.id,
            // Etags are stored widened to BIGINT
            etag: row.etag as Etag,
            fields: BookFields {
                title: row.title,
                authors: row.authors,
                topic: row.topic,
                keywords: row.keywords,
                signature: row.signature,
                location: row.location,
                isbn: row.isbn,
                year: row.year,
                publisher: row.publisher,
                place_of_publication: row.place_of_publication,
                volume: row.volume,
                edition: row.edition,
                lendable: row.lendable,
            },
            lending,
        }
    }
}

/// Create / update book request.
///
/// Numeric fields are accepted as numbers or numeric strings. Unknown fields
/// (such as `_csrf`) are ignored.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    pub title: Option<String>,
    pub authors: Option<String>,
    pub topic: Option<String>,
    pub keywords: Option<String>,
    pub signature: Option<String>,
    pub location: Option<String>,
    pub isbn: Option<String>,
    #[schema(value_type = Option<i32>)]
    pub year: Option<serde_json::Value>,
    pub publisher: Option<String>,
    pub place_of_publication: Option<String>,
    pub volume: Option<String>,
    pub edition: Option<String>,
    pub lendable: Option<bool>,
    /// Expected current etag (optimistic concurrency)
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    #[schema(value_type = Option<u32>)]
    pub etag: Option<Etag>,
}

/// Create / update lending request
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LendingInput {
    /// Borrower identity
    pub user: Option<String>,
    /// Loan duration in days; defaults when missing or not a positive integer
    #[schema(value_type = Option<i32>)]
    pub days: Option<serde_json::Value>,
    /// Expected current etag (optimistic concurrency)
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    #[schema(value_type = Option<u32>)]
    pub etag: Option<Etag>,
}

/// Validated lending request
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct LendingRequest {
    #[validate(email(message = "Borrower must look like user@host"))]
    pub user: String,
    #[validate(range(min = 1, message = "Days must be positive"))]
    pub days: i32,
}

/// Lending representation. All fields are null when the book is available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LendingView {
    pub user: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub days: Option<i32>,
    /// Derived: the loan period has elapsed
    pub overdue: bool,
}

impl LendingView {
    pub fn new(lending: Option<&Lending>, now: DateTime<Utc>) -> Self {
        match lending {
            Some(lending) => Self {
                user: Some(lending.user.clone()),
                since: Some(lending.since),
                days: Some(lending.days),
                overdue: lending.is_overdue(now),
            },
            None => Self {
                user: None,
                since: None,
                days: None,
                overdue: false,
            },
        }
    }
}

/// Book representation returned by the API.
///
/// `lending` is omitted for requesters without the lend capability.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
    pub id: i64,
    pub etag: Etag,
    pub title: String,
    pub authors: String,
    pub topic: String,
    pub keywords: String,
    pub signature: String,
    pub location: String,
    pub isbn: String,
    pub year: Option<i32>,
    pub publisher: String,
    pub place_of_publication: String,
    pub volume: String,
    pub edition: String,
    pub lendable: bool,
    pub lent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lending: Option<LendingView>,
}

impl BookView {
    /// Build the representation, keeping lending details only if `show_lending`
    pub fn new(book: &Book, show_lending: bool, now: DateTime<Utc>) -> Self {
        let fields = &book.fields;
        Self {
            id: book.id,
            etag: book.etag,
            title: fields.title.clone(),
            authors: fields.authors.clone(),
            topic: fields.topic.clone(),
            keywords: fields.keywords.clone(),
            signature: fields.signature.clone(),
            location: fields.location.clone(),
            isbn: fields.isbn.clone(),
            year: fields.year,
            publisher: fields.publisher.clone(),
            place_of_publication: fields.place_of_publication.clone(),
            volume: fields.volume.clone(),
            edition: fields.edition.clone(),
            lendable: fields.lendable,
            lent: book.is_lent(),
            lending: show_lending.then(|| LendingView::new(book.lending.as_ref(), now)),
        }
    }
}

/// All books keyed by id
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(transparent)]
pub struct BookIndex(pub BTreeMap<i64, BookView>);

/// XOR of all book etags: an order-independent freshness token for the collection
pub fn collection_etag<'a>(books: impl IntoIterator<Item = &'a Book>) -> Etag {
    books.into_iter().fold(0, |acc, book| acc ^ book.etag)
}
