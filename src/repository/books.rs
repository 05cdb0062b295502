//! Books repository for PostgreSQL

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::book::{Book, BookFields, BookRow, Etag},
};

use super::BookStore;

#[derive(Clone)]
pub struct PgBookStore {
    pool: Pool<Postgres>,
}

impl PgBookStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn list(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>("SELECT * FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn get(&self, id: i64) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Book::from))
    }

    async fn insert(&self, etag: Etag, fields: &BookFields) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            INSERT INTO books (
                etag, title, authors, topic, keywords, signature, location, isbn,
                year, publisher, place_of_publication, volume, edition, lendable
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(i64::from(etag))
        .bind(&fields.title)
        .bind(&fields.authors)
        .bind(&fields.topic)
        .bind(&fields.keywords)
        .bind(&fields.signature)
        .bind(&fields.location)
        .bind(&fields.isbn)
        .bind(fields.year)
        .bind(&fields.publisher)
        .bind(&fields.place_of_publication)
        .bind(&fields.volume)
        .bind(&fields.edition)
        .bind(fields.lendable)
        .fetch_one(&self.pool)
        .await?;

        Ok(Book::from(row))
    }

    async fn replace(&self, book: &Book, expected: Etag) -> AppResult<Option<Book>> {
        let fields = &book.fields;
        let lending = book.lending.as_ref();

        let row = sqlx::query_as::<_, BookRow>(
            r#"
            UPDATE books SET
                etag = $2, title = $3, authors = $4, topic = $5, keywords = $6,
                signature = $7, location = $8, isbn = $9, year = $10, publisher = $11,
                place_of_publication = $12, volume = $13, edition = $14, lendable = $15,
                lending_user = $16, lending_since = $17, lending_days = $18
            WHERE id = $1 AND etag = $19
            RETURNING *
            "#,
        )
        .bind(book.id)
        .bind(i64::from(book.etag))
        .bind(&fields.title)
        .bind(&fields.authors)
        .bind(&fields.topic)
        .bind(&fields.keywords)
        .bind(&fields.signature)
        .bind(&fields.location)
        .bind(&fields.isbn)
        .bind(fields.year)
        .bind(&fields.publisher)
        .bind(&fields.place_of_publication)
        .bind(&fields.volume)
        .bind(&fields.edition)
        .bind(fields.lendable)
        .bind(lending.map(|l| l.user.clone()))
        .bind(lending.map(|l| l.since))
        .bind(lending.map(|l| l.days))
        .bind(i64::from(expected))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Book::from))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
