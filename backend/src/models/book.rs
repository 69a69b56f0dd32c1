use chrono::{DateTime, NaiveDate, Utc};
use library_platform_shared::{validate_book_rating, BookStatus, CreateBookRequest};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{Author, Pagination};
use crate::utils::validation::escape_like;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub isbn: String,
    pub description: String,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub publisher_id: Option<Uuid>,
    pub publication_date: NaiveDate,
    pub pages: i32,
    pub language: String,
    pub status: BookStatus,
    pub quantity: i32,
    pub available_copies: i32,
    pub rating: Decimal,
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Ratings live in a TEXT column; SQLite has no decimal type.
impl<'r> FromRow<'r, SqliteRow> for Book {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let rating: String = row.try_get("rating")?;
        let rating = Decimal::from_str(&rating).map_err(|e| sqlx::Error::ColumnDecode {
            index: "rating".to_string(),
            source: Box::new(e),
        })?;

        Ok(Book {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            isbn: row.try_get("isbn")?,
            description: row.try_get("description")?,
            author_id: row.try_get("author_id")?,
            category_id: row.try_get("category_id")?,
            publisher_id: row.try_get("publisher_id")?,
            publication_date: row.try_get("publication_date")?,
            pages: row.try_get("pages")?,
            language: row.try_get("language")?,
            status: row.try_get("status")?,
            quantity: row.try_get("quantity")?,
            available_copies: row.try_get("available_copies")?,
            rating,
            cover_image: row.try_get("cover_image")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

fn rating_text(rating: Decimal) -> String {
    let mut rating = rating;
    rating.rescale(2);
    rating.to_string()
}

impl Book {
    pub async fn create(pool: &SqlitePool, request: CreateBookRequest) -> Result<Self, AppError> {
        request.validate()?;
        let now = Utc::now();

        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (
                id, title, isbn, description, author_id, category_id, publisher_id,
                publication_date, pages, language, status, quantity, available_copies,
                rating, cover_image, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.title)
        .bind(&request.isbn)
        .bind(&request.description)
        .bind(request.author_id)
        .bind(request.category_id)
        .bind(request.publisher_id)
        .bind(request.publication_date)
        .bind(request.pages)
        .bind(&request.language)
        .bind(request.status)
        .bind(request.quantity)
        .bind(request.available_copies)
        .bind(rating_text(request.rating))
        .bind(&request.cover_image)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            AppError::from_constraint(
                e,
                "Book with this Isbn already exists.",
                "Author, category or publisher does not exist.",
            )
        })
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, AppError> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(book)
    }

    pub async fn find_by_isbn(pool: &SqlitePool, isbn: &str) -> Result<Option<Self>, AppError> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(pool)
            .await?;

        Ok(book)
    }

    /// Newest first.
    pub async fn list(pool: &SqlitePool, page: Pagination) -> Result<Vec<Self>, AppError> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(pool)
        .await?;

        Ok(books)
    }

    pub async fn find_by_author(pool: &SqlitePool, author_id: Uuid) -> Result<Vec<Self>, AppError> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE author_id = $1 ORDER BY created_at DESC",
        )
        .bind(author_id)
        .fetch_all(pool)
        .await?;

        Ok(books)
    }

    pub async fn find_by_category(
        pool: &SqlitePool,
        category_id: Uuid,
    ) -> Result<Vec<Self>, AppError> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE category_id = $1 ORDER BY created_at DESC",
        )
        .bind(category_id)
        .fetch_all(pool)
        .await?;

        Ok(books)
    }

    pub async fn find_by_publisher(
        pool: &SqlitePool,
        publisher_id: Uuid,
    ) -> Result<Vec<Self>, AppError> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE publisher_id = $1 ORDER BY created_at DESC",
        )
        .bind(publisher_id)
        .fetch_all(pool)
        .await?;

        Ok(books)
    }

    /// Books with at least one copy on the shelf, optionally matching a
    /// title substring.
    pub async fn find_available(
        pool: &SqlitePool,
        search: Option<&str>,
    ) -> Result<Vec<Self>, AppError> {
        let books = match search {
            Some(term) => {
                sqlx::query_as::<_, Book>(
                    r#"
                    SELECT * FROM books
                    WHERE available_copies > 0 AND title LIKE $1 ESCAPE '\'
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(format!("%{}%", escape_like(term)))
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Book>(
                    "SELECT * FROM books WHERE available_copies > 0 ORDER BY created_at DESC",
                )
                .fetch_all(pool)
                .await?
            }
        };

        Ok(books)
    }

    pub async fn update_status(
        pool: &SqlitePool,
        id: Uuid,
        status: BookStatus,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE books SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Overwrite the copy counts. Both must be non-negative; nothing ties
    /// `available_copies` to `quantity`.
    pub async fn update_copies(
        pool: &SqlitePool,
        id: Uuid,
        quantity: i32,
        available_copies: i32,
    ) -> Result<(), AppError> {
        if quantity < 0 || available_copies < 0 {
            return Err(AppError::Validation(
                "Copy counts must be greater than or equal to 0".to_string(),
            ));
        }

        sqlx::query(
            "UPDATE books SET quantity = $1, available_copies = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(quantity)
        .bind(available_copies)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn update_rating(pool: &SqlitePool, id: Uuid, rating: Decimal) -> Result<(), AppError> {
        validate_book_rating(&rating)
            .map_err(|e| AppError::Validation(format!("rating: {}", e.code)))?;

        sqlx::query("UPDATE books SET rating = $1, updated_at = $2 WHERE id = $3")
            .bind(rating_text(rating))
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// True while at least one copy can be lent out.
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    /// "<title> by <author>"
    pub fn describe(&self, author: &Author) -> String {
        format!("{} by {}", self.title, author.name)
    }
}
