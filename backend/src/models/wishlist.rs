use chrono::{DateTime, Utc};
use library_platform_shared::ERROR_WISHLIST_EXISTS;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Book, User};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Wishlist {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub added_date: DateTime<Utc>,
}

impl Wishlist {
    /// Add a book to a user's wishlist; each book appears at most once per user.
    pub async fn add(pool: &SqlitePool, user_id: Uuid, book_id: Uuid) -> Result<Self, AppError> {
        sqlx::query_as::<_, Wishlist>(
            r#"
            INSERT INTO wishlists (id, user_id, book_id, added_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(book_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::from_constraint(e, ERROR_WISHLIST_EXISTS, "Book or user does not exist."))
    }

    /// A user's wishlist, most recently added first.
    pub async fn find_by_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Self>, AppError> {
        let entries = sqlx::query_as::<_, Wishlist>(
            "SELECT * FROM wishlists WHERE user_id = $1 ORDER BY added_date DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(entries)
    }

    pub async fn wishlisted_by(pool: &SqlitePool, book_id: Uuid) -> Result<Vec<Self>, AppError> {
        let entries = sqlx::query_as::<_, Wishlist>(
            "SELECT * FROM wishlists WHERE book_id = $1 ORDER BY added_date DESC",
        )
        .bind(book_id)
        .fetch_all(pool)
        .await?;

        Ok(entries)
    }

    pub async fn remove(pool: &SqlitePool, user_id: Uuid, book_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM wishlists WHERE user_id = $1 AND book_id = $2")
            .bind(user_id)
            .bind(book_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// "<user>'s wishlist - <title>"
    pub fn describe(&self, user: &User, book: &Book) -> String {
        format!("{}'s wishlist - {}", user.handle(), book.title)
    }
}
