use chrono::{DateTime, Utc};
use library_platform_shared::{CreateReviewRequest, ERROR_REVIEW_EXISTS};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{Book, User};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub rating: i32,
    pub helpful_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// A user may review a given book once.
    pub async fn create(pool: &SqlitePool, request: CreateReviewRequest) -> Result<Self, AppError> {
        request.validate()?;
        let now = Utc::now();

        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (id, book_id, user_id, title, content, rating, helpful_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.book_id)
        .bind(request.user_id)
        .bind(&request.title)
        .bind(&request.content)
        .bind(request.rating)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::from_constraint(e, ERROR_REVIEW_EXISTS, "Book or user does not exist."))
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, AppError> {
        let review = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(review)
    }

    pub async fn find_by_book(pool: &SqlitePool, book_id: Uuid) -> Result<Vec<Self>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE book_id = $1 ORDER BY created_at DESC",
        )
        .bind(book_id)
        .fetch_all(pool)
        .await?;

        Ok(reviews)
    }

    pub async fn find_by_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Self>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(reviews)
    }

    pub async fn mark_helpful(pool: &SqlitePool, id: Uuid) -> Result<i32, AppError> {
        let count: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE reviews
            SET helpful_count = helpful_count + 1, updated_at = $1
            WHERE id = $2
            RETURNING helpful_count
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await?;

        count.ok_or_else(|| AppError::NotFound(format!("Review {} not found", id)))
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub fn describe(&self, user: &User, book: &Book) -> String {
        format!("Review by {} for {}", user.handle(), book.title)
    }
}
