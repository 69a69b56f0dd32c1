use chrono::{DateTime, NaiveDate, Utc};
use library_platform_shared::CreateAuthorRequest;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub nationality: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Author {
    pub async fn create(pool: &SqlitePool, request: CreateAuthorRequest) -> Result<Self, AppError> {
        request.validate()?;
        let now = Utc::now();

        sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (id, name, bio, birth_date, nationality, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.bio)
        .bind(request.birth_date)
        .bind(&request.nationality)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::unique_violation(e, "Author with this Name already exists."))
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, AppError> {
        let author = sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(author)
    }

    pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Self>, AppError> {
        let author = sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;

        Ok(author)
    }

    /// All authors, alphabetically.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, AppError> {
        let authors = sqlx::query_as::<_, Author>("SELECT * FROM authors ORDER BY name ASC")
            .fetch_all(pool)
            .await?;

        Ok(authors)
    }

    /// Deleting an author deletes their books.
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
