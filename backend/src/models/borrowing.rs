use chrono::{DateTime, NaiveDate, Utc};
use library_platform_shared::CreateBorrowingRequest;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{Book, User};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Borrowing {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub borrowed_date: DateTime<Utc>,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub is_returned: bool,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Borrowing {
    /// Record a loan. Copy counts on the book are left alone.
    pub async fn create(pool: &SqlitePool, request: CreateBorrowingRequest) -> Result<Self, AppError> {
        request.validate()?;
        let now = Utc::now();

        sqlx::query_as::<_, Borrowing>(
            r#"
            INSERT INTO borrowings (id, book_id, user_id, borrowed_date, due_date, return_date, is_returned, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, NULL, 0, $6, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.book_id)
        .bind(request.user_id)
        .bind(now)
        .bind(request.due_date)
        .bind(&request.notes)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::from_constraint(e, "Borrowing already exists.", "Book or user does not exist."))
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, AppError> {
        let borrowing = sqlx::query_as::<_, Borrowing>("SELECT * FROM borrowings WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(borrowing)
    }

    /// A user's borrowing history, most recent first.
    pub async fn find_by_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Self>, AppError> {
        let borrowings = sqlx::query_as::<_, Borrowing>(
            "SELECT * FROM borrowings WHERE user_id = $1 ORDER BY borrowed_date DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(borrowings)
    }

    pub async fn find_by_book(pool: &SqlitePool, book_id: Uuid) -> Result<Vec<Self>, AppError> {
        let borrowings = sqlx::query_as::<_, Borrowing>(
            "SELECT * FROM borrowings WHERE book_id = $1 ORDER BY borrowed_date DESC",
        )
        .bind(book_id)
        .fetch_all(pool)
        .await?;

        Ok(borrowings)
    }

    /// Loans not yet returned whose due date is before `today`.
    pub async fn find_overdue(pool: &SqlitePool, today: NaiveDate) -> Result<Vec<Self>, AppError> {
        let borrowings = sqlx::query_as::<_, Borrowing>(
            r#"
            SELECT * FROM borrowings
            WHERE is_returned = 0 AND due_date < $1
            ORDER BY borrowed_date DESC
            "#,
        )
        .bind(today)
        .fetch_all(pool)
        .await?;

        Ok(borrowings)
    }

    pub async fn mark_returned(
        pool: &SqlitePool,
        id: Uuid,
        return_date: NaiveDate,
    ) -> Result<Self, AppError> {
        sqlx::query_as::<_, Borrowing>(
            "UPDATE borrowings SET is_returned = 1, return_date = $1 WHERE id = $2 RETURNING *",
        )
        .bind(return_date)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrowing {} not found", id)))
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM borrowings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(Utc::now().date_naive())
    }

    /// Returned loans are never overdue.
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        !self.is_returned && today > self.due_date
    }

    /// "<user> borrowed <title>"
    pub fn describe(&self, user: &User, book: &Book) -> String {
        format!("{} borrowed {}", user.handle(), book.title)
    }
}
