//! Database models for the library platform
//!
//! Each model corresponds to a table and carries its own queries. Derived
//! state (availability, overdue loans, expired reservations) is computed
//! from the loaded row without touching the database.

pub mod author;
pub mod book;
pub mod borrowing;
pub mod category;
pub mod publisher;
pub mod reservation;
pub mod review;
pub mod user;
pub mod wishlist;

#[cfg(test)]
mod tests;

pub use author::Author;
pub use book::Book;
pub use borrowing::Borrowing;
pub use category::Category;
pub use publisher::Publisher;
pub use reservation::Reservation;
pub use review::Review;
pub use user::{NewUser, User};
pub use wishlist::Wishlist;

use library_platform_shared::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Pagination helper
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: offset.unwrap_or(0).max(0),
        }
    }

    /// 1-based page numbers.
    pub fn page(page: i64, per_page: i64) -> Self {
        let per_page = per_page.max(1);
        let page = page.max(1);
        Self {
            limit: per_page,
            offset: (page - 1) * per_page,
        }
    }
}
