//! Unit tests for database models
//!
//! These tests cover the queries and derived state of the library models.
//! Each test gets its own migrated in-memory SQLite database.

use chrono::{Duration, NaiveDate, Utc};
use library_platform_shared::{
    BookStatus, CreateAuthorRequest, CreateBookRequest, CreateBorrowingRequest,
    CreateCategoryRequest, CreatePublisherRequest, CreateReservationRequest, CreateReviewRequest,
    ERROR_REVIEW_EXISTS, ERROR_WISHLIST_EXISTS,
};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::str::FromStr;
use uuid::Uuid;

use super::*;
use crate::database::Database;
use crate::error::AppError;
use crate::utils::crypto::make_unusable_password;

/// Helper function to create a test database pool
async fn create_test_pool() -> SqlitePool {
    Database::in_memory().await.unwrap().pool().clone()
}

/// Helper function to create a test user
async fn create_test_user(pool: &SqlitePool, email: &str) -> User {
    User::create(
        pool,
        NewUser {
            email: email.to_string(),
            password: make_unusable_password(),
            username: None,
            first_name: "Test".to_string(),
            last_name: "Reader".to_string(),
            date_of_birth: None,
            profile_photo: None,
            phone_number: None,
            bio: None,
            is_email_verified: false,
            is_staff: false,
            is_superuser: false,
            is_active: true,
        },
    )
    .await
    .unwrap()
}

async fn create_test_author(pool: &SqlitePool, name: &str) -> Author {
    Author::create(
        pool,
        CreateAuthorRequest {
            name: name.to_string(),
            bio: None,
            birth_date: NaiveDate::from_ymd_opt(1775, 12, 16),
            nationality: "British".to_string(),
        },
    )
    .await
    .unwrap()
}

fn book_request(author_id: Uuid, isbn: &str) -> CreateBookRequest {
    CreateBookRequest {
        title: "Pride and Prejudice".to_string(),
        isbn: isbn.to_string(),
        description: String::new(),
        author_id,
        category_id: None,
        publisher_id: None,
        publication_date: NaiveDate::from_ymd_opt(1813, 1, 28).unwrap(),
        pages: 432,
        language: "English".to_string(),
        status: BookStatus::Available,
        quantity: 1,
        available_copies: 1,
        rating: Decimal::ZERO,
        cover_image: None,
    }
}

async fn create_test_book(pool: &SqlitePool, author_id: Uuid, isbn: &str) -> Book {
    Book::create(pool, book_request(author_id, isbn)).await.unwrap()
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[tokio::test]
async fn test_book_availability_follows_available_copies() {
    let pool = create_test_pool().await;
    let author = create_test_author(&pool, "Jane Austen").await;
    let book = create_test_book(&pool, author.id, "9780141439518").await;

    assert!(book.is_available());
    assert_eq!(book.status, BookStatus::Available);
    assert_eq!(book.describe(&author), "Pride and Prejudice by Jane Austen");

    Book::update_copies(&pool, book.id, 1, 0).await.unwrap();
    let book = Book::find_by_id(&pool, book.id).await.unwrap().unwrap();
    assert!(!book.is_available());

    assert!(matches!(
        Book::update_copies(&pool, book.id, 1, -1).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_book_rating_round_trips_with_two_places() {
    let pool = create_test_pool().await;
    let author = create_test_author(&pool, "Jane Austen").await;
    let book = create_test_book(&pool, author.id, "9780141439518").await;
    assert_eq!(book.rating, Decimal::ZERO);

    Book::update_rating(&pool, book.id, Decimal::from_str("4.5").unwrap())
        .await
        .unwrap();
    let book = Book::find_by_id(&pool, book.id).await.unwrap().unwrap();
    assert_eq!(book.rating.to_string(), "4.50");

    assert!(matches!(
        Book::update_rating(&pool, book.id, Decimal::from_str("5.01").unwrap()).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        Book::update_rating(&pool, book.id, Decimal::from_str("4.555").unwrap()).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_book_validation_and_unique_isbn() {
    let pool = create_test_pool().await;
    let author = create_test_author(&pool, "Jane Austen").await;
    create_test_book(&pool, author.id, "9780141439518").await;

    let duplicate = Book::create(&pool, book_request(author.id, "9780141439518")).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let mut request = book_request(author.id, "0141439513");
    request.pages = 0;
    assert!(matches!(Book::create(&pool, request).await, Err(AppError::Validation(_))));

    let missing_author = Book::create(&pool, book_request(Uuid::new_v4(), "0141439513")).await;
    assert!(matches!(missing_author, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_book_status_and_listing() {
    let pool = create_test_pool().await;
    let author = create_test_author(&pool, "Jane Austen").await;
    let first = create_test_book(&pool, author.id, "9780141439518").await;
    let second = create_test_book(&pool, author.id, "9780141439587").await;

    Book::update_status(&pool, first.id, BookStatus::Damaged).await.unwrap();
    let first = Book::find_by_isbn(&pool, "9780141439518").await.unwrap().unwrap();
    assert_eq!(first.status, BookStatus::Damaged);

    let books = Book::list(&pool, Pagination::new(None, None)).await.unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].id, second.id);

    let books = Book::list(&pool, Pagination::page(2, 1)).await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id, first.id);

    assert_eq!(Book::find_by_author(&pool, author.id).await.unwrap().len(), 2);
    assert_eq!(Book::find_available(&pool, Some("pride")).await.unwrap().len(), 2);
    assert!(Book::find_available(&pool, Some("emma")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_find_available_matches_wildcards_literally() {
    let pool = create_test_pool().await;
    let author = create_test_author(&pool, "Jane Austen").await;
    create_test_book(&pool, author.id, "9780141439518").await;

    assert!(Book::find_available(&pool, Some("%")).await.unwrap().is_empty());
    assert!(Book::find_available(&pool, Some("P_ide")).await.unwrap().is_empty());
    assert_eq!(Book::find_available(&pool, Some("pride")).await.unwrap().len(), 1);

    let mut request = book_request(author.id, "9780141439587");
    request.title = "100% Pride_Edition".to_string();
    Book::create(&pool, request).await.unwrap();
    assert_eq!(Book::find_available(&pool, Some("0% P")).await.unwrap().len(), 1);
    assert_eq!(Book::find_available(&pool, Some("e_E")).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unique_names() {
    let pool = create_test_pool().await;
    create_test_author(&pool, "Jane Austen").await;

    let duplicate = Author::create(
        &pool,
        CreateAuthorRequest {
            name: "Jane Austen".to_string(),
            bio: None,
            birth_date: None,
            nationality: String::new(),
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let category = CreateCategoryRequest {
        name: "Fiction".to_string(),
        description: None,
    };
    Category::create(&pool, category.clone()).await.unwrap();
    assert!(matches!(
        Category::create(&pool, category).await,
        Err(AppError::Conflict(_))
    ));

    let publisher = CreatePublisherRequest {
        name: "Penguin".to_string(),
        address: String::new(),
        phone: String::new(),
        website: Some("https://www.penguin.co.uk".to_string()),
    };
    Publisher::create(&pool, publisher.clone()).await.unwrap();
    assert!(matches!(
        Publisher::create(&pool, publisher).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_named_lookups_are_ordered_by_name() {
    let pool = create_test_pool().await;
    create_test_author(&pool, "Mary Shelley").await;
    create_test_author(&pool, "Charlotte Bronte").await;

    let names: Vec<String> = Author::list(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(names, vec!["Charlotte Bronte", "Mary Shelley"]);

    let found = Author::find_by_name(&pool, "Mary Shelley").await.unwrap().unwrap();
    assert_eq!(found.to_string(), "Mary Shelley");
}

#[tokio::test]
async fn test_deleting_category_and_publisher_keeps_books() {
    let pool = create_test_pool().await;
    let author = create_test_author(&pool, "Jane Austen").await;
    let category = Category::create(
        &pool,
        CreateCategoryRequest {
            name: "Fiction".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();
    let publisher = Publisher::create(
        &pool,
        CreatePublisherRequest {
            name: "Penguin".to_string(),
            address: String::new(),
            phone: String::new(),
            website: None,
        },
    )
    .await
    .unwrap();

    let mut request = book_request(author.id, "9780141439518");
    request.category_id = Some(category.id);
    request.publisher_id = Some(publisher.id);
    let book = Book::create(&pool, request).await.unwrap();
    assert_eq!(Book::find_by_category(&pool, category.id).await.unwrap().len(), 1);
    assert_eq!(Book::find_by_publisher(&pool, publisher.id).await.unwrap().len(), 1);

    assert!(Category::delete(&pool, category.id).await.unwrap());
    assert!(Publisher::delete(&pool, publisher.id).await.unwrap());

    let book = Book::find_by_id(&pool, book.id).await.unwrap().unwrap();
    assert_eq!(book.category_id, None);
    assert_eq!(book.publisher_id, None);
}

#[tokio::test]
async fn test_deleting_author_removes_books() {
    let pool = create_test_pool().await;
    let author = create_test_author(&pool, "Jane Austen").await;
    let book = create_test_book(&pool, author.id, "9780141439518").await;

    assert!(Author::delete(&pool, author.id).await.unwrap());
    assert!(Book::find_by_id(&pool, book.id).await.unwrap().is_none());
    assert!(!Author::delete(&pool, author.id).await.unwrap());
}

#[tokio::test]
async fn test_borrowing_overdue_until_returned() {
    let pool = create_test_pool().await;
    let user = create_test_user(&pool, "reader@example.com").await;
    let author = create_test_author(&pool, "Jane Austen").await;
    let book = create_test_book(&pool, author.id, "9780141439518").await;

    let borrowing = Borrowing::create(
        &pool,
        CreateBorrowingRequest {
            book_id: book.id,
            user_id: user.id,
            due_date: today() - Duration::days(1),
            notes: String::new(),
        },
    )
    .await
    .unwrap();

    assert!(!borrowing.is_returned);
    assert_eq!(
        borrowing.describe(&user, &book),
        "reader@example.com borrowed Pride and Prejudice"
    );
    assert!(borrowing.is_overdue());
    assert!(!borrowing.is_overdue_on(borrowing.due_date));
    assert_eq!(Borrowing::find_overdue(&pool, today()).await.unwrap().len(), 1);

    Borrowing::mark_returned(&pool, borrowing.id, today()).await.unwrap();
    let borrowing = Borrowing::find_by_id(&pool, borrowing.id).await.unwrap().unwrap();
    assert!(borrowing.is_returned);
    assert_eq!(borrowing.return_date, Some(today()));
    assert!(!borrowing.is_overdue());
    assert!(Borrowing::find_overdue(&pool, today()).await.unwrap().is_empty());

    assert_eq!(Borrowing::find_by_user(&pool, user.id).await.unwrap().len(), 1);
    assert_eq!(Borrowing::find_by_book(&pool, book.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_borrowing_requires_existing_book() {
    let pool = create_test_pool().await;
    let user = create_test_user(&pool, "reader@example.com").await;

    let result = Borrowing::create(
        &pool,
        CreateBorrowingRequest {
            book_id: Uuid::new_v4(),
            user_id: user.id,
            due_date: today(),
            notes: String::new(),
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_reservation_expiry() {
    let pool = create_test_pool().await;
    let user = create_test_user(&pool, "reader@example.com").await;
    let author = create_test_author(&pool, "Jane Austen").await;
    let book = create_test_book(&pool, author.id, "9780141439518").await;

    let reservation = Reservation::create(
        &pool,
        CreateReservationRequest {
            book_id: book.id,
            user_id: user.id,
            expiry_date: today() - Duration::days(1),
            notes: "Hold at front desk".to_string(),
        },
    )
    .await
    .unwrap();

    assert!(reservation.is_active);
    assert_eq!(
        reservation.describe(&user, &book),
        "reader@example.com reserved Pride and Prejudice"
    );
    assert!(reservation.is_expired());
    assert_eq!(Reservation::find_expired(&pool, today()).await.unwrap().len(), 1);
    assert_eq!(Reservation::find_active_for_book(&pool, book.id).await.unwrap().len(), 1);

    Reservation::deactivate(&pool, reservation.id).await.unwrap();
    let reservation = Reservation::find_by_id(&pool, reservation.id).await.unwrap().unwrap();
    assert!(!reservation.is_expired());
    assert!(Reservation::find_active_for_book(&pool, book.id).await.unwrap().is_empty());

    assert!(matches!(
        Reservation::deactivate(&pool, Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_one_review_per_user_and_book() {
    let pool = create_test_pool().await;
    let user = create_test_user(&pool, "reader@example.com").await;
    let author = create_test_author(&pool, "Jane Austen").await;
    let book = create_test_book(&pool, author.id, "9780141439518").await;

    let request = CreateReviewRequest {
        book_id: book.id,
        user_id: user.id,
        title: "A classic".to_string(),
        content: "Witty from start to finish.".to_string(),
        rating: 5,
    };

    let review = Review::create(&pool, request.clone()).await.unwrap();
    assert_eq!(review.helpful_count, 0);
    assert_eq!(
        review.describe(&user, &book),
        "Review by reader@example.com for Pride and Prejudice"
    );

    match Review::create(&pool, request.clone()).await {
        Err(AppError::Conflict(msg)) => assert_eq!(msg, ERROR_REVIEW_EXISTS),
        other => panic!("expected conflict, got {:?}", other.map(|r| r.id)),
    }

    let other_user = create_test_user(&pool, "other@example.com").await;
    let mut request = request;
    request.user_id = other_user.id;
    request.rating = 6;
    assert!(matches!(Review::create(&pool, request).await, Err(AppError::Validation(_))));

    assert_eq!(Review::mark_helpful(&pool, review.id).await.unwrap(), 1);
    assert_eq!(Review::mark_helpful(&pool, review.id).await.unwrap(), 2);
    assert_eq!(Review::find_by_book(&pool, book.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_one_wishlist_entry_per_user_and_book() {
    let pool = create_test_pool().await;
    let user = create_test_user(&pool, "reader@example.com").await;
    let author = create_test_author(&pool, "Jane Austen").await;
    let book = create_test_book(&pool, author.id, "9780141439518").await;

    let entry = Wishlist::add(&pool, user.id, book.id).await.unwrap();
    let mut named = user.clone();
    named.username = Some("lizzy".to_string());
    assert_eq!(entry.describe(&named, &book), "lizzy's wishlist - Pride and Prejudice");
    assert_eq!(
        entry.describe(&user, &book),
        "reader@example.com's wishlist - Pride and Prejudice"
    );

    match Wishlist::add(&pool, user.id, book.id).await {
        Err(AppError::Conflict(msg)) => assert_eq!(msg, ERROR_WISHLIST_EXISTS),
        other => panic!("expected conflict, got {:?}", other.map(|w| w.id)),
    }

    assert_eq!(Wishlist::wishlisted_by(&pool, book.id).await.unwrap().len(), 1);
    assert!(Wishlist::remove(&pool, user.id, book.id).await.unwrap());
    assert!(Wishlist::find_by_user(&pool, user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_user_cascades_to_activity() {
    let pool = create_test_pool().await;
    let user = create_test_user(&pool, "reader@example.com").await;
    let author = create_test_author(&pool, "Jane Austen").await;
    let book = create_test_book(&pool, author.id, "9780141439518").await;

    Borrowing::create(
        &pool,
        CreateBorrowingRequest {
            book_id: book.id,
            user_id: user.id,
            due_date: today(),
            notes: String::new(),
        },
    )
    .await
    .unwrap();
    Wishlist::add(&pool, user.id, book.id).await.unwrap();

    assert!(User::delete(&pool, user.id).await.unwrap());
    assert!(Borrowing::find_by_book(&pool, book.id).await.unwrap().is_empty());
    assert!(Wishlist::wishlisted_by(&pool, book.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_user_queries() {
    let pool = create_test_pool().await;
    let user = create_test_user(&pool, "reader@example.com").await;

    assert!(User::email_exists(&pool, "reader@example.com").await.unwrap());
    assert!(!User::email_exists(&pool, "READER@example.com").await.unwrap());
    assert_eq!(user.full_name(), "Test Reader");
    assert_eq!(user.short_name(), "Test");
    assert_eq!(user.to_string(), "reader@example.com");
    assert!(!user.has_usable_password());
    assert!(user.last_login.is_none());

    User::verify_email(&pool, user.id).await.unwrap();
    User::update_last_login(&pool, user.id).await.unwrap();
    let user = User::find_by_email(&pool, "reader@example.com").await.unwrap().unwrap();
    assert!(user.is_email_verified);
    assert!(user.last_login.is_some());

    let response = serde_json::to_value(&user).unwrap();
    assert!(response.get("password").is_none());
}

#[test]
fn test_pagination_bounds() {
    let page = Pagination::new(Some(1000), Some(-5));
    assert_eq!(page.limit, library_platform_shared::MAX_PAGE_SIZE);
    assert_eq!(page.offset, 0);

    let page = Pagination::page(3, 25);
    assert_eq!(page.limit, 25);
    assert_eq!(page.offset, 50);
}
