// Pagination defaults
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const ADMIN_LIST_PER_PAGE: i64 = 100;

// Field limits
pub const EMAIL_MAX_LENGTH: u64 = 254;

pub const DEFAULT_BOOK_LANGUAGE: &str = "English";
pub const MIN_BOOK_RATING: i64 = 0;
pub const MAX_BOOK_RATING: i64 = 5;

// Error messages
pub const ERROR_EMAIL_REQUIRED: &str = "The Email field must be set";
pub const ERROR_SUPERUSER_STAFF: &str = "Superuser must have is_staff=True.";
pub const ERROR_SUPERUSER_SUPERUSER: &str = "Superuser must have is_superuser=True.";
pub const ERROR_INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const ERROR_ACCOUNT_DISABLED: &str = "Account has been disabled";
pub const ERROR_STAFF_REQUIRED: &str = "Staff access is required";
pub const ERROR_USER_NOT_FOUND: &str = "User not found";
pub const ERROR_EMAIL_ALREADY_EXISTS: &str = "User with this Email Address already exists.";
pub const ERROR_REVIEW_EXISTS: &str = "Review with this Book and User already exists.";
pub const ERROR_WISHLIST_EXISTS: &str = "Wishlist with this User and Book already exists.";

