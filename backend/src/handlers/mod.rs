pub mod admin_users;
pub mod health;
