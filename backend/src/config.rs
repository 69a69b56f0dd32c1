use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Prefix joined with stored upload paths to build public URLs.
    pub media_url: String,
    pub admin_page_size: i64,
    pub log_level: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("database_url", "sqlite://library.db")?
            .set_default("media_url", "/media/")?
            .set_default("admin_page_size", library_platform_shared::ADMIN_LIST_PER_PAGE)?
            .set_default("log_level", "info")?
            .add_source(config::Environment::default())
            .build()?;

        config.try_deserialize()
    }
}

/// Join a stored upload path onto the media prefix.
pub fn media_url(prefix: &str, path: &str) -> String {
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
