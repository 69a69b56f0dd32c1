use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use library_platform_backend::admin::UserAdmin;
use library_platform_backend::config::AppConfig;
use library_platform_backend::database::Database;
use library_platform_backend::error::AppError;
use library_platform_backend::services::UserManager;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    // Load configuration
    let config = AppConfig::from_env()?;

    // Initialize tracing; RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("Starting Library Platform Backend on {}:{}", config.host, config.port);

    // Initialize database
    let database = Database::new(&config.database_url).await?;

    // Run migrations
    database.migrate().await?;

    // Initialize services
    let user_manager = UserManager::new(database.pool().clone());
    let user_admin = UserAdmin::new(
        database.pool().clone(),
        user_manager.clone(),
        config.media_url.clone(),
        config.admin_page_size,
    );

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(database.clone()))
            .app_data(web::Data::new(user_manager.clone()))
            .app_data(web::Data::new(user_admin.clone()))
            .configure(library_platform_backend::configure)
    })
    .bind(format!("{}:{}", config.host, config.port))?
    .run()
    .await
    .map_err(AppError::from)
}
