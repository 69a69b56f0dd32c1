use anyhow::{Context, Result};
use std::env;
use tracing::{error, info};

use library_platform_backend::config::AppConfig;
use library_platform_backend::database::Database;
use library_platform_backend::services::UserManager;
use library_platform_shared::UserFields;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("migrate");

    let database = Database::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to connect to {}", config.database_url))?;

    match command {
        "migrate" => {
            info!("Running database migrations...");
            database.migrate().await.context("Failed to apply migrations")?;
            info!("Database migrations completed successfully");
        }
        "createsuperuser" => {
            let (email, password) = match (args.get(2), args.get(3)) {
                (Some(email), Some(password)) => (email, password),
                _ => {
                    print_usage();
                    std::process::exit(1);
                }
            };

            database.migrate().await.context("Failed to apply migrations")?;

            let fields = UserFields {
                first_name: args.get(4).cloned().unwrap_or_default(),
                last_name: args.get(5).cloned().unwrap_or_default(),
                ..UserFields::default()
            };

            let user = UserManager::new(database.pool().clone())
                .create_superuser(email, Some(password), fields)
                .await
                .context("Failed to create superuser")?;
            info!("Superuser {} created", user.email);
        }
        "check" => {
            if let Err(e) = database.health_check().await {
                error!("Database check failed: {}", e);
                std::process::exit(1);
            }
            info!("Database connection OK");
        }
        _ => {
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_usage() {
    eprintln!("Usage: manage [migrate|createsuperuser <email> <password> [first] [last]|check]");
    eprintln!("  migrate          - Apply pending migrations (default)");
    eprintln!("  createsuperuser  - Create an active staff superuser");
    eprintln!("  check            - Verify the database is reachable");
}
