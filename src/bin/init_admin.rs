//! Creates the first admin account from `ADMIN_EMAIL` and `ADMIN_PASSWORD`.

use admissions_backend::{
    AppState,
    config::Config,
    database::{create_pool, run_migrations},
};
use anyhow::{Context, Result};

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let email = std::env::var("ADMIN_EMAIL").context("ADMIN_EMAIL must be set")?;
    let password = std::env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD must be set")?;

    let config = Config::from_toml().context("Failed to load configuration")?;
    let pool = create_pool(&config.database)
        .await
        .context("Failed to connect to the database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let state = AppState::new(&config, pool).context("Failed to initialise services")?;
    let auth = &state.auth_service;

    let normalized = email.trim().to_lowercase();
    if let Some(existing) = auth.find_by_email(&normalized).await? {
        println!(
            "User {} already exists with role {}, nothing to do",
            normalized, existing.role
        );
        return Ok(());
    }

    let admin = auth.create_admin(&email, &password).await?;
    println!("Admin {} created for {}", admin.id, normalized);
    Ok(())
}
