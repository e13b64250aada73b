use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod components;
mod config;
mod controllers;
mod crypto;
mod db_ops;
mod errors;
mod extractors;
mod filter;
mod flash;
mod listings;
mod media;
mod middleware;
mod models;
mod pw;
mod routes;
mod session;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,listings=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let config = config::Config::from_env()?;

    let db = db_ops::connect(&config.database_url).await?;
    auth::seed_demo_user(&db).await?;
    let media = media::MediaStore::new(&config.upload_dir);
    media.ensure_dir().await?;

    let addr = config.bind_addr;
    let state = models::AppState {
        db,
        media,
        config: Arc::new(config),
    };
    let app = routes::app(state);

    tracing::info!("listening on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
