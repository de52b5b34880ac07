#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::items_after_statements)]

mod auth;
mod cfg;
mod error;
mod routes;
mod state;

use crate::{cfg::Settings, state::GatherState};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[macro_use]
extern crate tracing;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::new().await.expect("unable to read settings");

    let db_url = std::env::var("DATABASE_URL").expect("DB URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await
        .expect("cannot connect to DB");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("unable to run migrations");

    let addr: SocketAddr = format!("{}:{}", settings.net.host, settings.net.port)
        .parse()
        .expect("invalid bind address");

    let state = GatherState::new(pool, settings);
    let app = routes::build_app(state);

    info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("unable to bind");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("unable to listen for ctrl-c");
            info!("Shutting down");
        })
        .await
        .expect("error running server");
}
