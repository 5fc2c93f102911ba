#[macro_use]
extern crate rocket;

mod api;
mod auth;
mod cors;
mod db;
mod env;
mod error;
mod models;
mod storage;
mod telemetry;
mod validation;
#[cfg(test)]
mod test;

use api::{
    api_change_password, api_create_kinesiology, api_create_payment, api_create_player,
    api_delete_kinesiology, api_delete_payment, api_delete_player, api_get_all_payments,
    api_get_attendance_sheet, api_get_payment_totals, api_get_player, api_get_player_attendance,
    api_get_player_kinesiology, api_get_player_payments, api_get_players, api_get_staff,
    api_get_staff_member, api_login, api_recover_password, api_register, api_submit_attendance,
    api_update_kinesiology, api_update_payment, api_update_player, api_update_staff_member,
    api_upload_player_documents, default_catcher, health,
};
use cors::{Cors, all_options};
use error::AppError;
use rocket::fairing::AdHoc;
use rocket::fs::FileServer;
use rocket::{Build, Rocket};
use std::str::FromStr;
use storage::DocumentStore;
use telemetry::{TelemetryFairing, init_tracing, shutdown_telemetry};
use thiserror::Error;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Anyhow(anyhow::Error),
    #[error("{0}")]
    Figment(rocket::figment::Error),
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        Error::Anyhow(value)
    }
}

impl From<rocket::figment::Error> for Error {
    fn from(value: rocket::figment::Error) -> Self {
        Error::Figment(value)
    }
}

#[launch]
async fn rocket() -> _ {
    if let Err(e) = env::load_environment() {
        eprintln!("Failed to load environment files: {}", e);
    }

    init_tracing();

    let database_url = std::env::var("DATABASE_URL").unwrap_or_default();

    let options = SqliteConnectOptions::from_str(&database_url)
        .expect("Invalid DATABASE_URL")
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .expect("Failed to connect to SQLite database");

    info!("Running database migrations...");
    match sqlx::migrate!("./migrations").run(&pool).await {
        Ok(_) => info!("Migrations completed successfully"),
        Err(e) => {
            error!("Failed to run migrations: {}", e);
            panic!("Database migration failed: {}", e);
        }
    }

    let uploads_dir = std::env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string());
    let store = DocumentStore::new(uploads_dir).expect("Failed to prepare uploads directory");

    init_rocket(pool, store).await
}

pub async fn init_rocket(pool: SqlitePool, store: DocumentStore) -> Rocket<Build> {
    info!("Starting club administration backend");

    let uploads_root = store.root().to_path_buf();

    rocket::build()
        .manage(pool)
        .manage(store)
        .mount(
            "/",
            routes![
                api_register,
                api_login,
                api_change_password,
                api_recover_password,
                api_get_players,
                api_get_player,
                api_create_player,
                api_update_player,
                api_delete_player,
                api_upload_player_documents,
                api_get_payment_totals,
                api_get_all_payments,
                api_get_player_payments,
                api_create_payment,
                api_update_payment,
                api_delete_payment,
                api_get_player_attendance,
                api_get_attendance_sheet,
                api_submit_attendance,
                api_get_staff,
                api_get_staff_member,
                api_update_staff_member,
                api_get_player_kinesiology,
                api_create_kinesiology,
                api_update_kinesiology,
                api_delete_kinesiology,
                health,
                all_options,
            ],
        )
        .mount("/uploads", FileServer::from(uploads_root))
        .register("/", catchers![default_catcher])
        .attach(TelemetryFairing)
        .attach(Cors)
        .attach(AdHoc::on_shutdown("Close database pool", |rocket| {
            Box::pin(async move {
                if let Some(pool) = rocket.state::<SqlitePool>() {
                    info!("Draining database pool");
                    pool.close().await;
                }
                shutdown_telemetry();
            })
        }))
}
