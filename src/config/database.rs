//! Database configuration module.
//!
//! Handles the SeaORM connection used by [`crate::store::DatabaseBookingStore`] and
//! creates the `bookings` table from its entity definition, so the schema always
//! matches the Rust model without hand-written SQL.

use crate::entities::Booking;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/therapy_scheduler.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, or the default
/// local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if database_url == DEFAULT_DATABASE_URL {
        std::fs::create_dir_all("data")?;
    }
    tracing::debug!("Connecting to {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates the scheduling tables if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut booking_table = schema.create_table_from_entity(Booking);
    booking_table.if_not_exists();

    db.execute(builder.build(&booking_table)).await?;

    Ok(())
}
