use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::debug;

use crate::error::CoreError;

pub type DbPool = SqlitePool;

/// Opens (creating if needed) the SQLite database and runs migrations.
///
/// `path` is either a file path or a full `sqlite:` URL.
pub async fn establish_connection(path: &str) -> Result<DbPool, CoreError> {
    let options = if path.starts_with("sqlite:") {
        SqliteConnectOptions::from_str(path)?
    } else {
        SqliteConnectOptions::new().filename(path)
    }
    .create_if_missing(true)
    .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    debug!(path, "database ready");

    Ok(pool)
}
