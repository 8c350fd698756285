use rocket_db_pools::{Database, sqlx};

/// Postgres pool holding sessions and saved favorites.
#[derive(Database)]
#[database("jupiter_db")]
pub struct JupiterDb(sqlx::PgPool);
