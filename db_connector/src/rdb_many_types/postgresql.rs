//! PostgreSQL database connection module
//! Handle PostgreSQL-specific connect options and connection creation

use log::info;
use sea_orm::sqlx::postgres::{PgConnectOptions, Postgres};
use sea_orm::sqlx::ConnectOptions as _;
use sea_orm::{DatabaseConnection, SqlxPostgresConnector};
use crate::config::DbConfig;
use crate::rdb_many_types::pool;
use crate::DbError;

/// Create PostgreSQL database connection
pub(crate) async fn create_postgresql_connection(config: &DbConfig) -> Result<DatabaseConnection, DbError> {
    info!("Configuring PostgreSQL connection parameters: dsn={}, user={}", config.dsn(), config.credentials.username);
    let options = PgConnectOptions::new_without_pgpass()
        .host(&config.host)
        .port(config.port_number()?)
        .database(&config.descriptor.database)
        .username(&config.credentials.username)
        .password(&config.credentials.password)
        .statement_cache_capacity(0)
        .disable_statement_logging();
    info!("PostgreSQL connection parameters configured, establishing connection...");

    let pool = pool::single_connection::<Postgres>()
        .connect_with(options)
        .await
        .map_err(|source| DbError::ConnectionFailed { source })?;
    Ok(SqlxPostgresConnector::from_sqlx_postgres_pool(pool))
}
