//! MySQL database connection module
//! Handle MySQL-specific connect options and connection creation

use log::info;
use sea_orm::sqlx::mysql::{MySql, MySqlConnectOptions};
use sea_orm::sqlx::ConnectOptions as _;
use sea_orm::{DatabaseConnection, SqlxMySqlConnector};
use crate::config::DbConfig;
use crate::rdb_many_types::pool;
use crate::DbError;

/// Create MySQL database connection
pub(crate) async fn create_mysql_connection(config: &DbConfig) -> Result<DatabaseConnection, DbError> {
    info!("Configuring MySQL connection parameters: dsn={}, user={}", config.dsn(), config.credentials.username);
    let options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port_number()?)
        .database(&config.descriptor.database)
        .username(&config.credentials.username)
        .password(&config.credentials.password)
        .charset("utf8mb4")
        .statement_cache_capacity(0)
        .disable_statement_logging();
    info!("MySQL connection parameters configured, establishing connection...");

    let pool = pool::single_connection::<MySql>()
        .connect_with(options)
        .await
        .map_err(|source| DbError::ConnectionFailed { source })?;
    Ok(SqlxMySqlConnector::from_sqlx_mysql_pool(pool))
}
