/*
 * Copyright (c) Huawei Technologies Co., Ltd. 2025. All rights reserved.
 * Global Trust Authority is licensed under the Mulan PSL v2.
 * You can use this software according to the terms and conditions of the Mulan PSL v2.
 * You may obtain a copy of Mulan PSL v2 at:
 *     http://license.coscl.org.cn/MulanPSL2
 * THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY KIND, EITHER EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR
 * PURPOSE.
 * See the Mulan PSL v2 for more details.
 */

//! Database Connection Module
//! Opens one connection per connector and runs raw SQL through it

use std::fmt::{Debug, Formatter};
use dotenv::dotenv;
use log::{debug, error, info};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, JsonValue, QueryResult, Statement,
    TransactionTrait,
};
use crate::config::{ConnectionDescriptor, DbConfig, Engine, Role};
use crate::params::Params;
use crate::rdb_many_types::{mysql, postgresql};
use crate::row::decode_columns;
use crate::DbError;

/// One result row, column name to value, in column order.
///
/// When several columns share a name the last one wins, the earlier ones
/// are still reachable by position through [`DbConnector::fetch_column`].
pub type Row = serde_json::Map<String, JsonValue>;

/// Connector owning a single database connection opened with the credentials of one role.
///
/// Query helpers take `&self`; transaction control takes `&mut self`. The
/// connector adds no synchronization of its own, so callers that need
/// concurrent access should create one connector per unit of work.
///
/// # Example
/// ```rust,no_run
/// use db_connector::{DbConnector, Params};
/// use sea_orm::Value;
///
/// async fn example() -> Result<(), db_connector::DbError> {
///     let mut db = DbConnector::new("pgsql", "accounts", "insertupdate").await?;
///     db.begin().await?;
///     db.execute("UPDATE users SET active = :active WHERE id = :id",
///         Params::named([("active", Value::from(true)), ("id", Value::from(7))])).await?;
///     db.commit().await?;
///     Ok(())
/// }
/// ```
pub struct DbConnector {
    descriptor: ConnectionDescriptor,
    dsn: String,
    conn: DatabaseConnection,
    txn: Option<DatabaseTransaction>,
}

impl Debug for DbConnector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConnector")
            .field("descriptor", &self.descriptor)
            .field("dsn", &self.dsn)
            .field("in_transaction", &self.txn.is_some())
            .finish()
    }
}

impl DbConnector {
    /// Resolves credentials for `role` and connects to `database` on `engine`.
    ///
    /// `engine` is "pgsql" or "mysql" (case-insensitive), `role` one of
    /// "readonly", "insertupdate", "delete" or "auth". Variables from a `.env`
    /// file are loaded first when one is present.
    ///
    /// # Errors
    ///
    /// * `DbError::UnsupportedRole` - If `role` is unknown; checked before any variable is read.
    /// * `DbError::IncompleteCredentials` - If the role's username or password is not set.
    /// * `DbError::UnsupportedEngine` - If `engine` is unknown.
    /// * `DbError::EmptyDatabaseName` - If `database` is empty.
    /// * `DbError::ConnectionFailed` - If the connection cannot be opened.
    pub async fn new(engine: &str, database: &str, role: &str) -> Result<Self, DbError> {
        let role = role.parse::<Role>()?;
        Self::with_role(engine, database, role).await
    }

    pub async fn with_role(engine: &str, database: &str, role: Role) -> Result<Self, DbError> {
        dotenv().ok();
        let config = DbConfig::from_env(engine, database, role)?;
        Self::connect(config).await
    }

    /// Opens the connection described by an already resolved configuration.
    pub async fn connect(config: DbConfig) -> Result<Self, DbError> {
        info!("Initializing database connection...");
        let conn = match config.descriptor.engine {
            Engine::PostgreSql => postgresql::create_postgresql_connection(&config).await,
            Engine::MySql => mysql::create_mysql_connection(&config).await,
        };
        match conn {
            Ok(conn) => {
                info!("{} database connection created successfully", config.descriptor.engine);
                Ok(Self::with_connection(config, conn))
            }
            Err(e) => {
                error!("Failed to create {} connection: {}", config.descriptor.engine, e);
                Err(e)
            }
        }
    }

    /// Wraps a connection that is already open, e.g. a `MockDatabase` connection.
    pub fn with_connection(config: DbConfig, conn: DatabaseConnection) -> Self {
        Self {
            dsn: config.dsn(),
            descriptor: config.descriptor,
            conn,
            txn: None,
        }
    }

    /// Raw handle, for client-library features the helpers do not cover.
    ///
    /// Statements run on it never join a transaction opened with [`DbConnector::begin`].
    /// While such a transaction is open it holds the only underlying connection,
    /// so work on the raw handle waits until the transaction ends.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    pub fn engine(&self) -> Engine {
        self.descriptor.engine
    }

    pub fn role(&self) -> Role {
        self.descriptor.role
    }

    pub fn database(&self) -> &str {
        &self.descriptor.database
    }

    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    pub fn in_transaction(&self) -> bool {
        self.txn.is_some()
    }

    /// First row of the result, or `None` when the query matched nothing.
    pub async fn fetch_one(&self, sql: &str, params: impl Into<Params>) -> Result<Option<Row>, DbError> {
        let stmt = self.statement(sql, params.into())?;
        let result = match &self.txn {
            Some(txn) => txn.query_one(stmt).await?,
            None => self.conn.query_one(stmt).await?,
        };
        Ok(result.as_ref().map(into_row).transpose()?)
    }

    /// All rows of the result, possibly none.
    pub async fn fetch_all(&self, sql: &str, params: impl Into<Params>) -> Result<Vec<Row>, DbError> {
        let stmt = self.statement(sql, params.into())?;
        let results = match &self.txn {
            Some(txn) => txn.query_all(stmt).await?,
            None => self.conn.query_all(stmt).await?,
        };
        Ok(results.iter().map(into_row).collect::<Result<Vec<_>, _>>()?)
    }

    /// Runs a mutating statement and returns the number of affected rows.
    ///
    /// MySQL reports the rows an UPDATE matched, including rows left unchanged.
    pub async fn execute(&self, sql: &str, params: impl Into<Params>) -> Result<u64, DbError> {
        let stmt = self.statement(sql, params.into())?;
        let result = match &self.txn {
            Some(txn) => txn.execute(stmt).await?,
            None => self.conn.execute(stmt).await?,
        };
        Ok(result.rows_affected())
    }

    /// First column of the first row, or `None` when the query matched nothing.
    ///
    /// The column is taken by position, so a later column with the same name
    /// does not shadow it. A SQL NULL in that column is `Some(JsonValue::Null)`.
    pub async fn fetch_column(&self, sql: &str, params: impl Into<Params>) -> Result<Option<JsonValue>, DbError> {
        let stmt = self.statement(sql, params.into())?;
        let result = match &self.txn {
            Some(txn) => txn.query_one(stmt).await?,
            None => self.conn.query_one(stmt).await?,
        };
        match result {
            Some(result) => Ok(decode_columns(&result)?.into_iter().next().map(|(_, value)| value)),
            None => Ok(None),
        }
    }

    pub async fn begin(&mut self) -> Result<(), DbError> {
        if self.txn.is_some() {
            error!("begin called while a transaction is active");
            return Err(DbError::TransactionAlreadyActive);
        }
        self.txn = Some(self.conn.begin().await?);
        debug!("transaction started on {}", self.dsn);
        Ok(())
    }

    pub async fn commit(&mut self) -> Result<(), DbError> {
        let txn = self.txn.take().ok_or(DbError::NoActiveTransaction)?;
        txn.commit().await?;
        debug!("transaction committed on {}", self.dsn);
        Ok(())
    }

    pub async fn rollback(&mut self) -> Result<(), DbError> {
        let txn = self.txn.take().ok_or(DbError::NoActiveTransaction)?;
        txn.rollback().await?;
        debug!("transaction rolled back on {}", self.dsn);
        Ok(())
    }

    fn statement(&self, sql: &str, params: Params) -> Result<Statement, DbError> {
        params.into_statement(self.conn.get_database_backend(), sql)
    }
}

fn into_row(result: &QueryResult) -> Result<Row, DbErr> {
    Ok(decode_columns(result)?.into_iter().collect())
}
