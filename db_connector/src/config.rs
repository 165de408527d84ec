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

//! Database Configuration Module
//! Resolves role credentials, host and port from environment variables and
//! assembles the connection string

use std::env;
use std::fmt;
use std::str::FromStr;
use log::{error, info, warn};
use sea_orm::sqlx;
use crate::DbError;

/// Environment variable holding the server host for both engines
pub const DB_HOST: &str = "DB_HOST";

/// Access-privilege tier used to select a credential pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    ReadOnly,
    InsertUpdate,
    Delete,
    Auth,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::ReadOnly, Role::InsertUpdate, Role::Delete, Role::Auth];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ReadOnly => "readonly",
            Role::InsertUpdate => "insertupdate",
            Role::Delete => "delete",
            Role::Auth => "auth",
        }
    }

    /// Names of the (username, password) environment variables for this role
    pub fn credential_vars(&self) -> (&'static str, &'static str) {
        match self {
            Role::ReadOnly => ("DB_READONLY_USER", "DB_READONLY_PASS"),
            Role::InsertUpdate => ("DB_UPDATE_USER", "DB_UPDATE_PASS"),
            Role::Delete => ("DB_DELETE_USER", "DB_DELETE_PASS"),
            Role::Auth => ("DB_AUTH_USER", "DB_AUTH_PASS"),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DbError;

    /// Role names are matched exactly, no case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| {
                error!("role is not support: {}", s);
                DbError::UnsupportedRole(s.to_string())
            })
    }
}

/// Target database product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Engine {
    PostgreSql,
    MySql,
}

impl Engine {
    pub const ALL: [Engine; 2] = [Engine::PostgreSql, Engine::MySql];

    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::PostgreSql => "pgsql",
            Engine::MySql => "mysql",
        }
    }

    /// Environment variable holding the engine-specific port
    pub fn port_var(&self) -> &'static str {
        match self {
            Engine::PostgreSql => "DB_PORT_PGSQL",
            Engine::MySql => "DB_PORT_MYSQL",
        }
    }

    /// Builds the connection string for this engine.
    ///
    /// Values are inserted verbatim, so an empty host or port yields an empty field.
    ///
    /// # Example
    /// ```rust
    /// use db_connector::Engine;
    ///
    /// assert_eq!(Engine::PostgreSql.dsn("h", "5432", "db"), "pgsql:host=h;port=5432;dbname=db");
    /// assert_eq!(Engine::MySql.dsn("h", "3306", "db"), "mysql:host=h;port=3306;dbname=db;charset=utf8mb4");
    /// ```
    pub fn dsn(&self, host: &str, port: &str, database: &str) -> String {
        match self {
            Engine::PostgreSql => format!("pgsql:host={};port={};dbname={}", host, port, database),
            Engine::MySql => format!("mysql:host={};port={};dbname={};charset=utf8mb4", host, port, database),
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Engine {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase();
        Engine::ALL
            .into_iter()
            .find(|engine| engine.as_str() == normalized)
            .ok_or_else(|| {
                error!("db engine is not support: {}", normalized);
                DbError::UnsupportedEngine(normalized)
            })
    }
}

/// Username and password for one role
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Reads the role's credential pair; both values must be present and non-empty.
    pub fn resolve<F>(role: Role, lookup: F) -> Result<Self, DbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (user_var, pass_var) = role.credential_vars();
        let username = lookup(user_var).unwrap_or_default();
        let password = lookup(pass_var).unwrap_or_default();
        if username.is_empty() || password.is_empty() {
            error!("credentials for role {} are incomplete, check {} and {}", role, user_var, pass_var);
            return Err(DbError::IncompleteCredentials { role });
        }
        Ok(Self { username, password })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"******")
            .finish()
    }
}

/// What a connector was built for: engine, database and role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub engine: Engine,
    pub database: String,
    pub role: Role,
}

/// Fully resolved connection settings
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub descriptor: ConnectionDescriptor,
    pub credentials: Credentials,
    /// Raw value of `DB_HOST`
    pub host: String,
    /// Raw value of the engine's port variable
    pub port: String,
}

impl DbConfig {
    /// Loads the connection settings for `role` from process environment variables.
    ///
    /// # Errors
    ///
    /// * `DbError::IncompleteCredentials` - If the role's username or password is missing or empty.
    /// * `DbError::UnsupportedEngine` - If `engine` is neither "pgsql" nor "mysql".
    /// * `DbError::EmptyDatabaseName` - If `database` is empty.
    pub fn from_env(engine: &str, database: &str, role: Role) -> Result<Self, DbError> {
        info!("get db config from env, role={}", role);
        Self::resolve(engine, database, role, |key| env::var(key).ok())
    }

    /// Same as [`DbConfig::from_env`], reading variables through `lookup`.
    ///
    /// Credentials are checked before the engine is parsed, and the engine
    /// before host and port are read.
    pub fn resolve<F>(engine: &str, database: &str, role: Role, lookup: F) -> Result<Self, DbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::resolve(role, &lookup)?;
        let engine = engine.parse::<Engine>()?;
        if database.is_empty() {
            error!("database name is empty");
            return Err(DbError::EmptyDatabaseName);
        }
        let host = read_or_empty(&lookup, DB_HOST);
        let port = read_or_empty(&lookup, engine.port_var());
        info!("db engine is {}, database={}, role={}", engine, database, role);

        Ok(Self {
            descriptor: ConnectionDescriptor {
                engine,
                database: database.to_string(),
                role,
            },
            credentials,
            host,
            port,
        })
    }

    /// Connection string for the resolved engine
    pub fn dsn(&self) -> String {
        self.descriptor.engine.dsn(&self.host, &self.port, &self.descriptor.database)
    }

    pub(crate) fn port_number(&self) -> Result<u16, DbError> {
        self.port.parse::<u16>().map_err(|e| DbError::ConnectionFailed {
            source: sqlx::Error::Configuration(
                format!("invalid port '{}' in {}: {}", self.port, self.descriptor.engine.port_var(), e).into(),
            ),
        })
    }
}

fn read_or_empty<F>(lookup: &F, key: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value,
        None => {
            warn!("environment variable {} is not set", key);
            String::new()
        }
    }
}
