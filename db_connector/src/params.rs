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

//! Bind parameters for the query helpers

use std::collections::HashMap;
use sea_orm::{DatabaseBackend, Statement, Value};
use crate::DbError;

/// Values bound to the placeholders of one statement.
///
/// Positional values are sent as-is and the SQL must use the engine's native
/// placeholders (`$1`, `$2`, ... for PostgreSQL, `?` for MySQL). Named values
/// match `:name` placeholders, which are rewritten to the native form before
/// the statement is sent.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    Positional(Vec<Value>),
    Named(Vec<(String, Value)>),
}

impl Params {
    pub fn none() -> Self {
        Params::Positional(Vec::new())
    }

    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Params::Positional(values.into_iter().map(Into::into).collect())
    }

    /// Names may be given with or without the leading `:`.
    pub fn named<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Params::Named(values.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Builds the statement for `backend`, rewriting named placeholders if needed.
    pub fn into_statement(self, backend: DatabaseBackend, sql: &str) -> Result<Statement, DbError> {
        match self {
            Params::Positional(values) => Ok(Statement::from_sql_and_values(backend, sql, values)),
            Params::Named(named) => {
                let (sql, values) = bind_named(backend, sql, &named)?;
                Ok(Statement::from_sql_and_values(backend, sql, values))
            }
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Params::none()
    }
}

impl From<()> for Params {
    fn from(_: ()) -> Self {
        Params::none()
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Params::Positional(values)
    }
}

impl From<Vec<(String, Value)>> for Params {
    fn from(values: Vec<(String, Value)>) -> Self {
        Params::Named(values)
    }
}

/// Rewrites `:name` placeholders into positional ones and collects the values
/// in placeholder order. A name used twice binds its value twice.
///
/// Quoted strings and identifiers, `--` and `/* */` comments and `::` casts are
/// copied through untouched.
fn bind_named(
    backend: DatabaseBackend,
    sql: &str,
    named: &[(String, Value)],
) -> Result<(String, Vec<Value>), DbError> {
    let lookup: HashMap<&str, &Value> = named
        .iter()
        .map(|(name, value)| (name.trim_start_matches(':'), value))
        .collect();
    let backslash_escapes = backend == DatabaseBackend::MySql;

    let mut out = String::with_capacity(sql.len());
    let mut values = Vec::new();
    let mut chars = sql.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                out.push(c);
                while let Some((_, n)) = chars.next() {
                    out.push(n);
                    if n == '\\' && backslash_escapes && c != '`' {
                        if let Some((_, escaped)) = chars.next() {
                            out.push(escaped);
                        }
                        continue;
                    }
                    // a doubled quote closes here and reopens on the next char
                    if n == c {
                        break;
                    }
                }
            }
            '-' if matches!(chars.peek(), Some((_, '-'))) => {
                out.push(c);
                for (_, n) in chars.by_ref() {
                    out.push(n);
                    if n == '\n' {
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                out.push(c);
                if let Some((_, star)) = chars.next() {
                    out.push(star);
                }
                let mut prev = '\0';
                for (_, n) in chars.by_ref() {
                    out.push(n);
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
            }
            ':' if matches!(chars.peek(), Some((_, ':'))) => {
                out.push_str("::");
                chars.next();
            }
            ':' if matches!(chars.peek(), Some(&(_, n)) if n.is_ascii_alphabetic() || n == '_') => {
                let start = i + 1;
                let mut end = start;
                while let Some(&(j, n)) = chars.peek() {
                    if !(n.is_ascii_alphanumeric() || n == '_') {
                        break;
                    }
                    end = j + n.len_utf8();
                    chars.next();
                }
                let name = &sql[start..end];
                let value = lookup
                    .get(name)
                    .ok_or_else(|| DbError::MissingParameter(name.to_string()))?;
                values.push((*value).clone());
                match backend {
                    DatabaseBackend::Postgres => out.push_str(&format!("${}", values.len())),
                    _ => out.push('?'),
                }
            }
            _ => out.push(c),
        }
    }

    Ok((out, values))
}
