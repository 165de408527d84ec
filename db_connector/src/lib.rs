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

//! Role-based database connector
//! Resolves credentials from the environment by access role and opens a single
//! MySQL or PostgreSQL connection with thin query and transaction helpers

pub mod config;
pub mod error;
pub mod params;
pub mod rdb_many_types {
    pub mod postgresql;
    pub mod mysql;
    pub(crate) mod pool;
}
mod row;
pub mod connection;

pub use config::{ConnectionDescriptor, Credentials, DbConfig, Engine, Role};
pub use connection::{DbConnector, Row};
pub use error::DbError;
pub use params::Params;
