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

use std::cell::RefCell;
use std::collections::HashMap;
use db_connector::{Credentials, DbConfig, DbError, Engine, Role};

fn full_env() -> HashMap<String, String> {
    [
        ("DB_HOST", "h"),
        ("DB_PORT_PGSQL", "5432"),
        ("DB_PORT_MYSQL", "3306"),
        ("DB_READONLY_USER", "ro_user"),
        ("DB_READONLY_PASS", "ro_pass"),
        ("DB_UPDATE_USER", "up_user"),
        ("DB_UPDATE_PASS", "up_pass"),
        ("DB_DELETE_USER", "del_user"),
        ("DB_DELETE_PASS", "del_pass"),
        ("DB_AUTH_USER", "auth_user"),
        ("DB_AUTH_PASS", "auth_pass"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[test]
fn test_role_parse_when_known_names_then_all_roles() {
    assert_eq!("readonly".parse::<Role>().unwrap(), Role::ReadOnly);
    assert_eq!("insertupdate".parse::<Role>().unwrap(), Role::InsertUpdate);
    assert_eq!("delete".parse::<Role>().unwrap(), Role::Delete);
    assert_eq!("auth".parse::<Role>().unwrap(), Role::Auth);
}

#[test]
fn test_role_parse_when_unknown_or_wrong_case_then_unsupported_role() {
    for name in ["admin", "", "ReadOnly"] {
        match name.parse::<Role>() {
            Err(DbError::UnsupportedRole(role)) => assert_eq!(role, name),
            other => panic!("Expected UnsupportedRole, got {:?}", other),
        }
    }
    let message = "admin".parse::<Role>().unwrap_err().to_string();
    for legal in ["'readonly'", "'insertupdate'", "'delete'", "'auth'"] {
        assert!(message.contains(legal), "{} missing from {}", legal, message);
    }
}

#[test]
fn test_engine_parse_when_mixed_case_then_normalized() {
    assert_eq!("PGSQL".parse::<Engine>().unwrap(), Engine::PostgreSql);
    assert_eq!("MySql".parse::<Engine>().unwrap(), Engine::MySql);
}

#[test]
fn test_engine_parse_when_unknown_then_unsupported_engine() {
    let err = "Oracle".parse::<Engine>().unwrap_err();
    match &err {
        DbError::UnsupportedEngine(engine) => assert_eq!(engine, "oracle"),
        other => panic!("Expected UnsupportedEngine, got {:?}", other),
    }
    let message = err.to_string();
    assert!(message.contains("'pgsql'") && message.contains("'mysql'"));
}

#[test]
fn test_dsn_when_postgres_then_exact_template() {
    assert_eq!(Engine::PostgreSql.dsn("h", "5432", "db"), "pgsql:host=h;port=5432;dbname=db");
}

#[test]
fn test_dsn_when_mysql_then_exact_template() {
    assert_eq!(
        Engine::MySql.dsn("h", "3306", "db"),
        "mysql:host=h;port=3306;dbname=db;charset=utf8mb4"
    );
}

#[test]
fn test_resolve_when_all_roles_and_engines_then_config_built() {
    let env = full_env();
    for role in Role::ALL {
        for engine in Engine::ALL {
            let config = DbConfig::resolve(engine.as_str(), "db", role, |k| env.get(k).cloned()).unwrap();
            let (user_var, pass_var) = role.credential_vars();
            assert_eq!(config.credentials.username, env[user_var]);
            assert_eq!(config.credentials.password, env[pass_var]);
            assert_eq!(config.descriptor.engine, engine);
            assert_eq!(config.descriptor.role, role);
            assert_eq!(config.descriptor.database, "db");
            assert_eq!(config.port, env[engine.port_var()]);
        }
    }
}

#[test]
fn test_resolve_when_pgsql_then_dsn_matches() {
    let env = full_env();
    let config = DbConfig::resolve("pgsql", "db", Role::ReadOnly, |k| env.get(k).cloned()).unwrap();
    assert_eq!(config.dsn(), "pgsql:host=h;port=5432;dbname=db");
    let config = DbConfig::resolve("mysql", "db", Role::ReadOnly, |k| env.get(k).cloned()).unwrap();
    assert_eq!(config.dsn(), "mysql:host=h;port=3306;dbname=db;charset=utf8mb4");
}

#[test]
fn test_resolve_when_credential_missing_or_empty_then_incomplete_credentials() {
    for role in Role::ALL {
        let (user_var, pass_var) = role.credential_vars();
        for var in [user_var, pass_var] {
            let mut missing = full_env();
            missing.remove(var);
            let mut empty = full_env();
            empty.insert(var.to_string(), String::new());
            for env in [missing, empty] {
                match DbConfig::resolve("pgsql", "db", role, |k| env.get(k).cloned()) {
                    Err(DbError::IncompleteCredentials { role: r }) => assert_eq!(r, role),
                    other => panic!("Expected IncompleteCredentials, got {:?}", other),
                }
            }
        }
    }
}

#[test]
fn test_resolve_when_incomplete_credentials_then_message_names_role() {
    let err = DbConfig::resolve("pgsql", "db", Role::Delete, |_| None).unwrap_err();
    assert!(err.to_string().contains("'delete'"));
}

#[test]
fn test_resolve_when_bad_engine_and_missing_credentials_then_credentials_reported_first() {
    let result = DbConfig::resolve("oracle", "db", Role::Auth, |_| None);
    assert!(matches!(result, Err(DbError::IncompleteCredentials { role: Role::Auth })));
}

#[test]
fn test_resolve_when_bad_engine_then_host_and_port_not_read() {
    let env = full_env();
    let read = RefCell::new(Vec::new());
    let result = DbConfig::resolve("sqlite", "db", Role::ReadOnly, |k| {
        read.borrow_mut().push(k.to_string());
        env.get(k).cloned()
    });
    assert!(matches!(result, Err(DbError::UnsupportedEngine(_))));
    assert_eq!(*read.borrow(), vec!["DB_READONLY_USER".to_string(), "DB_READONLY_PASS".to_string()]);
}

#[test]
fn test_resolve_when_database_empty_then_error() {
    let env = full_env();
    let result = DbConfig::resolve("mysql", "", Role::ReadOnly, |k| env.get(k).cloned());
    assert!(matches!(result, Err(DbError::EmptyDatabaseName)));
}

#[test]
fn test_resolve_when_host_and_port_missing_then_empty_fields() {
    let mut env = full_env();
    env.remove("DB_HOST");
    env.remove("DB_PORT_MYSQL");
    let config = DbConfig::resolve("mysql", "db", Role::InsertUpdate, |k| env.get(k).cloned()).unwrap();
    assert_eq!(config.dsn(), "mysql:host=;port=;dbname=db;charset=utf8mb4");
}

#[test]
fn test_credentials_debug_when_formatted_then_password_redacted() {
    let credentials = Credentials {
        username: "ro_user".to_string(),
        password: "s3cret".to_string(),
    };
    let printed = format!("{:?}", credentials);
    assert!(printed.contains("ro_user"));
    assert!(!printed.contains("s3cret"));
}
