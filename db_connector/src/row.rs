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

//! Row decoding module
//! Turns a driver row into (column name, JSON value) pairs, one per column, in
//! column order. A column whose type has no JSON mapping is an error, never
//! skipped.

use std::net::IpAddr;
use sea_orm::sea_query::sea_value_to_json_value;
use sea_orm::sqlx::error::BoxDynError;
use sea_orm::sqlx::mysql::types::MySqlTime;
use sea_orm::sqlx::mysql::{MySql, MySqlRow};
use sea_orm::sqlx::postgres::types::{Oid, PgInterval, PgMoney};
use sea_orm::sqlx::postgres::{PgRow, PgTypeKind, PgValueFormat, PgValueRef, Postgres};
use sea_orm::sqlx::sqlite::{Sqlite, SqliteRow};
use sea_orm::sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_orm::sqlx::types::{BigDecimal, Json, Uuid};
use sea_orm::sqlx::{Column, Database, Decode, Row, TypeInfo, ValueRef};
use sea_orm::{DbErr, JsonValue, QueryResult, Value};
use serde_json::json;

/// Fractional digits of the `money` type under the usual lc_monetary settings
const PG_MONEY_FRACTION_DIGITS: i64 = 2;

/// Decodes every column of `result`, keeping duplicate names and column order.
pub(crate) fn decode_columns(result: &QueryResult) -> Result<Vec<(String, JsonValue)>, DbErr> {
    let columns = if let Some(row) = result.try_as_pg_row() {
        decode_with(row, pg_value)?
    } else if let Some(row) = result.try_as_mysql_row() {
        decode_with(row, mysql_value)?
    } else if let Some(row) = result.try_as_sqlite_row() {
        decode_with(row, sqlite_value)?
    } else if let Some(row) = result.try_as_mock_row() {
        row.clone()
            .into_column_value_tuples()
            .map(|(name, value)| (name, mock_value(&value)))
            .collect()
    } else {
        return Err(DbErr::Type("row from an unsupported backend".to_string()));
    };

    let expected = result.column_names().len();
    if columns.len() != expected {
        return Err(DbErr::Type(format!("decoded {} of {} columns", columns.len(), expected)));
    }
    Ok(columns)
}

fn decode_with<R, F>(row: &R, decode: F) -> Result<Vec<(String, JsonValue)>, DbErr>
where
    R: Row,
    F: Fn(&R, usize) -> Result<JsonValue, BoxDynError>,
{
    row.columns()
        .iter()
        .map(|column| {
            let name = column.name();
            decode(row, column.ordinal())
                .map(|value| (name.to_string(), value))
                .map_err(|e| DbErr::Type(format!("column '{}': {}", name, e)))
        })
        .collect()
}

fn get<'r, DB: Database, T: Decode<'r, DB>>(value: DB::ValueRef<'r>) -> Result<T, BoxDynError> {
    T::decode(value)
}

fn unsupported(type_name: &str) -> BoxDynError {
    format!("unsupported column type {}", type_name).into()
}

fn pg_value(row: &PgRow, index: usize) -> Result<JsonValue, BoxDynError> {
    let value = row.try_get_raw(index)?;
    if value.is_null() {
        return Ok(JsonValue::Null);
    }
    let type_info = value.type_info().into_owned();
    if let PgTypeKind::Enum(_) = type_info.kind() {
        return Ok(json!(get::<Postgres, String>(value)?));
    }

    Ok(match type_info.name() {
        "BOOL" => json!(get::<Postgres, bool>(value)?),
        "INT2" => json!(get::<Postgres, i16>(value)?),
        "INT4" => json!(get::<Postgres, i32>(value)?),
        "INT8" => json!(get::<Postgres, i64>(value)?),
        "OID" => json!(get::<Postgres, Oid>(value)?.0),
        "FLOAT4" => json!(get::<Postgres, f32>(value)?),
        "FLOAT8" => json!(get::<Postgres, f64>(value)?),
        "NUMERIC" => json!(get::<Postgres, BigDecimal>(value)?.to_string()),
        "MONEY" => json!(get::<Postgres, PgMoney>(value)?
            .to_bigdecimal(PG_MONEY_FRACTION_DIGITS)
            .to_string()),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CITEXT" | "XML" | "UNKNOWN" => {
            json!(get::<Postgres, String>(value)?)
        }
        "UUID" => json!(get::<Postgres, Uuid>(value)?.to_string()),
        "JSON" | "JSONB" => get::<Postgres, Json<JsonValue>>(value)?.0,
        "BYTEA" => json!(get::<Postgres, Vec<u8>>(value)?),
        "DATE" => json!(get::<Postgres, NaiveDate>(value)?.to_string()),
        "TIME" => json!(get::<Postgres, NaiveTime>(value)?.to_string()),
        "TIMESTAMP" => json!(get::<Postgres, NaiveDateTime>(value)?.to_string()),
        "TIMESTAMPTZ" => json!(get::<Postgres, DateTime<Utc>>(value)?.to_rfc3339()),
        "INTERVAL" => {
            let interval = get::<Postgres, PgInterval>(value)?;
            json!({
                "months": interval.months,
                "days": interval.days,
                "microseconds": interval.microseconds,
            })
        }
        "INET" | "CIDR" => pg_inet(value)?,
        "MACADDR" => pg_macaddr(value)?,
        "BIT" | "VARBIT" => pg_bits(value)?,
        "BOOL[]" => json!(get::<Postgres, Vec<Option<bool>>>(value)?),
        "INT2[]" => json!(get::<Postgres, Vec<Option<i16>>>(value)?),
        "INT4[]" => json!(get::<Postgres, Vec<Option<i32>>>(value)?),
        "INT8[]" => json!(get::<Postgres, Vec<Option<i64>>>(value)?),
        "FLOAT8[]" => json!(get::<Postgres, Vec<Option<f64>>>(value)?),
        "TEXT[]" | "VARCHAR[]" => json!(get::<Postgres, Vec<Option<String>>>(value)?),
        other => return Err(unsupported(other)),
    })
}

// inet/cidr binary layout: family, prefix bits, is_cidr, address length, address
fn pg_inet(value: PgValueRef<'_>) -> Result<JsonValue, BoxDynError> {
    if value.format() == PgValueFormat::Text {
        return Ok(json!(value.as_str()?));
    }
    let (bits, is_cidr, addr) = match value.as_bytes()? {
        [2, bits, is_cidr, 4, addr @ ..] => (*bits, *is_cidr != 0, IpAddr::from(<[u8; 4]>::try_from(addr)?)),
        [3, bits, is_cidr, 16, addr @ ..] => (*bits, *is_cidr != 0, IpAddr::from(<[u8; 16]>::try_from(addr)?)),
        _ => return Err("malformed inet value".into()),
    };
    let full = if addr.is_ipv4() { 32 } else { 128 };
    if is_cidr || bits != full {
        Ok(json!(format!("{}/{}", addr, bits)))
    } else {
        Ok(json!(addr.to_string()))
    }
}

fn pg_macaddr(value: PgValueRef<'_>) -> Result<JsonValue, BoxDynError> {
    if value.format() == PgValueFormat::Text {
        return Ok(json!(value.as_str()?));
    }
    let octets: Vec<String> = value.as_bytes()?.iter().map(|b| format!("{:02x}", b)).collect();
    Ok(json!(octets.join(":")))
}

// bit/varbit binary layout: i32 bit count, then the bits packed most significant first
fn pg_bits(value: PgValueRef<'_>) -> Result<JsonValue, BoxDynError> {
    if value.format() == PgValueFormat::Text {
        return Ok(json!(value.as_str()?));
    }
    let bytes = value.as_bytes()?;
    if bytes.len() < 4 {
        return Err("malformed bit string".into());
    }
    let (len, data) = bytes.split_at(4);
    let len = i32::from_be_bytes(<[u8; 4]>::try_from(len)?).max(0) as usize;
    if data.len() * 8 < len {
        return Err("malformed bit string".into());
    }
    let bits: String = (0..len)
        .map(|i| if data[i / 8] & (0x80 >> (i % 8)) != 0 { '1' } else { '0' })
        .collect();
    Ok(json!(bits))
}

fn mysql_value(row: &MySqlRow, index: usize) -> Result<JsonValue, BoxDynError> {
    let value = row.try_get_raw(index)?;
    if value.is_null() {
        return Ok(JsonValue::Null);
    }
    let type_info = value.type_info().into_owned();

    Ok(match type_info.name() {
        // TINYINT(1) is reported as BOOLEAN but may hold any tinyint
        "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            json!(get::<MySql, i64>(value)?)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" | "BIT" => json!(get::<MySql, u64>(value)?),
        "FLOAT" => json!(get::<MySql, f32>(value)?),
        "DOUBLE" => json!(get::<MySql, f64>(value)?),
        "DECIMAL" => json!(get::<MySql, BigDecimal>(value)?.to_string()),
        "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET" => {
            json!(get::<MySql, String>(value)?)
        }
        "JSON" => get::<MySql, Json<JsonValue>>(value)?.0,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "GEOMETRY" => {
            json!(get::<MySql, Vec<u8>>(value)?)
        }
        "DATE" => json!(get::<MySql, NaiveDate>(value)?.to_string()),
        "DATETIME" | "TIMESTAMP" => json!(get::<MySql, NaiveDateTime>(value)?.to_string()),
        "TIME" => json!(get::<MySql, MySqlTime>(value)?.to_string()),
        other => return Err(unsupported(other)),
    })
}

// sqlite reports the storage class of the value itself, not the declared column type
fn sqlite_value(row: &SqliteRow, index: usize) -> Result<JsonValue, BoxDynError> {
    let value = row.try_get_raw(index)?;
    if value.is_null() {
        return Ok(JsonValue::Null);
    }
    let type_info = value.type_info().into_owned();

    Ok(match type_info.name() {
        "INTEGER" => json!(get::<Sqlite, i64>(value)?),
        "REAL" => json!(get::<Sqlite, f64>(value)?),
        "TEXT" => json!(get::<Sqlite, String>(value)?),
        "BLOB" => json!(get::<Sqlite, Vec<u8>>(value)?),
        other => return Err(unsupported(other)),
    })
}

fn mock_value(value: &Value) -> JsonValue {
    match value {
        Value::Bytes(Some(bytes)) => json!(bytes.as_slice()),
        other => sea_value_to_json_value(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use sea_orm::{ConnectionTrait, Statement};
    use std::collections::BTreeMap;

    async fn mock_result(row: BTreeMap<&str, Value>) -> QueryResult {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row]])
            .into_connection();
        db.query_one(Statement::from_string(DatabaseBackend::Postgres, "SELECT 1"))
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_decode_columns_when_mock_row_then_every_column_kept() {
        let row = BTreeMap::from([
            ("a", Value::from(1i64)),
            ("b", Value::from("x")),
            ("c", Value::String(None)),
            ("d", Value::from(vec![0xffu8, 0x00])),
        ]);
        let columns = decode_columns(&mock_result(row).await).unwrap();
        assert_eq!(
            columns,
            vec![
                ("a".to_string(), json!(1)),
                ("b".to_string(), json!("x")),
                ("c".to_string(), JsonValue::Null),
                ("d".to_string(), json!([255, 0])),
            ]
        );
    }
}
