//! Driver error translation and schema checks for the MySQL store

use vt_core::errors::StoreError;

use crate::database::mysql::verification_store_impl::{classify_database_error, map_sqlx_error};
use crate::database::mysql::CREATE_TABLE_SQL;

#[test]
fn test_connection_failures_are_transient() {
    let io = sqlx::Error::Io(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"));
    assert!(map_sqlx_error(io).is_transient());
    assert!(map_sqlx_error(sqlx::Error::PoolTimedOut).is_transient());
    assert!(map_sqlx_error(sqlx::Error::PoolClosed).is_transient());
}

#[test]
fn test_decode_failures_are_corrupt() {
    let err = map_sqlx_error(sqlx::Error::ColumnNotFound("state".to_string()));
    assert!(matches!(err, StoreError::Corrupt { .. }));
    assert!(!err.is_transient());
}

#[test]
fn test_only_lock_contention_server_errors_are_transient() {
    assert!(classify_database_error(Some(1213), "Deadlock found".to_string()).is_transient());
    assert!(classify_database_error(Some(1205), "Lock wait timeout exceeded".to_string()).is_transient());

    // Data too long for column
    let err = classify_database_error(Some(1406), "Data too long".to_string());
    assert!(matches!(err, StoreError::Corrupt { .. }));
    assert!(!err.is_transient());

    // Unknown column
    assert!(!classify_database_error(Some(1054), "Unknown column".to_string()).is_transient());
    assert!(!classify_database_error(None, "unrecognised".to_string()).is_transient());
}

#[test]
fn test_schema_has_version_and_sweep_index() {
    assert!(CREATE_TABLE_SQL.contains("version BIGINT"));
    assert!(CREATE_TABLE_SQL.contains("idx_state_expires (state, expires_at)"));
    assert!(CREATE_TABLE_SQL.contains("secret_hash CHAR(64)"));
}
