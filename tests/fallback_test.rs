mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use common::script;
use predicates::prelude::*;
use std::process::Command;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let input = script(&["submit,table:1,water,4.50,1,,,"]);

    let mut cmd = Command::new(cargo_bin!("comanda"));
    cmd.arg(input.path()).arg("--db-path").arg("some_db");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage.",
        ))
        .stdout(predicate::str::contains(",table:1,PREPARING,1,4.50,0.00,4.50,"));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let input = script(&["submit,table:1,water,4.50,1,,,"]);
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut cmd = Command::new(cargo_bin!("comanda"));
    cmd.arg(input.path()).arg("--db-path").arg(&db_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Falling back").not());
}
