mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use common::script;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("comanda"));
    cmd.arg("tests/fixtures/floor.csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "order,destination,status,items,owed,paid,remaining,justification",
        ))
        .stdout(predicate::str::contains(",table:5,FINISHED,3,58.00,58.00,0.00,"))
        .stdout(predicate::str::contains(
            ",takeaway:Ana,FINISHED,1,12.00,5.00,7.00,cliente sem dinheiro",
        ))
        .stdout(predicate::str::contains(",table:7+8,PREPARING,2,9.00,0.00,9.00,"))
        .stderr(predicate::str::contains("Error").not());

    Ok(())
}

#[test]
fn test_second_submission_appends_to_table() {
    let input = script(&[
        "submit,table:5,burger,25.00,2,,,",
        "ready,table:5,,,,,,",
        "submit,table:5,soda,8.00,1,,,",
    ]);

    let output = Command::new(cargo_bin!("comanda"))
        .arg(input.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let rows: Vec<&str> = stdout.lines().skip(1).collect();
    assert_eq!(rows.len(), 1, "{stdout}");
    assert!(rows[0].contains(",table:5,PREPARING,3,58.00,0.00,58.00,"));
}

#[test]
fn test_shortfall_without_justification_is_rejected() {
    let input = script(&[
        "submit,table:5,burger,25.00,2,,,",
        "ready,table:5,,,,,,",
        "deliver,table:5,,,,,,",
        "pay,table:5,,,,cash,30.00,",
        "close,table:5,,,,,,",
    ]);

    Command::new(cargo_bin!("comanda"))
        .arg(input.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Error processing row 6"))
        .stdout(predicate::str::contains(",table:5,DELIVERED,2,50.00,30.00,20.00,"));
}

#[test]
fn test_bad_rows_are_reported_and_skipped() {
    let input = script(&[
        "cook,table:5,,,,,,",
        "submit,bar:1,burger,25.00,1,,,",
        "ready,table:9,,,,,,",
        "submit,table:1,water,4.50,0,,,",
        "submit,table:2,water,4.50,1,,,",
    ]);

    Command::new(cargo_bin!("comanda"))
        .arg(input.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Error reading row 2"))
        .stderr(predicate::str::contains("Error reading row 3"))
        .stderr(predicate::str::contains("Error processing row 4"))
        .stderr(predicate::str::contains("Error processing row 5"))
        .stdout(predicate::str::contains(",table:2,PREPARING,1,4.50,0.00,4.50,"))
        .stdout(predicate::str::contains("table:1").not());
}

const CLOSE_TABLE_THREE: [&str; 5] = [
    "submit,table:3,burger,25.00,1,,,",
    "ready,table:3,,,,,,",
    "deliver,table:3,,,,,,",
    "pay,table:3,,,,debit,25.00,",
    "close,table:3,,,,,,",
];

#[test]
fn test_oversized_amounts_are_rejected() {
    let input = script(&[
        "submit,table:1,caviar,90000000000000000.00,2,,,",
        "submit,table:1,caviar,90.00,20000,,,",
        "submit,table:2,water,4.50,1,,,",
    ]);

    Command::new(cargo_bin!("comanda"))
        .arg(input.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Error reading row 2"))
        .stderr(predicate::str::contains("Error processing row 3"))
        .stdout(predicate::str::contains(",table:2,PREPARING,1,4.50,0.00,4.50,"))
        .stdout(predicate::str::contains("table:1,").not());
}

#[test]
fn test_joined_tables_are_billed_one_at_a_time() {
    let input = script(&[
        "submit,table:5+6,burger,25.00,1,,,",
        "ready,table:5+6,,,,,,",
        "deliver,table:5+6,,,,,,",
        "pay,table:5+6,,,,cash,25.00,",
        "pay,table:5,,,,cash,25.00,",
        "close,table:5+6,,,,,,",
        "close,table:6,,,,,,",
    ]);

    Command::new(cargo_bin!("comanda"))
        .arg(input.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Error processing row 5"))
        .stderr(predicate::str::contains("Error processing row 7"))
        .stderr(predicate::str::contains("Error processing row 8").not())
        .stdout(predicate::str::contains(",table:5+6,FINISHED,1,25.00,25.00,0.00,"));
}

#[test]
fn test_cleaning_step_parks_table() {
    let input = script(&CLOSE_TABLE_THREE);

    Command::new(cargo_bin!("comanda"))
        .arg(input.path())
        .arg("--cleaning-step")
        .assert()
        .success()
        .stdout(predicate::str::contains(",table:3,NEEDS_CLEANING,1,25.00,25.00,0.00,"));

    let mut rows = CLOSE_TABLE_THREE.to_vec();
    rows.push("clean,table:3,,,,,,");
    let input = script(&rows);

    Command::new(cargo_bin!("comanda"))
        .arg(input.path())
        .env("COMANDA_CLEANING_STEP", "true")
        .assert()
        .success()
        .stdout(predicate::str::contains(",table:3,FINISHED,1,25.00,25.00,0.00,"));
}

#[test]
fn test_missing_input_fails() {
    Command::new(cargo_bin!("comanda"))
        .arg("tests/fixtures/does-not-exist.csv")
        .assert()
        .failure();
}
