use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn cli() -> Command {
    Command::cargo_bin("library-fees").unwrap()
}

#[test]
fn test_report_writes_output_and_exits_zero() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("book_returns.csv");
    let output = dir.path().join("book_fees.csv");
    fs::write(
        &input,
        "patron_id,due_date,return_date,fee_per_day\nA,2021-01-01,2021-01-05,1.00\n",
    )
    .unwrap();

    cli()
        .args(["report", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .arg("--print")
        .assert()
        .success()
        .stdout(predicate::str::contains("Book returns: 1 records read"))
        .stdout(predicate::str::contains("A,4.00"));

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "patron_id,total_fees\nA,4.00\n"
    );
}

#[test]
fn test_report_with_checkout_schema() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("checkouts.csv");
    let output = dir.path().join("late.csv");
    fs::write(
        &input,
        "patron_id,date_due,date_returned\nP1,02/01/2021,02/05/21\n",
    )
    .unwrap();

    cli()
        .args(["report", "--schema", "library-checkouts", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "patron_id,late_fees\nP1,1.00\n"
    );
}

#[test]
fn test_report_failure_exits_nonzero_without_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("book_returns.csv");
    let output = dir.path().join("book_fees.csv");
    fs::write(
        &input,
        "patron_id,due_date,return_date,fee_per_day\nA,2021-02-30,2021-03-05,1.00\n",
    )
    .unwrap();

    cli()
        .args(["report", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("parsing"));

    assert!(!output.exists());
}

#[test]
fn test_missing_input_exits_nonzero() {
    let dir = tempdir().unwrap();

    cli()
        .args(["report", "--input"])
        .arg(dir.path().join("absent.csv"))
        .arg("--output")
        .arg(dir.path().join("out.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("io"));
}

#[test]
fn test_reformat_prints_display_dates() {
    cli()
        .args(["reformat", "2021-01-02", "2001-01-25"])
        .assert()
        .success()
        .stdout("02 Jan 2021\n25 Jan 2001\n");
}

#[test]
fn test_range_and_pair() {
    cli()
        .args(["range", "--start", "2021-01-30", "--count", "3"])
        .assert()
        .success()
        .stdout("2021-01-30\n2021-01-31\n2021-02-01\n");

    cli()
        .args(["pair", "--start", "2021-01-01", "10", "20"])
        .assert()
        .success()
        .stdout("2021-01-01,10\n2021-01-02,20\n");
}

#[test]
fn test_range_rejects_negative_count() {
    cli()
        .args(["range", "--start", "2021-01-01", "--count", "-2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-negative"));
}
