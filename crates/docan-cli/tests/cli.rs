use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const INVOICE: &str = "ACME Supplies\n\
INVOICE AB1234\n\
Date March 4, 2024\n\
1 Widget 1,000.00\n\
2 Service fee 300.00\n\
Thank you for your business\n";

/// A `docan` command isolated from the user's configuration and API key.
fn docan(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("docan").unwrap();
    cmd.env("XDG_CONFIG_HOME", home)
        .env("HOME", home)
        .env_remove("OPENROUTER_API_KEY")
        .current_dir(home);
    cmd
}

fn write_invoice(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    docan(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("edit"));
}

#[test]
fn test_process_text_file_as_json() {
    let home = TempDir::new().unwrap();
    let input = write_invoice(home.path(), "invoice.txt", INVOICE);

    let output = docan(home.path())
        .arg("process")
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["header_data"]["Invoice Number"], "AB1234");
    assert_eq!(json["header_data"]["Date"], "March 4, 2024");
    assert_eq!(json["header_data"]["Total Amount"], "1300.00");
    assert_eq!(json["line_items"][0]["description"], "Widget");
    assert!(json.get("raw_text").is_none());
}

#[test]
fn test_process_without_items_reports_not_found() {
    let home = TempDir::new().unwrap();
    let input = write_invoice(home.path(), "note.txt", "Just a letter\nNo table here\n");

    docan(home.path())
        .args(["process", "-f", "text"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Invoice Number: Not Found"))
        .stdout(predicate::str::contains("Total Amount: Not Found"))
        .stdout(predicate::str::contains("No line items found."));
}

#[test]
fn test_process_csv() {
    let home = TempDir::new().unwrap();
    let input = write_invoice(home.path(), "invoice.txt", INVOICE);

    docan(home.path())
        .args(["process", "-f", "csv"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("AB1234,\"March 4, 2024\",1300.00,Widget,1000.00"));
}

#[test]
fn test_process_xlsx_writes_report_file() {
    let home = TempDir::new().unwrap();
    let input = write_invoice(home.path(), "invoice.txt", INVOICE);

    docan(home.path())
        .args(["process", "-f", "xlsx"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("invoice_AB1234.xlsx"));

    let data = fs::read(home.path().join("invoice_AB1234.xlsx")).unwrap();
    assert!(data.starts_with(b"PK"));
}

#[test]
fn test_process_rejects_unknown_format() {
    let home = TempDir::new().unwrap();
    let input = write_invoice(home.path(), "invoice.docx", INVOICE);

    docan(home.path())
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn test_process_missing_file() {
    let home = TempDir::new().unwrap();

    docan(home.path())
        .args(["process", "missing.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_batch_with_summary() {
    let home = TempDir::new().unwrap();
    let inputs = home.path().join("in");
    fs::create_dir(&inputs).unwrap();
    write_invoice(&inputs, "a.txt", INVOICE);
    write_invoice(&inputs, "b.txt", "INVOICE ZZ9\n1 Bolt 2.50\n");
    write_invoice(&inputs, "empty.txt", "   \n");

    let out = home.path().join("out");
    docan(home.path())
        .arg("batch")
        .arg(format!("{}/*.txt", inputs.display()))
        .arg("-o")
        .arg(&out)
        .args(["--summary", "--continue-on-error", "-j", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful, 1 failed"));

    assert!(out.join("a.json").exists());
    assert!(out.join("b.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("a.txt,success,AB1234,\"March 4, 2024\",1300.00,2,plain_text,"));
    assert!(lines[2].starts_with("b.txt,success,ZZ9,Not Found,2.50,1,plain_text,"));
    assert!(lines[3].starts_with("empty.txt,error,"));
}

#[test]
fn test_batch_stops_on_error() {
    let home = TempDir::new().unwrap();
    write_invoice(home.path(), "empty.txt", "");

    docan(home.path())
        .arg("batch")
        .arg(format!("{}/*.txt", home.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn test_edit_session() {
    let home = TempDir::new().unwrap();
    let input = write_invoice(home.path(), "invoice.txt", INVOICE);

    docan(home.path())
        .arg("edit")
        .arg(&input)
        .write_stdin("set number XY-9\nrm 2\nrecompute\nshow\nexport\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Amount: 1000.00"))
        .stdout(predicate::str::contains("Invoice Number: XY-9"))
        .stdout(predicate::str::contains("(modified)"));

    assert!(home.path().join("invoice_XY-9_corrected.xlsx").exists());
}

#[test]
fn test_edit_reports_bad_input() {
    let home = TempDir::new().unwrap();
    let input = write_invoice(home.path(), "invoice.txt", INVOICE);

    docan(home.path())
        .arg("edit")
        .arg(&input)
        .write_stdin("rm 9\nset total abc\nask What is the total?\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("no line item at position 8"))
        .stdout(predicate::str::contains("invalid amount: abc"))
        .stdout(predicate::str::contains("Please enter your OpenRouter API Key"));
}

#[test]
fn test_ask_requires_api_key() {
    let home = TempDir::new().unwrap();
    let input = write_invoice(home.path(), "invoice.txt", INVOICE);

    docan(home.path())
        .arg("ask")
        .arg(&input)
        .arg("What is the total?")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter your OpenRouter API Key"));
}

#[test]
fn test_config_set_and_get() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("docan.json");

    docan(home.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "chat.model", "openai/gpt-4o-mini"])
        .assert()
        .success();

    docan(home.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "chat.model"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"openai/gpt-4o-mini\""));

    docan(home.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "chat.nonexistent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn test_config_path_default_location() {
    let home = TempDir::new().unwrap();

    docan(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docan"))
        .stdout(predicate::str::contains("not created"));
}
