use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../formtab-core/tests/fixtures/two_pages.json")
}

fn formtab(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("formtab").unwrap();
    cmd.env("XDG_CONFIG_HOME", home)
        .env("HOME", home)
        .env_remove("RUST_LOG")
        .current_dir(home);
    cmd
}

fn batch_input(dir: &TempDir) -> PathBuf {
    let input = dir.path().join("input");
    fs::create_dir(&input).unwrap();
    fs::copy(fixture(), input.join("01_report.json")).unwrap();
    fs::write(input.join("02_broken.json"), "%PDF-1.7 not a result").unwrap();
    fs::write(input.join("readme.txt"), "ignored").unwrap();
    input
}

#[test]
fn test_batch_writes_dataset_and_errors() {
    let dir = TempDir::new().unwrap();
    let input = batch_input(&dir);
    let output = dir.path().join("dataset.csv");
    let errors = dir.path().join("errors.json");

    formtab(dir.path())
        .arg("batch")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--errors")
        .arg(&errors)
        .arg("--results-dir")
        .arg(dir.path().join("results"))
        .arg("--log-dir")
        .arg(dir.path().join("var"))
        .assert()
        .success()
        .stderr(predicate::str::contains("1 successful, 1 failed"));

    let csv = fs::read_to_string(&output).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("ENSAYO,METODO,RESULTADO,CLIENTE,PRODUCTO,FECHA,NUM PAGINA,ARCHIVO")
    );
    assert_eq!(
        lines.next(),
        Some("Octanaje RON,ASTM D2699,95.3,Estaciones del Norte S.A.,Gasohol 95 Plus,2023-10-03 09:15:00,1,01_report.pdf")
    );
    assert_eq!(csv.lines().count(), 4);
    assert!(!csv.contains("02_broken"));

    let errors = fs::read_to_string(&errors).unwrap();
    assert!(errors.contains("02_broken.json"));
    assert!(errors.contains("\"analysis\""));

    assert!(dir.path().join("results/01_report.json").exists());
    let checkpoint = fs::read_to_string(dir.path().join("var/checkpoint.txt")).unwrap();
    assert_eq!(checkpoint, r#"["01_report.pdf"]"#);
}

#[test]
fn test_batch_resume_and_fail_on_error() {
    let dir = TempDir::new().unwrap();
    let input = batch_input(&dir);

    formtab(dir.path())
        .arg("batch")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("first.csv"))
        .assert()
        .success();

    formtab(dir.path())
        .arg("batch")
        .arg(&input)
        .arg("--resume")
        .arg("--fail-on-error")
        .arg("-f")
        .arg("json")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Octanaje").not())
        .stderr(predicate::str::contains("1 skipped"))
        .stderr(predicate::str::contains("1 documents failed"));
}

#[test]
fn test_batch_missing_input_dir() {
    let dir = TempDir::new().unwrap();

    formtab(dir.path())
        .arg("batch")
        .arg(dir.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input directory not found"));
}

#[test]
fn test_inspect_text_and_csv() {
    let dir = TempDir::new().unwrap();

    formtab(dir.path())
        .arg("inspect")
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Address: Av. Panamericana Norte km 22 Carabayllo",
        ))
        .stdout(predicate::str::contains("Diesel B5"))
        .stdout(predicate::str::contains("3 rows x 7 columns"));

    formtab(dir.path())
        .args(["inspect", "--format", "csv", "--page", "2"])
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "ENSAYO,METODO,RESULTADO,CLIENTE,PRODUCTO,FECHA\n",
        ))
        .stdout(predicate::str::contains("Punto de inflamacion,ASTM D93,58"))
        .stdout(predicate::str::contains("Octanaje").not());
}

#[test]
fn test_inspect_json() {
    let dir = TempDir::new().unwrap();

    let assert = formtab(dir.path())
        .args(["inspect", "--format", "json"])
        .arg(fixture())
        .assert()
        .success();

    let value: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(value["address"], "Av. Panamericana Norte km 22 Carabayllo");
    assert_eq!(value["pages"].as_array().unwrap().len(), 2);
    assert_eq!(value["pages"][1]["product"], "Diesel B5");
    assert_eq!(value["table"][2]["NUM PAGINA"], "2");
}

#[test]
fn test_config_set_renames_columns() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("formtab.json");

    formtab(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();

    formtab(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "extraction.columns.client", "CLIENT"])
        .assert()
        .success();

    formtab(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "extraction.columns.client"])
        .assert()
        .success()
        .stdout("\"CLIENT\"\n");

    formtab(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "extraction.columns.nope", "X"])
        .assert()
        .failure();

    formtab(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["inspect", "--format", "csv"])
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains(",CLIENT,PRODUCTO,"));
}
