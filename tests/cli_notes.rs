use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn slurmux(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("slurmux");
    cmd.env_remove("SLURMUX_CONFIG")
        .arg("--data-dir")
        .arg(dir.path());
    cmd
}

#[test]
fn notes_set_list_and_delete() {
    let dir = TempDir::new().expect("tempdir");

    slurmux(&dir)
        .args(["notes", "set", "gpu03:train", "lr", "sweep", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("noted gpu03:train"));

    slurmux(&dir)
        .args(["notes", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gpu03:train\tlr sweep 3"));

    assert!(dir.path().join("notes.json").exists());

    slurmux(&dir)
        .args(["notes", "delete", "gpu03:train"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted note for gpu03:train"));

    slurmux(&dir)
        .args(["notes", "delete", "gpu03:train"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no note for gpu03:train"));
}

#[test]
fn placeholder_rows_cannot_carry_notes() {
    let dir = TempDir::new().expect("tempdir");
    slurmux(&dir)
        .args(["notes", "set", "gpu01:<Start Shell>", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("placeholder"));
}

#[test]
fn watch_add_list_and_remove() {
    let dir = TempDir::new().expect("tempdir");

    slurmux(&dir)
        .args(["watch", "add", "gpu03:train", "--minutes", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("watching gpu03:train (alert after 120s idle)"));

    slurmux(&dir)
        .args(["watch", "add", "gpu03:eval"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alert after 300s idle"));

    slurmux(&dir)
        .args(["watch", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("gpu03:train\tthreshold=120s")
                .and(predicate::str::contains("gpu03:eval\tthreshold=300s")),
        );

    slurmux(&dir)
        .args(["watch", "remove", "gpu03:train"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stopped watching gpu03:train"));

    slurmux(&dir)
        .args(["watch", "remove", "gpu03:train"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("gpu03:train is not watched"));
}

#[test]
fn invalid_watch_threshold_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    slurmux(&dir)
        .args(["watch", "add", "gpu03:train", "--minutes", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid threshold"));
}

#[test]
fn alert_test_without_webhook_fails() {
    let dir = TempDir::new().expect("tempdir");
    slurmux(&dir)
        .arg("alert-test")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no webhook_url configured"));
}
