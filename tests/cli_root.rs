use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn root_help_lists_expected_subcommands() {
    let mut cmd = cargo_bin_cmd!("slurmux");
    cmd.arg("--help");

    cmd.assert().success().stdout(
        predicate::str::contains("tui")
            .and(predicate::str::contains("sessions"))
            .and(predicate::str::contains("notes"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn invalid_subcommand_returns_non_zero() {
    let mut cmd = cargo_bin_cmd!("slurmux");
    cmd.arg("not-a-real-subcommand");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("error").or(predicate::str::contains("unrecognized")));
}

#[test]
fn malformed_session_key_is_rejected_by_the_parser() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let mut cmd = cargo_bin_cmd!("slurmux");
    cmd.arg("--data-dir")
        .arg(dir.path())
        .args(["notes", "set", "no-separator", "text"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("missing ':' separator"));
}
