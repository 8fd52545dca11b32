#[path = "helpers/fake_cluster.rs"]
mod fake_cluster;

use fake_cluster::FakeCluster;
use slurmux::domain::START_SHELL;
use slurmux::tmux::{ProbeConfig, SHELL_PLACEHOLDER_LINE, SessionProber};

fn prober(cluster: &FakeCluster) -> SessionProber<'_, FakeCluster> {
    SessionProber::new(cluster, ProbeConfig::default())
}

#[test]
fn lists_sessions_with_window_counts() {
    let cluster = FakeCluster::new().sessions("gpu03", &[("train", 3), ("eval", 1)]);
    let (sessions, error) = prober(&cluster).list_sessions("gpu03");
    assert_eq!(error, None);
    assert_eq!(
        sessions,
        vec![("train".to_string(), 3), ("eval".to_string(), 1)]
    );

    let (node, remote) = &cluster.ssh_commands()[0];
    assert_eq!(node, "gpu03");
    assert!(remote.starts_with("tmux list-sessions"));
    let args = &cluster.calls()[0].1;
    assert!(args.iter().any(|arg| arg == "BatchMode=yes"));
}

#[test]
fn missing_tmux_server_is_an_empty_node_not_an_error() {
    let cluster = FakeCluster::new().no_server("gpu01");
    let (sessions, error) = prober(&cluster).list_sessions("gpu01");
    assert!(sessions.is_empty());
    assert_eq!(error, None);
}

#[test]
fn unreachable_node_reports_a_node_prefixed_error() {
    let cluster = FakeCluster::new().unreachable(
        "gpu09",
        "ssh: connect to host gpu09 port 22: Connection timed out\n",
    );
    let (sessions, error) = prober(&cluster).list_sessions("gpu09");
    assert!(sessions.is_empty());
    let error = error.unwrap_or_default();
    assert!(error.starts_with("gpu09: "), "unexpected error: {error}");
    assert!(error.contains("Connection timed out"));
}

#[test]
fn capture_quotes_the_target_and_returns_pane_lines() {
    let cluster = FakeCluster::new()
        .sessions("gpu03", &[("train", 3)])
        .pane("gpu03", "train", &["epoch 1", "epoch 2"]);
    let lines = prober(&cluster).capture("gpu03", "train");
    assert_eq!(lines, vec!["epoch 1", "epoch 2"]);

    let (_, remote) = &cluster.ssh_commands()[0];
    assert!(remote.contains("-t 'train'"), "unexpected remote: {remote}");
    assert!(remote.ends_with("-S -10"), "unexpected remote: {remote}");
}

#[test]
fn placeholder_capture_never_touches_the_network() {
    let cluster = FakeCluster::new();
    let lines = prober(&cluster).capture("gpu01", START_SHELL);
    assert_eq!(lines, vec![SHELL_PLACEHOLDER_LINE]);
    assert!(cluster.calls().is_empty());
}

#[test]
fn capture_failures_become_a_descriptive_line() {
    let cluster = FakeCluster::new()
        .sessions("gpu03", &[("train", 1)])
        .capture_fails("gpu03", "train", "can't find session: train\n");
    let probe = prober(&cluster);
    assert_eq!(
        probe.try_capture("gpu03", "train"),
        Err("can't find session: train".to_string())
    );
    assert_eq!(
        probe.capture("gpu03", "train"),
        vec!["Error fetching snapshot: can't find session: train"]
    );
}

#[test]
fn create_and_kill_mutate_the_remote_server() {
    let cluster = FakeCluster::new().sessions("gpu03", &[("train", 1)]);
    let probe = prober(&cluster);

    probe
        .create_session("gpu03", "eval")
        .expect("create should succeed");
    probe
        .kill_session("gpu03", "train")
        .expect("kill should succeed");

    let (sessions, _) = probe.list_sessions("gpu03");
    assert_eq!(sessions, vec![("eval".to_string(), 1)]);

    let error = probe
        .kill_session("gpu03", "train")
        .expect_err("second kill should fail");
    assert!(error.contains("failed to kill gpu03:train"), "{error}");
}

#[test]
fn invalid_names_and_placeholders_are_rejected_before_ssh() {
    let cluster = FakeCluster::new();
    let probe = prober(&cluster);
    assert!(probe.create_session("gpu03", "").is_err());
    assert!(probe.create_session("gpu03", "a:b").is_err());
    assert!(probe.create_session("gpu03", "two words").is_err());
    assert!(probe.kill_session("gpu03", START_SHELL).is_err());
    assert!(cluster.calls().is_empty());
}
