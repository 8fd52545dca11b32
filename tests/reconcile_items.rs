use std::collections::BTreeMap;

use slurmux::domain::{NodeTimes, ReconciledItem, START_SHELL, SessionKey, SessionRef};
use slurmux::reconcile::reconcile;

fn node_times(entries: &[(&str, &str)]) -> NodeTimes {
    entries
        .iter()
        .map(|(node, time)| (node.to_string(), time.to_string()))
        .collect()
}

fn notes(keys: &[(&str, &str)]) -> BTreeMap<SessionKey, String> {
    keys.iter()
        .map(|(node, session)| (SessionKey::new(*node, *session), "note".to_string()))
        .collect()
}

fn summary(items: &[ReconciledItem]) -> Vec<(String, String, u32, bool)> {
    items
        .iter()
        .map(|item| {
            (
                item.node.clone(),
                item.session_name.clone(),
                item.window_count,
                item.is_stale,
            )
        })
        .collect()
}

#[test]
fn live_sessions_placeholders_then_stale_notes() {
    let live = vec![SessionRef::new("gpu03", "train", 3)];
    let items = reconcile(
        &live,
        &notes(&[("gpu02", "build")]),
        &node_times(&[("gpu01", "1:00:00"), ("gpu03", "2:00:00")]),
    );

    assert_eq!(
        summary(&items),
        vec![
            ("gpu01".to_string(), START_SHELL.to_string(), 0, false),
            ("gpu03".to_string(), "train".to_string(), 3, false),
            ("gpu02".to_string(), "build".to_string(), 0, true),
        ]
    );
}

#[test]
fn noted_live_sessions_are_not_duplicated_as_stale() {
    let live = vec![
        SessionRef::new("gpu01", "a", 1),
        SessionRef::new("gpu01", "b", 2),
    ];
    let items = reconcile(
        &live,
        &notes(&[("gpu01", "a"), ("gpu04", "old")]),
        &node_times(&[("gpu01", "5:00")]),
    );

    let live_count = items.iter().filter(|item| !item.is_stale).count();
    let stale_count = items.iter().filter(|item| item.is_stale).count();
    assert_eq!(live_count, 2);
    assert_eq!(stale_count, 1);
    assert!(items.iter().all(|item| !item.is_placeholder()));
}

#[test]
fn every_session_less_node_gets_exactly_one_placeholder() {
    let items = reconcile(
        &[SessionRef::new("gpu02", "x", 1)],
        &BTreeMap::<SessionKey, String>::new(),
        &node_times(&[("gpu01", "1:00"), ("gpu02", "1:00"), ("gpu05", "1:00")]),
    );
    let placeholders: Vec<&str> = items
        .iter()
        .filter(|item| item.is_placeholder())
        .map(|item| item.node.as_str())
        .collect();
    assert_eq!(placeholders, vec!["gpu01", "gpu05"]);
    assert_eq!(items.len(), 3);
}

#[test]
fn output_is_ordered_and_independent_of_input_order() {
    let forward = vec![
        SessionRef::new("gpu01", "alpha", 1),
        SessionRef::new("gpu01", "beta", 1),
        SessionRef::new("gpu02", "alpha", 1),
    ];
    let mut backward = forward.clone();
    backward.reverse();
    let noted = notes(&[("gpu09", "z"), ("gpu00", "y")]);
    let times = node_times(&[("gpu01", "1:00"), ("gpu02", "1:00")]);

    let first = reconcile(&forward, &noted, &times);
    let second = reconcile(&backward, &noted, &times);
    assert_eq!(first, second);
    assert_eq!(reconcile(&forward, &noted, &times), first);

    let keys: Vec<String> = first.iter().map(|item| item.key().to_string()).collect();
    assert_eq!(
        keys,
        vec![
            "gpu01:alpha",
            "gpu01:beta",
            "gpu02:alpha",
            "gpu00:y",
            "gpu09:z",
        ]
    );
}

#[test]
fn empty_inputs_yield_no_rows() {
    let items = reconcile(&[], &BTreeMap::<SessionKey, String>::new(), &NodeTimes::new());
    assert!(items.is_empty());
}
