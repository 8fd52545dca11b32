use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{NodeTimes, ReconciledItem, SessionKey, SessionRef};

/// Merges live sessions with noted sessions into the list the UI walks.
///
/// Live sessions plus one `<Start Shell>` row per session-less node come first, ordered by
/// `(node, session)`; noted sessions that are no longer live follow in the same order.
/// Notes attached to placeholder keys are ignored.
pub fn reconcile<V>(
    live_sessions: &[SessionRef],
    notes: &BTreeMap<SessionKey, V>,
    node_times: &NodeTimes,
) -> Vec<ReconciledItem> {
    let mut active: BTreeMap<SessionKey, ReconciledItem> = BTreeMap::new();
    for session in live_sessions.iter().filter(|session| !session.key().is_placeholder()) {
        active.insert(session.key(), ReconciledItem::live(session));
    }

    let nodes_with_sessions: BTreeSet<String> =
        active.keys().map(|key| key.node.clone()).collect();
    for node in node_times.keys() {
        if !nodes_with_sessions.contains(node) {
            let item = ReconciledItem::start_shell(node);
            active.insert(item.key(), item);
        }
    }

    let stale: Vec<ReconciledItem> = notes
        .keys()
        .filter(|key| !key.is_placeholder() && !active.contains_key(*key))
        .map(ReconciledItem::stale)
        .collect();

    active.into_values().chain(stale).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_notes_never_become_stale_rows() {
        let mut notes = BTreeMap::new();
        notes.insert(SessionKey::new("gpu01", crate::domain::START_SHELL), "x".to_string());
        let items = reconcile(&[], &notes, &NodeTimes::new());
        assert!(items.is_empty());
    }

    #[test]
    fn noted_offline_rows_follow_live_and_placeholder_rows() {
        let mut notes = BTreeMap::new();
        notes.insert(SessionKey::new("gpu00", "old"), "x".to_string());
        notes.insert(SessionKey::new("gpu02", "train"), "y".to_string());
        let mut node_times = NodeTimes::new();
        node_times.insert("gpu01".to_string(), "1:00".to_string());
        node_times.insert("gpu02".to_string(), "1:00".to_string());
        let live = [SessionRef::new("gpu02", "train", 2)];

        let keys: Vec<String> = reconcile(&live, &notes, &node_times)
            .iter()
            .map(|item| item.key().to_string())
            .collect();
        assert_eq!(
            keys,
            vec![
                format!("gpu01:{}", crate::domain::START_SHELL),
                "gpu02:train".to_string(),
                "gpu00:old".to_string(),
            ]
        );
    }
}
