// tests/stream_monitor_tests.rs

use heraldbot_core::platforms::twitch::{LiveStreamMeta, StreamSnapshot};
use heraldbot_core::tasks::stream_monitor::{
    detect_transition, LiveStatusTable, StreamTransition,
};

fn live(display_name: &str, title: &str) -> StreamSnapshot {
    StreamSnapshot::Live(LiveStreamMeta {
        display_name: display_name.into(),
        title: title.into(),
    })
}

/// Runs one poll cycle over parallel streamer/snapshot lists and returns
/// the logins that produced a BecameLive transition.
fn run_cycle(
    table: &mut LiveStatusTable,
    streamers: &[&str],
    snapshots: &[StreamSnapshot],
) -> Vec<String> {
    streamers
        .iter()
        .copied()
        .zip(snapshots)
        .filter_map(|(login, snapshot)| {
            match detect_transition(table, login, snapshot) {
                StreamTransition::BecameLive(_) => Some(login.to_string()),
                _ => None,
            }
        })
        .collect()
}

#[test]
fn first_live_snapshot_yields_became_live() {
    let mut table = LiveStatusTable::new();
    let t = detect_transition(&mut table, "alice", &live("Alice", "hi"));
    assert!(matches!(t, StreamTransition::BecameLive(_)));
    assert!(table.is_live("alice"));
}

#[test]
fn consecutive_live_snapshots_announce_once() {
    let mut table = LiveStatusTable::new();
    let first = detect_transition(&mut table, "alice", &live("Alice", "hi"));
    let second = detect_transition(&mut table, "alice", &live("Alice", "hi"));
    assert!(matches!(first, StreamTransition::BecameLive(_)));
    assert_eq!(second, StreamTransition::Unchanged);
}

#[test]
fn live_then_offline_yields_became_offline_silently() {
    let mut table = LiveStatusTable::new();
    let first = detect_transition(&mut table, "alice", &live("Alice", "hi"));
    assert!(matches!(first, StreamTransition::BecameLive(_)));

    let second = detect_transition(&mut table, "alice", &StreamSnapshot::Offline);
    assert_eq!(second, StreamTransition::BecameOffline);
    assert!(!table.is_live("alice"));
}

#[test]
fn not_found_never_mutates_table() {
    let mut table = LiveStatusTable::new();

    // Fresh streamer: ignored, still not live.
    let t = detect_transition(&mut table, "alice", &StreamSnapshot::NotFound);
    assert_eq!(t, StreamTransition::Ignored);
    assert!(!table.is_live("alice"));

    // Known-live streamer: ignored, stays live.
    detect_transition(&mut table, "alice", &live("Alice", "hi"));
    let t = detect_transition(&mut table, "alice", &StreamSnapshot::NotFound);
    assert_eq!(t, StreamTransition::Ignored);
    assert!(table.is_live("alice"));
}

#[test]
fn probe_failure_never_mutates_table() {
    let mut table = LiveStatusTable::new();

    let t = detect_transition(&mut table, "alice", &StreamSnapshot::ProbeFailed);
    assert_eq!(t, StreamTransition::Ignored);
    assert!(!table.is_live("alice"));

    detect_transition(&mut table, "alice", &live("Alice", "hi"));
    let t = detect_transition(&mut table, "alice", &StreamSnapshot::ProbeFailed);
    assert_eq!(t, StreamTransition::Ignored);
    assert!(table.is_live("alice"));
}

#[test]
fn three_cycle_scenario_announces_each_session_start_once() {
    let mut table = LiveStatusTable::new();
    let streamers = ["alice", "bob"];

    // Cycle 1: alice live, bob offline => one announcement (alice).
    let announced = run_cycle(
        &mut table,
        &streamers,
        &[live("Alice", "t1"), StreamSnapshot::Offline],
    );
    assert_eq!(announced, vec!["alice"]);
    assert!(table.is_live("alice"));
    assert!(!table.is_live("bob"));

    // Cycle 2: both live => one announcement (bob).
    let announced = run_cycle(
        &mut table,
        &streamers,
        &[live("Alice", "t1"), live("Bob", "t2")],
    );
    assert_eq!(announced, vec!["bob"]);
    assert!(table.is_live("alice"));
    assert!(table.is_live("bob"));

    // Cycle 3: alice offline, bob live => zero announcements.
    let announced = run_cycle(
        &mut table,
        &streamers,
        &[StreamSnapshot::Offline, live("Bob", "t2")],
    );
    assert!(announced.is_empty());
    assert!(!table.is_live("alice"));
    assert!(table.is_live("bob"));
}
