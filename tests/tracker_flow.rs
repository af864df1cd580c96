mod common;

use cmxtrack::error::{TrackerError, TransportError};
use cmxtrack::record::MembershipStatus;
use cmxtrack::schema::SchemaVersion;
use cmxtrack::tracker::{PurgeOutcome, QuarantineOutcome, Tracker};
use cmxtrack::watchlist::{UpsertOutcome, Watchlist};
use common::{v2_client, FakeRenderer, FakeService};
use serde_json::json;

fn new_tracker(service: &FakeService) -> (Tracker, FakeRenderer) {
    let renderer = FakeRenderer::default();
    let tracker = Tracker::new(Box::new(service.clone()), Box::new(renderer.clone()));
    (tracker, renderer)
}

#[test]
fn test_schema_selection() {
    let (tracker, _) = new_tracker(&FakeService::with_version("CMX-10_3.2"));
    assert_eq!(tracker.schema(), SchemaVersion::A);

    let (tracker, _) = new_tracker(&FakeService::with_version("CMX-10_4.1"));
    assert_eq!(tracker.schema(), SchemaVersion::B);

    let (tracker, _) = new_tracker(&FakeService::with_version("3.0_CMX-10.4.1"));
    assert_eq!(tracker.schema(), SchemaVersion::B);

    // Unreachable probe fails open.
    let (tracker, _) = new_tracker(&FakeService::default());
    assert_eq!(tracker.schema(), SchemaVersion::A);
}

#[test]
fn test_schema_cached_across_probe_outage() {
    let service = FakeService::with_version("CMX-10_4.1");
    let (tracker, _) = new_tracker(&service);

    assert_eq!(tracker.schema(), SchemaVersion::B);
    service.down.set(true);
    assert_eq!(tracker.schema(), SchemaVersion::B);
    assert_eq!(service.probes.get(), 1);
}

#[test]
fn test_watchlist_scenario() {
    let service = FakeService::with_version("CMX-10_3.2");
    let (mut tracker, renderer) = new_tracker(&service);

    service.set_body("aa:bb", json!([v2_client("aa:bb", 100.0, 200.0)]));
    let report = tracker.lookup_and_track("AA:BB").unwrap();
    assert_eq!(report.outcome, UpsertOutcome::Inserted);
    assert_eq!(tracker.store().flagged().len(), 1);
    assert_eq!(tracker.store().quarantined().len(), 0);

    service.set_body("aa:bb", json!([v2_client("aa:bb", 150.5, 220.25)]));
    let report = tracker.lookup_and_track("AA:BB").unwrap();
    assert_eq!(report.outcome, UpsertOutcome::Updated(Watchlist::Flagged));
    assert_eq!(tracker.store().flagged().len(), 1);
    let (_, record) = tracker.lookup("AA:BB").unwrap();
    assert_eq!((record.position_x, record.position_y), (150.5, 220.25));
    assert_eq!(record.floor_ref_id, "723413320329068590");

    assert_eq!(tracker.quarantine("AA:BB").unwrap(), QuarantineOutcome::Moved);
    assert_eq!(tracker.store().flagged().len(), 0);
    assert_eq!(tracker.store().quarantined().len(), 1);

    assert_eq!(tracker.purge("AA:BB"), PurgeOutcome::Removed(Watchlist::Quarantined));
    assert!(tracker.store().is_empty());

    let placements = renderer.placements.borrow();
    assert_eq!(placements.len(), 2);
    assert_eq!(placements[1].1, "domain_0_1421949023265.png");
    assert_eq!((placements[1].2, placements[1].3), (150.5, 220.25));
}

#[test]
fn test_update_on_quarantined_keeps_status() {
    let service = FakeService::with_version("CMX-10_3.2");
    let (mut tracker, _) = new_tracker(&service);

    tracker.lookup_and_track("AA:BB").unwrap();
    tracker.quarantine("AA:BB").unwrap();

    service.set_body("aa:bb", json!([v2_client("aa:bb", 1.0, 2.0)]));
    let report = tracker.lookup_and_track("AA:BB").unwrap();
    assert_eq!(report.outcome, UpsertOutcome::Updated(Watchlist::Quarantined));
    assert!(!report.placeholder);

    let (list, record) = tracker.lookup("AA:BB").unwrap();
    assert_eq!(list, Watchlist::Quarantined);
    assert_eq!(record.membership_status, MembershipStatus::Quarantined);
    assert_eq!(record.manufacturer, "Apple");
    assert!(tracker.store().flagged().is_empty());
}

#[test]
fn test_empty_lookup_yields_placeholder() {
    let service = FakeService::with_version("CMX-10_3.2");
    let (mut tracker, renderer) = new_tracker(&service);

    let report = tracker.lookup_and_track("00:11:22:33:44:55").unwrap();
    assert!(report.placeholder);
    assert!(report.used_default_map);

    let (_, record) = tracker.lookup("00:11:22:33:44:55").unwrap();
    assert_eq!(record.membership_status, MembershipStatus::OnNet);
    assert_eq!(record.manufacturer, "Unknown");
    assert_eq!((record.position_x, record.position_y), (10.0, 10.0));
    assert_eq!(renderer.placements.borrow()[0].1, "unknownmap.jpg");
}

#[test]
fn test_malformed_entries_are_skipped() {
    let service = FakeService::with_version("CMX-10_3.2");
    service.set_body(
        "aa:bb",
        json!([{ "macAddress": "aa:bb", "manufacturer": "Broken" }, v2_client("aa:bb", 5.0, 6.0)]),
    );
    let (mut tracker, _) = new_tracker(&service);

    let report = tracker.lookup_and_track("AA:BB").unwrap();
    assert!(!report.placeholder);
    let (_, record) = tracker.lookup("AA:BB").unwrap();
    assert_eq!(record.manufacturer, "Apple");
}

#[test]
fn test_transport_failure_aborts_lookup() {
    let service = FakeService::with_version("CMX-10_3.2");
    let (mut tracker, renderer) = new_tracker(&service);
    tracker.lookup_and_track("AA:BB").unwrap();

    service.down.set(true);
    let err = tracker.lookup_and_track("CC:DD").unwrap_err();
    assert!(matches!(err, TrackerError::Transport(TransportError::Network { .. })));
    assert!(matches!(
        tracker.quarantine("CC:DD"),
        Err(TrackerError::Transport(_))
    ));

    assert_eq!(tracker.store().len(), 1);
    assert!(tracker.lookup("CC:DD").is_none());
    assert_eq!(renderer.placements.borrow().len(), 1);
}

#[test]
fn test_quarantine_absent_device_one_lookup_per_call() {
    let service = FakeService::with_version("CMX-10_3.2");
    let (mut tracker, _) = new_tracker(&service);

    assert_eq!(tracker.quarantine("AA:BB").unwrap(), QuarantineOutcome::LookedUpAndMoved);
    assert_eq!(service.lookups.get(), 1);

    assert_eq!(tracker.quarantine("AA:BB").unwrap(), QuarantineOutcome::AlreadyQuarantined);
    assert_eq!(service.lookups.get(), 1);
}

#[test]
fn test_operator_casing_matches_service_casing() {
    let service = FakeService::with_version("CMX-10_3.2");
    service.set_body("aa:bb:cc:dd:ee:ff", json!([v2_client("aa:bb:cc:dd:ee:ff", 40.0, 60.0)]));
    let (mut tracker, _) = new_tracker(&service);

    assert_eq!(
        tracker.quarantine("AA:BB:CC:DD:EE:FF").unwrap(),
        QuarantineOutcome::LookedUpAndMoved
    );
    assert_eq!(
        tracker.quarantine("AA:BB:CC:DD:EE:FF").unwrap(),
        QuarantineOutcome::AlreadyQuarantined
    );
    assert_eq!(service.lookups.get(), 1);
    assert!(tracker.store().flagged().is_empty());

    let (list, record) = tracker.lookup("AA:BB:CC:DD:EE:FF").unwrap();
    assert_eq!(list, Watchlist::Quarantined);
    assert_eq!(record.device_id, "aa:bb:cc:dd:ee:ff");
    assert_eq!((record.position_x, record.position_y), (40.0, 60.0));

    assert_eq!(
        tracker.purge("AA:BB:CC:DD:EE:FF"),
        PurgeOutcome::Removed(Watchlist::Quarantined)
    );
}

#[test]
fn test_purge_unknown_leaves_lists() {
    let service = FakeService::with_version("CMX-10_3.2");
    let (mut tracker, _) = new_tracker(&service);
    tracker.lookup_and_track("AA:BB").unwrap();
    tracker.lookup_and_track("CC:DD").unwrap();
    tracker.quarantine("CC:DD").unwrap();

    assert_eq!(tracker.purge("EE:FF"), PurgeOutcome::NotFound);
    assert_eq!(tracker.store().flagged().len(), 1);
    assert_eq!(tracker.store().quarantined().len(), 1);
}

#[test]
fn test_schema_b_lookup_is_unsupported() {
    let service = FakeService::with_version("CMX-10_4.1");
    service.set_body("aa:bb", json!([v2_client("aa:bb", 1.0, 1.0)]));
    let (mut tracker, renderer) = new_tracker(&service);

    assert!(matches!(
        tracker.lookup_and_track("AA:BB"),
        Err(TrackerError::UnsupportedSchema(SchemaVersion::B))
    ));
    assert!(tracker.store().is_empty());
    assert!(renderer.placements.borrow().is_empty());
}

#[test]
fn test_survey_does_not_touch_watchlists() {
    let service = FakeService::with_version("CMX-10_3.2");
    service.set_body("aa:bb", json!([v2_client("aa:bb", 1.0, 1.0)]));
    service.set_body("cc:dd", json!([v2_client("cc:dd", 2.0, 2.0)]));
    let (tracker, _) = new_tracker(&service);

    assert_eq!(tracker.all_clients().unwrap().len(), 2);
    assert_eq!(tracker.client_count().unwrap().total, 2);
    assert!(tracker.store().is_empty());
}
