//! End-to-end lifecycle flows over the file-backed store.

use chrono::Duration;

use checkin_core::{CheckInPhase, Error, RegistrationError};
use integration_tests::fixtures::{t0, venue, venue_with_policy, TestEngine};

#[tokio::test]
async fn test_check_in_and_check_out_records_one_visit() {
    let t = TestEngine::open().await;
    let manager = t.engine.manager();

    manager.start_check_in("Q1", venue("venue-1"), t0()).await.unwrap();
    assert_eq!(
        manager.phase().await.unwrap(),
        CheckInPhase::Active { arrival: t0() }
    );

    let departure = t0() + Duration::seconds(3600);
    let entry = manager.check_out(departure).await.unwrap().unwrap();

    assert_eq!(entry.arrival(), t0());
    assert_eq!(entry.departure(), departure);
    assert_eq!(entry.venue().id(), "venue-1");
    assert!(manager.phase().await.unwrap().is_idle());

    let diary = manager.diary().await.unwrap();
    assert_eq!(diary, vec![entry]);

    // Exactly one window reached the registration service.
    let registered = t.registration.registered();
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0].venue_id, "venue-1");
    assert_eq!(registered[0].arrival, t0());
    assert_eq!(registered[0].departure, departure);
}

#[tokio::test]
async fn test_failed_registration_leaves_no_trace_in_history() {
    let t = TestEngine::open().await;
    let manager = t.engine.manager();
    t.registration
        .fail_with(RegistrationError::NetworkUnavailable("offline".into()));

    manager.start_check_in("Q1", venue("venue-1"), t0()).await.unwrap();
    let result = manager.check_out(t0() + Duration::seconds(3600)).await;

    assert!(matches!(
        result,
        Err(Error::Registration(RegistrationError::NetworkUnavailable(_)))
    ));
    assert!(manager.diary().await.unwrap().is_empty());
    assert!(manager.active_session().await.unwrap().is_none());
    // The platform was never told a checkout completed.
    assert_eq!(t.reminders.checkout_notices(), 0);
}

#[tokio::test]
async fn test_auto_checkout_after_max_duration() {
    let t = TestEngine::open().await;
    let manager = t.engine.manager();

    manager.start_check_in("Q1", venue("venue-1"), t0()).await.unwrap();

    let entry = manager
        .maybe_auto_checkout(t0() + Duration::hours(13), Duration::hours(12))
        .await
        .unwrap()
        .unwrap();

    // Departure is capped at arrival + max, not at the poll time.
    assert_eq!(entry.departure(), t0() + Duration::hours(12));
    assert!(manager.active_session().await.unwrap().is_none());
    assert_eq!(t.registration.registered().len(), 1);
}

#[tokio::test]
async fn test_at_most_one_active_session_across_sequences() {
    let t = TestEngine::open().await;
    let manager = t.engine.manager();

    for round in 0..3 {
        let arrival = t0() + Duration::hours(round * 24);
        manager
            .start_check_in("Q", venue("venue-1"), arrival)
            .await
            .unwrap();

        // A second start is always rejected, never stacked.
        let rejected = manager.start_check_in("Q", venue("venue-2"), arrival).await;
        assert!(matches!(rejected, Err(Error::AlreadyCheckedIn)));

        manager
            .check_out(arrival + Duration::seconds(600))
            .await
            .unwrap();
        assert!(manager.active_session().await.unwrap().is_none());
    }

    assert_eq!(manager.diary().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_session_identifier_stays_out_of_diary() {
    let t = TestEngine::open().await;
    let manager = t.engine.manager();

    manager.start_check_in("Q1", venue("venue-1"), t0()).await.unwrap();
    manager.check_out(t0() + Duration::seconds(600)).await.unwrap();
    manager
        .start_check_in("Q2", venue("venue-2"), t0() + Duration::hours(2))
        .await
        .unwrap();

    let session = manager.active_session().await.unwrap().unwrap();
    assert_eq!(session.registration_id, None);

    let diary = manager.diary().await.unwrap();
    assert_eq!(diary.len(), 1);
    assert!(diary.iter().all(|e| !e.id().is_empty()));
}

#[tokio::test]
async fn test_reminder_hooks_fire_at_lifecycle_points() {
    let t = TestEngine::open().await;
    let manager = t.engine.manager();

    // Venue carries a checkout warning delay: scheduled at check-in.
    manager
        .start_check_in("Q1", venue_with_policy("venue-1"), t0())
        .await
        .unwrap();
    assert_eq!(t.reminders.scheduled(), vec![("venue-1".to_string(), 7200)]);

    // A user-chosen offset from the venue's list is forwarded too.
    assert!(manager
        .schedule_reminder(Duration::seconds(1800))
        .await
        .unwrap());
    assert_eq!(t.reminders.scheduled().len(), 2);

    manager.check_out(t0() + Duration::seconds(600)).await.unwrap();
    assert_eq!(t.reminders.cancellations(), 1);
    assert_eq!(t.reminders.checkout_notices(), 1);
}

#[tokio::test]
async fn test_diary_survives_engine_reopen() {
    let t = TestEngine::open().await;
    let manager = t.engine.manager();

    manager.start_check_in("Q1", venue("venue-1"), t0()).await.unwrap();
    let entry = manager
        .check_out(t0() + Duration::seconds(3600))
        .await
        .unwrap()
        .unwrap();

    let t = t.reopen().await;
    let diary = t.engine.manager().diary().await.unwrap();
    assert_eq!(diary, vec![entry]);
    assert!(t.engine.manager().phase().await.unwrap().is_idle());
}

#[tokio::test]
async fn test_active_session_survives_engine_reopen() {
    let t = TestEngine::open().await;
    t.engine
        .manager()
        .start_check_in("Q1", venue("venue-1"), t0())
        .await
        .unwrap();

    let t = t.reopen().await;
    let session = t.engine.manager().active_session().await.unwrap().unwrap();
    assert_eq!(session.qr_payload, "Q1");
    assert_eq!(session.arrival, t0());
    assert!(!session.is_finalizing());
}
