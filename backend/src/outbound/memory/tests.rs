//! Constraint coverage for the in-memory store.

use chrono::TimeDelta;
use rstest::{fixture, rstest};
use tokio::sync::Barrier;

use super::*;
use crate::domain::ports::{CreateTurnRequest, FamilyMembersCommand, TurnBookingCommand};
use crate::domain::{BookingEngine, BookingRepositories, ErrorCode, FamilyRegistry, UserRole};
use crate::outbound::notifications::{TracingBadgeEvaluationTrigger, TracingBookingNotifier};
use crate::test_support::{MutableClock, instant, member_draft, user};

const CONTENDERS: usize = 32;

#[fixture]
fn store() -> InMemoryStore {
    InMemoryStore::new()
}

fn turn(doctor_id: UserId, patient_id: UserId, at: &str, status: TurnStatus) -> Turn {
    Turn {
        id: TurnId::random(),
        doctor_id,
        patient_id,
        family_member_id: None,
        scheduled_at: instant(at),
        motive: None,
        status,
        created_at: instant("2025-05-01T00:00:00Z"),
    }
}

#[rstest]
#[tokio::test]
async fn second_active_turn_in_slot_is_rejected(store: InMemoryStore) {
    let doctor = UserId::random();
    let at = "2025-06-01T10:00:00Z";
    TurnRepository::insert(&store, &turn(doctor, UserId::random(), at, TurnStatus::Pending))
        .await
        .expect("first");

    let second = turn(doctor, UserId::random(), at, TurnStatus::Confirmed);
    let result = TurnRepository::insert(&store, &second).await;

    assert_eq!(result, Err(TurnPersistenceError::SlotTaken));
    assert_eq!(store.turns().await.len(), 1);
}

#[rstest]
#[tokio::test]
async fn cancelled_turns_free_the_slot(store: InMemoryStore) {
    let doctor = UserId::random();
    let at = "2025-06-01T10:00:00Z";
    let first = turn(doctor, UserId::random(), at, TurnStatus::Pending);
    let first_id = first.id;
    TurnRepository::insert(&store, &first).await.expect("first");
    assert!(store.set_turn_status(first_id, TurnStatus::Cancelled).await);

    assert!(!store
        .exists_active_for_doctor_at(&doctor, instant(at))
        .await
        .expect("query"));
    TurnRepository::insert(&store, &turn(doctor, UserId::random(), at, TurnStatus::Pending))
        .await
        .expect("slot reusable");
}

#[rstest]
#[tokio::test]
async fn member_dni_is_unique_on_insert_and_update(store: InMemoryStore) {
    let holder = UserId::random();
    let first = FamilyMember::from_draft(FamilyMemberId::random(), holder, member_draft(40_000_000));
    let second =
        FamilyMember::from_draft(FamilyMemberId::random(), holder, member_draft(40_000_001));
    FamilyMemberRepository::insert(&store, &first).await.expect("first");
    FamilyMemberRepository::insert(&store, &second).await.expect("second");

    let clash = FamilyMember::from_draft(FamilyMemberId::random(), holder, member_draft(40_000_000));
    assert!(matches!(
        FamilyMemberRepository::insert(&store, &clash).await,
        Err(FamilyMemberPersistenceError::DuplicateDni { dni: 40_000_000 })
    ));

    let renamed = second.clone().apply(member_draft(40_000_000));
    assert!(matches!(
        store.update(&renamed).await,
        Err(FamilyMemberPersistenceError::DuplicateDni { .. })
    ));
    // Keeping one's own DNI is not a clash.
    store.update(&second).await.expect("self update");
}

#[rstest]
#[tokio::test]
async fn completed_turn_lookup_respects_window(store: InMemoryStore) {
    let patient = user(UserRole::Patient, 22_222_222);
    let patient_id = patient.id;
    store.seed_user(patient).await;
    let attended = turn(
        UserId::random(),
        patient_id,
        "2025-01-10T10:00:00Z",
        TurnStatus::Completed,
    );
    TurnRepository::insert(&store, &attended).await.expect("seed");

    let since = instant("2025-01-10T10:00:00Z");
    assert!(store
        .has_completed_turn_since(&patient_id, since)
        .await
        .expect("query"));
    assert!(!store
        .has_completed_turn_since(&patient_id, since + TimeDelta::seconds(1))
        .await
        .expect("query"));
}

#[rstest]
#[tokio::test]
async fn email_lookup_ignores_case(store: InMemoryStore) {
    let patient = user(UserRole::Patient, 22_222_222);
    store.seed_user(patient.clone()).await;

    let found = store
        .find_by_email("USER22222222@medibook.test")
        .await
        .expect("query");

    assert_eq!(found.map(|u| u.id), Some(patient.id));
}

/// Outcome counts for a batch of contending writes.
#[derive(Debug, Default, PartialEq, Eq)]
struct Tally {
    ok: usize,
    conflict: usize,
}

async fn settle<T: Send + 'static>(
    handles: Vec<tokio::task::JoinHandle<Result<T, crate::domain::Error>>>,
) -> Tally {
    let mut tally = Tally::default();
    for handle in handles {
        match handle.await.expect("task joined") {
            Ok(_) => tally.ok += 1,
            Err(error) => {
                assert_eq!(error.code(), ErrorCode::Conflict, "{error:?}");
                tally.conflict += 1;
            }
        }
    }
    tally
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bookings_for_one_slot_store_a_single_turn(store: InMemoryStore) {
    let doctor = user(UserRole::Doctor, 30_000_000);
    let doctor_id = doctor.id;
    store.seed_user(doctor).await;
    let mut patients = Vec::with_capacity(CONTENDERS);
    for dni in (31_000_000_i64..).take(CONTENDERS) {
        let patient = user(UserRole::Patient, dni);
        patients.push(patient.id);
        store.seed_user(patient).await;
    }
    let engine = Arc::new(BookingEngine::new(
        BookingRepositories {
            users: Arc::new(store.clone()),
            members: Arc::new(store.clone()),
            turns: Arc::new(store.clone()),
        },
        Arc::new(TracingBookingNotifier),
        Arc::new(TracingBadgeEvaluationTrigger),
        Arc::new(MutableClock::new(instant("2025-05-01T09:00:00Z"))),
    ));
    let scheduled_at = instant("2025-06-01T10:00:00Z");
    let start = Arc::new(Barrier::new(CONTENDERS));

    let handles = patients
        .into_iter()
        .map(|patient_id| {
            let engine = Arc::clone(&engine);
            let start = Arc::clone(&start);
            tokio::spawn(async move {
                start.wait().await;
                engine
                    .create_turn(CreateTurnRequest {
                        doctor_id,
                        patient_id,
                        scheduled_at,
                        motive: None,
                        family_member_id: None,
                    })
                    .await
            })
        })
        .collect();

    let tally = settle(handles).await;
    assert_eq!(
        tally,
        Tally {
            ok: 1,
            conflict: CONTENDERS - 1
        }
    );
    assert_eq!(store.turns().await.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_of_one_dni_store_a_single_member(store: InMemoryStore) {
    let mut holders = Vec::with_capacity(CONTENDERS);
    for dni in (21_000_000_i64..).take(CONTENDERS) {
        let holder = user(UserRole::Patient, dni);
        holders.push(holder.id);
        store.seed_user(holder).await;
    }
    let registry = Arc::new(FamilyRegistry::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
    ));
    let start = Arc::new(Barrier::new(CONTENDERS));

    let handles = holders
        .into_iter()
        .map(|holder_id| {
            let registry = Arc::clone(&registry);
            let start = Arc::clone(&start);
            tokio::spawn(async move {
                start.wait().await;
                registry.create(&holder_id, member_draft(40_000_000)).await
            })
        })
        .collect();

    let tally = settle(handles).await;
    assert_eq!(
        tally,
        Tally {
            ok: 1,
            conflict: CONTENDERS - 1
        }
    );
    assert_eq!(store.family_members().await.len(), 1);
}
