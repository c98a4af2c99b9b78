//! Diesel adapters against embedded PostgreSQL.
//!
//! Covers the guarantees the in-memory suites cannot: the locked progress
//! merge, concurrent first reports, settlement idempotence under concurrent
//! confirmations, and `max + 1` ordering of catalog appends.

mod support;

use chrono::Utc;
use rstest::{fixture, rstest};
use uuid::Uuid;

use lms_backend::domain::ports::{
    CatalogAuthoringRepository, EnrollmentGrant, EnrollmentRepository, PendingPaymentRepository,
    ProgressRepository, UserAccount, UserRepository,
};
use lms_backend::domain::{
    CourseDraft, Email, Enrollment, EnrollmentMethod, LessonDraft, ModuleDraft, PasswordHash,
    PendingPayment, Price, ProgressObservation, ProgressStatus, Role, User, UserId, UserName,
};
use lms_backend::outbound::persistence::{
    DieselCatalogAuthoringRepository, DieselEnrollmentRepository, DieselPendingPaymentRepository,
    DieselProgressRepository, DieselUserRepository,
};

use support::{Database, handle_cluster_setup_failure, migrated_database};

const STORED_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2hoYXNoaGFzaA";

#[fixture]
fn database() -> Option<Database> {
    match migrated_database() {
        Ok(database) => Some(database),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

struct SeededLesson {
    course_id: Uuid,
    module_id: Uuid,
    lesson_id: Uuid,
}

async fn seed_student(db: &Database) -> UserId {
    let id = UserId::random();
    let user = User::new(
        id.clone(),
        UserName::new("Aluno Teste").expect("name"),
        Email::new(format!("aluno-{}@teste.com", Uuid::new_v4())).expect("email"),
        Role::Student,
    );
    DieselUserRepository::new(db.pool.clone())
        .create(&UserAccount {
            user,
            password_hash: PasswordHash::from_stored(STORED_HASH),
        })
        .await
        .expect("student stored");
    id
}

async fn seed_lesson(db: &Database) -> SeededLesson {
    let authoring = DieselCatalogAuthoringRepository::new(db.pool.clone());
    let draft = CourseDraft::try_new(
        "Rust para iniciantes",
        None,
        Some(Price::from_minor_units(150_000).expect("price")),
        None,
        false,
        Some(true),
    )
    .expect("course draft");
    let course = authoring
        .create_course(&draft, Utc::now())
        .await
        .expect("course stored");
    let module = authoring
        .create_module(course.id, &ModuleDraft::try_new("Fundamentos").expect("module"))
        .await
        .expect("module stored")
        .expect("course exists");
    let lesson = authoring
        .create_lesson(
            module.id,
            &LessonDraft::try_new("Ownership", None, "vid-ownership", 600).expect("lesson"),
        )
        .await
        .expect("lesson stored")
        .expect("module exists");
    SeededLesson {
        course_id: course.id,
        module_id: module.id,
        lesson_id: lesson.id,
    }
}

fn observation(seconds: i32, percent: i32, status: ProgressStatus) -> ProgressObservation {
    ProgressObservation::try_new(seconds, percent, Some(status)).expect("valid observation")
}

fn enrollment_for(user_id: &UserId, course_id: Uuid) -> Enrollment {
    Enrollment {
        user_id: user_id.clone(),
        course_id,
        method: EnrollmentMethod::Payment(Some("card".to_owned())),
        transaction_id: Some("4811".to_owned()),
        amount: Price::from_minor_units(150_000).expect("price"),
        enrolled_at: Utc::now(),
    }
}

async fn seed_pending(db: &Database, user_id: &UserId, course_id: Uuid) -> PendingPayment {
    let pending = PendingPayment::mint(
        user_id.clone(),
        course_id,
        Price::from_minor_units(150_000).expect("price"),
        "MZN",
        Utc::now(),
    );
    DieselPendingPaymentRepository::new(db.pool.clone())
        .create(&pending)
        .await
        .expect("pending stored");
    pending
}

#[rstest]
fn stored_progress_never_moves_backwards(database: Option<Database>) {
    let Some(db) = database else {
        eprintln!("SKIP-TEST-CLUSTER: stored_progress_never_moves_backwards skipped");
        return;
    };
    db.block_on(async {
        let user = seed_student(&db).await;
        let seeded = seed_lesson(&db).await;
        let progress = DieselProgressRepository::new(db.pool.clone());

        let first = progress
            .record(
                &user,
                seeded.lesson_id,
                observation(480, 80, ProgressStatus::Started),
                Utc::now(),
            )
            .await
            .expect("first report");
        assert_eq!(first.percent, 80);

        let rewound = progress
            .record(
                &user,
                seeded.lesson_id,
                observation(120, 40, ProgressStatus::Started),
                Utc::now(),
            )
            .await
            .expect("rewind");
        assert_eq!(rewound.percent, 80);
        assert_eq!(rewound.last_watched_second, 120);

        progress
            .record(
                &user,
                seeded.lesson_id,
                observation(600, 100, ProgressStatus::Completed),
                Utc::now(),
            )
            .await
            .expect("completion");
        let rewatched = progress
            .record(
                &user,
                seeded.lesson_id,
                observation(30, 30, ProgressStatus::Started),
                Utc::now(),
            )
            .await
            .expect("rewatch");
        assert_eq!(rewatched.status, ProgressStatus::Completed);
        assert_eq!(rewatched.percent, 100);

        let stored = progress
            .list_for_lessons(&user, &[seeded.lesson_id])
            .await
            .expect("listing");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].percent, 100);
        assert_eq!(stored[0].status, ProgressStatus::Completed);
        assert_eq!(stored[0].last_watched_second, 30);
    });
}

#[rstest]
fn concurrent_first_reports_share_one_row(database: Option<Database>) {
    let Some(db) = database else {
        eprintln!("SKIP-TEST-CLUSTER: concurrent_first_reports_share_one_row skipped");
        return;
    };
    db.block_on(async {
        let user = seed_student(&db).await;
        let seeded = seed_lesson(&db).await;
        let left = DieselProgressRepository::new(db.pool.clone());
        let right = DieselProgressRepository::new(db.pool.clone());

        let (a, b) = tokio::join!(
            left.record(
                &user,
                seeded.lesson_id,
                observation(200, 40, ProgressStatus::Started),
                Utc::now(),
            ),
            right.record(
                &user,
                seeded.lesson_id,
                observation(350, 70, ProgressStatus::Started),
                Utc::now(),
            ),
        );
        a.expect("first reporter");
        b.expect("second reporter");

        let stored = left
            .list_for_lessons(&user, &[seeded.lesson_id])
            .await
            .expect("listing");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].percent, 70);
    });
}

#[rstest]
fn settling_twice_enrolls_once(database: Option<Database>) {
    let Some(db) = database else {
        eprintln!("SKIP-TEST-CLUSTER: settling_twice_enrolls_once skipped");
        return;
    };
    db.block_on(async {
        let user = seed_student(&db).await;
        let seeded = seed_lesson(&db).await;
        let pending = seed_pending(&db, &user, seeded.course_id).await;
        let payments = DieselPendingPaymentRepository::new(db.pool.clone());
        let enrollments = DieselEnrollmentRepository::new(db.pool.clone());

        assert!(!enrollments.is_enrolled(&user, seeded.course_id).await.expect("lookup"));

        let first = payments
            .settle(pending.tx_ref, &enrollment_for(&user, seeded.course_id))
            .await
            .expect("first settle");
        assert_eq!(first, EnrollmentGrant::Created);
        let confirmed_at = payments
            .find_by_reference(pending.tx_ref)
            .await
            .expect("lookup")
            .expect("pending exists")
            .confirmed_at;
        assert!(confirmed_at.is_some());

        let second = payments
            .settle(pending.tx_ref, &enrollment_for(&user, seeded.course_id))
            .await
            .expect("second settle");
        assert_eq!(second, EnrollmentGrant::AlreadyEnrolled);
        let after_replay = payments
            .find_by_reference(pending.tx_ref)
            .await
            .expect("lookup")
            .expect("pending exists");
        assert_eq!(after_replay.confirmed_at, confirmed_at, "first confirmation is kept");

        assert!(enrollments.is_enrolled(&user, seeded.course_id).await.expect("lookup"));
        assert_eq!(
            enrollments.enrolled_course_ids(&user).await.expect("ids"),
            vec![seeded.course_id]
        );
    });
}

#[rstest]
fn concurrent_confirmations_grant_exactly_once(database: Option<Database>) {
    let Some(db) = database else {
        eprintln!("SKIP-TEST-CLUSTER: concurrent_confirmations_grant_exactly_once skipped");
        return;
    };
    db.block_on(async {
        let user = seed_student(&db).await;
        let seeded = seed_lesson(&db).await;
        let pending = seed_pending(&db, &user, seeded.course_id).await;
        let left = DieselPendingPaymentRepository::new(db.pool.clone());
        let right = DieselPendingPaymentRepository::new(db.pool.clone());
        let enrollment = enrollment_for(&user, seeded.course_id);

        let (a, b) = tokio::join!(
            left.settle(pending.tx_ref, &enrollment),
            right.settle(pending.tx_ref, &enrollment),
        );
        let grants = [a.expect("left settle"), b.expect("right settle")];
        let created = grants
            .iter()
            .filter(|grant| **grant == EnrollmentGrant::Created)
            .count();
        assert_eq!(created, 1, "grants: {grants:?}");

        let ids = DieselEnrollmentRepository::new(db.pool.clone())
            .enrolled_course_ids(&user)
            .await
            .expect("ids");
        assert_eq!(ids, vec![seeded.course_id]);
    });
}

#[rstest]
fn appends_take_the_next_position_and_keep_gaps(database: Option<Database>) {
    let Some(db) = database else {
        eprintln!("SKIP-TEST-CLUSTER: appends_take_the_next_position_and_keep_gaps skipped");
        return;
    };
    db.block_on(async {
        let seeded = seed_lesson(&db).await;
        let authoring = DieselCatalogAuthoringRepository::new(db.pool.clone());
        let module = |title: &str| ModuleDraft::try_new(title).expect("module draft");

        let second = authoring
            .create_module(seeded.course_id, &module("Traits"))
            .await
            .expect("append")
            .expect("course exists");
        let third = authoring
            .create_module(seeded.course_id, &module("Async"))
            .await
            .expect("append")
            .expect("course exists");
        assert_eq!((second.position, third.position), (2, 3));

        assert!(authoring.delete_module(second.id).await.expect("delete"));
        let fourth = authoring
            .create_module(seeded.course_id, &module("Macros"))
            .await
            .expect("append")
            .expect("course exists");
        assert_eq!(fourth.position, 4);

        let lesson = |title: &str| LessonDraft::try_new(title, None, "vid", 60).expect("lesson");
        let other = DieselCatalogAuthoringRepository::new(db.pool.clone());
        let borrowing = lesson("Borrowing");
        let lifetimes = lesson("Lifetimes");
        let (a, b) = tokio::join!(
            authoring.create_lesson(seeded.module_id, &borrowing),
            other.create_lesson(seeded.module_id, &lifetimes),
        );
        let mut positions = [
            a.expect("append").expect("module exists").position,
            b.expect("append").expect("module exists").position,
        ];
        positions.sort_unstable();
        assert_eq!(positions, [2, 3]);
    });
}

#[rstest]
fn appends_to_missing_parents_are_absent(database: Option<Database>) {
    let Some(db) = database else {
        eprintln!("SKIP-TEST-CLUSTER: appends_to_missing_parents_are_absent skipped");
        return;
    };
    db.block_on(async {
        let authoring = DieselCatalogAuthoringRepository::new(db.pool.clone());
        let module = authoring
            .create_module(Uuid::new_v4(), &ModuleDraft::try_new("Sem curso").expect("draft"))
            .await
            .expect("query");
        assert!(module.is_none());
        let lesson = authoring
            .create_lesson(
                Uuid::new_v4(),
                &LessonDraft::try_new("Sem modulo", None, "vid", 10).expect("draft"),
            )
            .await
            .expect("query");
        assert!(lesson.is_none());
        assert!(!authoring.delete_lesson(Uuid::new_v4()).await.expect("delete"));
    });
}
