//! Integration tests for the Diesel ledger store adapters.
//!
//! Runs the repositories, and once the full engine, against embedded
//! PostgreSQL. These are the checks that only the database can enforce:
//! row locks, the grant primary key and single-transaction decisions.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use futures::future::join_all;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use postgres::{Client, NoTls};
use progression::domain::ports::{
    AchievementRepository, ModuleProgressRepository, ProgressCommand, RewardRequestRepository,
    RewardRequestRepositoryError, SetModuleStatusRequest, XpLedgerRepository,
};
use progression::domain::{
    Actor, DecisionRecord, EngineServices, ErrorCode, Module, ModuleId, ModuleStatus,
    NewRewardRequest, RewardDecision, RewardRequest, RewardRequestId, RewardRequestStatus,
    RewardType, TargetStatus, TrailId, UserId,
};
use progression::outbound::persistence::{
    DbPool, DieselAchievementRepository, DieselModuleProgressRepository,
    DieselRewardRequestRepository, DieselXpLedgerRepository, PoolConfig, diesel_engine_ports,
};
use progression::test_support::{MutableClock, RecordingNotificationSink};
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

mod support;

use support::{
    format_postgres_error, handle_cluster_setup_failure, provision_database, shared_cluster,
};

const TRAIL_BADGE: &str = "Desbravador";

struct TestContext {
    runtime: Runtime,
    pool: DbPool,
    database_url: String,
    _database: TemporaryDatabase,
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let database = provision_database(cluster)?;
    let database_url = database.url().to_string();

    let config = PoolConfig::new(database_url.as_str()).with_max_size(4);
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        pool,
        database_url,
        _database: database,
    })
}

#[fixture]
fn store() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 6, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn insert_trail(url: &str, xp_rewards: &[i64]) -> Result<Vec<Module>, String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let trail_id = TrailId::random();
    let total: i64 = xp_rewards.iter().sum();
    client
        .execute(
            "INSERT INTO trails (id, title, category, total_xp) VALUES ($1, $2, $3, $4)",
            &[trail_id.as_uuid(), &"Banco de Dados", &"computing", &total],
        )
        .map_err(|err| format_postgres_error(&err))?;

    let mut modules = Vec::new();
    for (xp_reward, order_index) in xp_rewards.iter().copied().zip(1_i32..) {
        let module = Module {
            id: ModuleId::random(),
            trail_id,
            title: format!("Capítulo {order_index}"),
            order_index,
            xp_reward,
        };
        client
            .execute(
                concat!(
                    "INSERT INTO modules (id, trail_id, title, order_index, xp_reward) ",
                    "VALUES ($1, $2, $3, $4, $5)"
                ),
                &[
                    module.id.as_uuid(),
                    trail_id.as_uuid(),
                    &module.title,
                    &order_index,
                    &xp_reward,
                ],
            )
            .map_err(|err| format_postgres_error(&err))?;
        modules.push(module);
    }
    Ok(modules)
}

fn ledger_rows(url: &str, user_id: &UserId) -> i64 {
    let mut client = Client::connect(url, NoTls).expect("connect");
    client
        .query_one(
            "SELECT COUNT(*) FROM xp_ledgers WHERE user_id = $1",
            &[user_id.as_uuid()],
        )
        .expect("count ledger rows")
        .get(0)
}

impl TestContext {
    fn credit(&self, user_id: &UserId, delta: i64) -> i64 {
        let ledger = DieselXpLedgerRepository::new(self.pool.clone());
        self.runtime
            .block_on(ledger.apply_delta(user_id, delta, noon()))
            .expect("ledger delta")
            .ledger
            .total_xp
    }

    fn balance(&self, user_id: &UserId) -> Option<i64> {
        let ledger = DieselXpLedgerRepository::new(self.pool.clone());
        self.runtime
            .block_on(ledger.find(user_id))
            .expect("ledger read")
            .map(|ledger| ledger.total_xp)
    }

    fn open_request(
        &self,
        student_id: UserId,
    ) -> Result<RewardRequest, RewardRequestRepositoryError> {
        let rewards = DieselRewardRequestRepository::new(self.pool.clone());
        self.runtime.block_on(rewards.create_if_affordable(NewRewardRequest {
            id: RewardRequestId::random(),
            student_id,
            reward_type: RewardType::BonusActivity,
            message: Some("Atividade extra".to_owned()),
            created_at: noon(),
        }))
    }

    fn decide(
        &self,
        request: &RewardRequest,
        decision: RewardDecision,
    ) -> Result<RewardRequest, RewardRequestRepositoryError> {
        let rewards = DieselRewardRequestRepository::new(self.pool.clone());
        self.runtime.block_on(rewards.decide(&DecisionRecord {
            request_id: request.id,
            professor_id: UserId::random(),
            decision,
            response: None,
            decided_at: noon(),
        }))
    }

    fn stored_status(&self, request: &RewardRequest) -> RewardRequestStatus {
        let rewards = DieselRewardRequestRepository::new(self.pool.clone());
        self.runtime
            .block_on(rewards.find(&request.id))
            .expect("request read")
            .expect("request stored")
            .status
    }
}

#[rstest]
fn racing_grants_of_one_achievement_insert_and_credit_once(store: Option<TestContext>) {
    let Some(ctx) = store else {
        eprintln!("SKIP-TEST-CLUSTER: racing_grants_of_one_achievement_insert_and_credit_once skipped");
        return;
    };
    let repo = DieselAchievementRepository::new(ctx.pool.clone());
    let user_id = UserId::random();
    let badge = ctx
        .runtime
        .block_on(repo.find_by_title(TRAIL_BADGE))
        .expect("catalogue read")
        .expect("seeded trail achievement");

    let outcomes: Vec<bool> = ctx.runtime.block_on(async {
        join_all((0..4).map(|_| repo.grant(&user_id, &badge, noon())))
            .await
            .into_iter()
            .map(|outcome| outcome.expect("grant runs"))
            .collect()
    });
    let repeat = ctx
        .runtime
        .block_on(repo.grant(&user_id, &badge, noon()))
        .expect("repeat grant runs");

    assert_eq!(outcomes.iter().filter(|granted| **granted).count(), 1);
    assert!(!repeat);
    let grants = ctx
        .runtime
        .block_on(repo.list_grants(&user_id))
        .expect("grant listing");
    assert_eq!(grants.len(), 1);
    assert_eq!(ctx.balance(&user_id), Some(badge.xp_reward));
}

#[rstest]
fn second_approval_beyond_the_balance_leaves_the_request_pending(store: Option<TestContext>) {
    let Some(ctx) = store else {
        eprintln!("SKIP-TEST-CLUSTER: second_approval_beyond_the_balance_leaves_the_request_pending skipped");
        return;
    };
    let student = UserId::random();
    ctx.credit(&student, 100);
    let first = ctx.open_request(student).expect("first request");
    let second = ctx.open_request(student).expect("second request");

    let approved = ctx
        .decide(&first, RewardDecision::Approve)
        .expect("first approval");
    let refused = ctx
        .decide(&second, RewardDecision::Approve)
        .expect_err("second approval refused");

    assert_eq!(approved.status, RewardRequestStatus::Approved);
    assert_eq!(refused.code(), ErrorCode::InsufficientPoints);
    assert!(matches!(
        refused,
        RewardRequestRepositoryError::InsufficientPoints {
            required: 100,
            available: 0
        }
    ));
    assert_eq!(ctx.stored_status(&second), RewardRequestStatus::Pending);
    assert_eq!(ctx.balance(&student), Some(0));
}

#[rstest]
#[case(RewardDecision::Approve, RewardDecision::Reject, RewardRequestStatus::Approved, 150)]
#[case(RewardDecision::Reject, RewardDecision::Approve, RewardRequestStatus::Rejected, 250)]
fn decided_requests_refuse_a_second_decision(
    store: Option<TestContext>,
    #[case] first: RewardDecision,
    #[case] second: RewardDecision,
    #[case] settled: RewardRequestStatus,
    #[case] remaining: i64,
) {
    let Some(ctx) = store else {
        eprintln!("SKIP-TEST-CLUSTER: decided_requests_refuse_a_second_decision skipped");
        return;
    };
    let student = UserId::random();
    ctx.credit(&student, 250);
    let request = ctx.open_request(student).expect("request");
    ctx.decide(&request, first).expect("first decision");

    let err = ctx
        .decide(&request, second)
        .expect_err("second decision refused");

    assert_eq!(err.code(), ErrorCode::InvalidState);
    assert_eq!(ctx.stored_status(&request), settled);
    assert_eq!(ctx.balance(&student), Some(remaining));
}

#[rstest]
fn racing_approvals_never_overdraw(store: Option<TestContext>) {
    let Some(ctx) = store else {
        eprintln!("SKIP-TEST-CLUSTER: racing_approvals_never_overdraw skipped");
        return;
    };
    let student = UserId::random();
    ctx.credit(&student, 100);
    let requests: Vec<RewardRequest> = (0..3)
        .map(|_| ctx.open_request(student).expect("request"))
        .collect();
    let rewards = DieselRewardRequestRepository::new(ctx.pool.clone());

    let outcomes = ctx.runtime.block_on(async {
        let decisions: Vec<DecisionRecord> = requests
            .iter()
            .map(|request| DecisionRecord {
                request_id: request.id,
                professor_id: UserId::random(),
                decision: RewardDecision::Approve,
                response: None,
                decided_at: noon(),
            })
            .collect();
        join_all(decisions.iter().map(|decision| rewards.decide(decision))).await
    });

    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
    assert!(
        outcomes
            .iter()
            .filter_map(|outcome| outcome.as_ref().err())
            .all(|err| err.code() == ErrorCode::InsufficientPoints)
    );
    assert_eq!(ctx.balance(&student), Some(0));
}

#[rstest]
fn requests_from_students_without_xp_create_no_ledger(store: Option<TestContext>) {
    let Some(ctx) = store else {
        eprintln!("SKIP-TEST-CLUSTER: requests_from_students_without_xp_create_no_ledger skipped");
        return;
    };
    let student = UserId::random();

    let err = ctx.open_request(student).expect_err("nothing to spend");

    assert_eq!(err.code(), ErrorCode::InsufficientPoints);
    assert_eq!(ctx.balance(&student), None);
    assert_eq!(ledger_rows(&ctx.database_url, &student), 0);
}

#[rstest]
fn progress_rows_credit_completion_once_and_refund_on_reopen(store: Option<TestContext>) {
    let Some(ctx) = store else {
        eprintln!("SKIP-TEST-CLUSTER: progress_rows_credit_completion_once_and_refund_on_reopen skipped");
        return;
    };
    let modules = insert_trail(&ctx.database_url, &[80]).expect("seed trail");
    let module = &modules[0];
    let repo = DieselModuleProgressRepository::new(ctx.pool.clone());
    let user_id = UserId::random();

    let deltas: Vec<i64> = ctx.runtime.block_on(async {
        join_all(
            (0..3).map(|_| repo.record_status(&user_id, module, TargetStatus::Completed, noon())),
        )
        .await
            .into_iter()
            .map(|outcome| outcome.expect("status recorded").xp_delta)
            .collect()
    });
    let reopened = ctx
        .runtime
        .block_on(repo.record_status(&user_id, module, TargetStatus::InProgress, noon()))
        .expect("reopen recorded");

    assert_eq!(deltas.iter().sum::<i64>(), 80);
    assert_eq!(reopened.previous, ModuleStatus::Completed);
    assert_eq!(reopened.xp_delta, -80);
    let rows = ctx
        .runtime
        .block_on(repo.list_for_user(&user_id))
        .expect("progress listing");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, ModuleStatus::InProgress);
    assert_eq!(rows[0].xp_earned, 0);
}

#[rstest]
fn the_catalogue_rejects_modules_without_a_reward(store: Option<TestContext>) {
    let Some(ctx) = store else {
        eprintln!("SKIP-TEST-CLUSTER: the_catalogue_rejects_modules_without_a_reward skipped");
        return;
    };

    let err = insert_trail(&ctx.database_url, &[0]).expect_err("zero reward rejected");

    assert!(err.contains("23514"), "expected a check violation, got {err}");
}

#[rstest]
fn finishing_a_trail_through_the_engine_grants_seeded_achievements(store: Option<TestContext>) {
    let Some(ctx) = store else {
        eprintln!("SKIP-TEST-CLUSTER: finishing_a_trail_through_the_engine_grants_seeded_achievements skipped");
        return;
    };
    let modules = insert_trail(&ctx.database_url, &[100]).expect("seed trail");
    let notifications = Arc::new(RecordingNotificationSink::default());
    let services = EngineServices::new(
        diesel_engine_ports(&ctx.pool, notifications),
        Arc::new(MutableClock::new(noon())),
    );
    let student = Actor::student(UserId::random());

    let response = ctx
        .runtime
        .block_on(services.progress.set_module_status(SetModuleStatusRequest {
            actor: student,
            module_id: modules[0].id,
            status: TargetStatus::Completed,
        }))
        .expect("completion");

    let mut titles: Vec<&str> = response
        .granted
        .iter()
        .map(|achievement| achievement.title.as_str())
        .collect();
    titles.sort_unstable();
    assert_eq!(titles, vec![TRAIL_BADGE, "Primeiro Passo"]);
    // 100 for the module, 10 and 100 for the two badges.
    assert_eq!(response.total_xp, 210);
    assert_eq!(ctx.balance(&student.user_id), Some(210));
}
