//! End-to-end behaviour of the engine services over the in-memory store.
//!
//! Each case drives the public command and query ports the way the HTTP
//! adapter does, then inspects the store directly to check what was
//! persisted.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use mockable::Clock;
use progression::domain::ports::{
    AchievementCommand, AchievementQuery, CreateRewardRequest, DecideRewardRequest,
    ProgressCommand, ProgressQuery, RewardCommand, SetModuleStatusRequest,
    SetModuleStatusResponse,
};
use progression::domain::{
    Achievement, AchievementId, AchievementKind, Actor, EngineServices, Error, ErrorCode,
    FIRST_APPROVAL_TITLE, Module, ModuleId, ModuleStatus, NotificationKind, RewardDecision,
    RewardRequest, RewardRequestStatus, RewardType, TargetStatus, Trail, TrailId, UserId,
};
use progression::test_support::{InMemoryLedgerStore, MutableClock, RecordingNotificationSink};
use rstest::{fixture, rstest};

struct World {
    store: Arc<InMemoryLedgerStore>,
    clock: Arc<MutableClock>,
    notifications: Arc<RecordingNotificationSink>,
    services: EngineServices,
    student: Actor,
    professor: Actor,
}

fn monday_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn world() -> World {
    let store = InMemoryLedgerStore::new();
    let clock = Arc::new(MutableClock::new(monday_morning()));
    let notifications = Arc::new(RecordingNotificationSink::default());
    let services = EngineServices::new(store.ports(notifications.clone()), clock.clone());
    World {
        store,
        clock,
        notifications,
        services,
        student: Actor::student(UserId::random()),
        professor: Actor::professor(UserId::random()),
    }
}

fn achievement(title: &str, kind: AchievementKind, requirement: i64, reward: i64) -> Achievement {
    Achievement {
        id: AchievementId::random(),
        title: title.to_owned(),
        description: format!("{title} description"),
        kind,
        requirement_value: requirement,
        xp_reward: reward,
    }
}

impl World {
    fn seed_trail(&self, xp_rewards: &[i64]) -> (Trail, Vec<Module>) {
        let trail = Trail {
            id: TrailId::random(),
            title: "Estruturas de Dados".to_owned(),
            category: "computing".to_owned(),
            total_xp: xp_rewards.iter().sum(),
        };
        self.store.add_trail(trail.clone());
        let modules: Vec<Module> = xp_rewards
            .iter()
            .zip(0..)
            .map(|(xp, index)| Module {
                id: ModuleId::random(),
                trail_id: trail.id,
                title: format!("Aula {}", index + 1),
                order_index: index,
                xp_reward: *xp,
            })
            .collect();
        for module in &modules {
            self.store.add_module(module.clone());
        }
        (trail, modules)
    }

    async fn set_status(
        &self,
        module: &Module,
        status: TargetStatus,
    ) -> SetModuleStatusResponse {
        self.services
            .progress
            .set_module_status(SetModuleStatusRequest {
                actor: self.student,
                module_id: module.id,
                status,
            })
            .await
            .expect("status change succeeds")
    }

    async fn complete(&self, module: &Module) -> i64 {
        self.set_status(module, TargetStatus::Completed)
            .await
            .xp_delta
    }

    async fn request_reward(&self) -> RewardRequest {
        self.services
            .rewards
            .create_request(CreateRewardRequest {
                actor: self.student,
                reward_type: RewardType::AssignmentExtension,
                message: None,
            })
            .await
            .expect("request created")
    }

    async fn decide(
        &self,
        request: &RewardRequest,
        decision: RewardDecision,
    ) -> Result<RewardRequest, Error> {
        self.services
            .rewards
            .decide(DecideRewardRequest {
                actor: self.professor,
                request_id: request.id,
                decision,
                response: Some("ok".to_owned()),
            })
            .await
    }
}

#[rstest]
#[tokio::test]
async fn completing_a_first_module_credits_its_reward(world: World) {
    let (_, modules) = world.seed_trail(&[50, 50]);

    let response = world.set_status(&modules[0], TargetStatus::Completed).await;

    assert_eq!(response.previous_status, ModuleStatus::NotStarted);
    assert_eq!(response.xp_delta, 50);
    assert_eq!(response.total_xp, 50);
    assert_eq!(response.level, 1);
    let stats = world
        .services
        .achievements
        .user_stats(&world.student.user_id)
        .await
        .expect("stats");
    assert_eq!(stats.total_xp, 50);
    assert_eq!(stats.completed_modules, 1);
    assert_eq!(stats.streak_days, 1);
}

#[rstest]
#[tokio::test]
async fn finishing_a_trail_grants_its_achievement_once(world: World) {
    let trail_badge = achievement("Trilha Concluída", AchievementKind::Trail, 1, 25);
    world.store.add_achievement(trail_badge.clone());
    let (trail, modules) = world.seed_trail(&[100, 100, 100, 100]);

    for module in &modules[..3] {
        let response = world.set_status(module, TargetStatus::Completed).await;
        assert!(response.granted.is_empty());
    }
    let last = world.set_status(&modules[3], TargetStatus::Completed).await;

    assert_eq!(last.granted, vec![trail_badge.clone()]);
    let again = world
        .services
        .achievements
        .reevaluate(&world.student.user_id)
        .await
        .expect("reevaluation");
    assert!(again.is_empty());

    let trails = world
        .services
        .progress
        .list_trails(&world.student.user_id)
        .await
        .expect("trail listing");
    let listed = trails
        .iter()
        .find(|entry| entry.trail.id == trail.id)
        .expect("trail listed");
    assert_eq!(listed.percentage, 100);
    assert!(listed.is_completed());

    let stats = world
        .services
        .achievements
        .user_stats(&world.student.user_id)
        .await
        .expect("stats");
    assert_eq!(stats.completed_trails, 1);
    assert_eq!(stats.achievements_count, 1);
    assert_eq!(stats.total_xp, 425);
    assert_eq!(stats.level, 5);
    assert_eq!(world.store.grants_for(&world.student.user_id).len(), 1);
    assert_eq!(
        world.notifications.count_of(NotificationKind::AchievementEarned),
        1
    );
}

#[rstest]
#[tokio::test]
async fn completing_then_reopening_restores_the_original_balance(world: World) {
    let (_, modules) = world.seed_trail(&[40, 60]);
    world
        .store
        .set_balance(world.student.user_id, 10, world.clock.utc());

    assert_eq!(world.complete(&modules[1]).await, 60);
    let reopened = world.set_status(&modules[1], TargetStatus::InProgress).await;

    assert_eq!(reopened.previous_status, ModuleStatus::Completed);
    assert_eq!(reopened.xp_delta, -60);
    assert_eq!(world.store.total_xp(&world.student.user_id), 10);
}

#[rstest]
#[tokio::test]
async fn repeated_completion_is_credited_once(world: World) {
    let (_, modules) = world.seed_trail(&[30]);

    assert_eq!(world.complete(&modules[0]).await, 30);
    assert_eq!(world.complete(&modules[0]).await, 0);

    assert_eq!(world.store.total_xp(&world.student.user_id), 30);
}

#[rstest]
#[tokio::test]
async fn finishing_a_trail_of_rewardless_modules_still_evaluates(world: World) {
    let trail_badge = achievement("Trilha Livre", AchievementKind::Trail, 1, 15);
    world.store.add_achievement(trail_badge.clone());
    let (_, modules) = world.seed_trail(&[0]);

    let response = world.set_status(&modules[0], TargetStatus::Completed).await;

    assert_eq!(response.xp_delta, 0);
    assert_eq!(response.granted, vec![trail_badge]);
    assert_eq!(response.total_xp, 15);
    assert_eq!(
        world.notifications.count_of(NotificationKind::ModuleCompleted),
        1
    );
}

#[rstest]
#[tokio::test]
async fn spending_then_reopening_never_drives_xp_negative(world: World) {
    let (_, modules) = world.seed_trail(&[50, 50]);
    world.complete(&modules[0]).await;
    world.complete(&modules[1]).await;

    let request = world.request_reward().await;
    world
        .decide(&request, RewardDecision::Approve)
        .await
        .expect("approval");
    assert_eq!(world.store.total_xp(&world.student.user_id), 0);

    let reopened = world.set_status(&modules[0], TargetStatus::InProgress).await;

    assert_eq!(reopened.total_xp, 0);
    assert_eq!(world.store.total_xp(&world.student.user_id), 0);
}

#[rstest]
#[tokio::test]
async fn approving_two_requests_stops_at_the_balance(world: World) {
    world
        .store
        .set_balance(world.student.user_id, 100, world.clock.utc());
    let first = world.request_reward().await;
    world.clock.advance_seconds(5);
    let second = world.request_reward().await;

    let approved = world
        .decide(&first, RewardDecision::Approve)
        .await
        .expect("first approval");
    let refused = world
        .decide(&second, RewardDecision::Approve)
        .await
        .expect_err("second approval refused");

    assert_eq!(approved.status, RewardRequestStatus::Approved);
    assert_eq!(refused.code(), ErrorCode::InsufficientPoints);
    assert_eq!(world.store.total_xp(&world.student.user_id), 0);
    let stored = world.store.request(&second.id).expect("second stored");
    assert_eq!(stored.status, RewardRequestStatus::Pending);
}

#[rstest]
#[case(RewardDecision::Approve, RewardDecision::Reject, RewardRequestStatus::Approved)]
#[case(RewardDecision::Reject, RewardDecision::Approve, RewardRequestStatus::Rejected)]
#[tokio::test]
async fn a_decided_request_cannot_be_decided_again(
    world: World,
    #[case] first: RewardDecision,
    #[case] second: RewardDecision,
    #[case] settled: RewardRequestStatus,
) {
    world
        .store
        .set_balance(world.student.user_id, 250, world.clock.utc());
    let request = world.request_reward().await;
    world.decide(&request, first).await.expect("first decision");
    let balance_after_first = world.store.total_xp(&world.student.user_id);

    let err = world
        .decide(&request, second)
        .await
        .expect_err("second decision refused");

    assert_eq!(err.code(), ErrorCode::InvalidState);
    let stored = world.store.request(&request.id).expect("request stored");
    assert_eq!(stored.status, settled);
    assert_eq!(
        world.store.total_xp(&world.student.user_id),
        balance_after_first
    );
    let decided = world.notifications.count_of(NotificationKind::RewardApproved)
        + world.notifications.count_of(NotificationKind::RewardRejected);
    assert_eq!(decided, 1);
}

#[rstest]
#[tokio::test]
async fn streak_extends_on_consecutive_days_and_resets_after_a_gap(world: World) {
    world
        .store
        .add_achievement(achievement("Três Dias", AchievementKind::Streak, 3, 10));
    let (_, modules) = world.seed_trail(&[10, 10, 10, 10]);

    world.complete(&modules[0]).await;
    world.clock.advance_days(1);
    world.complete(&modules[1]).await;
    world.clock.advance_days(1);
    let third = world.set_status(&modules[2], TargetStatus::Completed).await;

    assert_eq!(third.granted.len(), 1);
    let ledger = world
        .store
        .ledger(&world.student.user_id)
        .expect("ledger row");
    assert_eq!(ledger.streak_days, 3);

    world.clock.advance_days(2);
    world.complete(&modules[3]).await;
    let ledger = world
        .store
        .ledger(&world.student.user_id)
        .expect("ledger row");
    assert_eq!(ledger.streak_days, 1);
}

#[rstest]
#[tokio::test]
async fn special_achievements_are_only_granted_by_title(world: World) {
    world
        .store
        .add_achievement(achievement(FIRST_APPROVAL_TITLE, AchievementKind::Special, 0, 20));
    let (_, modules) = world.seed_trail(&[10]);

    let completion = world.set_status(&modules[0], TargetStatus::Completed).await;
    assert!(completion.granted.is_empty());

    let outcome = world
        .services
        .achievements
        .grant_by_title(&world.student.user_id, FIRST_APPROVAL_TITLE)
        .await
        .expect("special grant");
    let repeat = world
        .services
        .achievements
        .grant_by_title(&world.student.user_id, FIRST_APPROVAL_TITLE)
        .await
        .expect("repeat grant");

    assert!(outcome.is_granted());
    assert!(!repeat.is_granted());
    assert_eq!(world.store.total_xp(&world.student.user_id), 30);
}

#[rstest]
#[tokio::test]
async fn catalogue_progress_reports_partial_thresholds(world: World) {
    world
        .store
        .add_achievement(achievement("Cinco Módulos", AchievementKind::Module, 5, 15));
    let (_, modules) = world.seed_trail(&[10, 10]);
    world.complete(&modules[0]).await;
    world.complete(&modules[1]).await;

    let progress = world
        .services
        .achievements
        .catalogue_progress(&world.student.user_id)
        .await
        .expect("catalogue progress");

    assert_eq!(progress.len(), 1);
    assert!(!progress[0].earned);
    assert_eq!(progress[0].current, 2);
    assert_eq!(progress[0].requirement, 5);
}
