//! Test helpers for inbound HTTP components.
//!
//! Handlers are exercised against the real engine services wired to the
//! in-memory ledger store, so responses reflect actual domain behaviour.

use std::sync::Arc;

use actix_web::test::TestRequest;
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{Actor, EngineServices, Module, ModuleId, Trail, TrailId};
use crate::inbound::http::actor::{USER_ID_HEADER, USER_ROLE_HEADER};
use crate::inbound::http::state::HttpState;
use crate::test_support::{InMemoryLedgerStore, MutableClock, RecordingNotificationSink};

/// Engine services over an in-memory store, plus handles for assertions.
pub struct EngineHarness {
    pub store: Arc<InMemoryLedgerStore>,
    pub clock: Arc<MutableClock>,
    pub notifications: Arc<RecordingNotificationSink>,
    pub state: HttpState,
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
        .single()
        .expect("valid fixed start time")
}

/// Build a harness with an empty store and the clock at [`start_time`].
pub fn engine_harness() -> EngineHarness {
    let store = InMemoryLedgerStore::new();
    let clock = Arc::new(MutableClock::new(start_time()));
    let notifications = Arc::new(RecordingNotificationSink::default());
    let services = EngineServices::new(store.ports(notifications.clone()), clock.clone());
    EngineHarness {
        store,
        clock,
        notifications,
        state: HttpState::from_engine(&services),
    }
}

/// Seed a trail with `count` modules worth `xp` each, in order.
pub fn seed_trail(store: &InMemoryLedgerStore, count: i32, xp: i64) -> (Trail, Vec<Module>) {
    let trail = Trail {
        id: TrailId::random(),
        title: "Fundamentos de Rust".to_owned(),
        category: "programming".to_owned(),
        total_xp: xp * i64::from(count),
    };
    store.add_trail(trail.clone());
    let modules: Vec<Module> = (0..count)
        .map(|index| Module {
            id: ModuleId::random(),
            trail_id: trail.id,
            title: format!("Módulo {}", index + 1),
            order_index: index,
            xp_reward: xp,
        })
        .collect();
    for module in &modules {
        store.add_module(module.clone());
    }
    (trail, modules)
}

/// Attach the identity headers the upstream gateway would forward.
pub fn as_actor(request: TestRequest, actor: Actor) -> TestRequest {
    request
        .insert_header((USER_ID_HEADER, actor.user_id.to_string()))
        .insert_header((USER_ROLE_HEADER, actor.role.as_str()))
}
