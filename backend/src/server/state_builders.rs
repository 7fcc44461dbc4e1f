//! Builders wiring the engine services into HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;

use progression::domain::EngineServices;
use progression::inbound::http::state::{HttpState, HttpStatePorts};
use progression::outbound::notifications::TracingNotificationSink;
use progression::outbound::persistence::diesel_engine_ports;

use super::ServerConfig;

/// Build HTTP state over the Diesel adapters when a pool is configured,
/// otherwise over fixture ports.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let state = match &config.db_pool {
        Some(pool) => {
            let ports = diesel_engine_ports(pool, Arc::new(TracingNotificationSink));
            let services = EngineServices::new(ports, Arc::new(DefaultClock));
            HttpState::from_engine(&services)
        }
        None => HttpState::new(HttpStatePorts::default()),
    };
    web::Data::new(state)
}
