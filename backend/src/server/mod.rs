//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppSettings, ServerConfig};

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use progression::Trace;
#[cfg(debug_assertions)]
use progression::doc::ApiDoc;
use progression::inbound::http::achievements::{
    get_my_stats, grant_achievement, list_achievements, list_my_achievements,
};
use progression::inbound::http::health::{HealthState, live, ready};
use progression::inbound::http::progress::{list_trail_modules, list_trails, set_module_status};
use progression::inbound::http::rewards::{
    create_reward_request, decide_reward_request, list_reward_requests, list_reward_types,
};
use progression::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let api = web::scope("/api/v1")
        .service(list_trails)
        .service(list_trail_modules)
        .service(set_module_status)
        .service(get_my_stats)
        .service(list_my_achievements)
        .service(list_achievements)
        .service(grant_achievement)
        .service(list_reward_types)
        .service(create_reward_request)
        .service(list_reward_requests)
        .service(decide_reward_request);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// The returned [`Server`] must be awaited to drive the listener. Readiness
/// is left to the caller.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: &ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(config);
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .bind(config.bind_addr)?
    .run();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use progression::domain::TRACE_ID_HEADER;
    use rstest::rstest;

    fn fixture_deps() -> AppDependencies {
        let config = ServerConfig::new("127.0.0.1:0".parse().expect("loopback address"));
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: build_http_state(&config),
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn api_routes_are_mounted_and_traced() {
        let app = test::init_service(build_app(fixture_deps())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/reward-types")
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key(TRACE_ID_HEADER));
    }

    #[rstest]
    #[actix_web::test]
    async fn readiness_starts_unavailable() {
        let app = test::init_service(build_app(fixture_deps())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/health/ready").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[rstest]
    #[actix_web::test]
    async fn api_requires_identity_headers() {
        let app = test::init_service(build_app(fixture_deps())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/me/stats").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
