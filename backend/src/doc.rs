//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer, the DTOs
//! they exchange and the domain error schema wrappers. Callers are identified
//! by gateway-supplied headers, described here as two API-key schemes.
//!
//! The generated document backs Swagger UI in debug builds.

use crate::inbound::http::achievements::{
    AchievementProgressResponse, AchievementResponse, EarnedAchievementResponse,
    GrantAchievementRequest, GrantAchievementResponse, UserStatsResponse,
};
use crate::inbound::http::actor::{USER_ID_HEADER, USER_ROLE_HEADER};
use crate::inbound::http::progress::{
    ModuleResponse, ModuleStatusRequest, ModuleStatusResponse, TrailResponse,
};
use crate::inbound::http::rewards::{
    CreateRewardRequestBody, RewardDecisionBody, RewardRequestResponse, RewardTypeResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the identity header schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "UserId",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                USER_ID_HEADER,
                "Authenticated user UUID forwarded by the gateway.",
            ))),
        );
        components.add_security_scheme(
            "UserRole",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                USER_ROLE_HEADER,
                "Authenticated user role: student or professor.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Progression API",
        description = "Module progress, XP, achievements and reward redemption."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("UserId" = [], "UserRole" = [])),
    paths(
        crate::inbound::http::progress::list_trails,
        crate::inbound::http::progress::list_trail_modules,
        crate::inbound::http::progress::set_module_status,
        crate::inbound::http::achievements::get_my_stats,
        crate::inbound::http::achievements::list_my_achievements,
        crate::inbound::http::achievements::list_achievements,
        crate::inbound::http::achievements::grant_achievement,
        crate::inbound::http::rewards::list_reward_types,
        crate::inbound::http::rewards::create_reward_request,
        crate::inbound::http::rewards::list_reward_requests,
        crate::inbound::http::rewards::decide_reward_request,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        TrailResponse,
        ModuleResponse,
        ModuleStatusRequest,
        ModuleStatusResponse,
        AchievementResponse,
        UserStatsResponse,
        EarnedAchievementResponse,
        AchievementProgressResponse,
        GrantAchievementRequest,
        GrantAchievementResponse,
        RewardTypeResponse,
        RewardRequestResponse,
        CreateRewardRequestBody,
        RewardDecisionBody,
    )),
    tags(
        (name = "progress", description = "Trails, modules and module status"),
        (name = "achievements", description = "Statistics and achievements"),
        (name = "rewards", description = "Reward catalogue and redemption requests"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
