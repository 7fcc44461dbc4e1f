//! Trail, module and module-status HTTP handlers.
//!
//! ```text
//! GET /api/v1/trails
//! GET /api/v1/trails/{trail_id}/modules
//! PUT /api/v1/modules/{module_id}/status
//! ```

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{SetModuleStatusRequest, SetModuleStatusResponse};
use crate::domain::{Error, ModuleId, ModuleView, TargetStatus, TrailId, TrailProgress};
use crate::inbound::http::ApiResult;
use crate::inbound::http::achievements::AchievementResponse;
use crate::inbound::http::actor::ActorContext;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_choice, parse_id};

const TARGET_STATUSES: [&str; 2] = ["in_progress", "completed"];

/// Trail summary with the caller's derived completion.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrailResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "Fundamentos de Rust")]
    pub title: String,
    pub category: String,
    pub total_xp: i64,
    pub total_modules: u32,
    pub completed_modules: u32,
    /// Rounded half-up; 0 for a trail without modules.
    #[schema(example = 67)]
    pub percentage: u8,
}

impl From<TrailProgress> for TrailResponse {
    fn from(value: TrailProgress) -> Self {
        Self {
            id: value.trail.id.to_string(),
            title: value.trail.title,
            category: value.trail.category,
            total_xp: value.trail.total_xp,
            total_modules: value.total_modules,
            completed_modules: value.completed_modules,
            percentage: value.percentage,
        }
    }
}

/// Module with the caller's status and display lock.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleResponse {
    pub id: String,
    pub trail_id: String,
    pub title: String,
    pub order_index: i32,
    pub xp_reward: i64,
    /// One of `not_started`, `in_progress` or `completed`.
    #[schema(example = "in_progress")]
    pub status: String,
    pub xp_earned: i64,
    pub completed_at: Option<String>,
    /// Display hint only; locked modules can still be written.
    pub unlocked: bool,
}

impl From<ModuleView> for ModuleResponse {
    fn from(value: ModuleView) -> Self {
        Self {
            id: value.module.id.to_string(),
            trail_id: value.module.trail_id.to_string(),
            title: value.module.title,
            order_index: value.module.order_index,
            xp_reward: value.module.xp_reward,
            status: value.status.as_str().to_owned(),
            xp_earned: value.xp_earned,
            completed_at: value.completed_at.map(|at| at.to_rfc3339()),
            unlocked: value.unlocked,
        }
    }
}

/// Request payload for a module status write.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStatusRequest {
    #[schema(example = "completed")]
    pub status: Option<String>,
}

/// Outcome of a module status write.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStatusResponse {
    pub module_id: String,
    pub status: String,
    pub previous_status: String,
    pub xp_earned: i64,
    pub completed_at: Option<String>,
    /// Signed XP change this write produced.
    pub xp_delta: i64,
    pub total_xp: i64,
    pub level: i32,
    /// Achievements unlocked as a consequence of this write.
    pub granted_achievements: Vec<AchievementResponse>,
}

impl From<SetModuleStatusResponse> for ModuleStatusResponse {
    fn from(value: SetModuleStatusResponse) -> Self {
        Self {
            module_id: value.progress.module_id.to_string(),
            status: value.progress.status.as_str().to_owned(),
            previous_status: value.previous_status.as_str().to_owned(),
            xp_earned: value.progress.xp_earned,
            completed_at: value.progress.completed_at.map(|at| at.to_rfc3339()),
            xp_delta: value.xp_delta,
            total_xp: value.total_xp,
            level: value.level,
            granted_achievements: value.granted.into_iter().map(Into::into).collect(),
        }
    }
}

fn parse_target_status(payload: ModuleStatusRequest) -> ApiResult<TargetStatus> {
    let field = FieldName::new("status");
    let raw = payload.status.ok_or_else(|| missing_field_error(field))?;
    // A status the caller may not write is a state conflict, not bad syntax.
    parse_choice(&raw, field, &TARGET_STATUSES).map_err(|err| {
        let rejected = Error::invalid_state(err.message());
        match err.details() {
            Some(details) => rejected.with_details(details.clone()),
            None => rejected,
        }
    })
}

/// List every trail with the caller's completion summary.
#[utoipa::path(
    get,
    path = "/api/v1/trails",
    responses(
        (status = 200, description = "Trails with progress", body = [TrailResponse]),
        (status = 401, description = "Missing identity", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["progress"],
    operation_id = "listTrails"
)]
#[get("/trails")]
pub async fn list_trails(
    state: web::Data<HttpState>,
    actor: ActorContext,
) -> ApiResult<web::Json<Vec<TrailResponse>>> {
    let trails = state.progress_query.list_trails(&actor.user_id()).await?;
    Ok(web::Json(trails.into_iter().map(Into::into).collect()))
}

/// List a trail's modules in order with status and lock state.
#[utoipa::path(
    get,
    path = "/api/v1/trails/{trail_id}/modules",
    params(("trail_id" = String, Path, description = "Trail UUID")),
    responses(
        (status = 200, description = "Modules of the trail", body = [ModuleResponse]),
        (status = 400, description = "Invalid trail id", body = ErrorSchema),
        (status = 401, description = "Missing identity", body = ErrorSchema),
        (status = 404, description = "Trail not found", body = ErrorSchema)
    ),
    tags = ["progress"],
    operation_id = "listTrailModules"
)]
#[get("/trails/{trail_id}/modules")]
pub async fn list_trail_modules(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ModuleResponse>>> {
    let trail_id: TrailId = parse_id(&path.into_inner(), FieldName::new("trailId"))?;
    let modules = state
        .progress_query
        .list_modules(&actor.user_id(), &trail_id)
        .await?;
    Ok(web::Json(modules.into_iter().map(Into::into).collect()))
}

/// Record the caller's status on a module.
///
/// Completing a module credits its XP once; moving a completed module back
/// to `in_progress` debits what it earned.
#[utoipa::path(
    put,
    path = "/api/v1/modules/{module_id}/status",
    params(("module_id" = String, Path, description = "Module UUID")),
    request_body = ModuleStatusRequest,
    responses(
        (status = 200, description = "Status recorded", body = ModuleStatusResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing identity", body = ErrorSchema),
        (status = 404, description = "Module not found", body = ErrorSchema),
        (status = 409, description = "Status cannot be written", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["progress"],
    operation_id = "setModuleStatus"
)]
#[put("/modules/{module_id}/status")]
pub async fn set_module_status(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
    payload: web::Json<ModuleStatusRequest>,
) -> ApiResult<web::Json<ModuleStatusResponse>> {
    let module_id: ModuleId = parse_id(&path.into_inner(), FieldName::new("moduleId"))?;
    let status = parse_target_status(payload.into_inner())?;
    let response = state
        .progress
        .set_module_status(SetModuleStatusRequest {
            actor: actor.actor(),
            module_id,
            status,
        })
        .await?;
    Ok(web::Json(response.into()))
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
