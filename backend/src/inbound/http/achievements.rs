//! Statistics and achievement HTTP handlers.
//!
//! ```text
//! GET  /api/v1/me/stats
//! GET  /api/v1/me/achievements
//! GET  /api/v1/achievements
//! POST /api/v1/internal/achievements/grant
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Achievement, AchievementProgress, EarnedAchievement, GrantOutcome, UserId, UserStats,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::ActorContext;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_id};

/// Achievement catalogue entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AchievementResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "Primeiro passo")]
    pub title: String,
    pub description: String,
    /// One of `module`, `trail`, `streak` or `special`.
    #[schema(example = "module")]
    pub kind: String,
    pub requirement_value: i64,
    pub xp_reward: i64,
}

impl From<Achievement> for AchievementResponse {
    fn from(value: Achievement) -> Self {
        Self {
            id: value.id.to_string(),
            title: value.title,
            description: value.description,
            kind: value.kind.as_str().to_owned(),
            requirement_value: value.requirement_value,
            xp_reward: value.xp_reward,
        }
    }
}

/// Aggregate statistics for the caller.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsResponse {
    pub total_xp: i64,
    pub level: i32,
    pub achievements_count: u32,
    pub completed_modules: u32,
    pub completed_trails: u32,
    pub streak_days: i32,
}

impl From<UserStats> for UserStatsResponse {
    fn from(value: UserStats) -> Self {
        Self {
            total_xp: value.total_xp,
            level: value.level,
            achievements_count: value.achievements_count,
            completed_modules: value.completed_modules,
            completed_trails: value.completed_trails,
            streak_days: value.streak_days,
        }
    }
}

/// An achievement the caller holds.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EarnedAchievementResponse {
    pub achievement: AchievementResponse,
    pub earned_at: String,
}

impl From<EarnedAchievement> for EarnedAchievementResponse {
    fn from(value: EarnedAchievement) -> Self {
        Self {
            achievement: value.achievement.into(),
            earned_at: value.earned_at.to_rfc3339(),
        }
    }
}

/// Catalogue entry with the caller's progress towards it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AchievementProgressResponse {
    pub achievement: AchievementResponse,
    pub earned: bool,
    pub earned_at: Option<String>,
    pub current: i64,
    pub requirement: i64,
}

impl From<AchievementProgress> for AchievementProgressResponse {
    fn from(value: AchievementProgress) -> Self {
        Self {
            achievement: value.achievement.into(),
            earned: value.earned,
            earned_at: value.earned_at.map(|at| at.to_rfc3339()),
            current: value.current,
            requirement: value.requirement,
        }
    }
}

/// Grant request sent by the submission workflow.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrantAchievementRequest {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub user_id: Option<String>,
    #[schema(example = "Primeira Aprovação")]
    pub title: Option<String>,
}

/// Grant outcome; `achievement` is present only when newly granted.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrantAchievementResponse {
    pub granted: bool,
    pub achievement: Option<AchievementResponse>,
}

impl From<GrantOutcome> for GrantAchievementResponse {
    fn from(value: GrantOutcome) -> Self {
        match value {
            GrantOutcome::Granted(achievement) => Self {
                granted: true,
                achievement: Some(achievement.into()),
            },
            GrantOutcome::NotGranted => Self {
                granted: false,
                achievement: None,
            },
        }
    }
}

fn parse_grant_request(payload: GrantAchievementRequest) -> ApiResult<(UserId, String)> {
    let user_field = FieldName::new("userId");
    let title_field = FieldName::new("title");
    let raw_user = payload
        .user_id
        .ok_or_else(|| missing_field_error(user_field))?;
    let title = payload
        .title
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
        .ok_or_else(|| missing_field_error(title_field))?;
    Ok((parse_id(&raw_user, user_field)?, title))
}

/// Fetch the caller's XP, level, streak and completion counts.
#[utoipa::path(
    get,
    path = "/api/v1/me/stats",
    responses(
        (status = 200, description = "User statistics", body = UserStatsResponse),
        (status = 401, description = "Missing identity", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["achievements"],
    operation_id = "getMyStats"
)]
#[get("/me/stats")]
pub async fn get_my_stats(
    state: web::Data<HttpState>,
    actor: ActorContext,
) -> ApiResult<web::Json<UserStatsResponse>> {
    let stats = state.achievements_query.user_stats(&actor.user_id()).await?;
    Ok(web::Json(stats.into()))
}

/// List the caller's earned achievements, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/me/achievements",
    responses(
        (status = 200, description = "Earned achievements", body = [EarnedAchievementResponse]),
        (status = 401, description = "Missing identity", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["achievements"],
    operation_id = "listMyAchievements"
)]
#[get("/me/achievements")]
pub async fn list_my_achievements(
    state: web::Data<HttpState>,
    actor: ActorContext,
) -> ApiResult<web::Json<Vec<EarnedAchievementResponse>>> {
    let earned = state
        .achievements_query
        .earned_achievements(&actor.user_id())
        .await?;
    Ok(web::Json(earned.into_iter().map(Into::into).collect()))
}

/// The achievement catalogue annotated with the caller's progress.
#[utoipa::path(
    get,
    path = "/api/v1/achievements",
    responses(
        (status = 200, description = "Catalogue with progress", body = [AchievementProgressResponse]),
        (status = 401, description = "Missing identity", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["achievements"],
    operation_id = "listAchievements"
)]
#[get("/achievements")]
pub async fn list_achievements(
    state: web::Data<HttpState>,
    actor: ActorContext,
) -> ApiResult<web::Json<Vec<AchievementProgressResponse>>> {
    let catalogue = state
        .achievements_query
        .catalogue_progress(&actor.user_id())
        .await?;
    Ok(web::Json(catalogue.into_iter().map(Into::into).collect()))
}

/// Grant a named achievement, typically after a submission is approved.
///
/// Only professors may call this. Unknown titles and repeat grants report
/// `granted: false` rather than failing.
#[utoipa::path(
    post,
    path = "/api/v1/internal/achievements/grant",
    request_body = GrantAchievementRequest,
    responses(
        (status = 200, description = "Grant outcome", body = GrantAchievementResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing identity", body = ErrorSchema),
        (status = 403, description = "Caller is not a professor", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["achievements"],
    operation_id = "grantAchievement"
)]
#[post("/internal/achievements/grant")]
pub async fn grant_achievement(
    state: web::Data<HttpState>,
    actor: ActorContext,
    payload: web::Json<GrantAchievementRequest>,
) -> ApiResult<web::Json<GrantAchievementResponse>> {
    actor.actor().require_professor()?;
    let (user_id, title) = parse_grant_request(payload.into_inner())?;
    let outcome = state.achievements.grant_by_title(&user_id, &title).await?;
    Ok(web::Json(outcome.into()))
}

#[cfg(test)]
#[path = "achievements_tests.rs"]
mod tests;
