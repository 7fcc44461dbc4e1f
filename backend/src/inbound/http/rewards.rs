//! Reward catalogue and redemption request HTTP handlers.
//!
//! ```text
//! GET  /api/v1/reward-types
//! POST /api/v1/reward-requests
//! GET  /api/v1/reward-requests?status=pending
//! POST /api/v1/reward-requests/{request_id}/decision
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{CreateRewardRequest, DecideRewardRequest};
use crate::domain::{
    RewardDecision, RewardRequest, RewardRequestId, RewardRequestStatus, RewardType,
    RewardTypeInfo, reward_catalogue,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::ActorContext;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_choice, parse_id};

const REQUEST_STATUSES: [&str; 3] = ["pending", "approved", "rejected"];
const DECISIONS: [&str; 2] = ["approve", "reject"];

/// Reward catalogue entry.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewardTypeResponse {
    #[schema(example = "extra_points")]
    pub reward_type: String,
    #[schema(example = "Pontos extras na média")]
    pub title: String,
    pub description: String,
    #[schema(example = 100)]
    pub points_cost: i64,
}

impl From<RewardTypeInfo> for RewardTypeResponse {
    fn from(value: RewardTypeInfo) -> Self {
        Self {
            reward_type: value.reward_type.as_str().to_owned(),
            title: value.title.to_owned(),
            description: value.description.to_owned(),
            points_cost: value.points_cost,
        }
    }
}

/// A redemption request as seen by students and professors.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewardRequestResponse {
    pub id: String,
    pub student_id: String,
    pub reward_type: String,
    pub points_cost: i64,
    pub message: Option<String>,
    /// One of `pending`, `approved` or `rejected`.
    #[schema(example = "pending")]
    pub status: String,
    pub professor_id: Option<String>,
    pub professor_response: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<RewardRequest> for RewardRequestResponse {
    fn from(value: RewardRequest) -> Self {
        Self {
            id: value.id.to_string(),
            student_id: value.student_id.to_string(),
            reward_type: value.reward_type.as_str().to_owned(),
            points_cost: value.points_cost(),
            message: value.message,
            status: value.status.as_str().to_owned(),
            professor_id: value.professor_id.map(|id| id.to_string()),
            professor_response: value.professor_response,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Student payload creating a redemption request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRewardRequestBody {
    #[schema(example = "assignment_extension")]
    pub reward_type: Option<String>,
    /// Optional note for the professor, at most 500 characters.
    pub message: Option<String>,
}

/// Professor payload deciding a pending request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewardDecisionBody {
    #[schema(example = "approve")]
    pub decision: Option<String>,
    /// Optional reply to the student, at most 500 characters.
    pub response: Option<String>,
}

/// Query string for request listings.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RewardRequestListQuery {
    /// Narrow the listing to one status.
    #[param(example = "pending")]
    pub status: Option<String>,
}

/// Accepted `rewardType` spellings, in catalogue order.
pub(crate) fn reward_type_names() -> Vec<&'static str> {
    reward_catalogue()
        .iter()
        .map(|info| info.reward_type.as_str())
        .collect()
}

fn parse_create_body(body: CreateRewardRequestBody) -> ApiResult<(RewardType, Option<String>)> {
    let field = FieldName::new("rewardType");
    let raw = body.reward_type.ok_or_else(|| missing_field_error(field))?;
    let reward_type = parse_choice(&raw, field, &reward_type_names())?;
    Ok((reward_type, body.message))
}

fn parse_decision_body(body: RewardDecisionBody) -> ApiResult<(RewardDecision, Option<String>)> {
    let field = FieldName::new("decision");
    let raw = body.decision.ok_or_else(|| missing_field_error(field))?;
    let decision = parse_choice(&raw, field, &DECISIONS)?;
    Ok((decision, body.response))
}

fn parse_status_filter(query: RewardRequestListQuery) -> ApiResult<Option<RewardRequestStatus>> {
    query
        .status
        .map(|raw| parse_choice(&raw, FieldName::new("status"), &REQUEST_STATUSES))
        .transpose()
}

/// List the reward types and their fixed costs.
#[utoipa::path(
    get,
    path = "/api/v1/reward-types",
    responses(
        (status = 200, description = "Reward catalogue", body = [RewardTypeResponse])
    ),
    tags = ["rewards"],
    operation_id = "listRewardTypes"
)]
#[get("/reward-types")]
pub async fn list_reward_types(state: web::Data<HttpState>) -> web::Json<Vec<RewardTypeResponse>> {
    web::Json(
        state
            .rewards_query
            .reward_types()
            .into_iter()
            .map(Into::into)
            .collect(),
    )
}

/// Create a pending redemption request for the calling student.
///
/// The balance check is advisory; points are only debited on approval.
#[utoipa::path(
    post,
    path = "/api/v1/reward-requests",
    request_body = CreateRewardRequestBody,
    responses(
        (status = 201, description = "Request created", body = RewardRequestResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing identity", body = ErrorSchema),
        (status = 403, description = "Caller is not a student", body = ErrorSchema),
        (status = 422, description = "Insufficient points", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["rewards"],
    operation_id = "createRewardRequest"
)]
#[post("/reward-requests")]
pub async fn create_reward_request(
    state: web::Data<HttpState>,
    actor: ActorContext,
    payload: web::Json<CreateRewardRequestBody>,
) -> ApiResult<HttpResponse> {
    let (reward_type, message) = parse_create_body(payload.into_inner())?;
    let created = state
        .rewards
        .create_request(CreateRewardRequest {
            actor: actor.actor(),
            reward_type,
            message,
        })
        .await?;
    Ok(HttpResponse::Created().json(RewardRequestResponse::from(created)))
}

/// List requests visible to the caller, newest first.
///
/// Students see their own requests; professors see everyone's.
#[utoipa::path(
    get,
    path = "/api/v1/reward-requests",
    params(RewardRequestListQuery),
    responses(
        (status = 200, description = "Reward requests", body = [RewardRequestResponse]),
        (status = 400, description = "Unknown status filter", body = ErrorSchema),
        (status = 401, description = "Missing identity", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["rewards"],
    operation_id = "listRewardRequests"
)]
#[get("/reward-requests")]
pub async fn list_reward_requests(
    state: web::Data<HttpState>,
    actor: ActorContext,
    query: web::Query<RewardRequestListQuery>,
) -> ApiResult<web::Json<Vec<RewardRequestResponse>>> {
    let status = parse_status_filter(query.into_inner())?;
    let requests = state
        .rewards_query
        .list_requests(actor.actor(), status)
        .await?;
    Ok(web::Json(requests.into_iter().map(Into::into).collect()))
}

/// Approve or reject a pending request.
///
/// Approval re-checks the balance and debits it atomically with the status
/// change.
#[utoipa::path(
    post,
    path = "/api/v1/reward-requests/{request_id}/decision",
    params(("request_id" = String, Path, description = "Reward request UUID")),
    request_body = RewardDecisionBody,
    responses(
        (status = 200, description = "Request decided", body = RewardRequestResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing identity", body = ErrorSchema),
        (status = 403, description = "Caller is not a professor", body = ErrorSchema),
        (status = 404, description = "Request not found", body = ErrorSchema),
        (status = 409, description = "Request already decided", body = ErrorSchema),
        (status = 422, description = "Insufficient points", body = ErrorSchema)
    ),
    tags = ["rewards"],
    operation_id = "decideRewardRequest"
)]
#[post("/reward-requests/{request_id}/decision")]
pub async fn decide_reward_request(
    state: web::Data<HttpState>,
    actor: ActorContext,
    path: web::Path<String>,
    payload: web::Json<RewardDecisionBody>,
) -> ApiResult<web::Json<RewardRequestResponse>> {
    let request_id: RewardRequestId = parse_id(&path.into_inner(), FieldName::new("requestId"))?;
    let (decision, response) = parse_decision_body(payload.into_inner())?;
    let decided = state
        .rewards
        .decide(DecideRewardRequest {
            actor: actor.actor(),
            request_id,
            decision,
            response,
        })
        .await?;
    Ok(web::Json(decided.into()))
}

#[cfg(test)]
#[path = "rewards_tests.rs"]
mod tests;
