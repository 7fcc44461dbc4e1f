//! Reward catalogue and the redemption request state machine.
//!
//! ```text
//! pending ──approve──▶ approved (terminal)
//!    └─────reject────▶ rejected (terminal)
//! ```
//!
//! Creating a request only checks the balance; nothing is reserved. The
//! authoritative check happens again when a professor approves.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, RewardRequestId, UserId};

/// Maximum length of a student message or professor response.
pub const MAX_NOTE_CHARS: usize = 500;

/// Kinds of real-world reward a student can redeem points for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    ExtraPoints,
    AssignmentExtension,
    BonusActivity,
}

/// Catalogue entry describing a reward type and its fixed cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardTypeInfo {
    pub reward_type: RewardType,
    pub title: &'static str,
    pub description: &'static str,
    pub points_cost: i64,
}

const REWARD_CATALOGUE: [RewardTypeInfo; 3] = [
    RewardTypeInfo {
        reward_type: RewardType::ExtraPoints,
        title: "Pontos extras na média",
        description: "Pontos adicionais na média da disciplina",
        points_cost: 100,
    },
    RewardTypeInfo {
        reward_type: RewardType::AssignmentExtension,
        title: "Extensão de prazo",
        description: "Prazo adicional para a entrega de um trabalho",
        points_cost: 100,
    },
    RewardTypeInfo {
        reward_type: RewardType::BonusActivity,
        title: "Atividade bônus",
        description: "Acesso a uma atividade bônus valendo nota",
        points_cost: 100,
    },
];

/// Every reward type with its cost, in display order.
pub fn reward_catalogue() -> &'static [RewardTypeInfo] {
    &REWARD_CATALOGUE
}

impl RewardType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExtraPoints => "extra_points",
            Self::AssignmentExtension => "assignment_extension",
            Self::BonusActivity => "bonus_activity",
        }
    }

    /// Catalogue entry for this type.
    pub fn info(self) -> &'static RewardTypeInfo {
        REWARD_CATALOGUE
            .iter()
            .find(|info| info.reward_type == self)
            .unwrap_or(&REWARD_CATALOGUE[0])
    }

    /// Cost in points, read from the catalogue entry.
    pub fn points_cost(self) -> i64 {
        self.info().points_cost
    }
}

impl fmt::Display for RewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a reward type string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reward type: {0}")]
pub struct ParseRewardTypeError(pub String);

impl FromStr for RewardType {
    type Err = ParseRewardTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        REWARD_CATALOGUE
            .iter()
            .map(|info| info.reward_type)
            .find(|reward_type| reward_type.as_str() == s)
            .ok_or_else(|| ParseRewardTypeError(s.to_owned()))
    }
}

/// Lifecycle state of a reward request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RewardRequestStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RewardRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a request status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reward request status: {0}")]
pub struct ParseRewardRequestStatusError(pub String);

impl FromStr for RewardRequestStatus {
    type Err = ParseRewardRequestStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(ParseRewardRequestStatusError(other.to_owned())),
        }
    }
}

/// Professor verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardDecision {
    Approve,
    Reject,
}

impl RewardDecision {
    pub const fn resulting_status(self) -> RewardRequestStatus {
        match self {
            Self::Approve => RewardRequestStatus::Approved,
            Self::Reject => RewardRequestStatus::Rejected,
        }
    }
}

/// Error returned when a decision string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reward decision: {0}")]
pub struct ParseRewardDecisionError(pub String);

impl FromStr for RewardDecision {
    type Err = ParseRewardDecisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            other => Err(ParseRewardDecisionError(other.to_owned())),
        }
    }
}

/// A student's request to spend points on a reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardRequest {
    pub id: RewardRequestId,
    pub student_id: UserId,
    pub reward_type: RewardType,
    pub message: Option<String>,
    pub status: RewardRequestStatus,
    pub professor_id: Option<UserId>,
    pub professor_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for inserting a new pending request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRewardRequest {
    pub id: RewardRequestId,
    pub student_id: UserId,
    pub reward_type: RewardType,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewRewardRequest {
    pub fn points_cost(&self) -> i64 {
        self.reward_type.points_cost()
    }

    /// Materialise the pending row.
    pub fn into_request(self) -> RewardRequest {
        RewardRequest {
            id: self.id,
            student_id: self.student_id,
            reward_type: self.reward_type,
            message: self.message,
            status: RewardRequestStatus::Pending,
            professor_id: None,
            professor_response: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// A professor's decision, ready to be applied to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRecord {
    pub request_id: RewardRequestId,
    pub professor_id: UserId,
    pub decision: RewardDecision,
    pub response: Option<String>,
    pub decided_at: DateTime<Utc>,
}

/// The request is no longer pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("reward request already {status}")]
pub struct AlreadyDecided {
    pub status: RewardRequestStatus,
}

impl RewardRequest {
    pub fn points_cost(&self) -> i64 {
        self.reward_type.points_cost()
    }

    /// Apply a decision; only pending requests accept one.
    ///
    /// # Errors
    /// Returns [`AlreadyDecided`] when the request is approved or rejected.
    pub fn apply_decision(&mut self, record: &DecisionRecord) -> Result<(), AlreadyDecided> {
        if self.status != RewardRequestStatus::Pending {
            return Err(AlreadyDecided {
                status: self.status,
            });
        }
        self.status = record.decision.resulting_status();
        self.professor_id = Some(record.professor_id);
        self.professor_response.clone_from(&record.response);
        self.updated_at = record.decided_at;
        Ok(())
    }
}

/// Trim an optional free-text note and enforce the length limit.
///
/// Blank notes collapse to `None`.
///
/// # Errors
/// Returns [`Error::invalid_request`] when the note is too long.
pub fn normalise_note(note: Option<String>, field: &str) -> Result<Option<String>, Error> {
    let Some(raw) = note else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_NOTE_CHARS {
        return Err(Error::invalid_request(format!(
            "{field} must be at most {MAX_NOTE_CHARS} characters"
        ))
        .with_details(serde_json::json!({ "field": field, "max": MAX_NOTE_CHARS })));
    }
    Ok(Some(trimmed.to_owned()))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    #[fixture]
    fn pending() -> RewardRequest {
        NewRewardRequest {
            id: RewardRequestId::random(),
            student_id: UserId::random(),
            reward_type: RewardType::AssignmentExtension,
            message: Some("Preciso de mais uma semana".to_owned()),
            created_at: Utc::now(),
        }
        .into_request()
    }

    fn decision(request: &RewardRequest, decision: RewardDecision) -> DecisionRecord {
        DecisionRecord {
            request_id: request.id,
            professor_id: UserId::random(),
            decision,
            response: Some("ok".to_owned()),
            decided_at: Utc::now(),
        }
    }

    #[rstest]
    fn catalogue_has_three_types_costing_one_hundred() {
        let catalogue = reward_catalogue();
        assert_eq!(catalogue.len(), 3);
        assert!(catalogue.iter().all(|info| info.points_cost == 100));
        assert_eq!(RewardType::BonusActivity.points_cost(), 100);
    }

    #[rstest]
    #[case("extra_points", RewardType::ExtraPoints)]
    #[case("assignment_extension", RewardType::AssignmentExtension)]
    #[case("bonus_activity", RewardType::BonusActivity)]
    fn reward_types_parse(#[case] raw: &str, #[case] expected: RewardType) {
        assert_eq!(raw.parse::<RewardType>(), Ok(expected));
    }

    #[rstest]
    fn unknown_reward_type_is_rejected() {
        assert!("free_pizza".parse::<RewardType>().is_err());
    }

    #[rstest]
    fn decisions_parse_from_snake_case() {
        assert_eq!("approve".parse::<RewardDecision>(), Ok(RewardDecision::Approve));
        assert_eq!("reject".parse::<RewardDecision>(), Ok(RewardDecision::Reject));
        assert!("maybe".parse::<RewardDecision>().is_err());
    }

    #[rstest]
    fn new_requests_start_pending(pending: RewardRequest) {
        assert_eq!(pending.status, RewardRequestStatus::Pending);
        assert_eq!(pending.created_at, pending.updated_at);
        assert!(pending.professor_id.is_none());
    }

    #[rstest]
    #[case(RewardDecision::Approve, RewardRequestStatus::Approved)]
    #[case(RewardDecision::Reject, RewardRequestStatus::Rejected)]
    fn pending_accepts_one_decision(
        mut pending: RewardRequest,
        #[case] verdict: RewardDecision,
        #[case] expected: RewardRequestStatus,
    ) {
        let record = decision(&pending, verdict);
        pending.apply_decision(&record).expect("pending accepts decision");

        assert_eq!(pending.status, expected);
        assert_eq!(pending.professor_id, Some(record.professor_id));
        assert_eq!(pending.professor_response.as_deref(), Some("ok"));
    }

    #[rstest]
    fn decided_requests_are_terminal(mut pending: RewardRequest) {
        let first = decision(&pending, RewardDecision::Approve);
        pending.apply_decision(&first).expect("first decision");
        let second = decision(&pending, RewardDecision::Reject);

        let err = pending.apply_decision(&second).expect_err("terminal");

        assert_eq!(err.status, RewardRequestStatus::Approved);
        assert_eq!(pending.status, RewardRequestStatus::Approved);
        assert_eq!(pending.professor_id, Some(first.professor_id));
    }

    #[rstest]
    fn notes_are_trimmed_and_blank_collapses() {
        assert_eq!(
            normalise_note(Some("  oi  ".to_owned()), "message").expect("valid"),
            Some("oi".to_owned())
        );
        assert_eq!(
            normalise_note(Some("   ".to_owned()), "message").expect("valid"),
            None
        );
    }

    #[rstest]
    fn overlong_notes_are_invalid() {
        let err = normalise_note(Some("x".repeat(MAX_NOTE_CHARS + 1)), "message")
            .expect_err("too long");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
