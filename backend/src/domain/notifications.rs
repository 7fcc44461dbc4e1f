//! User-facing notification events emitted by the engine.
//!
//! Events are opaque to the engine once emitted; delivery and retry belong
//! to whichever sink is wired in.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Achievement, Module, RewardRequest, RewardRequestStatus, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ModuleCompleted,
    AchievementEarned,
    RewardApproved,
    RewardRejected,
}

impl NotificationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ModuleCompleted => "module_completed",
            Self::AchievementEarned => "achievement_earned",
            Self::RewardApproved => "reward_approved",
            Self::RewardRejected => "reward_rejected",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(user, kind, title, body)` event handed to the notification sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
}

impl NotificationEvent {
    pub fn module_completed(user_id: UserId, module: &Module) -> Self {
        Self {
            user_id,
            kind: NotificationKind::ModuleCompleted,
            title: "Módulo concluído".to_owned(),
            body: format!(
                "Você concluiu \"{}\" e ganhou {} XP.",
                module.title, module.xp_reward
            ),
        }
    }

    pub fn achievement_earned(user_id: UserId, achievement: &Achievement) -> Self {
        Self {
            user_id,
            kind: NotificationKind::AchievementEarned,
            title: "Nova conquista!".to_owned(),
            body: format!(
                "Você desbloqueou \"{}\" (+{} XP).",
                achievement.title, achievement.xp_reward
            ),
        }
    }

    /// Event for a decided request, addressed to the requesting student.
    ///
    /// Returns `None` while the request is still pending.
    pub fn reward_decided(request: &RewardRequest) -> Option<Self> {
        let reward = request.reward_type.info().title;
        let (kind, title, body) = match request.status {
            RewardRequestStatus::Pending => return None,
            RewardRequestStatus::Approved => (
                NotificationKind::RewardApproved,
                "Recompensa aprovada",
                format!(
                    "Seu pedido de \"{reward}\" foi aprovado; {} pontos foram debitados.",
                    request.points_cost()
                ),
            ),
            RewardRequestStatus::Rejected => (
                NotificationKind::RewardRejected,
                "Recompensa recusada",
                format!("Seu pedido de \"{reward}\" foi recusado."),
            ),
        };
        Some(Self {
            user_id: request.student_id,
            kind,
            title: title.to_owned(),
            body,
        })
    }
}
