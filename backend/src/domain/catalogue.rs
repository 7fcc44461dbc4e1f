//! Curriculum catalogue entries.
//!
//! Trails and modules are authored externally and only read by the engine.

use serde::{Deserialize, Serialize};

use crate::domain::{ModuleId, TrailId};

/// A named curriculum path composed of ordered modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trail {
    pub id: TrailId,
    pub title: String,
    /// Course or category the trail is attached to.
    pub category: String,
    /// Sum of the XP rewards of every module in the trail.
    pub total_xp: i64,
}

/// An atomic unit of a trail with a fixed XP reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: ModuleId,
    pub trail_id: TrailId,
    pub title: String,
    /// Position within the trail; lower values come first.
    pub order_index: i32,
    pub xp_reward: i64,
}
