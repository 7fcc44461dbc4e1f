//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Learning trails.
    trails (id) {
        id -> Uuid,
        title -> Varchar,
        category -> Varchar,
        /// Sum of the module rewards, denormalised for display.
        total_xp -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ordered units of a trail.
    modules (id) {
        id -> Uuid,
        trail_id -> Uuid,
        title -> Varchar,
        /// 1-based position within the trail; unique per trail.
        order_index -> Int4,
        xp_reward -> Int8,
    }
}

diesel::table! {
    /// Per-user module status. A missing row means `not_started`.
    module_progress (user_id, module_id) {
        user_id -> Uuid,
        module_id -> Uuid,
        trail_id -> Uuid,
        /// One of `in_progress` or `completed`.
        status -> Varchar,
        /// Non-zero exactly when `status` is `completed`.
        xp_earned -> Int8,
        completed_at -> Nullable<Timestamptz>,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One XP ledger row per user, created lazily.
    xp_ledgers (user_id) {
        user_id -> Uuid,
        total_xp -> Int8,
        level -> Int4,
        streak_days -> Int4,
        last_activity_on -> Nullable<Date>,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Achievement catalogue.
    achievements (id) {
        id -> Uuid,
        /// Unique; special achievements are granted by title.
        title -> Varchar,
        description -> Text,
        /// One of `module`, `trail`, `streak` or `special`.
        kind -> Varchar,
        requirement_value -> Int8,
        xp_reward -> Int8,
    }
}

diesel::table! {
    /// Earned achievements; the primary key makes a grant happen once.
    achievement_grants (user_id, achievement_id) {
        user_id -> Uuid,
        achievement_id -> Uuid,
        earned_at -> Timestamptz,
    }
}

diesel::table! {
    /// Student reward redemption requests.
    reward_requests (id) {
        id -> Uuid,
        student_id -> Uuid,
        /// One of `extra_points`, `assignment_extension` or `bonus_activity`.
        reward_type -> Varchar,
        message -> Nullable<Text>,
        /// One of `pending`, `approved` or `rejected`.
        status -> Varchar,
        professor_id -> Nullable<Uuid>,
        professor_response -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(modules -> trails (trail_id));
diesel::joinable!(achievement_grants -> achievements (achievement_id));

diesel::allow_tables_to_appear_in_same_query!(
    trails,
    modules,
    module_progress,
    xp_ledgers,
    achievements,
    achievement_grants,
    reward_requests,
);
