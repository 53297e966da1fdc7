//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`.
//! Regenerate with `diesel print-schema` when the migrations change.

diesel::table! {
    /// Internal users keyed by the identity provider subject.
    users (id) {
        id -> Uuid,
        /// Identity provider subject (unique).
        external_id -> Varchar,
        /// Lower-cased email (unique).
        email -> Varchar,
        /// Optional unique handle.
        handle -> Nullable<Varchar>,
        bio -> Nullable<Text>,
        avatar_key -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Places from the external Places API, deduplicated by external id.
    places (id) {
        id -> Uuid,
        external_place_id -> Varchar,
        name -> Varchar,
        address -> Nullable<Varchar>,
        lat -> Nullable<Float8>,
        lng -> Nullable<Float8>,
        rating -> Nullable<Float8>,
        photo_reference -> Nullable<Varchar>,
        image_key -> Nullable<Varchar>,
        /// Prefecture the place belongs to, if derivable.
        region -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-user saved places.
    wishlists (user_id, place_id) {
        user_id -> Uuid,
        place_id -> Uuid,
        note -> Nullable<Text>,
        saved_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed friendship edges; accepted friendships store both directions.
    friendships (user_id, friend_id) {
        user_id -> Uuid,
        friend_id -> Uuid,
        /// `pending` or `accepted`.
        status -> Varchar,
        requested_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    projects (id) {
        id -> Uuid,
        owner_id -> Uuid,
        title -> Varchar,
        description -> Nullable<Text>,
        start_date -> Nullable<Date>,
        end_date -> Nullable<Date>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    project_members (project_id, user_id) {
        project_id -> Uuid,
        user_id -> Uuid,
        /// `viewer`, `editor`, or `owner`.
        role -> Varchar,
        /// `invited` or `active`.
        status -> Varchar,
        joined_at -> Timestamptz,
    }
}

diesel::table! {
    /// Target regions of a project.
    project_prefectures (project_id, name) {
        project_id -> Uuid,
        name -> Varchar,
    }
}

diesel::table! {
    project_candidates (project_id, place_id) {
        project_id -> Uuid,
        place_id -> Uuid,
        added_by -> Uuid,
        added_at -> Timestamptz,
    }
}

diesel::table! {
    project_candidate_votes (project_id, place_id, user_id) {
        project_id -> Uuid,
        place_id -> Uuid,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    project_selections (project_id, place_id) {
        project_id -> Uuid,
        place_id -> Uuid,
        day_index -> Int4,
        order_in_day -> Int4,
        note -> Nullable<Text>,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    project_invites (token) {
        token -> Varchar,
        project_id -> Uuid,
        email -> Varchar,
        role -> Varchar,
        claimed_by -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(wishlists -> places (place_id));
diesel::joinable!(wishlists -> users (user_id));
diesel::joinable!(project_members -> projects (project_id));
diesel::joinable!(project_members -> users (user_id));
diesel::joinable!(project_prefectures -> projects (project_id));
diesel::joinable!(project_candidates -> places (place_id));
diesel::joinable!(project_selections -> places (place_id));
diesel::joinable!(project_invites -> projects (project_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    places,
    wishlists,
    friendships,
    projects,
    project_members,
    project_prefectures,
    project_candidates,
    project_candidate_votes,
    project_selections,
    project_invites,
);
