//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types live next
//! to the repositories that read them.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    friendships, places, project_candidates, project_invites, project_members, project_prefectures,
    project_selections, projects, users, wishlists,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub handle: Option<String>,
    pub bio: Option<String>,
    pub avatar_key: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub external_id: &'a str,
    pub email: &'a str,
}

/// Profile changeset; `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserProfileChangeset<'a> {
    pub handle: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub avatar_key: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Places and wishlists
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = places)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PlaceRow {
    pub id: Uuid,
    pub external_place_id: String,
    pub name: String,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub rating: Option<f64>,
    pub photo_reference: Option<String>,
    pub image_key: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = places)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct NewPlaceRow<'a> {
    pub id: Uuid,
    pub external_place_id: &'a str,
    pub name: &'a str,
    pub address: Option<&'a str>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub rating: Option<f64>,
    pub photo_reference: Option<&'a str>,
    pub image_key: Option<&'a str>,
    pub region: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = wishlists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WishlistRow {
    pub user_id: Uuid,
    pub note: Option<String>,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = wishlists)]
pub(crate) struct NewWishlistRow<'a> {
    pub user_id: Uuid,
    pub place_id: Uuid,
    pub note: Option<&'a str>,
    pub saved_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Friendships
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = friendships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FriendshipRow {
    pub user_id: Uuid,
    pub friend_id: Uuid,
    pub status: String,
    pub requested_by: Uuid,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = friendships)]
pub(crate) struct NewFriendshipRow<'a> {
    pub user_id: Uuid,
    pub friend_id: Uuid,
    pub status: &'a str,
    pub requested_by: Uuid,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProjectRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = projects)]
pub(crate) struct NewProjectRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Metadata changeset. Outer `None` leaves a column untouched; dates are
/// always written because they arrive already merged.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = projects)]
pub(crate) struct ProjectMetaChangeset<'a> {
    pub title: Option<&'a str>,
    pub description: Option<Option<&'a str>>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = project_prefectures)]
pub(crate) struct NewPrefectureRow<'a> {
    pub project_id: Uuid,
    pub name: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = project_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MemberRow {
    pub project_id: Uuid,
    pub role: String,
    pub status: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = project_members)]
pub(crate) struct NewMemberRow<'a> {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub role: &'a str,
    pub status: &'a str,
}

// ---------------------------------------------------------------------------
// Candidates, selections, invites
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = project_candidates)]
pub(crate) struct NewCandidateRow {
    pub project_id: Uuid,
    pub place_id: Uuid,
    pub added_by: Uuid,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = project_selections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SelectionRow {
    pub day_index: i32,
    pub order_in_day: i32,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = project_selections)]
pub(crate) struct NewSelectionRow<'a> {
    pub project_id: Uuid,
    pub place_id: Uuid,
    pub day_index: i32,
    pub order_in_day: i32,
    pub note: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = project_invites)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InviteRow {
    pub token: String,
    pub project_id: Uuid,
    pub email: String,
    pub role: String,
    pub claimed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = project_invites)]
pub(crate) struct NewInviteRow<'a> {
    pub token: &'a str,
    pub project_id: Uuid,
    pub email: &'a str,
    pub role: &'a str,
    pub created_at: DateTime<Utc>,
}
