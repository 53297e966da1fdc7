//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every handler under `inbound::http`, the request and
//! response bodies they exchange, and the session cookie security scheme.
//! Domain types stay free of utoipa derives; the error payload is described
//! through the wrappers in [`crate::inbound::http::schemas`].
//!
//! The document backs Swagger UI in debug builds and is exported by the
//! `openapi-dump` binary.

use crate::inbound::http::auth::{SignInRequest, SignInResponse};
use crate::inbound::http::candidates::{
    CandidateBody, CandidatePoolRowBody, ConfirmBody, RemoveCandidateBody,
    RemoveCandidateResponse, VoteBody, VoteResponse,
};
use crate::inbound::http::dto::{PlaceBody, UserSummaryBody};
use crate::inbound::http::friends::{
    AcceptFriendBody, FriendBody, FriendListResponse, FriendRequestBody, FriendRequestResponse,
};
use crate::inbound::http::invites::{InviteSummaryBody, SendInvitesBody};
use crate::inbound::http::places::PlaceSuggestionBody;
use crate::inbound::http::projects::{
    AddMembersBody, CreateProjectBody, CreateProjectResponse, InviteeInput, MemberBody,
    PrefecturesBody, ProjectBody, ProjectListingBody, ProjectMetaPatchBody,
};
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, FieldErrorDetails, PlaceConflictDetails,
};
use crate::inbound::http::selections::{
    PlacementInput, SaveSelectionsBody, SelectionBoardBody, SelectionDayBody, SelectionItemBody,
    UnconfirmResponse,
};
use crate::inbound::http::users::{ProfilePatchRequest, ProfileResponse};
use crate::inbound::http::wishlists::{
    PlaceInput, SaveWishlistBody, UpdateNoteBody, WishlistEntryBody,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/session.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Tripboard API",
        description = "Collaborative trip planning: wishlists, friends, projects, candidate pools, and day-by-day selections."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::sign_in,
        crate::inbound::http::auth::sign_out,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::friends::list_friends,
        crate::inbound::http::friends::request_friend,
        crate::inbound::http::friends::accept_friend,
        crate::inbound::http::wishlists::list_wishlist,
        crate::inbound::http::wishlists::save_wishlist_entry,
        crate::inbound::http::wishlists::get_wishlist_entry,
        crate::inbound::http::wishlists::update_wishlist_note,
        crate::inbound::http::wishlists::remove_wishlist_entry,
        crate::inbound::http::projects::list_projects,
        crate::inbound::http::projects::create_project,
        crate::inbound::http::projects::get_project_meta,
        crate::inbound::http::projects::update_project_meta,
        crate::inbound::http::projects::get_prefectures,
        crate::inbound::http::projects::replace_prefectures,
        crate::inbound::http::projects::list_members,
        crate::inbound::http::projects::add_members,
        crate::inbound::http::candidates::candidate_pool,
        crate::inbound::http::candidates::add_candidate,
        crate::inbound::http::candidates::remove_candidate,
        crate::inbound::http::candidates::vote_candidate,
        crate::inbound::http::candidates::confirm_candidate,
        crate::inbound::http::selections::selection_board,
        crate::inbound::http::selections::save_selections,
        crate::inbound::http::selections::unconfirm_selection,
        crate::inbound::http::invites::send_invites,
        crate::inbound::http::invites::accept_invite,
        crate::inbound::http::places::search_places,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        FieldErrorDetails,
        PlaceConflictDetails,
        SignInRequest,
        SignInResponse,
        ProfileResponse,
        ProfilePatchRequest,
        UserSummaryBody,
        PlaceBody,
        FriendBody,
        FriendListResponse,
        FriendRequestBody,
        FriendRequestResponse,
        AcceptFriendBody,
        PlaceInput,
        SaveWishlistBody,
        UpdateNoteBody,
        WishlistEntryBody,
        ProjectBody,
        ProjectListingBody,
        InviteeInput,
        CreateProjectBody,
        CreateProjectResponse,
        ProjectMetaPatchBody,
        PrefecturesBody,
        MemberBody,
        AddMembersBody,
        CandidatePoolRowBody,
        CandidateBody,
        RemoveCandidateBody,
        RemoveCandidateResponse,
        VoteBody,
        VoteResponse,
        ConfirmBody,
        SelectionItemBody,
        SelectionDayBody,
        SelectionBoardBody,
        PlacementInput,
        SaveSelectionsBody,
        UnconfirmResponse,
        SendInvitesBody,
        InviteSummaryBody,
        PlaceSuggestionBody,
    )),
    tags(
        (name = "session", description = "Sign-in and sign-out"),
        (name = "users", description = "The signed-in user's profile"),
        (name = "friends", description = "Friend requests and friend lists"),
        (name = "wishlists", description = "Personal saved places"),
        (name = "projects", description = "Trip projects, regions, and members"),
        (name = "candidates", description = "Candidate pool, votes, and confirmation"),
        (name = "selections", description = "Day-by-day selection board"),
        (name = "invites", description = "Email invites to projects"),
        (name = "places", description = "Places text search"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_uses_camel_case_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[test]
    fn candidate_rows_expose_vote_state() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let row = schemas.get("CandidatePoolRowBody").expect("pool row schema");

        for field in ["place", "savedBy", "savedAt", "isCandidate", "isSelected", "voteCount", "votedByMe"] {
            assert_object_schema_has_field(row, field);
        }
    }

    #[test]
    fn invite_landing_route_sits_outside_the_api_prefix() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/invite/{token}"));
        assert!(doc.paths.paths.contains_key("/api/v1/projects/{id}/candidates/confirm"));
        for path in [
            "/api/v1/session",
            "/api/v1/users/me",
            "/api/v1/friends",
            "/api/v1/wishlists/{placeId}",
            "/api/v1/projects",
            "/api/v1/projects/{id}/prefectures",
            "/api/v1/projects/{id}/members",
            "/api/v1/projects/{id}/selections",
            "/api/v1/projects/{id}/invites",
            "/api/v1/places/search",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        assert!(!doc.paths.paths.contains_key("/api/v1/invite/{token}"));
    }
}
