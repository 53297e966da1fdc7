//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, and the services that implement the driving ports in
//! [`ports`]. Keep types free of transport and storage concerns.
//!
//! Public surface:
//! - Error / ErrorCode — transport-agnostic failure payload.
//! - User, Place, WishlistEntry, Project, Invite — core entities.
//! - compute_candidate_pool / SelectionBoard — the candidate and selection
//!   read models.
//! - *Service — driving-port implementations wired by the server.

mod candidates;
pub mod error;
mod friendship;
mod friendship_service;
mod identifiers;
mod identity_service;
mod invite_service;
mod invites;
mod place;
mod places_search;
mod places_search_service;
mod plan_service;
pub mod ports;
mod project;
mod project_access;
mod project_service;
mod region;
mod selections;
mod trace_id;
pub mod user;
mod wishlist;
mod wishlist_service;

pub use self::candidates::{
    CandidatePoolRow, CandidateRemoval, PoolSnapshot, SavedPlace, Vote, VoteOp,
    VoteTally, compute_candidate_pool,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::friendship::{
    FriendList, FriendRequestOutcome, Friendship, FriendshipStatus, UnknownFriendshipStatus,
};
pub use self::friendship_service::FriendshipService;
pub use self::identifiers::{IdParseError, PlaceId, ProjectId, UserId};
pub use self::identity_service::IdentityService;
pub use self::invite_service::InviteService;
pub use self::invites::{
    INVITE_TOKEN_BYTES, InvalidInviteToken, Invite, InviteEmail, InviteRole, InviteSummary,
    InviteToken, SendInvitesRequest, UnknownInviteRole,
};
pub use self::place::{
    Coordinates, ExternalPlaceId, PLACE_ADDRESS_MAX, PLACE_NAME_MAX, Place, PlaceDraft,
    PlaceValidationError,
};
pub use self::places_search::{InvalidSearchQuery, PlaceSuggestion, SEARCH_QUERY_MAX, SearchQuery};
pub use self::places_search_service::PlacesSearchService;
pub use self::plan_service::PlanService;
pub use self::project::{
    CreateProjectRequest, DESCRIPTION_MAX, Invitee, MemberStatus, NewProject, Project,
    ProjectDescription, ProjectListing, ProjectMember, ProjectMetaPatch, ProjectRole,
    ProjectTitle, ProjectValidationError, TITLE_MAX, TripDates, UnknownProjectRole,
};
pub use self::project_access::{AuthorizedMember, ProjectAccess};
pub use self::project_service::ProjectService;
pub use self::region::{PREFECTURES, Prefecture, UnknownPrefecture, parse_prefectures};
pub use self::selections::{
    DAY_INDEX_MAX, Selection, SelectionBoard, SelectionDay, SelectionPlacement,
    SelectionValidationError,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    BIO_MAX, Bio, EMAIL_MAX, Email, ExternalIdentity, ExternalSubject, HANDLE_MAX, HANDLE_MIN,
    Handle, PLACEHOLDER_EMAIL_DOMAIN, ProfileUpdate, User, UserSummary, UserValidationError,
};
pub use self::wishlist::{NOTE_MAX, Note, NoteTooLong, WishlistEntry};
pub use self::wishlist_service::WishlistService;
