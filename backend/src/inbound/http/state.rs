//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CandidateCommand, CandidateQuery, FriendshipCommand, FriendshipQuery, InviteCommand,
    LoginService, PlacesSearchQuery, ProjectCommand, ProjectQuery, SelectionCommand,
    SelectionQuery, UserProfileCommand, UserProfileQuery, WishlistCommand, WishlistQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub profile_command: Arc<dyn UserProfileCommand>,
    pub friendships: Arc<dyn FriendshipCommand>,
    pub friendships_query: Arc<dyn FriendshipQuery>,
    pub wishlist: Arc<dyn WishlistCommand>,
    pub wishlist_query: Arc<dyn WishlistQuery>,
    pub projects: Arc<dyn ProjectCommand>,
    pub projects_query: Arc<dyn ProjectQuery>,
    pub candidates: Arc<dyn CandidateCommand>,
    pub candidates_query: Arc<dyn CandidateQuery>,
    pub selections: Arc<dyn SelectionCommand>,
    pub selections_query: Arc<dyn SelectionQuery>,
    pub invites: Arc<dyn InviteCommand>,
    pub places_search: Arc<dyn PlacesSearchQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub profile_command: Arc<dyn UserProfileCommand>,
    pub friendships: Arc<dyn FriendshipCommand>,
    pub friendships_query: Arc<dyn FriendshipQuery>,
    pub wishlist: Arc<dyn WishlistCommand>,
    pub wishlist_query: Arc<dyn WishlistQuery>,
    pub projects: Arc<dyn ProjectCommand>,
    pub projects_query: Arc<dyn ProjectQuery>,
    pub candidates: Arc<dyn CandidateCommand>,
    pub candidates_query: Arc<dyn CandidateQuery>,
    pub selections: Arc<dyn SelectionCommand>,
    pub selections_query: Arc<dyn SelectionQuery>,
    pub invites: Arc<dyn InviteCommand>,
    pub places_search: Arc<dyn PlacesSearchQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from explicit port implementations.
    ///
    /// A single service usually backs both halves of a command/query pair,
    /// so the same `Arc` is passed twice:
    ///
    /// ```ignore
    /// let plans = Arc::new(PlanService::new(projects, plans_repo, clock));
    /// let state = HttpState::new(HttpStatePorts {
    ///     candidates: plans.clone(),
    ///     candidates_query: plans.clone(),
    ///     selections: plans.clone(),
    ///     selections_query: plans,
    ///     // ...
    /// });
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            profile,
            profile_command,
            friendships,
            friendships_query,
            wishlist,
            wishlist_query,
            projects,
            projects_query,
            candidates,
            candidates_query,
            selections,
            selections_query,
            invites,
            places_search,
        } = ports;
        Self {
            login,
            profile,
            profile_command,
            friendships,
            friendships_query,
            wishlist,
            wishlist_query,
            projects,
            projects_query,
            candidates,
            candidates_query,
            selections,
            selections_query,
            invites,
            places_search,
        }
    }
}
