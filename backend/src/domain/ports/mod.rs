//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`, [`LoginService`]) are implemented by
//! domain services and called by inbound adapters. Driven ports
//! (`*Repository`, [`IdentityProvider`], [`InviteMailer`], [`PlacesSource`],
//! [`SearchCache`]) are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod cache_key;
mod candidate_command;
mod candidate_query;
mod friendship_command;
mod friendship_query;
mod friendship_repository;
mod identity_provider;
mod invite_command;
mod invite_mailer;
mod invite_repository;
mod login_service;
mod place_repository;
mod places_search_query;
mod places_source;
mod plan_repository;
mod project_command;
mod project_query;
mod project_repository;
mod search_cache;
mod selection_command;
mod selection_query;
mod user_profile_command;
mod user_profile_query;
mod user_repository;
mod wishlist_command;
mod wishlist_query;
mod wishlist_repository;

pub use cache_key::{SEARCH_CACHE_PREFIX, SearchCacheKey, SearchCacheKeyValidationError};
pub use candidate_command::CandidateCommand;
#[cfg(test)]
pub use candidate_command::MockCandidateCommand;
pub use candidate_query::CandidateQuery;
#[cfg(test)]
pub use candidate_query::MockCandidateQuery;
pub use friendship_command::FriendshipCommand;
#[cfg(test)]
pub use friendship_command::MockFriendshipCommand;
pub use friendship_query::FriendshipQuery;
#[cfg(test)]
pub use friendship_query::MockFriendshipQuery;
#[cfg(test)]
pub use friendship_repository::MockFriendshipRepository;
pub use friendship_repository::{FriendshipRepository, FriendshipRepositoryError};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{IdentityProvider, IdentityProviderError};
pub use invite_command::InviteCommand;
#[cfg(test)]
pub use invite_command::MockInviteCommand;
#[cfg(test)]
pub use invite_mailer::MockInviteMailer;
pub use invite_mailer::{InviteMailer, InviteMailerError, LoggingInviteMailer};
#[cfg(test)]
pub use invite_repository::MockInviteRepository;
pub use invite_repository::{InviteRepository, InviteRepositoryError};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use place_repository::MockPlaceRepository;
pub use place_repository::{PlaceRepository, PlaceRepositoryError};
#[cfg(test)]
pub use places_search_query::MockPlacesSearchQuery;
pub use places_search_query::PlacesSearchQuery;
#[cfg(test)]
pub use places_source::MockPlacesSource;
pub use places_source::{PlacesSource, PlacesSourceError};
#[cfg(test)]
pub use plan_repository::MockPlanRepository;
pub use plan_repository::{PlanRepository, PlanRepositoryError};
#[cfg(test)]
pub use project_command::MockProjectCommand;
pub use project_command::{ProjectCommand, ProjectCreated};
#[cfg(test)]
pub use project_query::MockProjectQuery;
pub use project_query::ProjectQuery;
#[cfg(test)]
pub use project_repository::MockProjectRepository;
pub use project_repository::{ProjectMetaUpdate, ProjectRepository, ProjectRepositoryError};
#[cfg(test)]
pub use search_cache::MockSearchCache;
pub use search_cache::{NoopSearchCache, SearchCache, SearchCacheError};
#[cfg(test)]
pub use selection_command::MockSelectionCommand;
pub use selection_command::SelectionCommand;
#[cfg(test)]
pub use selection_query::MockSelectionQuery;
pub use selection_query::SelectionQuery;
#[cfg(test)]
pub use user_profile_command::MockUserProfileCommand;
pub use user_profile_command::UserProfileCommand;
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::UserProfileQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use wishlist_command::MockWishlistCommand;
pub use wishlist_command::{SaveWishlistRequest, WishlistCommand};
#[cfg(test)]
pub use wishlist_query::MockWishlistQuery;
pub use wishlist_query::WishlistQuery;
#[cfg(test)]
pub use wishlist_repository::MockWishlistRepository;
pub use wishlist_repository::{WishlistRepository, WishlistRepositoryError};

#[cfg(test)]
mod tests;
