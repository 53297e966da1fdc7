//! Wires every domain service over one in-memory store.

use std::sync::Arc;

use mockable::Clock;

use super::{
    InMemorySearchCache, InMemoryStore, MutableClock, RecordingMailer, StaticIdentityProvider,
    StubPlacesSource,
};
use crate::domain::{
    FriendshipService, IdentityService, InviteService, PlacesSearchService, PlanService,
    ProjectService, WishlistService,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Public origin used in invite links built by the harness.
pub const TEST_BASE_URL: &str = "https://tripboard.test";

type Invites = InviteService<InMemoryStore, InMemoryStore, InMemoryStore, RecordingMailer>;
type Projects = ProjectService<InMemoryStore, InMemoryStore, Invites>;

/// Services and doubles sharing a single [`InMemoryStore`].
pub struct TestHarness {
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<MutableClock>,
    pub identity_provider: Arc<StaticIdentityProvider>,
    pub mailer: Arc<RecordingMailer>,
    pub places_source: Arc<StubPlacesSource>,
    pub search_cache: Arc<InMemorySearchCache>,
    pub identity: Arc<IdentityService<InMemoryStore, StaticIdentityProvider>>,
    pub wishlists: Arc<WishlistService<InMemoryStore, InMemoryStore>>,
    pub friendships: Arc<FriendshipService<InMemoryStore, InMemoryStore>>,
    pub invites: Arc<Invites>,
    pub projects: Arc<Projects>,
    pub plans: Arc<PlanService<InMemoryStore, InMemoryStore>>,
    pub search: Arc<PlacesSearchService<StubPlacesSource, InMemorySearchCache>>,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_places(StubPlacesSource::default())
    }

    /// Harness whose Places API double returns the given source's results.
    pub fn with_places(places_source: StubPlacesSource) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(MutableClock::fixed());
        let shared_clock: Arc<dyn Clock> = clock.clone();
        let identity_provider = Arc::new(StaticIdentityProvider::new());
        let mailer = Arc::new(RecordingMailer::new());
        let places_source = Arc::new(places_source);
        let search_cache = Arc::new(InMemorySearchCache::new());

        let invites = Arc::new(InviteService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            mailer.clone(),
            shared_clock.clone(),
            TEST_BASE_URL,
        ));
        let projects = Arc::new(ProjectService::new(
            store.clone(),
            store.clone(),
            invites.clone(),
            shared_clock.clone(),
        ));

        Self {
            identity: Arc::new(IdentityService::new(store.clone(), identity_provider.clone())),
            wishlists: Arc::new(WishlistService::new(
                store.clone(),
                store.clone(),
                shared_clock.clone(),
            )),
            friendships: Arc::new(FriendshipService::new(store.clone(), store.clone())),
            plans: Arc::new(PlanService::new(store.clone(), store.clone(), shared_clock)),
            search: Arc::new(PlacesSearchService::new(
                places_source.clone(),
                search_cache.clone(),
            )),
            invites,
            projects,
            store,
            clock,
            identity_provider,
            mailer,
            places_source,
            search_cache,
        }
    }

    /// HTTP handler state backed by this harness.
    pub fn http_state(&self) -> HttpState {
        HttpState::new(HttpStatePorts {
            login: self.identity.clone(),
            profile: self.identity.clone(),
            profile_command: self.identity.clone(),
            friendships: self.friendships.clone(),
            friendships_query: self.friendships.clone(),
            wishlist: self.wishlists.clone(),
            wishlist_query: self.wishlists.clone(),
            projects: self.projects.clone(),
            projects_query: self.projects.clone(),
            candidates: self.plans.clone(),
            candidates_query: self.plans.clone(),
            selections: self.plans.clone(),
            selections_query: self.plans.clone(),
            invites: self.invites.clone(),
            places_search: self.search.clone(),
        })
    }
}
