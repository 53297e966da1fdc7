//! Builds the HTTP state from real adapters.
//!
//! Every collaborator is constructed once here and handed to the domain
//! services by `Arc`; nothing is stored in process-wide globals.

use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr};
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use tripboard::domain::ports::{
    InviteMailer, LoggingInviteMailer, NoopSearchCache, SearchCache,
};
use tripboard::domain::{
    FriendshipService, IdentityService, InviteService, PlacesSearchService, PlanService,
    ProjectService, WishlistService,
};
use tripboard::inbound::http::state::{HttpState, HttpStatePorts};
use tripboard::outbound::cache::RedisSearchCache;
use tripboard::outbound::identity::JwtIdentityProvider;
use tripboard::outbound::mail::SmtpInviteMailer;
use tripboard::outbound::persistence::{
    DbPool, DieselFriendshipRepository, DieselInviteRepository, DieselPlaceRepository,
    DieselPlanRepository, DieselProjectRepository, DieselUserRepository,
    DieselWishlistRepository, PoolConfig, run_migrations,
};
use tripboard::outbound::places::PlacesHttpSource;

use super::AppSettings;

/// Repositories sharing one connection pool.
struct Repositories {
    users: Arc<DieselUserRepository>,
    places: Arc<DieselPlaceRepository>,
    wishlists: Arc<DieselWishlistRepository>,
    friendships: Arc<DieselFriendshipRepository>,
    projects: Arc<DieselProjectRepository>,
    plans: Arc<DieselPlanRepository>,
    invites: Arc<DieselInviteRepository>,
}

impl Repositories {
    fn new(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            places: Arc::new(DieselPlaceRepository::new(pool.clone())),
            wishlists: Arc::new(DieselWishlistRepository::new(pool.clone())),
            friendships: Arc::new(DieselFriendshipRepository::new(pool.clone())),
            projects: Arc::new(DieselProjectRepository::new(pool.clone())),
            plans: Arc::new(DieselPlanRepository::new(pool.clone())),
            invites: Arc::new(DieselInviteRepository::new(pool.clone())),
        }
    }
}

/// Apply pending migrations, then open the pool.
async fn connect_database(settings: &AppSettings) -> Result<DbPool> {
    let config = PoolConfig::new(settings.database_url()?).with_max_size(settings.db_pool_size());
    let applied = run_migrations(&config)
        .await
        .wrap_err("failed to run database migrations")?;
    info!(applied, "database migrations complete");
    DbPool::new(config)
        .await
        .wrap_err("failed to create database pool")
}

async fn build_search_cache(settings: &AppSettings) -> Result<Arc<dyn SearchCache>> {
    match settings.redis_url() {
        Some(url) => {
            let cache = RedisSearchCache::connect(url, settings.search_cache_ttl())
                .await
                .wrap_err("failed to connect search cache")?;
            Ok(Arc::new(cache))
        }
        None => {
            warn!("no redis url configured; places search results will not be cached");
            Ok(Arc::new(NoopSearchCache))
        }
    }
}

fn build_mailer(settings: &AppSettings) -> Result<Arc<dyn InviteMailer>> {
    match settings.smtp_config()? {
        Some(config) => {
            let mailer = SmtpInviteMailer::new(config).wrap_err("failed to configure smtp")?;
            Ok(Arc::new(mailer))
        }
        None => {
            warn!("no smtp relay configured; invite mail will be logged only");
            Ok(Arc::new(LoggingInviteMailer))
        }
    }
}

/// Build handler state over PostgreSQL, Redis, SMTP, and the Places API.
///
/// # Errors
///
/// Fails when a required setting is missing, migrations fail, or an adapter
/// cannot be constructed.
pub async fn build_http_state(settings: &AppSettings) -> Result<HttpState> {
    let pool = connect_database(settings).await?;
    let repos = Repositories::new(&pool);
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let search_cache = build_search_cache(settings).await?;
    let mailer = build_mailer(settings)?;
    let identity_provider = Arc::new(JwtIdentityProvider::new(&settings.jwt_config()?));
    let places_source = Arc::new(
        PlacesHttpSource::new(settings.places_config()?, settings.places_timeout())
            .wrap_err("failed to build places client")?,
    );

    let identity = Arc::new(IdentityService::new(
        repos.users.clone(),
        identity_provider,
    ));
    let friendships = Arc::new(FriendshipService::new(
        repos.users.clone(),
        repos.friendships.clone(),
    ));
    let wishlists = Arc::new(WishlistService::new(
        repos.places,
        repos.wishlists,
        clock.clone(),
    ));
    let invites = Arc::new(InviteService::new(
        repos.projects.clone(),
        repos.users,
        repos.invites,
        mailer,
        clock.clone(),
        settings.public_base_url()?,
    ));
    let projects = Arc::new(ProjectService::new(
        repos.projects.clone(),
        repos.friendships,
        invites.clone(),
        clock.clone(),
    ));
    let plans = Arc::new(PlanService::new(repos.projects, repos.plans, clock));
    let places_search = Arc::new(PlacesSearchService::new(places_source, search_cache));

    Ok(HttpState::new(HttpStatePorts {
        login: identity.clone(),
        profile: identity.clone(),
        profile_command: identity,
        friendships: friendships.clone(),
        friendships_query: friendships,
        wishlist: wishlists.clone(),
        wishlist_query: wishlists,
        projects: projects.clone(),
        projects_query: projects,
        candidates: plans.clone(),
        candidates_query: plans.clone(),
        selections: plans.clone(),
        selections_query: plans,
        invites,
        places_search,
    }))
}
