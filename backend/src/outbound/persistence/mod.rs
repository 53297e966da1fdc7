//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports, backed by
//! PostgreSQL through `diesel-async` with `bb8` connection pooling.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Access rules and workflow decisions stay in the domain
//!   services.
//! - **Internal models**: row structs (`models.rs`) and the schema
//!   (`schema.rs`) never leave this module.
//! - **Typed errors**: database failures surface as each port's
//!   `Connection`/`Query` variants, with unique and foreign key violations
//!   mapped onto the port's domain variants where one exists.
//!
//! ```ignore
//! use tripboard::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let config = PoolConfig::new("postgres://localhost/tripboard");
//! run_migrations(&config).await?;
//! let pool = DbPool::new(config).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod conversions;
mod diesel_error_mapping;
mod diesel_friendship_repository;
mod diesel_invite_repository;
mod diesel_place_repository;
mod diesel_plan_repository;
mod diesel_project_repository;
mod diesel_user_repository;
mod diesel_wishlist_repository;
mod models;
mod pool;
mod schema;

pub use diesel_friendship_repository::DieselFriendshipRepository;
pub use diesel_invite_repository::DieselInviteRepository;
pub use diesel_place_repository::DieselPlaceRepository;
pub use diesel_plan_repository::DieselPlanRepository;
pub use diesel_project_repository::DieselProjectRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_wishlist_repository::DieselWishlistRepository;
pub use pool::{DbPool, PoolConfig, PoolError, run_migrations};
