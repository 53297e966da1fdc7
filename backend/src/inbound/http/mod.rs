//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod candidates;
pub mod dto;
pub mod error;
pub mod friends;
pub mod health;
pub mod invites;
pub mod places;
pub mod projects;
pub mod schemas;
pub mod selections;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;
pub mod wishlists;

use actix_web::web;

pub use error::ApiResult;

/// Register every API route plus the invite landing route.
///
/// Handlers expect [`state::HttpState`] as app data and a session middleware
/// wrapping the app. Extractor failures are rendered as domain errors.
/// Health probes are registered separately because they carry their own
/// state.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .service(
            web::scope("/api/v1")
                .service(auth::sign_in)
                .service(auth::sign_out)
                .service(users::current_user)
                .service(users::update_current_user)
                .service(friends::list_friends)
                .service(friends::request_friend)
                .service(friends::accept_friend)
                .service(wishlists::list_wishlist)
                .service(wishlists::save_wishlist_entry)
                .service(wishlists::get_wishlist_entry)
                .service(wishlists::update_wishlist_note)
                .service(wishlists::remove_wishlist_entry)
                .service(projects::list_projects)
                .service(projects::create_project)
                .service(projects::get_project_meta)
                .service(projects::update_project_meta)
                .service(projects::get_prefectures)
                .service(projects::replace_prefectures)
                .service(projects::list_members)
                .service(projects::add_members)
                .service(candidates::candidate_pool)
                .service(candidates::add_candidate)
                .service(candidates::remove_candidate)
                .service(candidates::vote_candidate)
                .service(candidates::confirm_candidate)
                .service(selections::selection_board)
                .service(selections::save_selections)
                .service(selections::unconfirm_selection)
                .service(invites::send_invites)
                .service(places::search_places),
        )
        .service(invites::accept_invite);
}
