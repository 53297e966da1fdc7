//! Behaviour of the built-in port fallbacks and generated error constructors.
use super::*;
use crate::domain::{Email, InviteEmail, InviteRole, SearchQuery};
use rstest::rstest;

#[rstest]
#[tokio::test]
async fn noop_cache_always_misses() {
    let cache = NoopSearchCache;
    let key = SearchQuery::new("ramen").expect("query").cache_key();
    cache.put(&key, &[]).await.expect("put is accepted");
    assert_eq!(cache.get(&key).await.expect("get succeeds"), None);
}

#[rstest]
#[tokio::test]
async fn logging_mailer_accepts_every_message() {
    let email = InviteEmail {
        to: Email::new("guest@example.com").expect("email"),
        project_title: "Kyoto".to_owned(),
        inviter: "ada".to_owned(),
        accept_url: "https://tripboard.test/invite/abc".to_owned(),
        role: InviteRole::Viewer,
    };
    LoggingInviteMailer.send(&email).await.expect("logged");
}

#[rstest]
#[case(
    PlanRepositoryError::not_candidates(vec!["a".to_owned()]).to_string(),
    "places are not candidates: [\"a\"]"
)]
#[case(
    PlanRepositoryError::already_selected("p1").to_string(),
    "place p1 is already selected"
)]
#[case(
    UserPersistenceError::handle_taken("ada").to_string(),
    "handle ada is already taken"
)]
fn port_errors_render_context(#[case] rendered: String, #[case] expected: &str) {
    assert_eq!(rendered, expected);
}

#[rstest]
fn places_status_error_keeps_code() {
    let err = PlacesSourceError::status(503_u16, "unavailable");
    assert_eq!(err.to_string(), "places API returned status 503: unavailable");
}
