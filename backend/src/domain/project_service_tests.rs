//! Tests for the project service over the in-memory store.

use super::*;
use crate::domain::ports::{FriendshipCommand, ProjectCommand, ProjectQuery};
use crate::domain::{ErrorCode, ProjectDescription, ProjectTitle, TripDates, User};
use crate::test_support::TestHarness;
use chrono::NaiveDate;
use rstest::{fixture, rstest};

#[fixture]
fn harness() -> TestHarness {
    TestHarness::new()
}

async fn befriend(harness: &TestHarness, a: &User, b: &User) {
    harness
        .friendships
        .request(&a.id, &b.email)
        .await
        .expect("request");
    harness
        .friendships
        .accept(&b.id, &a.id)
        .await
        .expect("accept");
}

fn kyoto() -> Prefecture {
    Prefecture::new("京都府").expect("prefecture")
}

fn request(owner_id: UserId, invitees: Vec<Invitee>) -> CreateProjectRequest {
    CreateProjectRequest {
        owner_id,
        title: ProjectTitle::new("Kansai weekend").expect("title"),
        description: Some(ProjectDescription::new("temples").expect("description")),
        dates: TripDates::new(
            NaiveDate::from_ymd_opt(2026, 5, 1),
            NaiveDate::from_ymd_opt(2026, 5, 3),
        )
        .expect("dates"),
        prefectures: vec![kyoto()],
        invitees,
    }
}

#[rstest]
#[tokio::test]
async fn create_adds_owner_and_friends_as_editors(harness: TestHarness) {
    let owner = harness.store.seed_user("sub-owner", "owner@example.com");
    let friend = harness.store.seed_user("sub-friend", "friend@example.com");
    befriend(&harness, &owner, &friend).await;

    let created = harness
        .projects
        .create(request(
            owner.id,
            vec![
                Invitee::Friend(friend.id),
                Invitee::Email(Email::new("newcomer@example.com").expect("email")),
            ],
        ))
        .await
        .expect("created");

    assert_eq!(created.project.owner_id, owner.id);
    assert_eq!(created.project.prefectures, vec![kyoto()]);
    assert_eq!(created.invites.invited, 1);

    let members = harness
        .projects
        .members(&owner.id, &created.project.id)
        .await
        .expect("members");
    let roles: Vec<(UserId, ProjectRole)> = members.iter().map(|m| (m.user.id, m.role)).collect();
    assert_eq!(
        roles,
        vec![(owner.id, ProjectRole::Owner), (friend.id, ProjectRole::Editor)]
    );
    assert!(members.iter().all(|m| m.status == MemberStatus::Active));

    let sent = harness.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to.as_str(), "newcomer@example.com");
    assert_eq!(sent[0].project_title, "Kansai weekend");
}

#[rstest]
#[tokio::test]
async fn create_rejects_invitees_who_are_not_friends(harness: TestHarness) {
    let owner = harness.store.seed_user("sub-owner", "owner@example.com");
    let stranger = harness.store.seed_user("sub-stranger", "stranger@example.com");

    let err = harness
        .projects
        .create(request(owner.id, vec![Invitee::Friend(stranger.id)]))
        .await
        .expect_err("not a friend");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    let details = err.details().expect("details");
    assert_eq!(details["code"], "not_a_friend");
    assert_eq!(details["index"], 0);
    assert!(
        harness
            .projects
            .list(&owner.id)
            .await
            .expect("list")
            .is_empty()
    );
}

#[rstest]
#[tokio::test]
async fn create_keeps_project_when_mail_relay_fails(harness: TestHarness) {
    harness.mailer.fail_deliveries();
    let owner = harness.store.seed_user("sub-owner", "owner@example.com");

    let created = harness
        .projects
        .create(request(
            owner.id,
            vec![Invitee::Email(Email::new("later@example.com").expect("email"))],
        ))
        .await
        .expect("created despite mail failure");

    assert_eq!(created.invites.invited, 1);
    assert_eq!(harness.store.invites_for(&created.project.id).len(), 1);
}

#[rstest]
#[tokio::test]
async fn listing_reports_the_callers_role(harness: TestHarness) {
    let owner = harness.store.seed_user("sub-owner", "owner@example.com");
    let friend = harness.store.seed_user("sub-friend", "friend@example.com");
    befriend(&harness, &owner, &friend).await;
    let created = harness
        .projects
        .create(request(owner.id, vec![Invitee::Friend(friend.id)]))
        .await
        .expect("created");

    let listings = harness.projects.list(&friend.id).await.expect("list");
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].project.id, created.project.id);
    assert_eq!(listings[0].role, ProjectRole::Editor);
}

#[rstest]
#[tokio::test]
async fn viewers_cannot_edit_metadata(harness: TestHarness) {
    let owner = harness.store.seed_user("sub-owner", "owner@example.com");
    let viewer = harness.store.seed_user("sub-viewer", "viewer@example.com");
    befriend(&harness, &owner, &viewer).await;
    let project = harness
        .projects
        .create(request(owner.id, Vec::new()))
        .await
        .expect("created")
        .project;
    harness
        .projects
        .add_members(&owner.id, &project.id, vec![viewer.id], ProjectRole::Viewer)
        .await
        .expect("viewer added");

    let patch = ProjectMetaPatch {
        title: Some(ProjectTitle::new("Renamed").expect("title")),
        ..ProjectMetaPatch::default()
    };
    let err = harness
        .projects
        .update_meta(&viewer.id, &project.id, patch)
        .await
        .expect_err("viewer");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    let meta = harness
        .projects
        .meta(&viewer.id, &project.id)
        .await
        .expect("viewers can read");
    assert_eq!(meta.title.as_str(), "Kansai weekend");
}

#[rstest]
#[tokio::test]
async fn outsiders_are_forbidden_and_unknown_projects_are_missing(harness: TestHarness) {
    let owner = harness.store.seed_user("sub-owner", "owner@example.com");
    let outsider = harness.store.seed_user("sub-out", "out@example.com");
    let project = harness
        .projects
        .create(request(owner.id, Vec::new()))
        .await
        .expect("created")
        .project;

    let forbidden = harness
        .projects
        .meta(&outsider.id, &project.id)
        .await
        .expect_err("outsider");
    assert_eq!(forbidden.code(), ErrorCode::Forbidden);

    let missing = harness
        .projects
        .meta(&owner.id, &ProjectId::random())
        .await
        .expect_err("unknown project");
    assert_eq!(missing.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn date_patch_is_validated_against_stored_dates(harness: TestHarness) {
    let owner = harness.store.seed_user("sub-owner", "owner@example.com");
    let project = harness
        .projects
        .create(request(owner.id, Vec::new()))
        .await
        .expect("created")
        .project;

    let patch = ProjectMetaPatch {
        start_date: Some(NaiveDate::from_ymd_opt(2026, 6, 1)),
        ..ProjectMetaPatch::default()
    };
    let err = harness
        .projects
        .update_meta(&owner.id, &project.id, patch)
        .await
        .expect_err("end before start");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details().expect("details")["field"], "endDate");

    let clear = ProjectMetaPatch {
        description: Some(None),
        end_date: Some(None),
        ..ProjectMetaPatch::default()
    };
    let updated = harness
        .projects
        .update_meta(&owner.id, &project.id, clear)
        .await
        .expect("cleared");
    assert_eq!(updated.description, None);
    assert_eq!(updated.dates.end(), None);
    assert_eq!(updated.dates.start(), NaiveDate::from_ymd_opt(2026, 5, 1));
}

#[rstest]
#[tokio::test]
async fn prefectures_are_replaced_without_duplicates(harness: TestHarness) {
    let owner = harness.store.seed_user("sub-owner", "owner@example.com");
    let project = harness
        .projects
        .create(request(owner.id, Vec::new()))
        .await
        .expect("created")
        .project;
    let osaka = Prefecture::new("大阪府").expect("prefecture");

    let stored = harness
        .projects
        .replace_prefectures(&owner.id, &project.id, vec![osaka, osaka, kyoto()])
        .await
        .expect("replaced");
    assert_eq!(stored, vec![osaka, kyoto()]);

    let cleared = harness
        .projects
        .replace_prefectures(&owner.id, &project.id, Vec::new())
        .await
        .expect("cleared");
    assert!(cleared.is_empty());
    let meta = harness
        .projects
        .meta(&owner.id, &project.id)
        .await
        .expect("meta");
    assert!(meta.prefectures.is_empty());
}

#[rstest]
#[tokio::test]
async fn owner_role_cannot_be_granted(harness: TestHarness) {
    let owner = harness.store.seed_user("sub-owner", "owner@example.com");
    let friend = harness.store.seed_user("sub-friend", "friend@example.com");
    befriend(&harness, &owner, &friend).await;
    let project = harness
        .projects
        .create(request(owner.id, Vec::new()))
        .await
        .expect("created")
        .project;

    let err = harness
        .projects
        .add_members(&owner.id, &project.id, vec![friend.id], ProjectRole::Owner)
        .await
        .expect_err("owner role");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details().expect("details")["code"], "owner_not_grantable");
}

#[rstest]
#[tokio::test]
async fn adding_existing_members_keeps_their_role(harness: TestHarness) {
    let owner = harness.store.seed_user("sub-owner", "owner@example.com");
    let friend = harness.store.seed_user("sub-friend", "friend@example.com");
    befriend(&harness, &owner, &friend).await;
    let project = harness
        .projects
        .create(request(owner.id, vec![Invitee::Friend(friend.id)]))
        .await
        .expect("created")
        .project;

    let members = harness
        .projects
        .add_members(&owner.id, &project.id, vec![friend.id], ProjectRole::Viewer)
        .await
        .expect("added");
    let friend_row = members
        .iter()
        .find(|m| m.user.id == friend.id)
        .expect("friend row");
    assert_eq!(friend_row.role, ProjectRole::Editor);
    assert_eq!(members.len(), 2);
}
