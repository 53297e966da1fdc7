//! In-memory store implementing the user, place, wishlist, and friendship
//! repositories. Project, plan, and invite repositories live in
//! `memory_plan.rs` over the same state.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    FriendshipRepository, FriendshipRepositoryError, PlaceRepository, PlaceRepositoryError,
    UserPersistenceError, UserRepository, WishlistRepository, WishlistRepositoryError,
};
use crate::domain::{
    Email, ExternalSubject, Friendship, FriendshipStatus, Invite, MemberStatus, Note, Place,
    PlaceDraft, PlaceId, Prefecture, ProfileUpdate, ProjectDescription, ProjectId, ProjectRole,
    ProjectTitle, TripDates, User, UserId, UserSummary, WishlistEntry,
};

#[derive(Debug, Clone)]
pub(super) struct WishlistRow {
    pub user_id: UserId,
    pub place_id: PlaceId,
    pub note: Option<Note>,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(super) struct ProjectRow {
    pub id: ProjectId,
    pub owner_id: UserId,
    pub title: ProjectTitle,
    pub description: Option<ProjectDescription>,
    pub dates: TripDates,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(super) struct MemberRow {
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub role: ProjectRole,
    pub status: MemberStatus,
}

#[derive(Debug, Clone)]
pub(super) struct SelectionRow {
    pub project_id: ProjectId,
    pub place_id: PlaceId,
    pub day_index: u32,
    pub order_in_day: u32,
    pub note: Option<Note>,
}

#[derive(Debug, Default)]
pub(super) struct StoreState {
    pub users: BTreeMap<UserId, User>,
    pub places: BTreeMap<PlaceId, Place>,
    pub wishlists: Vec<WishlistRow>,
    pub friendships: Vec<Friendship>,
    pub projects: BTreeMap<ProjectId, ProjectRow>,
    pub prefectures: BTreeMap<ProjectId, Vec<Prefecture>>,
    pub members: Vec<MemberRow>,
    pub candidates: Vec<(ProjectId, PlaceId, UserId, DateTime<Utc>)>,
    pub votes: HashSet<(ProjectId, PlaceId, UserId)>,
    pub selections: Vec<SelectionRow>,
    pub invites: Vec<Invite>,
}

impl StoreState {
    pub fn summary(&self, id: &UserId) -> Option<UserSummary> {
        self.users.get(id).map(User::summary)
    }

    fn entry(&self, row: &WishlistRow) -> Option<WishlistEntry> {
        self.places.get(&row.place_id).map(|place| WishlistEntry {
            user_id: row.user_id,
            place: place.clone(),
            note: row.note.clone(),
            saved_at: row.saved_at,
        })
    }
}

/// Shared in-memory backing store for every repository port.
///
/// Each method takes the lock once, so multi-row operations are atomic in
/// the same way the database adapters' transactions are.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, StoreState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("in-memory store mutex poisoned"),
        }
    }

    /// Insert a user directly, bypassing sign-in.
    pub fn seed_user(&self, subject: &str, email: &str) -> User {
        let user = User {
            id: UserId::random(),
            external_subject: ExternalSubject::new(subject).expect("fixture subject"),
            email: Email::new(email).expect("fixture email"),
            handle: None,
            bio: None,
            avatar_key: None,
        };
        self.lock().users.insert(user.id, user.clone());
        user
    }

    /// Insert a place directly, deriving its region like a save would.
    pub fn seed_place(&self, draft: PlaceDraft) -> Place {
        let draft = draft.normalised().expect("fixture place");
        let place = Place::from_draft(PlaceId::random(), draft);
        self.lock().places.insert(place.id, place.clone());
        place
    }

    /// Number of wishlist rows for a user.
    pub fn wishlist_len(&self, user_id: &UserId) -> usize {
        self.lock()
            .wishlists
            .iter()
            .filter(|row| row.user_id == *user_id)
            .count()
    }

    /// Raw friendship edges, for asserting symmetry.
    pub fn friendship_edges(&self) -> Vec<Friendship> {
        self.lock().friendships.clone()
    }

    /// Candidate and selection row counts for one (project, place) pair.
    pub fn pair_rows(&self, project_id: &ProjectId, place_id: &PlaceId) -> (usize, usize) {
        let state = self.lock();
        let candidates = state
            .candidates
            .iter()
            .filter(|(p, place, _, _)| p == project_id && place == place_id)
            .count();
        let selections = state
            .selections
            .iter()
            .filter(|row| row.project_id == *project_id && row.place_id == *place_id)
            .count();
        (candidates, selections)
    }

    /// Number of vote rows for a place.
    pub fn vote_rows(&self, project_id: &ProjectId, place_id: &PlaceId) -> usize {
        self.lock()
            .votes
            .iter()
            .filter(|(p, place, _)| p == project_id && place == place_id)
            .count()
    }

    /// Stored invites for a project.
    pub fn invites_for(&self, project_id: &ProjectId) -> Vec<Invite> {
        self.lock()
            .invites
            .iter()
            .filter(|invite| invite.project_id == *project_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn upsert_by_subject(
        &self,
        subject: &ExternalSubject,
        email: &Email,
    ) -> Result<User, UserPersistenceError> {
        let mut state = self.lock();
        if let Some(existing) = state
            .users
            .values()
            .find(|user| user.external_subject == *subject)
        {
            return Ok(existing.clone());
        }
        if state.users.values().any(|user| user.email == *email) {
            return Err(UserPersistenceError::email_taken(email.as_str()));
        }
        let user = User {
            id: UserId::random(),
            external_subject: subject.clone(),
            email: email.clone(),
            handle: None,
            bio: None,
            avatar_key: None,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|user| user.email == *email)
            .cloned())
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut state = self.lock();
        if let Some(handle) = &update.handle
            && state
                .users
                .values()
                .any(|user| user.id != *id && user.handle.as_ref() == Some(handle))
        {
            return Err(UserPersistenceError::handle_taken(handle.as_str()));
        }
        let Some(user) = state.users.get_mut(id) else {
            return Ok(None);
        };
        if let Some(handle) = &update.handle {
            user.handle = Some(handle.clone());
        }
        if let Some(bio) = &update.bio {
            user.bio = Some(bio.clone());
        }
        if let Some(avatar_key) = &update.avatar_key {
            user.avatar_key = Some(avatar_key.clone());
        }
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl PlaceRepository for InMemoryStore {
    async fn upsert(&self, draft: &PlaceDraft) -> Result<Place, PlaceRepositoryError> {
        let mut state = self.lock();
        let existing = state
            .places
            .values()
            .find(|place| place.external_id == draft.external_id)
            .map(|place| place.id);
        let id = existing.unwrap_or_else(PlaceId::random);
        let place = Place::from_draft(id, draft.clone());
        state.places.insert(id, place.clone());
        Ok(place)
    }

    async fn find_by_id(&self, id: &PlaceId) -> Result<Option<Place>, PlaceRepositoryError> {
        Ok(self.lock().places.get(id).cloned())
    }
}

#[async_trait]
impl WishlistRepository for InMemoryStore {
    async fn save(
        &self,
        user_id: &UserId,
        place_id: &PlaceId,
        note: Option<Note>,
        saved_at: DateTime<Utc>,
    ) -> Result<WishlistEntry, WishlistRepositoryError> {
        let mut state = self.lock();
        let existing = state
            .wishlists
            .iter_mut()
            .find(|row| row.user_id == *user_id && row.place_id == *place_id);
        let row = match existing {
            Some(row) => {
                if note.is_some() {
                    row.note = note;
                }
                row.clone()
            }
            None => {
                let row = WishlistRow {
                    user_id: *user_id,
                    place_id: *place_id,
                    note,
                    saved_at,
                };
                state.wishlists.push(row.clone());
                row
            }
        };
        state
            .entry(&row)
            .ok_or_else(|| WishlistRepositoryError::query("place row missing"))
    }

    async fn list(&self, user_id: &UserId) -> Result<Vec<WishlistEntry>, WishlistRepositoryError> {
        let state = self.lock();
        let mut entries: Vec<WishlistEntry> = state
            .wishlists
            .iter()
            .filter(|row| row.user_id == *user_id)
            .filter_map(|row| state.entry(row))
            .collect();
        entries.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(entries)
    }

    async fn find(
        &self,
        user_id: &UserId,
        place_id: &PlaceId,
    ) -> Result<Option<WishlistEntry>, WishlistRepositoryError> {
        let state = self.lock();
        Ok(state
            .wishlists
            .iter()
            .find(|row| row.user_id == *user_id && row.place_id == *place_id)
            .and_then(|row| state.entry(row)))
    }

    async fn set_note(
        &self,
        user_id: &UserId,
        place_id: &PlaceId,
        note: Option<Note>,
    ) -> Result<Option<WishlistEntry>, WishlistRepositoryError> {
        let mut state = self.lock();
        let Some(row) = state
            .wishlists
            .iter_mut()
            .find(|row| row.user_id == *user_id && row.place_id == *place_id)
        else {
            return Ok(None);
        };
        row.note = note;
        let row = row.clone();
        Ok(state.entry(&row))
    }

    async fn delete(
        &self,
        user_id: &UserId,
        place_id: &PlaceId,
    ) -> Result<bool, WishlistRepositoryError> {
        let mut state = self.lock();
        let before = state.wishlists.len();
        state
            .wishlists
            .retain(|row| !(row.user_id == *user_id && row.place_id == *place_id));
        Ok(state.wishlists.len() != before)
    }
}

fn edge_matches(edge: &Friendship, from: &UserId, to: &UserId) -> bool {
    edge.user_id == *from && edge.friend_id == *to
}

#[async_trait]
impl FriendshipRepository for InMemoryStore {
    async fn find_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError> {
        let state = self.lock();
        let forward = state.friendships.iter().find(|e| edge_matches(e, a, b));
        let backward = state.friendships.iter().find(|e| edge_matches(e, b, a));
        Ok(forward.or(backward).cloned())
    }

    async fn insert_pending(
        &self,
        requester: &UserId,
        target: &UserId,
    ) -> Result<bool, FriendshipRepositoryError> {
        let mut state = self.lock();
        if state
            .friendships
            .iter()
            .any(|e| edge_matches(e, requester, target))
        {
            return Ok(false);
        }
        state.friendships.push(Friendship {
            user_id: *requester,
            friend_id: *target,
            status: FriendshipStatus::Pending,
            requested_by: *requester,
        });
        Ok(true)
    }

    async fn accept(&self, me: &UserId, friend: &UserId) -> Result<bool, FriendshipRepositoryError> {
        let mut state = self.lock();
        let Some(incoming) = state.friendships.iter_mut().find(|e| {
            edge_matches(e, friend, me) && e.status == FriendshipStatus::Pending
        }) else {
            return Ok(false);
        };
        incoming.status = FriendshipStatus::Accepted;
        match state.friendships.iter_mut().find(|e| edge_matches(e, me, friend)) {
            Some(mirror) => mirror.status = FriendshipStatus::Accepted,
            None => state.friendships.push(Friendship {
                user_id: *me,
                friend_id: *friend,
                status: FriendshipStatus::Accepted,
                requested_by: *friend,
            }),
        }
        Ok(true)
    }

    async fn list_friends(
        &self,
        me: &UserId,
    ) -> Result<Vec<UserSummary>, FriendshipRepositoryError> {
        let state = self.lock();
        let mut ids: Vec<UserId> = Vec::new();
        for edge in &state.friendships {
            if edge.status != FriendshipStatus::Accepted {
                continue;
            }
            let other = if edge.user_id == *me {
                edge.friend_id
            } else if edge.friend_id == *me {
                edge.user_id
            } else {
                continue;
            };
            if !ids.contains(&other) {
                ids.push(other);
            }
        }
        Ok(ids.iter().filter_map(|id| state.summary(id)).collect())
    }

    async fn list_incoming(
        &self,
        me: &UserId,
    ) -> Result<Vec<UserSummary>, FriendshipRepositoryError> {
        let state = self.lock();
        Ok(state
            .friendships
            .iter()
            .filter(|e| e.friend_id == *me && e.status == FriendshipStatus::Pending)
            .filter_map(|e| state.summary(&e.user_id))
            .collect())
    }

    async fn are_friends(&self, a: &UserId, b: &UserId) -> Result<bool, FriendshipRepositoryError> {
        let state = self.lock();
        Ok(state.friendships.iter().any(|e| {
            e.status == FriendshipStatus::Accepted
                && (edge_matches(e, a, b) || edge_matches(e, b, a))
        }))
    }
}
