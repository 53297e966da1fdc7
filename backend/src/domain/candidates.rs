//! Candidate pool derivation and voting types.
//!
//! The pool is never stored. Each read joins the wishlists of the project's
//! active members against the project's target regions and annotates every
//! place with its lifecycle state and vote tally.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Place, PlaceId, Prefecture, UserId};

/// One member's saved place, as read for pool computation.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedPlace {
    pub user_id: UserId,
    pub place: Place,
    pub saved_at: DateTime<Utc>,
}

/// A single member's vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vote {
    pub place_id: PlaceId,
    pub user_id: UserId,
}

/// Raw inputs for [`compute_candidate_pool`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolSnapshot {
    /// The project's target regions.
    pub regions: Vec<Prefecture>,
    /// Wishlist entries of the project's active members.
    pub saved: Vec<SavedPlace>,
    pub candidates: Vec<PlaceId>,
    pub selections: Vec<PlaceId>,
    pub votes: Vec<Vote>,
}

/// One row of the candidate pool.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePoolRow {
    pub place: Place,
    /// Members who saved the place, earliest save first.
    pub saved_by: Vec<UserId>,
    /// Most recent save by any member.
    pub saved_at: DateTime<Utc>,
    pub is_candidate: bool,
    pub is_selected: bool,
    pub vote_count: u32,
    pub voted_by_me: bool,
}

/// Requested vote mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteOp {
    Add,
    Remove,
}

/// Vote count recomputed after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTally {
    pub place_id: PlaceId,
    pub vote_count: u32,
    pub voted_by_me: bool,
}

/// What a candidate removal actually deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CandidateRemoval {
    pub candidate_removed: bool,
    pub selection_removed: bool,
}

/// Build the candidate pool visible to `viewer`.
///
/// Rows are the places saved by any member whose region is one of the
/// project's regions, one row per place, newest save first. Places without a
/// region never qualify.
pub fn compute_candidate_pool(snapshot: &PoolSnapshot, viewer: UserId) -> Vec<CandidatePoolRow> {
    let regions: HashSet<Prefecture> = snapshot.regions.iter().copied().collect();
    let candidates: HashSet<PlaceId> = snapshot.candidates.iter().copied().collect();
    let selections: HashSet<PlaceId> = snapshot.selections.iter().copied().collect();

    let mut saved: Vec<&SavedPlace> = snapshot
        .saved
        .iter()
        .filter(|entry| entry.place.region.is_some_and(|r| regions.contains(&r)))
        .collect();
    saved.sort_by_key(|entry| entry.saved_at);

    let mut rows: BTreeMap<PlaceId, CandidatePoolRow> = BTreeMap::new();
    for entry in saved {
        let row = rows
            .entry(entry.place.id)
            .or_insert_with(|| CandidatePoolRow {
                place: entry.place.clone(),
                saved_by: Vec::new(),
                saved_at: entry.saved_at,
                is_candidate: candidates.contains(&entry.place.id),
                is_selected: selections.contains(&entry.place.id),
                vote_count: 0,
                voted_by_me: false,
            });
        if !row.saved_by.contains(&entry.user_id) {
            row.saved_by.push(entry.user_id);
        }
        row.saved_at = row.saved_at.max(entry.saved_at);
    }

    let mut seen_votes: HashSet<Vote> = HashSet::new();
    for vote in &snapshot.votes {
        if !seen_votes.insert(*vote) {
            continue;
        }
        if let Some(row) = rows.get_mut(&vote.place_id) {
            row.vote_count += 1;
            row.voted_by_me |= vote.user_id == viewer;
        }
    }

    let mut pool: Vec<CandidatePoolRow> = rows.into_values().collect();
    pool.sort_by(|a, b| {
        b.saved_at
            .cmp(&a.saved_at)
            .then_with(|| a.place.name.cmp(&b.place.name))
            .then_with(|| a.place.id.cmp(&b.place.id))
    });
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExternalPlaceId, PlaceDraft};
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn place(name: &str, region: Option<&str>) -> Place {
        let mut draft = PlaceDraft::new(ExternalPlaceId::new(name).expect("id"), name);
        draft.region = region.map(|r| Prefecture::new(r).expect("prefecture"));
        Place::from_draft(PlaceId::random(), draft)
    }

    fn tokyo() -> Prefecture {
        Prefecture::new("東京都").expect("prefecture")
    }

    #[fixture]
    fn members() -> (UserId, UserId) {
        (UserId::random(), UserId::random())
    }

    #[rstest]
    fn pool_is_region_intersection(members: (UserId, UserId)) {
        let (alice, _) = members;
        let x = place("X", Some("東京都"));
        let y = place("Y", Some("大阪府"));
        let z = place("Z", None);
        let snapshot = PoolSnapshot {
            regions: vec![tokyo()],
            saved: vec![
                SavedPlace { user_id: alice, place: x.clone(), saved_at: at(1) },
                SavedPlace { user_id: alice, place: y, saved_at: at(2) },
                SavedPlace { user_id: alice, place: z, saved_at: at(3) },
            ],
            ..PoolSnapshot::default()
        };

        let pool = compute_candidate_pool(&snapshot, alice);
        let ids: Vec<PlaceId> = pool.iter().map(|row| row.place.id).collect();
        assert_eq!(ids, vec![x.id]);
    }

    #[rstest]
    fn pool_is_empty_without_regions(members: (UserId, UserId)) {
        let (alice, _) = members;
        let snapshot = PoolSnapshot {
            saved: vec![SavedPlace {
                user_id: alice,
                place: place("X", Some("東京都")),
                saved_at: at(1),
            }],
            ..PoolSnapshot::default()
        };
        assert!(compute_candidate_pool(&snapshot, alice).is_empty());
    }

    #[rstest]
    fn shared_saves_collapse_into_one_row(members: (UserId, UserId)) {
        let (alice, bob) = members;
        let x = place("X", Some("東京都"));
        let older = place("Older", Some("東京都"));
        let snapshot = PoolSnapshot {
            regions: vec![tokyo()],
            saved: vec![
                SavedPlace { user_id: bob, place: x.clone(), saved_at: at(5) },
                SavedPlace { user_id: alice, place: x.clone(), saved_at: at(2) },
                SavedPlace { user_id: alice, place: older.clone(), saved_at: at(4) },
            ],
            ..PoolSnapshot::default()
        };

        let pool = compute_candidate_pool(&snapshot, alice);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool[0].place.id, x.id);
        assert_eq!(pool[0].saved_by, vec![alice, bob]);
        assert_eq!(pool[0].saved_at, at(5));
        assert_eq!(pool[1].place.id, older.id);
    }

    #[rstest]
    fn rows_carry_state_and_votes(members: (UserId, UserId)) {
        let (alice, bob) = members;
        let x = place("X", Some("東京都"));
        let y = place("Y", Some("東京都"));
        let snapshot = PoolSnapshot {
            regions: vec![tokyo()],
            saved: vec![
                SavedPlace { user_id: alice, place: x.clone(), saved_at: at(2) },
                SavedPlace { user_id: bob, place: y.clone(), saved_at: at(1) },
            ],
            candidates: vec![x.id],
            selections: vec![y.id],
            votes: vec![
                Vote { place_id: x.id, user_id: bob },
                Vote { place_id: x.id, user_id: alice },
                Vote { place_id: x.id, user_id: alice },
            ],
        };

        let pool = compute_candidate_pool(&snapshot, alice);
        let x_row = &pool[0];
        assert!(x_row.is_candidate && !x_row.is_selected);
        assert_eq!(x_row.vote_count, 2);
        assert!(x_row.voted_by_me);

        let y_row = &pool[1];
        assert!(!y_row.is_candidate && y_row.is_selected);
        assert_eq!(y_row.vote_count, 0);
        assert!(!y_row.voted_by_me);
    }
}
