//! PostgreSQL-backed `PlanRepository` using Diesel ORM.
//!
//! Candidate and selection rows share the `(project_id, place_id)` key space.
//! Moving a pair between them happens inside one transaction so a place is
//! never both a candidate and a selection.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{PlanRepository, PlanRepositoryError};
use crate::domain::{
    CandidateRemoval, MemberStatus, Note, PlaceId, PoolSnapshot, Prefecture,
    ProjectId, SavedPlace, Selection, SelectionPlacement, UserId, Vote,
};

use super::conversions::{row_to_place, stored_note};
use super::diesel_error_mapping::{
    is_foreign_key_violation, map_basic_diesel_error, map_basic_pool_error, non_negative,
};
use super::models::{NewCandidateRow, NewSelectionRow, PlaceRow, SelectionRow, WishlistRow};
use super::pool::{DbPool, PoolError};
use super::schema::{
    places, project_candidate_votes, project_candidates, project_members, project_prefectures,
    project_selections, projects, wishlists,
};

/// Diesel-backed implementation of the `PlanRepository` port.
#[derive(Clone)]
pub struct DieselPlanRepository {
    pool: DbPool,
}

impl DieselPlanRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PlanRepositoryError {
    map_basic_pool_error(error, PlanRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PlanRepositoryError {
    map_basic_diesel_error(
        error,
        PlanRepositoryError::query,
        PlanRepositoryError::connection,
    )
}

/// Failure inside a plan transaction: either the database or a workflow rule.
#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    Rule(PlanRepositoryError),
}

impl From<diesel::result::Error> for TxError {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

impl From<TxError> for PlanRepositoryError {
    fn from(value: TxError) -> Self {
        match value {
            TxError::Diesel(err) => map_diesel_error(err),
            TxError::Rule(err) => err,
        }
    }
}

async fn place_exists(
    conn: &mut AsyncPgConnection,
    place_id: Uuid,
) -> Result<bool, diesel::result::Error> {
    diesel::select(exists(places::table.find(place_id)))
        .get_result(conn)
        .await
}

async fn is_selected(
    conn: &mut AsyncPgConnection,
    project_id: Uuid,
    place_id: Uuid,
) -> Result<bool, diesel::result::Error> {
    diesel::select(exists(project_selections::table.find((project_id, place_id))))
        .get_result(conn)
        .await
}

fn to_selection((row, place): (SelectionRow, PlaceRow)) -> Result<Selection, PlanRepositoryError> {
    Ok(Selection {
        place: row_to_place(place).map_err(PlanRepositoryError::query)?,
        day_index: non_negative(row.day_index),
        order_in_day: non_negative(row.order_in_day),
        note: stored_note(row.note).map_err(PlanRepositoryError::query)?,
    })
}

fn to_db_int(value: u32) -> Result<i32, TxError> {
    i32::try_from(value)
        .map_err(|_| TxError::Rule(PlanRepositoryError::query("placement index out of range")))
}

#[async_trait]
impl PlanRepository for DieselPlanRepository {
    async fn pool_snapshot(
        &self,
        project_id: &ProjectId,
    ) -> Result<PoolSnapshot, PlanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *project_id.as_uuid();
        let loaded = conn
            .transaction(|conn| {
                async move {
                    let regions: Vec<String> = project_prefectures::table
                        .filter(project_prefectures::project_id.eq(id))
                        .select(project_prefectures::name)
                        .load(conn)
                        .await?;
                    let active_members = project_members::table
                        .filter(project_members::project_id.eq(id))
                        .filter(project_members::status.eq(MemberStatus::Active.as_str()))
                        .select(project_members::user_id);
                    let saved: Vec<(WishlistRow, PlaceRow)> = wishlists::table
                        .inner_join(places::table)
                        .filter(wishlists::user_id.eq_any(active_members))
                        .select((WishlistRow::as_select(), PlaceRow::as_select()))
                        .load(conn)
                        .await?;
                    let candidates: Vec<Uuid> = project_candidates::table
                        .filter(project_candidates::project_id.eq(id))
                        .select(project_candidates::place_id)
                        .load(conn)
                        .await?;
                    let selections: Vec<Uuid> = project_selections::table
                        .filter(project_selections::project_id.eq(id))
                        .select(project_selections::place_id)
                        .load(conn)
                        .await?;
                    let votes: Vec<(Uuid, Uuid)> = project_candidate_votes::table
                        .filter(project_candidate_votes::project_id.eq(id))
                        .select((
                            project_candidate_votes::place_id,
                            project_candidate_votes::user_id,
                        ))
                        .load(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>((regions, saved, candidates, selections, votes))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let (regions, saved, candidates, selections, votes) = loaded;
        let saved = saved
            .into_iter()
            .map(|(entry, place)| {
                Ok(SavedPlace {
                    user_id: UserId::from_uuid(entry.user_id),
                    place: row_to_place(place).map_err(PlanRepositoryError::query)?,
                    saved_at: entry.saved_at,
                })
            })
            .collect::<Result<Vec<_>, PlanRepositoryError>>()?;
        Ok(PoolSnapshot {
            regions: regions
                .iter()
                .filter_map(|name| Prefecture::new(name).ok())
                .collect(),
            saved,
            candidates: candidates.into_iter().map(PlaceId::from_uuid).collect(),
            selections: selections.into_iter().map(PlaceId::from_uuid).collect(),
            votes: votes
                .into_iter()
                .map(|(place_id, user_id)| Vote {
                    place_id: PlaceId::from_uuid(place_id),
                    user_id: UserId::from_uuid(user_id),
                })
                .collect(),
        })
    }

    async fn add_candidate(
        &self,
        project_id: &ProjectId,
        place_id: &PlaceId,
        added_by: &UserId,
        added_at: DateTime<Utc>,
    ) -> Result<bool, PlanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewCandidateRow {
            project_id: *project_id.as_uuid(),
            place_id: *place_id.as_uuid(),
            added_by: *added_by.as_uuid(),
            added_at,
        };
        let result = conn
            .transaction(|conn| {
                async move {
                    if !place_exists(conn, row.place_id).await? {
                        return Err(TxError::Rule(PlanRepositoryError::unknown_place(
                            row.place_id.to_string(),
                        )));
                    }
                    if is_selected(conn, row.project_id, row.place_id).await? {
                        return Err(TxError::Rule(PlanRepositoryError::already_selected(
                            row.place_id.to_string(),
                        )));
                    }
                    let inserted = diesel::insert_into(project_candidates::table)
                        .values(&row)
                        .on_conflict_do_nothing()
                        .execute(conn)
                        .await?;
                    if inserted > 0 {
                        diesel::update(projects::table.find(row.project_id))
                            .set(projects::updated_at.eq(row.added_at))
                            .execute(conn)
                            .await?;
                    }
                    Ok(inserted > 0)
                }
                .scope_boxed()
            })
            .await;
        result.map_err(PlanRepositoryError::from)
    }

    async fn remove_candidate(
        &self,
        project_id: &ProjectId,
        place_id: &PlaceId,
        also_unselect: bool,
    ) -> Result<CandidateRemoval, PlanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let key = (*project_id.as_uuid(), *place_id.as_uuid());
        conn.transaction(|conn| {
            async move {
                let candidates = diesel::delete(project_candidates::table.find(key))
                    .execute(conn)
                    .await?;
                let selections = if also_unselect {
                    diesel::delete(project_selections::table.find(key))
                        .execute(conn)
                        .await?
                } else {
                    0
                };
                Ok(CandidateRemoval {
                    candidate_removed: candidates > 0,
                    selection_removed: selections > 0,
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn add_vote(
        &self,
        project_id: &ProjectId,
        place_id: &PlaceId,
        user_id: &UserId,
    ) -> Result<(), PlanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(project_candidate_votes::table)
            .values((
                project_candidate_votes::project_id.eq(project_id.as_uuid()),
                project_candidate_votes::place_id.eq(place_id.as_uuid()),
                project_candidate_votes::user_id.eq(user_id.as_uuid()),
            ))
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    PlanRepositoryError::unknown_place(place_id.to_string())
                } else {
                    map_diesel_error(err)
                }
            })?;
        Ok(())
    }

    async fn remove_vote(
        &self,
        project_id: &ProjectId,
        place_id: &PlaceId,
        user_id: &UserId,
    ) -> Result<(), PlanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(project_candidate_votes::table.find((
            project_id.as_uuid(),
            place_id.as_uuid(),
            user_id.as_uuid(),
        )))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn tally(
        &self,
        project_id: &ProjectId,
        place_id: &PlaceId,
        user_id: &UserId,
    ) -> Result<(u32, bool), PlanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let voters: Vec<Uuid> = project_candidate_votes::table
            .filter(project_candidate_votes::project_id.eq(project_id.as_uuid()))
            .filter(project_candidate_votes::place_id.eq(place_id.as_uuid()))
            .select(project_candidate_votes::user_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let mine = voters.contains(user_id.as_uuid());
        Ok((u32::try_from(voters.len()).unwrap_or(u32::MAX), mine))
    }

    async fn confirm(
        &self,
        project_id: &ProjectId,
        placements: &[SelectionPlacement],
        now: DateTime<Utc>,
    ) -> Result<(), PlanRepositoryError> {
        if placements.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *project_id.as_uuid();
        let requested: Vec<Uuid> = placements.iter().map(|p| *p.place_id.as_uuid()).collect();
        let result = conn
            .transaction(|conn| {
                async move {
                    let candidates: Vec<Uuid> = project_candidates::table
                        .filter(project_candidates::project_id.eq(id))
                        .filter(project_candidates::place_id.eq_any(&requested))
                        .select(project_candidates::place_id)
                        .load(conn)
                        .await?;
                    let selected: Vec<Uuid> = project_selections::table
                        .filter(project_selections::project_id.eq(id))
                        .filter(project_selections::place_id.eq_any(&requested))
                        .select(project_selections::place_id)
                        .load(conn)
                        .await?;
                    let known: HashSet<Uuid> = candidates.into_iter().chain(selected).collect();
                    let missing: Vec<String> = requested
                        .iter()
                        .filter(|place_id| !known.contains(*place_id))
                        .map(ToString::to_string)
                        .collect();
                    if !missing.is_empty() {
                        return Err(TxError::Rule(PlanRepositoryError::not_candidates(missing)));
                    }

                    diesel::delete(
                        project_candidates::table
                            .filter(project_candidates::project_id.eq(id))
                            .filter(project_candidates::place_id.eq_any(&requested)),
                    )
                    .execute(conn)
                    .await?;

                    let rows = placements
                        .iter()
                        .map(|placement| {
                            Ok(NewSelectionRow {
                                project_id: id,
                                place_id: *placement.place_id.as_uuid(),
                                day_index: to_db_int(placement.day_index)?,
                                order_in_day: to_db_int(placement.order_in_day)?,
                                note: placement.note.as_ref().map(Note::as_str),
                                updated_at: now,
                            })
                        })
                        .collect::<Result<Vec<_>, TxError>>()?;
                    diesel::insert_into(project_selections::table)
                        .values(&rows)
                        .on_conflict((project_selections::project_id, project_selections::place_id))
                        .do_update()
                        .set((
                            project_selections::day_index
                                .eq(excluded(project_selections::day_index)),
                            project_selections::order_in_day
                                .eq(excluded(project_selections::order_in_day)),
                            project_selections::note.eq(excluded(project_selections::note)),
                            project_selections::updated_at
                                .eq(excluded(project_selections::updated_at)),
                        ))
                        .execute(conn)
                        .await?;
                    diesel::update(projects::table.find(id))
                        .set(projects::updated_at.eq(now))
                        .execute(conn)
                        .await?;
                    Ok(())
                }
                .scope_boxed()
            })
            .await;
        result.map_err(PlanRepositoryError::from)
    }

    async fn unconfirm(
        &self,
        project_id: &ProjectId,
        place_id: &PlaceId,
    ) -> Result<bool, PlanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            project_selections::table.find((project_id.as_uuid(), place_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn selections(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Selection>, PlanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(SelectionRow, PlaceRow)> = project_selections::table
            .inner_join(places::table)
            .filter(project_selections::project_id.eq(project_id.as_uuid()))
            .order_by((
                project_selections::day_index,
                project_selections::order_in_day,
                places::name,
            ))
            .select((SelectionRow::as_select(), PlaceRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(to_selection).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn rule_errors_pass_through_transactions() {
        let err: PlanRepositoryError =
            TxError::Rule(PlanRepositoryError::already_selected("p1")).into();
        assert!(matches!(err, PlanRepositoryError::AlreadySelected { .. }));
    }

    #[rstest]
    fn database_errors_map_to_query_errors() {
        let err: PlanRepositoryError = TxError::from(diesel::result::Error::NotFound).into();
        assert!(matches!(err, PlanRepositoryError::Query { .. }));
    }

    #[rstest]
    fn placement_indices_fit_database_integers() {
        assert!(matches!(to_db_int(365), Ok(365)));
        assert!(to_db_int(u32::MAX).is_err());
    }

    #[rstest]
    fn negative_stored_indices_clamp_to_zero() {
        let place = PlaceRow {
            id: Uuid::nil(),
            external_place_id: "ChIJ".to_owned(),
            name: "Fushimi Inari".to_owned(),
            address: None,
            lat: None,
            lng: None,
            rating: None,
            photo_reference: None,
            image_key: None,
            region: None,
        };
        let row = SelectionRow {
            day_index: -3,
            order_in_day: 2,
            note: Some("sunrise".to_owned()),
        };
        let selection = to_selection((row, place)).expect("valid row");
        assert_eq!((selection.day_index, selection.order_in_day), (0, 2));
        assert_eq!(selection.note.as_ref().map(Note::as_str), Some("sunrise"));
    }
}
