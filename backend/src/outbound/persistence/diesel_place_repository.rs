//! PostgreSQL-backed `PlaceRepository` using Diesel ORM.
//!
//! Places are deduplicated on `external_place_id`; saving a known place
//! refreshes its stored details.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{PlaceRepository, PlaceRepositoryError};
use crate::domain::{Place, PlaceDraft, PlaceId};

use super::conversions::row_to_place;
use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewPlaceRow, PlaceRow};
use super::pool::{DbPool, PoolError};
use super::schema::places;

/// Diesel-backed implementation of the `PlaceRepository` port.
#[derive(Clone)]
pub struct DieselPlaceRepository {
    pool: DbPool,
}

impl DieselPlaceRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PlaceRepositoryError {
    map_basic_pool_error(error, PlaceRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PlaceRepositoryError {
    map_basic_diesel_error(
        error,
        PlaceRepositoryError::query,
        PlaceRepositoryError::connection,
    )
}

pub(super) fn new_place_row(id: Uuid, draft: &PlaceDraft) -> NewPlaceRow<'_> {
    NewPlaceRow {
        id,
        external_place_id: draft.external_id.as_str(),
        name: draft.name.as_str(),
        address: draft.address.as_deref(),
        lat: draft.location.map(|c| c.lat()),
        lng: draft.location.map(|c| c.lng()),
        rating: draft.rating,
        photo_reference: draft.photo_reference.as_deref(),
        image_key: draft.image_key.as_deref(),
        region: draft.region.map(|r| r.as_str()),
    }
}

#[async_trait]
impl PlaceRepository for DieselPlaceRepository {
    async fn upsert(&self, draft: &PlaceDraft) -> Result<Place, PlaceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = new_place_row(Uuid::new_v4(), draft);
        let stored = diesel::insert_into(places::table)
            .values(&row)
            .on_conflict(places::external_place_id)
            .do_update()
            .set(&row)
            .returning(PlaceRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_place(stored).map_err(PlaceRepositoryError::query)
    }

    async fn find_by_id(&self, id: &PlaceId) -> Result<Option<Place>, PlaceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        places::table
            .find(id.as_uuid())
            .select(PlaceRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(|row| row_to_place(row).map_err(PlaceRepositoryError::query))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, ExternalPlaceId};
    use rstest::rstest;

    #[rstest]
    fn draft_maps_onto_insert_row() {
        let mut draft = PlaceDraft::new(ExternalPlaceId::new("ChIJ").expect("id"), "Kiyomizu-dera");
        draft.address = Some("京都府京都市東山区清水1丁目".to_owned());
        draft.location = Some(Coordinates::new(34.99, 135.78).expect("coordinates"));
        let draft = draft.normalised().expect("valid");

        let row = new_place_row(Uuid::nil(), &draft);
        assert_eq!(row.external_place_id, "ChIJ");
        assert_eq!(row.region, Some("京都府"));
        assert_eq!(row.lat, Some(34.99));
        assert_eq!(row.photo_reference, None);
    }

    #[rstest]
    fn stored_row_round_trips_region() {
        let row = PlaceRow {
            id: Uuid::nil(),
            external_place_id: "ChIJ".to_owned(),
            name: "Kiyomizu-dera".to_owned(),
            address: None,
            lat: Some(34.99),
            lng: None,
            rating: Some(4.6),
            photo_reference: None,
            image_key: None,
            region: Some("京都府".to_owned()),
        };
        let place = row_to_place(row).expect("valid row");
        assert_eq!(place.region.map(|r| r.as_str()), Some("京都府"));
        assert!(place.location.is_none(), "half a coordinate pair is dropped");
    }
}
