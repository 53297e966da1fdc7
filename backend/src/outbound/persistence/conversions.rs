//! Row-to-domain conversions shared by several repositories.
//!
//! Stored values are re-validated on the way out; a row that no longer
//! satisfies the domain rules surfaces as a query error message.

use crate::domain::{
    Bio, Coordinates, Email, ExternalPlaceId, ExternalSubject, Handle, Note, Place, PlaceId,
    Prefecture, User, UserId, UserSummary,
};

use super::models::{PlaceRow, UserRow};

pub(super) fn row_to_user(row: UserRow) -> Result<User, String> {
    let invalid = |field: &str, err: &dyn std::fmt::Display| {
        format!("stored user {} has invalid {field}: {err}", row.id)
    };
    let external_subject =
        ExternalSubject::new(row.external_id.clone()).map_err(|err| invalid("subject", &err))?;
    let email = Email::new(&row.email).map_err(|err| invalid("email", &err))?;
    let handle = row
        .handle
        .clone()
        .map(Handle::new)
        .transpose()
        .map_err(|err| invalid("handle", &err))?;
    let bio = row
        .bio
        .clone()
        .map(Bio::new)
        .transpose()
        .map_err(|err| invalid("bio", &err))?;
    Ok(User {
        id: UserId::from_uuid(row.id),
        external_subject,
        email,
        handle,
        bio,
        avatar_key: row.avatar_key,
    })
}

pub(super) fn row_to_summary(row: UserRow) -> Result<UserSummary, String> {
    row_to_user(row).map(|user| user.summary())
}

pub(super) fn row_to_place(row: PlaceRow) -> Result<Place, String> {
    let external_id = ExternalPlaceId::new(row.external_place_id)
        .map_err(|err| format!("stored place {} has invalid external id: {err}", row.id))?;
    let location = match (row.lat, row.lng) {
        (Some(lat), Some(lng)) => Some(
            Coordinates::new(lat, lng)
                .map_err(|err| format!("stored place {} has invalid location: {err}", row.id))?,
        ),
        _ => None,
    };
    let region = row.region.as_deref().and_then(|name| {
        Prefecture::new(name)
            .inspect_err(|_| {
                tracing::warn!(place_id = %row.id, region = name, "ignoring unknown stored region");
            })
            .ok()
    });
    Ok(Place {
        id: PlaceId::from_uuid(row.id),
        external_id,
        name: row.name,
        address: row.address,
        location,
        rating: row.rating,
        photo_reference: row.photo_reference,
        image_key: row.image_key,
        region,
    })
}

pub(super) fn stored_note(raw: Option<String>) -> Result<Option<Note>, String> {
    raw.map(Note::new)
        .transpose()
        .map_err(|err| format!("stored note is invalid: {err}"))
}
