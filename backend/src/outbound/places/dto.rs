//! DTOs for decoding Places text search responses.
//!
//! Responses decode into these transport shapes first and are mapped into
//! domain suggestions in one pass. Hits without an id or a display name are
//! dropped rather than failing the whole search.

use serde::{Deserialize, Serialize};

use crate::domain::PlaceSuggestion;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TextSearchRequestDto<'a> {
    pub(super) text_query: &'a str,
    pub(super) language_code: &'a str,
    pub(super) region_code: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct TextSearchResponseDto {
    #[serde(default)]
    pub(super) places: Vec<PlaceDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PlaceDto {
    pub(super) id: Option<String>,
    pub(super) display_name: Option<LocalizedTextDto>,
    pub(super) formatted_address: Option<String>,
    pub(super) location: Option<LatLngDto>,
    pub(super) rating: Option<f64>,
    #[serde(default)]
    pub(super) photos: Vec<PhotoDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LocalizedTextDto {
    pub(super) text: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct LatLngDto {
    pub(super) latitude: f64,
    pub(super) longitude: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct PhotoDto {
    pub(super) name: String,
}

impl TextSearchResponseDto {
    pub(super) fn into_suggestions(self) -> Vec<PlaceSuggestion> {
        self.places
            .into_iter()
            .filter_map(PlaceDto::into_suggestion)
            .collect()
    }
}

impl PlaceDto {
    fn into_suggestion(self) -> Option<PlaceSuggestion> {
        let external_id = self.id.filter(|id| !id.trim().is_empty())?;
        let name = self.display_name.map(|n| n.text).filter(|n| !n.is_empty())?;
        let (lat, lng) = self
            .location
            .filter(|loc| loc.latitude.is_finite() && loc.longitude.is_finite())
            .map_or((None, None), |loc| (Some(loc.latitude), Some(loc.longitude)));
        Some(PlaceSuggestion {
            external_id,
            name,
            address: self.formatted_address,
            lat,
            lng,
            rating: self.rating,
            photo_reference: self.photos.into_iter().next().map(|photo| photo.name),
        })
    }
}
