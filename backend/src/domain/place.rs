//! Places of interest shared across users and projects.
//!
//! A place is deduplicated by the identifier issued by the external Places
//! API, so the first user to save it creates the row and later saves update
//! its descriptive fields.

use serde::{Deserialize, Serialize};

use super::{PlaceId, Prefecture};

/// Maximum length of a place name.
pub const PLACE_NAME_MAX: usize = 200;
/// Maximum length of a formatted address.
pub const PLACE_ADDRESS_MAX: usize = 500;

/// Validation errors for place drafts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaceValidationError {
    #[error("external place id must not be empty")]
    EmptyExternalId,
    #[error("place name must be between 1 and {max} characters")]
    NameLength { max: usize },
    #[error("address must be at most {max} characters")]
    AddressTooLong { max: usize },
    #[error("latitude must be within [-90, 90] and longitude within [-180, 180]")]
    CoordinatesOutOfRange,
    #[error("rating must be within [0, 5]")]
    RatingOutOfRange,
}

/// Identifier issued by the external Places API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExternalPlaceId(String);

impl ExternalPlaceId {
    /// Validate and construct an external place identifier.
    pub fn new(raw: impl Into<String>) -> Result<Self, PlaceValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PlaceValidationError::EmptyExternalId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ExternalPlaceId> for String {
    fn from(value: ExternalPlaceId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ExternalPlaceId {
    type Error = PlaceValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    lat: f64,
    lng: f64,
}

impl Coordinates {
    /// Validate a latitude/longitude pair.
    pub fn new(lat: f64, lng: f64) -> Result<Self, PlaceValidationError> {
        if !lat.is_finite()
            || !lng.is_finite()
            || !(-90.0..=90.0).contains(&lat)
            || !(-180.0..=180.0).contains(&lng)
        {
            return Err(PlaceValidationError::CoordinatesOutOfRange);
        }
        Ok(Self { lat, lng })
    }

    /// Latitude in degrees.
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub const fn lng(&self) -> f64 {
        self.lng
    }
}

/// Descriptive fields of a place before it has been persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceDraft {
    pub external_id: ExternalPlaceId,
    pub name: String,
    pub address: Option<String>,
    pub location: Option<Coordinates>,
    pub rating: Option<f64>,
    pub photo_reference: Option<String>,
    /// Object-storage key of a cached image.
    pub image_key: Option<String>,
    pub region: Option<Prefecture>,
}

impl PlaceDraft {
    /// Start a draft with the mandatory fields.
    pub fn new(external_id: ExternalPlaceId, name: impl Into<String>) -> Self {
        Self {
            external_id,
            name: name.into(),
            address: None,
            location: None,
            rating: None,
            photo_reference: None,
            image_key: None,
            region: None,
        }
    }

    /// Validate field lengths and ranges and fill in the region from the
    /// address when it was not supplied.
    ///
    /// # Examples
    /// ```
    /// use tripboard::domain::{ExternalPlaceId, PlaceDraft};
    ///
    /// let mut draft = PlaceDraft::new(ExternalPlaceId::new("abc").expect("id"), "Tokyo Tower");
    /// draft.address = Some("東京都港区芝公園4丁目2-8".to_owned());
    /// let draft = draft.normalised().expect("valid draft");
    /// assert_eq!(draft.region.map(|r| r.as_str()), Some("東京都"));
    /// ```
    pub fn normalised(mut self) -> Result<Self, PlaceValidationError> {
        let name = self.name.trim();
        let name_length = name.chars().count();
        if name_length == 0 || name_length > PLACE_NAME_MAX {
            return Err(PlaceValidationError::NameLength {
                max: PLACE_NAME_MAX,
            });
        }
        self.name = name.to_owned();
        if let Some(address) = self.address.as_deref()
            && address.chars().count() > PLACE_ADDRESS_MAX
        {
            return Err(PlaceValidationError::AddressTooLong {
                max: PLACE_ADDRESS_MAX,
            });
        }
        if let Some(rating) = self.rating
            && (!rating.is_finite() || !(0.0..=5.0).contains(&rating))
        {
            return Err(PlaceValidationError::RatingOutOfRange);
        }
        if self.region.is_none() {
            self.region = self.address.as_deref().and_then(Prefecture::from_address);
        }
        Ok(self)
    }
}

/// Persisted place.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub id: PlaceId,
    pub external_id: ExternalPlaceId,
    pub name: String,
    pub address: Option<String>,
    pub location: Option<Coordinates>,
    pub rating: Option<f64>,
    pub photo_reference: Option<String>,
    pub image_key: Option<String>,
    pub region: Option<Prefecture>,
}

impl Place {
    /// Materialise a draft under the given identifier.
    pub fn from_draft(id: PlaceId, draft: PlaceDraft) -> Self {
        let PlaceDraft {
            external_id,
            name,
            address,
            location,
            rating,
            photo_reference,
            image_key,
            region,
        } = draft;
        Self {
            id,
            external_id,
            name,
            address,
            location,
            rating,
            photo_reference,
            image_key,
            region,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn draft(name: &str) -> PlaceDraft {
        PlaceDraft::new(ExternalPlaceId::new("ChIJ123").expect("id"), name)
    }

    #[rstest]
    fn explicit_region_wins_over_address() {
        let mut value = draft("Osaka Castle");
        value.address = Some("東京都千代田区".to_owned());
        value.region = Some(Prefecture::new("大阪府").expect("prefecture"));
        let normalised = value.normalised().expect("valid");
        assert_eq!(normalised.region.map(|r| r.as_str()), Some("大阪府"));
    }

    #[rstest]
    fn region_stays_empty_without_recognisable_address() {
        let mut value = draft("Somewhere");
        value.address = Some("Main Street 1".to_owned());
        assert!(value.normalised().expect("valid").region.is_none());
    }

    #[rstest]
    #[case("   ")]
    #[case("")]
    fn blank_names_are_rejected(#[case] name: &str) {
        assert_eq!(
            draft(name).normalised().expect_err("blank name"),
            PlaceValidationError::NameLength {
                max: PLACE_NAME_MAX
            }
        );
    }

    #[rstest]
    #[case(5.5)]
    #[case(-0.1)]
    #[case(f64::NAN)]
    fn out_of_range_ratings_are_rejected(#[case] rating: f64) {
        let mut value = draft("Cafe");
        value.rating = Some(rating);
        assert_eq!(
            value.normalised().expect_err("bad rating"),
            PlaceValidationError::RatingOutOfRange
        );
    }

    #[rstest]
    #[case(91.0, 0.0)]
    #[case(0.0, 181.0)]
    #[case(f64::INFINITY, 0.0)]
    fn coordinates_validate_ranges(#[case] lat: f64, #[case] lng: f64) {
        assert!(Coordinates::new(lat, lng).is_err());
    }

    #[rstest]
    fn external_id_is_trimmed() {
        assert_eq!(
            ExternalPlaceId::new("  abc ").expect("id").as_str(),
            "abc"
        );
    }
}
