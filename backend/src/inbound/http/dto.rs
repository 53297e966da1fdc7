//! Response bodies shared by several handler modules.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Place, UserSummary};

/// Public place summary embedded in wishlist, candidate, and selection rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub external_id: String,
    pub name: String,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub rating: Option<f64>,
    pub photo_reference: Option<String>,
    pub image_key: Option<String>,
    #[schema(example = "東京都")]
    pub region: Option<String>,
}

impl From<Place> for PlaceBody {
    fn from(place: Place) -> Self {
        Self {
            id: place.id.to_string(),
            external_id: place.external_id.into(),
            name: place.name,
            address: place.address,
            lat: place.location.map(|location| location.lat()),
            lng: place.location.map(|location| location.lng()),
            rating: place.rating,
            photo_reference: place.photo_reference,
            image_key: place.image_key,
            region: place.region.map(String::from),
        }
    }
}

/// Another user as shown in friend lists and member lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub email: String,
    pub handle: Option<String>,
    pub avatar_key: Option<String>,
}

impl From<UserSummary> for UserSummaryBody {
    fn from(user: UserSummary) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.into(),
            handle: user.handle.map(String::from),
            avatar_key: user.avatar_key,
        }
    }
}
