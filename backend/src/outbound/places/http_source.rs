//! Reqwest-backed Places text search adapter.
//!
//! This adapter owns transport details only: request serialisation, timeout
//! and HTTP error mapping, and JSON decoding into domain suggestions.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use zeroize::Zeroizing;

use super::dto::{TextSearchRequestDto, TextSearchResponseDto};
use crate::domain::ports::{PlacesSource, PlacesSourceError};
use crate::domain::{PlaceSuggestion, SearchQuery};

const FIELD_MASK: &str = "places.id,places.displayName,places.formattedAddress,\
places.location,places.rating,places.photos";
const DEFAULT_USER_AGENT: &str = "tripboard-backend/0.1";

/// Endpoint, credentials, and locale for Places requests.
pub struct PlacesHttpConfig {
    /// Text search endpoint URL.
    pub endpoint: Url,
    /// API key sent in the `X-Goog-Api-Key` header.
    pub api_key: Zeroizing<String>,
    /// Language used for display names and addresses.
    pub language_code: String,
    /// Region bias for ranking.
    pub region_code: String,
}

/// Places source adapter issuing one POST per search.
pub struct PlacesHttpSource {
    client: Client,
    config: PlacesHttpConfig,
}

impl PlacesHttpSource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: PlacesHttpConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl PlacesSource for PlacesHttpSource {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<PlaceSuggestion>, PlacesSourceError> {
        let body = TextSearchRequestDto {
            text_query: query.as_str(),
            language_code: self.config.language_code.as_str(),
            region_code: self.config.region_code.as_str(),
        };
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .header("X-Goog-Api-Key", self.config.api_key.as_str())
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, bytes.as_ref()));
        }
        parse_suggestions(bytes.as_ref())
    }
}

fn parse_suggestions(body: &[u8]) -> Result<Vec<PlaceSuggestion>, PlacesSourceError> {
    let decoded: TextSearchResponseDto = serde_json::from_slice(body).map_err(|error| {
        PlacesSourceError::decode(format!("invalid Places JSON payload: {error}"))
    })?;
    Ok(decoded.into_suggestions())
}

fn map_transport_error(error: reqwest::Error) -> PlacesSourceError {
    if error.is_timeout() {
        PlacesSourceError::timeout(error.to_string())
    } else {
        PlacesSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PlacesSourceError {
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            PlacesSourceError::timeout(format!("status {}", status.as_u16()))
        }
        _ => PlacesSourceError::Status {
            status: status.as_u16(),
            message: body_preview(body),
        },
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the non-network decoding and mapping helpers.

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn decodes_hits_in_provider_order() {
        let body = r#"{
            "places": [
                {
                    "id": "ChIJ8cM8zdaoAWARPR27azYdlsA",
                    "displayName": { "text": "伏見稲荷大社", "languageCode": "ja" },
                    "formattedAddress": "日本、〒612-0882 京都府京都市伏見区深草薮之内町68",
                    "location": { "latitude": 34.9671, "longitude": 135.7727 },
                    "rating": 4.6,
                    "photos": [{ "name": "places/ChIJ/photos/AUc7" }]
                },
                { "id": "ChIJ2", "displayName": { "text": "清水寺" } }
            ]
        }"#;

        let hits = parse_suggestions(body.as_bytes()).expect("JSON should decode");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name, "伏見稲荷大社");
        assert_eq!(hits[0].lat, Some(34.9671));
        assert_eq!(hits[0].photo_reference.as_deref(), Some("places/ChIJ/photos/AUc7"));
        assert_eq!(hits[1].address, None);
        assert_eq!(hits[1].lng, None);
    }

    #[rstest]
    fn empty_response_yields_no_hits() {
        assert!(parse_suggestions(b"{}").expect("decodes").is_empty());
    }

    #[rstest]
    fn hits_without_identity_are_dropped() {
        let body = r#"{ "places": [ { "displayName": { "text": "nameless id" } }, { "id": "x" } ] }"#;
        assert!(parse_suggestions(body.as_bytes()).expect("decodes").is_empty());
    }

    #[rstest]
    fn invalid_json_is_a_decode_error() {
        let err = parse_suggestions(b"<html>").expect_err("not JSON");
        assert!(matches!(err, PlacesSourceError::Decode { .. }));
    }

    #[rstest]
    #[case(StatusCode::GATEWAY_TIMEOUT, true)]
    #[case(StatusCode::FORBIDDEN, false)]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, false)]
    fn statuses_map_to_timeout_or_status(#[case] status: StatusCode, #[case] timeout: bool) {
        let err = map_status_error(status, b"{\"error\": {\"message\": \"quota\"}}");
        if timeout {
            assert!(matches!(err, PlacesSourceError::Timeout { .. }));
        } else {
            assert!(
                matches!(err, PlacesSourceError::Status { status: code, .. } if code == status.as_u16())
            );
        }
    }
}
