//! Application settings and the HTTP server configuration object.
//!
//! [`AppSettings`] is loaded with OrthoConfig, so every value can come from a
//! `TRIPBOARD_*` environment variable, a CLI flag, or a config file. Optional
//! collaborators (Redis, SMTP) are disabled when their settings are absent.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use tripboard::inbound::http::session_config::SessionSettings;
use tripboard::outbound::identity::JwtIdentityConfig;
use tripboard::outbound::mail::SmtpMailerConfig;
use tripboard::outbound::places::PlacesHttpConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_SEARCH_CACHE_TTL_SECS: u64 = 60 * 60 * 24;
const DEFAULT_PLACES_ENDPOINT: &str = "https://places.googleapis.com/v1/places:searchText";
const DEFAULT_PLACES_TIMEOUT_SECS: u64 = 5;
const DEFAULT_PLACES_LANGUAGE: &str = "ja";
const DEFAULT_PLACES_REGION: &str = "JP";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";

/// Errors raised when settings are missing or malformed.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("missing required setting: {name}")]
    Missing { name: &'static str },
    #[error("invalid value for {name}='{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, SettingsError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(SettingsError::Missing { name })
}

fn parse_url(raw: &str, name: &'static str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|err| SettingsError::Invalid {
        name,
        value: raw.to_owned(),
        reason: err.to_string(),
    })
}

/// Runtime settings for the server binary.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TRIPBOARD")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Maximum database connections.
    pub db_pool_size: Option<u32>,
    /// Redis URL for the search cache; search results are not cached without it.
    pub redis_url: Option<String>,
    /// Lifetime of cached search results, in seconds.
    pub search_cache_ttl_secs: Option<u64>,
    /// Places text search endpoint.
    pub places_endpoint: Option<String>,
    pub places_api_key: Option<String>,
    pub places_timeout_secs: Option<u64>,
    pub places_language: Option<String>,
    pub places_region: Option<String>,
    /// SMTP relay host; invite mail is logged and skipped without it.
    pub smtp_relay: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// `From` mailbox for invite mail.
    pub smtp_from: Option<String>,
    /// Public origin used to build invite links.
    pub public_base_url: Option<String>,
    /// HMAC secret shared with the identity provider.
    pub jwt_secret: Option<String>,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("bind_addr", &self.bind_addr)
            .field("db_pool_size", &self.db_pool_size)
            .field("redis_configured", &self.redis_url.is_some())
            .field("search_cache_ttl_secs", &self.search_cache_ttl_secs)
            .field("places_endpoint", &self.places_endpoint)
            .field("smtp_relay", &self.smtp_relay)
            .field("public_base_url", &self.public_base_url)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .finish_non_exhaustive()
    }
}

impl AppSettings {
    /// Listening address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::Invalid {
            name: "bind_addr",
            value: raw.to_owned(),
            reason: err.to_string(),
        })
    }

    pub fn database_url(&self) -> Result<&str, SettingsError> {
        required(self.database_url.as_deref(), "database_url")
    }

    pub fn db_pool_size(&self) -> u32 {
        self.db_pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    pub fn redis_url(&self) -> Option<&str> {
        self.redis_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn search_cache_ttl(&self) -> Duration {
        Duration::from_secs(
            self.search_cache_ttl_secs
                .unwrap_or(DEFAULT_SEARCH_CACHE_TTL_SECS),
        )
    }

    pub fn places_timeout(&self) -> Duration {
        Duration::from_secs(
            self.places_timeout_secs
                .unwrap_or(DEFAULT_PLACES_TIMEOUT_SECS),
        )
    }

    /// Places adapter settings; the API key is required.
    pub fn places_config(&self) -> Result<PlacesHttpConfig, SettingsError> {
        let endpoint = parse_url(
            self.places_endpoint
                .as_deref()
                .unwrap_or(DEFAULT_PLACES_ENDPOINT),
            "places_endpoint",
        )?;
        let api_key = required(self.places_api_key.as_deref(), "places_api_key")?;
        Ok(PlacesHttpConfig {
            endpoint,
            api_key: Zeroizing::new(api_key.to_owned()),
            language_code: self
                .places_language
                .clone()
                .unwrap_or_else(|| DEFAULT_PLACES_LANGUAGE.to_owned()),
            region_code: self
                .places_region
                .clone()
                .unwrap_or_else(|| DEFAULT_PLACES_REGION.to_owned()),
        })
    }

    /// SMTP settings, or `None` when no relay is configured.
    pub fn smtp_config(&self) -> Result<Option<SmtpMailerConfig>, SettingsError> {
        let Some(relay) = self
            .smtp_relay
            .as_deref()
            .map(str::trim)
            .filter(|relay| !relay.is_empty())
        else {
            return Ok(None);
        };
        let from = required(self.smtp_from.as_deref(), "smtp_from")?;
        Ok(Some(SmtpMailerConfig {
            relay: relay.to_owned(),
            port: self.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
            username: self.smtp_username.clone(),
            password: self.smtp_password.clone().map(Zeroizing::new),
            from: from.to_owned(),
        }))
    }

    /// Origin for invite links, without a trailing slash.
    pub fn public_base_url(&self) -> Result<String, SettingsError> {
        let raw = self
            .public_base_url
            .as_deref()
            .unwrap_or(DEFAULT_PUBLIC_BASE_URL);
        let url = parse_url(raw, "public_base_url")?;
        Ok(url.as_str().trim_end_matches('/').to_owned())
    }

    /// Identity provider verification settings; all three values are required.
    pub fn jwt_config(&self) -> Result<JwtIdentityConfig, SettingsError> {
        Ok(JwtIdentityConfig {
            secret: Zeroizing::new(required(self.jwt_secret.as_deref(), "jwt_secret")?.to_owned()),
            issuer: required(self.jwt_issuer.as_deref(), "jwt_issuer")?.to_owned(),
            audience: required(self.jwt_audience.as_deref(), "jwt_audience")?.to_owned(),
        })
    }
}

/// Session and socket settings for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) session_ttl: CookieDuration,
    pub(crate) bind_addr: SocketAddr,
}

impl ServerConfig {
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
            ttl,
        } = session;
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Self {
            key,
            cookie_secure,
            same_site,
            session_ttl: CookieDuration::seconds(ttl_secs),
            bind_addr,
        }
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "TRIPBOARD_BIND_ADDR",
        "TRIPBOARD_DATABASE_URL",
        "TRIPBOARD_REDIS_URL",
        "TRIPBOARD_SMTP_RELAY",
        "TRIPBOARD_SMTP_FROM",
        "TRIPBOARD_PUBLIC_BASE_URL",
        "TRIPBOARD_JWT_SECRET",
        "TRIPBOARD_PLACES_API_KEY",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("tripboard")]).expect("config should load")
    }

    /// Every known variable, unset unless listed in `overrides`.
    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("socket address")
        );
        assert_eq!(settings.db_pool_size(), DEFAULT_POOL_SIZE);
        assert!(settings.redis_url().is_none());
        assert!(settings.smtp_config().expect("smtp settings").is_none());
        assert_eq!(
            settings.public_base_url().expect("base url"),
            "http://localhost:8080"
        );
        assert!(matches!(
            settings.database_url(),
            Err(SettingsError::Missing { name: "database_url" })
        ));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("TRIPBOARD_DATABASE_URL", "postgres://localhost/tripboard"),
            ("TRIPBOARD_SMTP_RELAY", "smtp.example.com"),
            ("TRIPBOARD_SMTP_FROM", "Tripboard <noreply@example.com>"),
            ("TRIPBOARD_PUBLIC_BASE_URL", "https://trips.example.com/"),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.database_url().expect("database url"),
            "postgres://localhost/tripboard"
        );
        let smtp = settings
            .smtp_config()
            .expect("smtp settings")
            .expect("relay configured");
        assert_eq!(smtp.relay, "smtp.example.com");
        assert_eq!(smtp.port, DEFAULT_SMTP_PORT);
        assert_eq!(
            settings.public_base_url().expect("base url"),
            "https://trips.example.com"
        );
    }

    #[rstest]
    fn relay_without_sender_is_rejected() {
        let _guard = lock_env(env_with(&[("TRIPBOARD_SMTP_RELAY", "smtp.example.com")]));

        let settings = load_from_empty_args();
        assert!(matches!(
            settings.smtp_config(),
            Err(SettingsError::Missing { name: "smtp_from" })
        ));
    }

    #[rstest]
    fn malformed_bind_address_is_reported() {
        let _guard = lock_env(env_with(&[("TRIPBOARD_BIND_ADDR", "not-an-address")]));

        let settings = load_from_empty_args();
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::Invalid { name: "bind_addr", .. })
        ));
    }
}
