//! Session cookie settings read from the environment.
//!
//! Debug builds fall back to defaults with a warning; release builds insist
//! on every toggle being present and valid so a misconfigured deployment
//! fails at start-up instead of issuing weak cookies.

use std::path::PathBuf;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use zeroize::Zeroize;

const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
const TTL_HOURS_ENV: &str = "SESSION_TTL_HOURS";

const KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const KEY_MIN_LEN: usize = 64;
const TTL_HOURS_DEFAULT: u64 = 24 * 14;
const TTL_HOURS_MAX: u64 = 24 * 90;

const BOOL_EXPECTED: &str = "1|0|true|false|yes|no";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";
const TTL_EXPECTED: &str = "hours between 1 and 2160";

/// How strictly to validate the environment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    /// Match the mode to `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Validated cookie session settings.
pub struct SessionSettings {
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
    /// Lifetime of a session cookie.
    pub ttl: Duration,
}

#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// One environment toggle with its debug-build fallback.
struct Toggle<T> {
    name: &'static str,
    expected: &'static str,
    fallback: T,
}

impl<T: Copy> Toggle<T> {
    fn read<E: Env>(
        &self,
        env: &E,
        mode: BuildMode,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<T, SessionConfigError> {
        let name = self.name;
        match env.string(name) {
            Some(value) => match parse(value.trim()) {
                Some(parsed) => Ok(parsed),
                None if mode == BuildMode::Debug => {
                    warn!(variable = name, value = %value, "invalid session setting; using default");
                    Ok(self.fallback)
                }
                None => Err(SessionConfigError::InvalidEnv {
                    name,
                    value,
                    expected: self.expected,
                }),
            },
            None if mode == BuildMode::Debug => {
                warn!(variable = name, "session setting not set; using default");
                Ok(self.fallback)
            }
            None => Err(SessionConfigError::MissingEnv { name }),
        }
    }
}

/// Read and validate session settings.
///
/// # Examples
/// ```
/// use mockable::MockEnv;
/// use tripboard::inbound::http::session_config::{BuildMode, session_settings_from_env};
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
/// let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
/// assert!(settings.cookie_secure);
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = Toggle {
        name: COOKIE_SECURE_ENV,
        expected: BOOL_EXPECTED,
        fallback: true,
    }
    .read(env, mode, parse_bool)?;

    let same_site = Toggle {
        name: SAMESITE_ENV,
        expected: SAMESITE_EXPECTED,
        fallback: match mode {
            BuildMode::Debug => SameSite::Lax,
            BuildMode::Release => SameSite::Strict,
        },
    }
    .read(env, mode, parse_same_site)?;
    if same_site == SameSite::None && !cookie_secure {
        if mode == BuildMode::Release {
            return Err(SessionConfigError::InsecureSameSiteNone);
        }
        warn!("SESSION_SAMESITE=None without secure cookies; browsers may drop the session");
    }

    let allow_ephemeral = Toggle {
        name: ALLOW_EPHEMERAL_ENV,
        expected: BOOL_EXPECTED,
        fallback: false,
    }
    .read(env, mode, parse_bool)?;
    if allow_ephemeral && mode == BuildMode::Release {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }

    // Optional in every build mode.
    let ttl_hours = match env.string(TTL_HOURS_ENV) {
        Some(_) => Toggle {
            name: TTL_HOURS_ENV,
            expected: TTL_EXPECTED,
            fallback: TTL_HOURS_DEFAULT,
        }
        .read(env, mode, parse_ttl_hours)?,
        None => TTL_HOURS_DEFAULT,
    };

    let key = session_key(env, mode, allow_ephemeral)?;
    info!(fingerprint = %key_fingerprint(&key), "session key loaded");

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
        ttl: Duration::from_secs(ttl_hours * 3600),
    })
}

fn session_key<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| KEY_DEFAULT_PATH.to_owned()),
    );
    let mut bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(source) if mode == BuildMode::Debug || allow_ephemeral => {
            warn!(path = %path.display(), error = %source, "using temporary session key (dev only)");
            return Ok(Key::generate());
        }
        Err(source) => return Err(SessionConfigError::KeyRead { path, source }),
    };
    let length = bytes.len();
    if mode == BuildMode::Release && length < KEY_MIN_LEN {
        bytes.zeroize();
        return Err(SessionConfigError::KeyTooShort {
            path,
            length,
            min_len: KEY_MIN_LEN,
        });
    }
    let key = Key::derive_from(&bytes);
    bytes.zeroize();
    Ok(key)
}

/// Short hex digest of the signing key, safe to log.
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..8])
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.to_ascii_lowercase().as_str() {
        "lax" => Some(SameSite::Lax),
        "strict" => Some(SameSite::Strict),
        "none" => Some(SameSite::None),
        _ => None,
    }
}

fn parse_ttl_hours(value: &str) -> Option<u64> {
    value
        .parse::<u64>()
        .ok()
        .filter(|hours| (1..=TTL_HOURS_MAX).contains(hours))
}

#[cfg(test)]
mod tests;
