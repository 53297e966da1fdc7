//! Unit tests for session configuration parsing.

use std::collections::HashMap;
use std::io::Write;

use mockable::MockEnv;
use rstest::{fixture, rstest};
use tempfile::NamedTempFile;

use super::*;

fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

fn key_file(len: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp key file");
    file.write_all(&vec![b'k'; len]).expect("write key");
    file
}

#[fixture]
fn release_key() -> NamedTempFile {
    key_file(KEY_MIN_LEN)
}

fn release_vars(key: &NamedTempFile) -> HashMap<&'static str, String> {
    HashMap::from([
        (KEY_FILE_ENV, key.path().display().to_string()),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ])
}

#[rstest]
fn release_accepts_complete_settings(release_key: NamedTempFile) {
    let env = mock_env(release_vars(&release_key));
    let settings = session_settings_from_env(&env, BuildMode::Release).expect("valid settings");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
    assert_eq!(settings.ttl, Duration::from_secs(TTL_HOURS_DEFAULT * 3600));
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(SAMESITE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_requires_every_toggle(release_key: NamedTempFile, #[case] missing: &'static str) {
    let mut vars = release_vars(&release_key);
    vars.remove(missing);
    let result = session_settings_from_env(&mock_env(vars), BuildMode::Release);
    assert!(matches!(
        result,
        Err(SessionConfigError::MissingEnv { name }) if name == missing
    ));
}

#[rstest]
#[case(COOKIE_SECURE_ENV, "maybe")]
#[case(SAMESITE_ENV, "sometimes")]
#[case(TTL_HOURS_ENV, "0")]
#[case(TTL_HOURS_ENV, "forever")]
fn release_rejects_invalid_values(
    release_key: NamedTempFile,
    #[case] name: &'static str,
    #[case] value: &str,
) {
    let mut vars = release_vars(&release_key);
    vars.insert(name, value.to_owned());
    let result = session_settings_from_env(&mock_env(vars), BuildMode::Release);
    assert!(matches!(
        result,
        Err(SessionConfigError::InvalidEnv { name: reported, .. }) if reported == name
    ));
}

#[rstest]
fn release_rejects_same_site_none_without_secure(release_key: NamedTempFile) {
    let mut vars = release_vars(&release_key);
    vars.insert(SAMESITE_ENV, "None".to_owned());
    vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
    let result = session_settings_from_env(&mock_env(vars), BuildMode::Release);
    assert!(matches!(result, Err(SessionConfigError::InsecureSameSiteNone)));
}

#[rstest]
fn release_rejects_ephemeral_keys(release_key: NamedTempFile) {
    let mut vars = release_vars(&release_key);
    vars.insert(ALLOW_EPHEMERAL_ENV, "1".to_owned());
    let result = session_settings_from_env(&mock_env(vars), BuildMode::Release);
    assert!(matches!(result, Err(SessionConfigError::EphemeralNotAllowed)));
}

#[rstest]
fn release_rejects_short_keys() {
    let short = key_file(KEY_MIN_LEN - 1);
    let result = session_settings_from_env(&mock_env(release_vars(&short)), BuildMode::Release);
    assert!(matches!(
        result,
        Err(SessionConfigError::KeyTooShort { length, .. }) if length == KEY_MIN_LEN - 1
    ));
}

#[rstest]
fn release_fails_when_key_is_unreadable() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut vars = HashMap::from([
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Lax".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ]);
    vars.insert(
        KEY_FILE_ENV,
        dir.path().join("absent").display().to_string(),
    );
    let result = session_settings_from_env(&mock_env(vars), BuildMode::Release);
    assert!(matches!(result, Err(SessionConfigError::KeyRead { .. })));
}

#[rstest]
fn debug_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let vars = HashMap::from([
        (KEY_FILE_ENV, dir.path().join("absent").display().to_string()),
        (COOKIE_SECURE_ENV, "perhaps".to_owned()),
    ]);
    let settings =
        session_settings_from_env(&mock_env(vars), BuildMode::Debug).expect("debug defaults");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn ttl_can_be_shortened(release_key: NamedTempFile) {
    let mut vars = release_vars(&release_key);
    vars.insert(TTL_HOURS_ENV, "12".to_owned());
    let settings =
        session_settings_from_env(&mock_env(vars), BuildMode::Release).expect("valid settings");
    assert_eq!(settings.ttl, Duration::from_secs(12 * 3600));
}

#[rstest]
fn fingerprint_is_stable_and_short() {
    let key = Key::derive_from(&[7_u8; 64]);
    let first = key_fingerprint(&key);
    assert_eq!(first.len(), 16);
    assert_eq!(first, key_fingerprint(&Key::derive_from(&[7_u8; 64])));
}
