//! Doubles for the external collaborators: identity provider, mail relay,
//! Places API, and search cache.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::ports::{
    IdentityProvider, IdentityProviderError, InviteMailer, InviteMailerError, PlacesSource,
    PlacesSourceError, SearchCache, SearchCacheError, SearchCacheKey,
};
use crate::domain::{Email, ExternalIdentity, ExternalSubject, InviteEmail, PlaceSuggestion, SearchQuery};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("collaborator mutex poisoned"),
    }
}

/// Identity provider that accepts a fixed set of tokens.
#[derive(Debug, Default)]
pub struct StaticIdentityProvider {
    tokens: Mutex<HashMap<String, ExternalIdentity>>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as proof of `subject`, optionally with an email claim.
    pub fn register(&self, token: &str, subject: &str, email: Option<&str>) {
        let identity = ExternalIdentity {
            subject: ExternalSubject::new(subject).expect("fixture subject"),
            email: email.map(|raw| Email::new(raw).expect("fixture email")),
        };
        lock(&self.tokens).insert(token.to_owned(), identity);
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn verify(&self, token: &str) -> Result<ExternalIdentity, IdentityProviderError> {
        lock(&self.tokens)
            .get(token)
            .cloned()
            .ok_or_else(|| IdentityProviderError::invalid_token("unknown token"))
    }
}

/// Mailer that keeps every message it was asked to send.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<InviteEmail>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail after recording the attempt.
    pub fn fail_deliveries(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<InviteEmail> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl InviteMailer for RecordingMailer {
    async fn send(&self, email: &InviteEmail) -> Result<(), InviteMailerError> {
        lock(&self.sent).push(email.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(InviteMailerError::delivery("relay refused message"));
        }
        Ok(())
    }
}

/// Places source returning canned results and counting calls.
#[derive(Debug, Default)]
pub struct StubPlacesSource {
    results: Mutex<Vec<PlaceSuggestion>>,
    calls: AtomicUsize,
}

impl StubPlacesSource {
    pub fn new(results: Vec<PlaceSuggestion>) -> Self {
        Self {
            results: Mutex::new(results),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlacesSource for StubPlacesSource {
    async fn search(&self, _query: &SearchQuery) -> Result<Vec<PlaceSuggestion>, PlacesSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(lock(&self.results).clone())
    }
}

/// Search cache backed by a map, without expiry.
#[derive(Debug, Default)]
pub struct InMemorySearchCache {
    entries: Mutex<HashMap<String, Vec<PlaceSuggestion>>>,
}

impl InMemorySearchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SearchCache for InMemorySearchCache {
    async fn get(
        &self,
        key: &SearchCacheKey,
    ) -> Result<Option<Vec<PlaceSuggestion>>, SearchCacheError> {
        Ok(lock(&self.entries).get(key.as_str()).cloned())
    }

    async fn put(
        &self,
        key: &SearchCacheKey,
        results: &[PlaceSuggestion],
    ) -> Result<(), SearchCacheError> {
        lock(&self.entries).insert(key.as_str().to_owned(), results.to_vec());
        Ok(())
    }
}
