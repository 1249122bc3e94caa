//! Version Resolver: latest published version of an npm package.
//!
//! [`NpmRegistry`] talks to a registry over HTTP and owns its timeout and
//! retry policy. [`FixedVersions`] answers from a map and never touches the
//! network. Lookups for distinct names are independent, so
//! [`resolve_all`] fans them out over scoped threads.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use nodeinit_core::Settings;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    #[error("package '{name}' does not exist in the registry")]
    NotFound { name: String },

    #[error("registry lookup for '{name}' failed after {attempts} attempt(s): {message}")]
    Unreachable {
        name: String,
        attempts: u32,
        message: String,
    },

    #[error("registry answered with an unreadable document for '{name}': {message}")]
    Malformed { name: String, message: String },

    /// No version is known and the resolver is not allowed to look one up.
    #[error("no version pinned for '{name}'")]
    Unpinned { name: String },

    #[error("lookup for '{name}' panicked")]
    Panicked { name: String },
}

/// Looks up the latest version of a dependency.
pub trait VersionResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<String, ResolverError>;
}

impl<R: VersionResolver + ?Sized> VersionResolver for &R {
    fn resolve(&self, name: &str) -> Result<String, ResolverError> {
        (**self).resolve(name)
    }
}

// ---------------------------------------------------------------------------
// 1. npm registry
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LatestDocument {
    version: String,
}

/// `GET <registry>/<name>/latest`.
#[derive(Debug, Clone)]
pub struct NpmRegistry {
    base_url: String,
    retries: u32,
    backoff: Duration,
    agent: ureq::Agent,
}

impl NpmRegistry {
    pub fn new(base_url: impl Into<String>, timeout: Duration, retries: u32) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retries,
            backoff: Duration::from_millis(250),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.registry_url.clone(),
            Duration::from_secs(settings.resolver_timeout_secs),
            settings.resolver_retries,
        )
    }

    /// Override the pause between attempts; it grows linearly per attempt.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn latest_url(&self, name: &str) -> String {
        format!("{}/{}/latest", self.base_url, encode_name(name))
    }
}

/// Scoped names keep their `@` but the separating slash is escaped.
pub fn encode_name(name: &str) -> String {
    match name.strip_prefix('@') {
        Some(scoped) => format!("@{}", scoped.replacen('/', "%2F", 1)),
        None => name.to_string(),
    }
}

impl VersionResolver for NpmRegistry {
    fn resolve(&self, name: &str) -> Result<String, ResolverError> {
        let url = self.latest_url(name);
        let attempts = self.retries + 1;
        let mut last = String::new();

        for attempt in 1..=attempts {
            match self.agent.get(&url).call() {
                Ok(response) => {
                    let doc: LatestDocument =
                        response.into_json().map_err(|e| ResolverError::Malformed {
                            name: name.to_string(),
                            message: e.to_string(),
                        })?;
                    tracing::debug!("resolved {}@{}", name, doc.version);
                    return Ok(doc.version);
                }
                Err(ureq::Error::Status(404, _)) => {
                    return Err(ResolverError::NotFound {
                        name: name.to_string(),
                    })
                }
                Err(e) => {
                    last = e.to_string();
                    if attempt < attempts {
                        tracing::warn!(
                            "lookup of {} failed (attempt {}/{}): {}",
                            name,
                            attempt,
                            attempts,
                            last
                        );
                        thread::sleep(self.backoff * attempt);
                    }
                }
            }
        }

        Err(ResolverError::Unreachable {
            name: name.to_string(),
            attempts,
            message: last,
        })
    }
}

// ---------------------------------------------------------------------------
// 2. Fixed versions
// ---------------------------------------------------------------------------

/// Deterministic resolver backed by a map; unknown names fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedVersions {
    versions: BTreeMap<String, String>,
}

impl FixedVersions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.versions.insert(name.into(), version.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, version: impl Into<String>) {
        self.versions.insert(name.into(), version.into());
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FixedVersions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            versions: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl VersionResolver for FixedVersions {
    fn resolve(&self, name: &str) -> Result<String, ResolverError> {
        self.versions
            .get(name)
            .cloned()
            .ok_or_else(|| ResolverError::Unpinned {
                name: name.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// 3. Recording wrapper
// ---------------------------------------------------------------------------

/// Wraps a resolver and remembers every name it was asked for.
#[derive(Debug, Default)]
pub struct RecordingResolver<R> {
    inner: R,
    calls: Mutex<Vec<String>>,
}

impl<R: VersionResolver> RecordingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Names looked up so far, sorted.
    pub fn calls(&self) -> Vec<String> {
        let mut calls = match self.calls.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        calls.sort();
        calls
    }
}

impl<R: VersionResolver> VersionResolver for RecordingResolver<R> {
    fn resolve(&self, name: &str) -> Result<String, ResolverError> {
        match self.calls.lock() {
            Ok(mut guard) => guard.push(name.to_string()),
            Err(poisoned) => poisoned.into_inner().push(name.to_string()),
        }
        self.inner.resolve(name)
    }
}

// ---------------------------------------------------------------------------
// 4. Fan-out
// ---------------------------------------------------------------------------

/// Resolve every name concurrently.
///
/// All lookups run to completion; the first failure in `names` order is
/// returned.
pub fn resolve_all(
    resolver: &dyn VersionResolver,
    names: &[String],
) -> Result<BTreeMap<String, String>, ResolverError> {
    if names.is_empty() {
        return Ok(BTreeMap::new());
    }

    let results: Vec<(String, Result<String, ResolverError>)> = thread::scope(|s| {
        let handles: Vec<_> = names
            .iter()
            .map(|name| (name, s.spawn(move || resolver.resolve(name))))
            .collect();
        handles
            .into_iter()
            .map(|(name, h)| {
                let result = h.join().unwrap_or_else(|_| {
                    Err(ResolverError::Panicked { name: name.clone() })
                });
                (name.clone(), result)
            })
            .collect()
    });

    let mut resolved = BTreeMap::new();
    for (name, result) in results {
        resolved.insert(name, result?);
    }
    Ok(resolved)
}
