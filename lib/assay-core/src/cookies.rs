//! In-memory cookie store used when a client enables cookies.

use std::sync::{Mutex, PoisonError};

use cookie::time::OffsetDateTime;
use cookie::{Cookie, CookieJar};

use crate::Headers;

/// Cookie jar shared by every request a client issues.
///
/// Domain and path attributes are not matched: a client talks to one base
/// URL, so every stored cookie is sent back. `Max-Age=0` or an `Expires` in
/// the past removes the cookie.
#[derive(Debug, Default)]
pub struct CookieStore {
    jar: Mutex<CookieJar>,
}

impl Clone for CookieStore {
    fn clone(&self) -> Self {
        Self {
            jar: Mutex::new(self.lock().clone()),
        }
    }
}

impl CookieStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CookieJar> {
        self.jar.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Absorb every `Set-Cookie` header of a response.
    pub fn store_response_cookies(&self, headers: &Headers) {
        let mut jar = self.lock();
        for raw in headers.get_all("Set-Cookie") {
            let Ok(cookie) = Cookie::parse(raw.clone()) else {
                tracing::debug!(header = %raw, "ignoring malformed Set-Cookie header");
                continue;
            };
            if is_expired(&cookie) {
                jar.remove(Cookie::from(cookie.name().to_owned()));
            } else {
                jar.add(cookie);
            }
        }
    }

    /// Value for the `Cookie` request header, names sorted.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        let jar = self.lock();
        let mut pairs: Vec<_> = jar
            .iter()
            .map(|cookie| format!("{}={}", cookie.name(), cookie.value()))
            .collect();
        if pairs.is_empty() {
            return None;
        }
        pairs.sort();
        Some(pairs.join("; "))
    }

    /// Stored value of cookie `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.lock().get(name).map(|cookie| cookie.value().to_owned())
    }

    /// Number of stored cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().iter().count()
    }

    /// Returns `true` if no cookie is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_expired(cookie: &Cookie<'_>) -> bool {
    let max_age_elapsed = cookie
        .max_age()
        .is_some_and(|age| age.is_zero() || age.is_negative());
    let expires_elapsed = cookie
        .expires_datetime()
        .is_some_and(|at| at <= OffsetDateTime::now_utc());
    max_age_elapsed || expires_elapsed
}
