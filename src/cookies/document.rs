//! Cookie document abstraction and an in-memory implementation.
//!
//! A **cookie document** is the cookie jar of the current page as scripts see
//! it: one getter returning every visible cookie as `"a=1; b=2"`, and one
//! setter taking a single `Set-Cookie`-style string. Every script on the page
//! shares it, so nothing above this layer caches its contents.
//!
//! This module defines the [`CookieDocument`] trait and a reference
//! implementation, [`InMemoryDocument`], which reproduces the browser rules
//! the gateway relies on.
//!
//! ## Notes & limitations
//! - Entries are keyed by `(name, domain, path)`. A host-only cookie and a
//!   domain cookie with the same name are two different entries.
//! - Setting a cookie whose expiry lies in the past removes the entry.
//! - `Max-Age`, `SameSite`, size limits and eviction are not implemented.
//! - This module is **not** internally synchronized. Use it via a
//!   `CookieDocumentHandle = Arc<RwLock<dyn CookieDocument + Send + Sync>>`.
use std::any::Any;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use time::OffsetDateTime;
use url::Url;

use crate::cookies::Cookie;

/// A handle to a cookie document.
///
/// Obtain a **read lock** for the getter and a **write lock** for the setter.
pub type CookieDocumentHandle = Arc<RwLock<dyn CookieDocument + Send + Sync>>;

/// The `document.cookie` contract.
pub trait CookieDocument: Send + Sync {
    /// Returns a type-erased reference to the document.
    fn as_any(&self) -> &dyn Any;

    /// Returns every visible, unexpired cookie as `name=value` pairs joined by `"; "`.
    fn cookie_string(&self) -> String;

    /// Applies one setter string (`name=value; path=/; expires=...`).
    ///
    /// Like the browser setter this never fails: strings the document refuses
    /// are dropped.
    fn set_cookie_string(&mut self, cookie: &str);
}

/// Takes a read lock on the document, recovering from poisoning.
///
/// The cookie string has no multi-step invariant a panicking writer could
/// have left half-applied.
pub(crate) fn read_document(
    doc: &CookieDocumentHandle,
) -> RwLockReadGuard<'_, dyn CookieDocument + Send + Sync + 'static> {
    doc.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Takes a write lock on the document, recovering from poisoning.
pub(crate) fn write_document(
    doc: &CookieDocumentHandle,
) -> RwLockWriteGuard<'_, dyn CookieDocument + Send + Sync + 'static> {
    doc.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory cookie document for a single page.
///
/// ### Behavior
/// - A `domain` attribute must domain-match the page host, otherwise the
///   string is dropped.
/// - `Secure` cookies are dropped from, and hidden on, non-https pages.
/// - Expired entries are never returned by the getter.
/// - When cookies are disabled every setter call is a no-op.
#[derive(Debug, Clone)]
pub struct InMemoryDocument {
    /// Page the document belongs to.
    url: Url,
    /// Cookies in creation order. Overwrites keep the original position.
    entries: Vec<Cookie>,
    /// Mirrors the browser setting; `false` turns the setter into a no-op.
    cookies_enabled: bool,
}

impl InMemoryDocument {
    /// Creates an empty document for the page at `url`.
    pub fn new(url: Url) -> Self {
        InMemoryDocument {
            url,
            entries: Vec::new(),
            cookies_enabled: true,
        }
    }

    /// Creates a document whose setter ignores everything.
    pub fn with_cookies_disabled(url: Url) -> Self {
        InMemoryDocument {
            cookies_enabled: false,
            ..Self::new(url)
        }
    }

    /// Wraps the document into a shareable handle.
    pub fn into_handle(self) -> CookieDocumentHandle {
        Arc::new(RwLock::new(self))
    }

    /// Live entries, for inspection.
    pub fn entries(&self) -> impl Iterator<Item = &Cookie> {
        let now = OffsetDateTime::now_utc();
        self.entries.iter().filter(move |c| !c.is_expired(now))
    }

    fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    fn is_secure_page(&self) -> bool {
        self.url.scheme() == "https"
    }

    fn domain_matches(&self, domain: &str) -> bool {
        let host = self.host();
        host == domain || host.ends_with(&format!(".{domain}"))
    }
}

impl CookieDocument for InMemoryDocument {
    fn as_any(&self) -> &dyn Any { self }

    fn cookie_string(&self) -> String {
        let secure_page = self.is_secure_page();
        let path = self.url.path();

        self.entries()
            .filter(|c| !c.secure || secure_page)
            .filter(|c| c.path.as_deref().map_or(true, |p| path_matches(path, p)))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn set_cookie_string(&mut self, cookie: &str) {
        if !self.cookies_enabled {
            log::debug!("cookies disabled, dropping {cookie:?}");
            return;
        }

        let Some(mut cookie) = Cookie::parse(cookie) else {
            log::debug!("ignoring malformed cookie string {cookie:?}");
            return;
        };

        if let Some(domain) = &cookie.domain {
            if !self.domain_matches(domain) {
                log::debug!(
                    "cookie {} rejected: domain {domain} does not match {}",
                    cookie.name,
                    self.host()
                );
                return;
            }
        }
        if cookie.secure && !self.is_secure_page() {
            log::debug!("cookie {} rejected: Secure cookie on insecure page", cookie.name);
            return;
        }
        if cookie.path.is_none() {
            let default_path = match self.url.path().rsplit_once('/') {
                Some((dir, _)) if !dir.is_empty() => dir,
                _ => "/",
            };
            cookie.path = Some(default_path.to_string());
        }

        let existing = self.entries.iter().position(|c| {
            c.name == cookie.name && c.domain == cookie.domain && c.path == cookie.path
        });

        if cookie.is_expired(OffsetDateTime::now_utc()) {
            if let Some(idx) = existing {
                self.entries.remove(idx);
            }
            return;
        }

        // Replace existing cookie with same name, domain and path
        match existing {
            Some(idx) => self.entries[idx] = cookie,
            None => self.entries.push(cookie),
        }
    }
}

/// RFC 6265 path-match: `/foo` matches `/foo` and `/foo/bar`, not `/foobar`.
fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    match request_path.strip_prefix(cookie_path) {
        Some(rest) => cookie_path.ends_with('/') || rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
