//! Cookie gateway.
//!
//! Every cookie the application reads, writes or deletes goes through
//! [`CookieGateway`]. Writes are checked against the [`CookieRegistry`] and
//! the [`ConsentStore`]:
//!
//! - the policy cookie itself is always writable (bootstrap),
//! - deletions are always allowed,
//! - unknown cookie names are refused,
//! - known names need consent for their category.
//!
//! A refused write is dropped silently. Callers that need to know in advance
//! use [`CookieGateway::check_consent_cookie`].
//!
//! The gateway holds no cookie state of its own; each call goes to the live
//! [`CookieDocument`](crate::cookies::CookieDocument).
//!
//! ```rust
//! use consent_gateway::config::GatewayConfig;
//! use consent_gateway::cookies::InMemoryDocument;
//! use consent_gateway::gateway::{CookieGateway, WriteOptions};
//! use consent_gateway::page::PageContext;
//! use url::Url;
//!
//! let url = Url::parse("https://www.example.com/").unwrap();
//! let document = InMemoryDocument::new(url.clone()).into_handle();
//! let gateway = CookieGateway::new(document, PageContext::new(url), GatewayConfig::default());
//!
//! gateway.write("seen_cookie_message", Some("true"), Some(WriteOptions::days(365)));
//! assert_eq!(gateway.read("seen_cookie_message").as_deref(), Some("true"));
//!
//! gateway.write("totally_unknown_cookie", Some("x"), None);
//! assert_eq!(gateway.read("totally_unknown_cookie"), None);
//! ```
use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::consent::{CascadeDelete, ConsentRecord, ConsentStore, ConsentUpdate};
use crate::cookies::{
    find_cookie, read_document, write_document, Cookie, CookieCategory, CookieDocumentHandle,
    CookieRegistry, NameMatch, POLICY_COOKIE,
};
use crate::page::PageContext;

/// Options for [`CookieGateway::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOptions {
    /// Lifetime in days. `None` or `Some(0)` makes a session cookie;
    /// negative values expire the cookie immediately.
    pub days: Option<i64>,
}

impl WriteOptions {
    pub fn days(days: i64) -> Self {
        Self { days: Some(days) }
    }

    pub fn session() -> Self {
        Self { days: None }
    }
}

pub struct CookieGateway {
    document: CookieDocumentHandle,
    page: PageContext,
    registry: Arc<CookieRegistry>,
    config: GatewayConfig,
    store: ConsentStore,
}

impl CookieGateway {
    /// Creates a gateway over the standard cookie registry.
    pub fn new(document: CookieDocumentHandle, page: PageContext, config: GatewayConfig) -> Self {
        Self::with_registry(document, page, CookieRegistry::standard(), config)
    }

    pub fn with_registry(
        document: CookieDocumentHandle,
        page: PageContext,
        registry: Arc<CookieRegistry>,
        config: GatewayConfig,
    ) -> Self {
        let store =
            ConsentStore::new(document.clone(), page.clone(), registry.clone(), config.clone());
        Self { document, page, registry, config, store }
    }

    pub fn consent(&self) -> &ConsentStore {
        &self.store
    }

    pub fn page(&self) -> &PageContext {
        &self.page
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Writes a cookie, subject to consent.
    ///
    /// `None` deletes the cookie. An empty value is written as an empty
    /// cookie. Without `options` the configured default expiry applies. A
    /// write the gate refuses is a no-op.
    pub fn write(&self, name: &str, value: Option<&str>, options: Option<WriteOptions>) {
        let Some(value) = value else {
            return self.delete(name);
        };

        if !self.is_write_allowed(name, Some(value)) {
            log::debug!("cookie write refused: {name}");
            return;
        }

        let days = options.map_or(Some(self.config.default_expiry_days), |o| o.days);
        self.set(Cookie::new(name, value), days);
    }

    /// Reads a cookie's decoded value from the live document.
    pub fn read(&self, name: &str) -> Option<String> {
        find_cookie(&read_document(&self.document).cookie_string(), name)
    }

    /// Removes a cookie by writing an expired one with the same name and
    /// path. Never subject to consent.
    pub fn delete(&self, name: &str) {
        self.set(Cookie::new(name, ""), Some(-1));
    }

    /// Decides whether writing `value` to `name` is allowed.
    ///
    /// A `None` or empty value is what a deletion writes, so it always passes.
    pub fn is_write_allowed(&self, name: &str, value: Option<&str>) -> bool {
        if name == POLICY_COOKIE || value.map_or(true, str::is_empty) {
            return true;
        }

        match self.registry.category_of(name) {
            Some(category) => self.store.is_cookie_approved(name, category),
            None => false,
        }
    }

    /// Deletes every cookie the registry files under `category`.
    ///
    /// Prefix entries remove every live cookie whose name matches. A cookie
    /// that survives the host-only delete was set for a wider domain; it is
    /// deleted again for the page host and then each parent domain until it
    /// is gone.
    pub fn cascade_delete(&self, category: CookieCategory) {
        let live = self.live_cookie_names();

        for entry in self.registry.entries_in(category) {
            let names: Vec<&str> = match entry.name {
                NameMatch::Exact(name) => vec![name],
                NameMatch::Prefix(_) => {
                    live.iter().map(String::as_str).filter(|n| entry.name.matches(n)).collect()
                }
            };

            for name in names {
                self.delete(name);
                if self.read(name).is_some() {
                    self.delete_for_parent_domains(name);
                }
            }
        }
    }

    // ---------- Consumer surface ----------

    pub fn set_default_consent_cookie(&self) {
        self.store.set_default_consent();
    }

    pub fn approve_all_cookie_types(&self) {
        self.store.approve_all();
    }

    /// Merges `partial` into the consent record, deleting cookies of every
    /// category it revokes.
    pub fn set_consent_cookie(&self, partial: &ConsentUpdate) -> ConsentRecord {
        self.store.update_consent(partial, self)
    }

    pub fn get_consent_cookie(&self) -> Option<ConsentRecord> {
        self.store.get_consent_record()
    }

    /// Pre-flights a write without performing it.
    pub fn check_consent_cookie(&self, name: &str, value: Option<&str>) -> bool {
        self.is_write_allowed(name, value)
    }

    // ---------- Internals ----------

    fn set(&self, cookie: Cookie, days: Option<i64>) {
        let mut cookie = cookie.with_secure(self.page.is_secure());
        if let Some(days) = days.filter(|d| *d != 0) {
            cookie = cookie.expiring_in_days(days);
        }
        write_document(&self.document).set_cookie_string(&cookie.to_cookie_string());
    }

    fn delete_for_parent_domains(&self, name: &str) {
        let mut domain = self.page.hostname();
        loop {
            log::debug!("deleting {name} for domain .{domain}");
            self.set(Cookie::new(name, "").with_domain(domain), Some(-1));
            if self.read(name).is_none() {
                return;
            }
            match domain.split_once('.') {
                Some((_, parent)) if parent.contains('.') => domain = parent,
                _ => {
                    log::warn!("cookie {name} survived deletion");
                    return;
                }
            }
        }
    }

    fn live_cookie_names(&self) -> Vec<String> {
        read_document(&self.document)
            .cookie_string()
            .split(';')
            .filter_map(|segment| segment.trim_start().split_once('=').map(|(n, _)| n.to_string()))
            .collect()
    }
}

impl CascadeDelete for CookieGateway {
    fn cascade_delete(&self, category: CookieCategory) {
        CookieGateway::cascade_delete(self, category);
    }
}
