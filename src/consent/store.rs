//! Consent store.
//!
//! The [`ConsentStore`] owns the `cookie_policy` cookie: it is the only
//! component that knows the record's structure, writes it, and answers
//! "is this category approved?".
//!
//! The record is always rewritten whole with a fresh expiry; it is never
//! patched in place. Reads go to the live document every time, so a record
//! changed by another script is picked up on the next call.
//!
//! A policy cookie that cannot be parsed is treated as absent and logged.
//! It never surfaces as an error.
use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::consent::{ConsentRecord, ConsentUpdate};
use crate::cookies::{
    find_cookie, read_document, write_document, Cookie, CookieCategory, CookieDocumentHandle,
    CookieRegistry, POLICY_COOKIE,
};
use crate::page::PageContext;

/// Removes every cookie of a category. Implemented by the gateway and
/// handed to [`ConsentStore::update_consent`].
pub trait CascadeDelete {
    fn cascade_delete(&self, category: CookieCategory);
}

pub struct ConsentStore {
    /// Live cookie document of the page.
    document: CookieDocumentHandle,
    /// Page facts (https decides the `Secure` attribute).
    page: PageContext,
    /// Known cookie names, consulted when no record exists yet.
    registry: Arc<CookieRegistry>,
    config: GatewayConfig,
}

impl ConsentStore {
    pub fn new(
        document: CookieDocumentHandle,
        page: PageContext,
        registry: Arc<CookieRegistry>,
        config: GatewayConfig,
    ) -> Self {
        Self { document, page, registry, config }
    }

    /// Reads the persisted consent record.
    ///
    /// Returns `None` when the policy cookie is absent or malformed.
    pub fn get_consent_record(&self) -> Option<ConsentRecord> {
        let raw = find_cookie(&read_document(&self.document).cookie_string(), POLICY_COOKIE)?;
        if raw.is_empty() {
            return None;
        }

        match ConsentRecord::from_cookie_value(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("ignoring {POLICY_COOKIE} cookie: {e}");
                None
            }
        }
    }

    /// Persists the default record (every category approved).
    ///
    /// Used on first contact, when the banner is shown or the settings page
    /// is opened without a record.
    pub fn set_default_consent(&self) {
        self.persist(&ConsentRecord::default());
    }

    /// Persists a record approving every category ("accept all cookies").
    pub fn approve_all(&self) {
        self.persist(&ConsentRecord::all_approved());
    }

    /// Merges `partial` onto the current record (or the default one) and
    /// persists the result.
    ///
    /// Every category `partial` sets to `false` is handed to `cascade`
    /// before the record is written, so cookies of a revoked category are
    /// gone by the time the new record is visible.
    pub fn update_consent(
        &self,
        partial: &ConsentUpdate,
        cascade: &dyn CascadeDelete,
    ) -> ConsentRecord {
        let mut record = self.get_consent_record().unwrap_or_default();
        record.merge(partial);

        for category in partial.revoked() {
            log::info!("consent for {category} cookies revoked");
            cascade.cascade_delete(category);
        }

        self.persist(&record);
        record
    }

    /// Whether `category` is approved.
    ///
    /// With no record yet every category counts as approved, since all
    /// categories are known ones.
    pub fn is_category_approved(&self, category: CookieCategory) -> bool {
        self.get_consent_record().map_or(true, |r| r.get(category))
    }

    /// Whether the cookie `name` of `category` may be written.
    ///
    /// With a record, its value for `category` decides. Without one, only a
    /// name the registry files under `category` is approved. This keeps the
    /// site's own cookies working before the user has decided.
    pub fn is_cookie_approved(&self, name: &str, category: CookieCategory) -> bool {
        match self.get_consent_record() {
            Some(record) => record.get(category),
            None => self.registry.category_of(name) == Some(category),
        }
    }

    fn persist(&self, record: &ConsentRecord) {
        let value = match record.to_cookie_value() {
            Ok(value) => value,
            Err(e) => {
                log::error!("cannot serialize consent record {record:?}: {e}");
                return;
            }
        };

        let cookie = Cookie::new(POLICY_COOKIE, value)
            .expiring_in_days(self.config.consent_expiry_days)
            .with_secure(self.page.is_secure());

        log::debug!("writing {POLICY_COOKIE}: {record:?}");
        write_document(&self.document).set_cookie_string(&cookie.to_cookie_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::InMemoryDocument;
    use std::cell::RefCell;
    use url::Url;

    #[derive(Default)]
    struct RecordingCascade {
        calls: RefCell<Vec<CookieCategory>>,
    }

    impl CascadeDelete for RecordingCascade {
        fn cascade_delete(&self, category: CookieCategory) {
            self.calls.borrow_mut().push(category);
        }
    }

    fn store() -> (ConsentStore, CookieDocumentHandle) {
        let url = Url::parse("https://www.example.com/").unwrap();
        let document = InMemoryDocument::new(url.clone()).into_handle();
        let store = ConsentStore::new(
            document.clone(),
            PageContext::new(url),
            CookieRegistry::standard(),
            GatewayConfig::default(),
        );
        (store, document)
    }

    fn raw_policy(document: &CookieDocumentHandle) -> Option<String> {
        find_cookie(&read_document(document).cookie_string(), POLICY_COOKIE)
    }

    #[test]
    fn no_record_on_fresh_document() {
        let (store, _) = store();
        assert_eq!(store.get_consent_record(), None);
    }

    #[test]
    fn default_consent_round_trips() {
        let (store, document) = store();
        store.set_default_consent();

        assert_eq!(store.get_consent_record(), Some(ConsentRecord::all_approved()));
        assert_eq!(
            raw_policy(&document).as_deref(),
            Some(r#"{"essential":true,"settings":true,"usage":true}"#)
        );
    }

    #[test]
    fn approve_all_is_idempotent() {
        let (store, document) = store();
        store.approve_all();
        let once = raw_policy(&document);
        store.approve_all();
        assert_eq!(raw_policy(&document), once);
    }

    #[test]
    fn malformed_record_reads_as_absent() {
        let (store, document) = store();
        write_document(&document)
            .set_cookie_string("cookie_policy=malformed consent cookie; path=/");
        assert_eq!(store.get_consent_record(), None);
    }

    #[test]
    fn update_merges_onto_default_and_cascades_revocations() {
        let (store, _) = store();
        let cascade = RecordingCascade::default();

        let record = store.update_consent(
            &ConsentUpdate::new()
                .set(CookieCategory::Usage, false)
                .set(CookieCategory::Settings, true),
            &cascade,
        );

        assert_eq!(record, ConsentRecord { essential: true, settings: true, usage: false });
        assert_eq!(store.get_consent_record(), Some(record));
        assert_eq!(*cascade.calls.borrow(), vec![CookieCategory::Usage]);
    }

    #[test]
    fn update_keeps_previous_choices() {
        let (store, _) = store();
        let cascade = RecordingCascade::default();

        store.update_consent(&ConsentUpdate::new().set(CookieCategory::Settings, false), &cascade);
        let usage_off = ConsentUpdate::new().set(CookieCategory::Usage, false);
        let record = store.update_consent(&usage_off, &cascade);

        assert_eq!(record, ConsentRecord { essential: true, settings: false, usage: false });
    }

    #[test]
    fn approval_without_record_depends_on_registry() {
        let (store, _) = store();

        assert!(store.is_category_approved(CookieCategory::Usage));
        assert!(store.is_cookie_approved("_ga", CookieCategory::Usage));
        assert!(!store.is_cookie_approved("fake_cookie", CookieCategory::Usage));
        assert!(!store.is_cookie_approved("_ga", CookieCategory::Settings));
    }

    #[test]
    fn approval_follows_record() {
        let (store, _) = store();
        let usage_off = ConsentUpdate::new().set(CookieCategory::Usage, false);
        store.update_consent(&usage_off, &RecordingCascade::default());

        assert!(!store.is_category_approved(CookieCategory::Usage));
        assert!(!store.is_cookie_approved("_ga", CookieCategory::Usage));
        assert!(store.is_category_approved(CookieCategory::Settings));
    }
}
