//! Static table mapping cookie names to their [`CookieCategory`].
//!
//! The registry covers every cookie the application sets itself plus the
//! analytics vendor cookies it knows about. A name that matches no entry is
//! *unknown*, and the gateway refuses to create unknown cookies.
//!
//! The registry is immutable once built. The standard table is shared
//! through [`CookieRegistry::standard`].
use std::sync::Arc;

use lazy_static::lazy_static;

use crate::cookies::CookieCategory;

/// Name of the cookie holding the serialized consent record.
pub const POLICY_COOKIE: &str = "cookie_policy";
/// Set once the user has dismissed or resolved the banner.
pub const SEEN_COOKIE_MESSAGE: &str = "seen_cookie_message";
/// Set once the user has saved choices on the settings page.
pub const COOKIE_PREFERENCES_SET: &str = "cookie_preferences_set";

lazy_static! {
    static ref STANDARD: Arc<CookieRegistry> = Arc::new(CookieRegistry::new(vec![
        RegistryEntry::exact(POLICY_COOKIE, CookieCategory::Essential),
        RegistryEntry::exact(SEEN_COOKIE_MESSAGE, CookieCategory::Essential),
        RegistryEntry::exact(COOKIE_PREFERENCES_SET, CookieCategory::Essential),
        RegistryEntry::exact("dm_session", CookieCategory::Essential),
        RegistryEntry::exact("dm_cookie_probe", CookieCategory::Settings),
        RegistryEntry::exact("_ga", CookieCategory::Usage),
        RegistryEntry::exact("_gid", CookieCategory::Usage),
        RegistryEntry::exact("_gat", CookieCategory::Usage),
        RegistryEntry::exact("_gat_govuk_shared", CookieCategory::Usage),
        RegistryEntry::prefix("_ga_", CookieCategory::Usage),
    ]));
}

/// How a registry entry matches cookie names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    /// Matches one cookie name exactly.
    Exact(&'static str),
    /// Matches every cookie whose name starts with the prefix.
    Prefix(&'static str),
}

impl NameMatch {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameMatch::Exact(n) => *n == name,
            NameMatch::Prefix(p) => name.starts_with(p) && name.len() > p.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryEntry {
    pub name: NameMatch,
    pub category: CookieCategory,
}

impl RegistryEntry {
    pub const fn exact(name: &'static str, category: CookieCategory) -> Self {
        Self { name: NameMatch::Exact(name), category }
    }

    pub const fn prefix(prefix: &'static str, category: CookieCategory) -> Self {
        Self { name: NameMatch::Prefix(prefix), category }
    }
}

#[derive(Debug, Clone)]
pub struct CookieRegistry {
    entries: Vec<RegistryEntry>,
}

impl CookieRegistry {
    pub fn new(entries: Vec<RegistryEntry>) -> Self {
        Self { entries }
    }

    /// The application's own registry.
    pub fn standard() -> Arc<CookieRegistry> {
        STANDARD.clone()
    }

    /// Returns the category for `name`, or `None` when the name is unknown.
    ///
    /// Exact entries win over prefix entries.
    pub fn category_of(&self, name: &str) -> Option<CookieCategory> {
        let exact =
            self.entries.iter().find(|e| matches!(e.name, NameMatch::Exact(n) if n == name));
        exact
            .or_else(|| self.entries.iter().find(|e| e.name.matches(name)))
            .map(|e| e.category)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.category_of(name).is_some()
    }

    /// All entries tagged with `category`, in table order.
    pub fn entries_in(&self, category: CookieCategory) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_categories() {
        let reg = CookieRegistry::standard();
        assert_eq!(reg.category_of(POLICY_COOKIE), Some(CookieCategory::Essential));
        assert_eq!(reg.category_of("dm_cookie_probe"), Some(CookieCategory::Settings));
        assert_eq!(reg.category_of("_gid"), Some(CookieCategory::Usage));
        assert_eq!(reg.category_of("totally_unknown_cookie"), None);
    }

    #[test]
    fn prefix_entries_need_a_suffix() {
        let reg = CookieRegistry::standard();
        assert_eq!(reg.category_of("_ga_ABC123"), Some(CookieCategory::Usage));
        assert_eq!(reg.category_of("_ga_"), None);
    }

    #[test]
    fn exact_entry_beats_prefix() {
        let reg = CookieRegistry::new(vec![
            RegistryEntry::prefix("dm_", CookieCategory::Usage),
            RegistryEntry::exact("dm_session", CookieCategory::Essential),
        ]);
        assert_eq!(reg.category_of("dm_session"), Some(CookieCategory::Essential));
        assert_eq!(reg.category_of("dm_other"), Some(CookieCategory::Usage));
    }

    #[test]
    fn entries_in_filters_by_category() {
        let reg = CookieRegistry::standard();
        let settings: Vec<_> = reg.entries_in(CookieCategory::Settings).map(|e| e.name).collect();
        assert_eq!(settings, vec![NameMatch::Exact("dm_cookie_probe")]);
    }
}
