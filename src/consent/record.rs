use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cookies::CookieCategory;
use crate::errors::ConsentError;

/// Which cookie categories the user has approved.
///
/// Always holds all three categories. Serializes to exactly
/// `{"essential":true,"settings":true,"usage":true}` (field order matters to
/// anything comparing the raw cookie).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub essential: bool,
    pub settings: bool,
    pub usage: bool,
}

impl Default for ConsentRecord {
    /// Opt-in by default: every category approved.
    fn default() -> Self {
        Self::all_approved()
    }
}

impl ConsentRecord {
    pub const fn all_approved() -> Self {
        Self { essential: true, settings: true, usage: true }
    }

    pub fn get(&self, category: CookieCategory) -> bool {
        match category {
            CookieCategory::Essential => self.essential,
            CookieCategory::Settings => self.settings,
            CookieCategory::Usage => self.usage,
        }
    }

    pub fn set(&mut self, category: CookieCategory, approved: bool) {
        match category {
            CookieCategory::Essential => self.essential = approved,
            CookieCategory::Settings => self.settings = approved,
            CookieCategory::Usage => self.usage = approved,
        }
    }

    /// Applies every choice in `update` on top of this record.
    pub fn merge(&mut self, update: &ConsentUpdate) {
        for (category, approved) in update.iter() {
            self.set(category, approved);
        }
    }

    /// The JSON stored as the policy cookie value.
    pub fn to_cookie_value(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parses the raw (already URL-decoded) value of the policy cookie.
    ///
    /// Legacy format: older pages stored the record JSON-encoded twice, so a
    /// value that parses to a JSON string is unwrapped once more before the
    /// structure is checked. Only one level is unwrapped.
    pub fn from_cookie_value(raw: &str) -> Result<Self, ConsentError> {
        let malformed = |e: serde_json::Error| ConsentError::MalformedConsent(e.to_string());

        let value: Value = serde_json::from_str(raw).map_err(malformed)?;
        let value = match value {
            Value::String(inner) => serde_json::from_str(&inner).map_err(malformed)?,
            other => other,
        };
        if !value.is_object() {
            return Err(ConsentError::MalformedConsent(format!(
                "expected an object, got {value}"
            )));
        }

        serde_json::from_value(value).map_err(malformed)
    }
}

/// A partial set of consent choices, as submitted from the settings form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsentUpdate {
    choices: BTreeMap<CookieCategory, bool>,
}

impl ConsentUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a choice. A later choice for the same category wins.
    pub fn set(mut self, category: CookieCategory, approved: bool) -> Self {
        self.choices.insert(category, approved);
        self
    }

    pub fn get(&self, category: CookieCategory) -> Option<bool> {
        self.choices.get(&category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CookieCategory, bool)> + '_ {
        self.choices.iter().map(|(c, a)| (*c, *a))
    }

    /// Categories this update sets to `false`.
    pub fn revoked(&self) -> impl Iterator<Item = CookieCategory> + '_ {
        self.iter().filter(|(_, approved)| !approved).map(|(c, _)| c)
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

impl FromIterator<(CookieCategory, bool)> for ConsentUpdate {
    fn from_iter<I: IntoIterator<Item = (CookieCategory, bool)>>(iter: I) -> Self {
        Self { choices: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_serializes_to_the_documented_layout() {
        assert_eq!(
            ConsentRecord::default().to_cookie_value().unwrap(),
            r#"{"essential":true,"settings":true,"usage":true}"#
        );
    }

    #[test]
    fn parses_plain_record() {
        let record =
            ConsentRecord::from_cookie_value(r#"{"essential":true,"settings":false,"usage":true}"#)
                .unwrap();
        assert!(!record.settings);
        assert!(record.usage);
    }

    #[test]
    fn unwraps_double_encoded_record_once() {
        let raw = r#""{\"essential\":true,\"settings\":true,\"usage\":false}""#;
        let record = ConsentRecord::from_cookie_value(raw).unwrap();
        assert!(!record.usage);

        let triple = serde_json::to_string(raw).unwrap();
        assert!(ConsentRecord::from_cookie_value(&triple).is_err());
    }

    #[test]
    fn rejects_non_records() {
        let rejected = [
            "malformed consent cookie",
            "true",
            "null",
            "[true,true,true]",
            r#"{"essential":true}"#,
        ];
        for raw in rejected {
            assert!(
                matches!(
                    ConsentRecord::from_cookie_value(raw),
                    Err(ConsentError::MalformedConsent(_))
                ),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn merge_only_touches_named_categories() {
        let mut record = ConsentRecord::default();
        record.merge(&ConsentUpdate::new().set(CookieCategory::Settings, false));
        assert_eq!(record, ConsentRecord { essential: true, settings: false, usage: true });
    }

    #[test]
    fn revoked_lists_false_choices() {
        let choices = [(CookieCategory::Usage, false), (CookieCategory::Settings, true)];
        let update: ConsentUpdate = choices.into_iter().collect();
        assert_eq!(update.revoked().collect::<Vec<_>>(), vec![CookieCategory::Usage]);
    }
}
