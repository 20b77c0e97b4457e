use crate::errors::ConsentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Consent granularity unit. Every cookie the application knows about
/// belongs to exactly one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CookieCategory {
    /// Required for the site to work. Never offered as an opt-out.
    Essential,
    /// Remembers user settings.
    Settings,
    /// Analytics and measurement.
    Usage,
}

impl CookieCategory {
    /// All categories, in the order they appear in the consent record.
    pub const ALL: [CookieCategory; 3] = [
        CookieCategory::Essential,
        CookieCategory::Settings,
        CookieCategory::Usage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CookieCategory::Essential => "essential",
            CookieCategory::Settings => "settings",
            CookieCategory::Usage => "usage",
        }
    }

    /// Whether the user may opt out of this category.
    pub fn is_optional(&self) -> bool {
        !matches!(self, CookieCategory::Essential)
    }
}

impl fmt::Display for CookieCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CookieCategory {
    type Err = ConsentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "essential" => Ok(CookieCategory::Essential),
            "settings" => Ok(CookieCategory::Settings),
            "usage" => Ok(CookieCategory::Usage),
            other => Err(ConsentError::UnknownCategory(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names_only() {
        assert_eq!("usage".parse::<CookieCategory>().unwrap(), CookieCategory::Usage);
        assert!(matches!(
            "marketing".parse::<CookieCategory>(),
            Err(ConsentError::UnknownCategory(name)) if name == "marketing"
        ));
    }

    #[test]
    fn only_essential_is_mandatory() {
        let optional: Vec<_> = CookieCategory::ALL.iter().filter(|c| c.is_optional()).collect();
        assert_eq!(optional, vec![&CookieCategory::Settings, &CookieCategory::Usage]);
    }
}
