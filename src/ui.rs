//! Consent UI controllers.
//!
//! The banner and the settings form are thin consumers of the
//! [`CookieGateway`](crate::gateway::CookieGateway): they only call its
//! public operations. Markup is reached through small view traits so the
//! controllers stay independent of any DOM binding.

mod banner;
mod settings;

pub use banner::BannerView;
pub use banner::CookieBanner;

pub use settings::AnalyticsEvents;
pub use settings::CookieSettings;
pub use settings::FormInput;
pub use settings::SettingsView;
