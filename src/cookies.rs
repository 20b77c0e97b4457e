//! Cookies: [`CookieCategory`], the [`CookieRegistry`], the [`Cookie`] record
//! and the [`CookieDocument`] backends.

mod category;
mod cookie;
mod document;
mod registry;

pub use category::CookieCategory;

pub use cookie::Cookie;
pub use cookie::format_expires;
pub use cookie::parse_expires;
pub(crate) use cookie::find_cookie;

pub use document::CookieDocument;
pub use document::CookieDocumentHandle;
pub use document::InMemoryDocument;
pub(crate) use document::{read_document, write_document};

pub use registry::CookieRegistry;
pub use registry::NameMatch;
pub use registry::RegistryEntry;
pub use registry::{COOKIE_PREFERENCES_SET, POLICY_COOKIE, SEEN_COOKIE_MESSAGE};
