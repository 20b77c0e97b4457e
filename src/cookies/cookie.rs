//! The [`Cookie`] record and its `document.cookie` string form.
//!
//! A cookie crosses the document boundary as a single string: the setter
//! takes `name=value; path=/; expires=<date>; Secure`, the getter returns
//! `name=value` pairs joined by `"; "`. Expiry dates use the GMT form
//! browsers emit (`Tue, 19 Oct 2027 10:00:00 GMT`).

use percent_encoding::percent_decode_str;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

const SECONDS_PER_DAY: i64 = 86_400;

/// A cookie as written to (or held by) a cookie document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name (case-sensitive).
    pub name: String,

    /// Raw cookie value (not URL-decoded).
    pub value: String,

    /// Path scoping. The gateway always writes `/`.
    pub path: Option<String>,

    /// Domain scoping without the leading dot. Host-only if `None`.
    pub domain: Option<String>,

    /// If `true`, the cookie is only visible on secure pages.
    pub secure: bool,

    /// Expiration timestamp. Session cookies have `None`.
    pub expires: Option<OffsetDateTime>,
}

impl Cookie {
    /// Creates a host-only session cookie on path `/`.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: Some("/".to_string()),
            domain: None,
            secure: false,
            expires: None,
        }
    }

    pub fn with_expires(mut self, expires: OffsetDateTime) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Sets the expiry `days` from now. Negative values produce an already
    /// expired cookie, which the document treats as a removal.
    ///
    /// Out-of-range lifetimes are clamped: to the last representable instant
    /// going forward, to the epoch going back.
    pub fn expiring_in_days(self, days: i64) -> Self {
        let expires = days
            .checked_mul(SECONDS_PER_DAY)
            .and_then(|secs| OffsetDateTime::now_utc().checked_add(Duration::seconds(secs)))
            .unwrap_or_else(|| {
                log::debug!("cookie {} lifetime of {days} days is out of range", self.name);
                if days > 0 {
                    PrimitiveDateTime::MAX.assume_utc()
                } else {
                    OffsetDateTime::UNIX_EPOCH
                }
            });
        self.with_expires(expires)
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into().trim_start_matches('.').to_string());
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires.is_some_and(|at| at <= now)
    }

    /// Serializes the cookie into the string handed to the document setter.
    pub fn to_cookie_string(&self) -> String {
        let mut out = format!("{}={}", self.name, self.value);
        if let Some(path) = &self.path {
            out.push_str("; path=");
            out.push_str(path);
        }
        if let Some(expires) = self.expires {
            out.push_str("; expires=");
            out.push_str(&format_expires(expires));
        }
        if let Some(domain) = &self.domain {
            out.push_str("; domain=.");
            out.push_str(domain);
        }
        if self.secure {
            out.push_str("; Secure");
        }
        out
    }

    /// Parses a setter string. Returns `None` when there is no `name=value` pair.
    ///
    /// Attribute names are case-insensitive. An unparseable `expires` leaves
    /// the cookie as a session cookie, as browsers do.
    pub fn parse(s: &str) -> Option<Cookie> {
        let mut parts = s.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = Cookie {
            name: name.to_string(),
            value: value.trim().to_string(),
            path: None,
            domain: None,
            secure: false,
            expires: None,
        };

        for part in parts {
            let part = part.trim();
            if let Some((k, v)) = part.split_once('=') {
                match k.trim().to_ascii_lowercase().as_str() {
                    "path" => cookie.path = Some(v.trim().to_string()),
                    "domain" => {
                        cookie.domain = Some(v.trim().trim_start_matches('.').to_ascii_lowercase())
                    }
                    "expires" => cookie.expires = parse_expires(v.trim()),
                    _ => {}
                }
            } else if part.eq_ignore_ascii_case("secure") {
                cookie.secure = true;
            }
        }

        Some(cookie)
    }

    /// The value with percent-escapes decoded.
    ///
    /// `+` is kept literally. A value that does not decode to UTF-8 is
    /// returned as stored.
    pub fn decoded_value(&self) -> String {
        decode_value(&self.value)
    }
}

/// Finds `name` in a document cookie string and returns its decoded value.
///
/// Segments are split on `;` with leading spaces trimmed; a segment matches
/// when it starts with `name=`. Everything after that first `=` is the value.
pub(crate) fn find_cookie(cookie_string: &str, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    cookie_string
        .split(';')
        .map(|segment| segment.trim_start_matches(' '))
        .find_map(|segment| segment.strip_prefix(prefix.as_str()))
        .map(decode_value)
}

pub(crate) fn decode_value(raw: &str) -> String {
    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            log::debug!("cookie value is not valid UTF-8 once decoded: {e}");
            raw.to_string()
        }
    }
}

/// Formats an expiry timestamp as `Tue, 19 Oct 2027 10:00:00 GMT`.
pub fn format_expires(at: OffsetDateTime) -> String {
    let at = at.to_offset(time::UtcOffset::UTC);
    match at.format(format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    )) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("cannot format cookie expiry {at}: {e}");
            String::new()
        }
    }
}

/// Parses an expiry timestamp in the form produced by [`format_expires`].
pub fn parse_expires(s: &str) -> Option<OffsetDateTime> {
    PrimitiveDateTime::parse(
        s,
        format_description!(
            "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
        ),
    )
    .ok()
    .map(PrimitiveDateTime::assume_utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn serializes_attributes_in_document_order() {
        let c = Cookie::new("seen_cookie_message", "true")
            .with_expires(datetime!(2027-10-19 10:00:00 UTC))
            .with_secure(true);

        assert_eq!(
            c.to_cookie_string(),
            "seen_cookie_message=true; path=/; expires=Tue, 19 Oct 2027 10:00:00 GMT; Secure"
        );
    }

    #[test]
    fn parses_setter_string() {
        let c = Cookie::parse(concat!(
            "_ga=GA1.2.3; Path=/; Domain=.Example.com; ",
            "Expires=Tue, 19 Oct 2027 10:00:00 GMT; secure",
        ))
        .unwrap();
        assert_eq!(c.name, "_ga");
        assert_eq!(c.value, "GA1.2.3");
        assert_eq!(c.path.as_deref(), Some("/"));
        assert_eq!(c.domain.as_deref(), Some("example.com"));
        assert_eq!(c.expires, Some(datetime!(2027-10-19 10:00:00 UTC)));
        assert!(c.secure);
    }

    #[test]
    fn value_keeps_equals_signs() {
        let c = Cookie::parse("cookie_policy={\"a\"=1}; path=/").unwrap();
        assert_eq!(c.value, "{\"a\"=1}");
    }

    #[test]
    fn rejects_strings_without_a_pair() {
        assert!(Cookie::parse("Secure").is_none());
        assert!(Cookie::parse("=value").is_none());
    }

    #[test]
    fn bad_expiry_makes_a_session_cookie() {
        let c = Cookie::parse("a=1; expires=soon").unwrap();
        assert_eq!(c.expires, None);
    }

    #[test]
    fn finds_cookie_by_exact_name_prefix() {
        let jar = "seen_cookie_message_old=x; seen_cookie_message=true;cookie_policy=a=b";
        assert_eq!(find_cookie(jar, "seen_cookie_message").as_deref(), Some("true"));
        assert_eq!(find_cookie(jar, "cookie_policy").as_deref(), Some("a=b"));
        assert_eq!(find_cookie(jar, "cookie"), None);
        assert_eq!(find_cookie("", "cookie_policy"), None);
    }

    #[test]
    fn negative_days_are_already_expired() {
        let c = Cookie::new("a", "").expiring_in_days(-1);
        assert!(c.is_expired(OffsetDateTime::now_utc()));
    }

    #[test]
    fn out_of_range_days_are_clamped() {
        let far = Cookie::new("a", "1").expiring_in_days(10_000_000);
        assert_eq!(far.expires, Some(PrimitiveDateTime::MAX.assume_utc()));
        assert!(far.to_cookie_string().contains("expires=Fri, 31 Dec 9999 23:59:59 GMT"));

        let past = Cookie::new("a", "").expiring_in_days(i64::MIN);
        assert_eq!(past.expires, Some(OffsetDateTime::UNIX_EPOCH));
        assert!(past.is_expired(OffsetDateTime::now_utc()));
    }

    #[test]
    fn decodes_percent_escapes_but_not_plus() {
        let c = Cookie::new("a", "%7B%22x%22%3A1%7D+y");
        assert_eq!(c.decoded_value(), "{\"x\":1}+y");
    }
}
