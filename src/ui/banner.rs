use crate::cookies::{POLICY_COOKIE, SEEN_COOKIE_MESSAGE};
use crate::gateway::{CookieGateway, WriteOptions};

/// The cookie banner markup: the banner itself, its message block and the
/// confirmation block shown after "accept all".
pub trait BannerView {
    /// Whether the banner markup is present on the page.
    fn has_banner(&self) -> bool;
    fn set_banner_visible(&mut self, visible: bool);
    fn set_message_visible(&mut self, visible: bool);
    fn set_confirmation_visible(&mut self, visible: bool);
    fn focus_confirmation(&mut self);
}

/// Shows the banner on first contact and handles its two buttons.
pub struct CookieBanner<'a, V: BannerView> {
    gateway: &'a CookieGateway,
    view: V,
}

impl<'a, V: BannerView> CookieBanner<'a, V> {
    pub fn new(gateway: &'a CookieGateway, view: V) -> Self {
        Self { gateway, view }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Decides whether the banner is shown.
    ///
    /// An acknowledgement left by the old banner (no consent record yet) is
    /// cleared first so the user gets asked about the categories.
    pub fn start(&mut self) {
        if self.gateway.read(POLICY_COOKIE).is_none() && self.seen() {
            log::info!("clearing {SEEN_COOKIE_MESSAGE} left without a consent record");
            self.gateway.delete(SEEN_COOKIE_MESSAGE);
        }

        self.show();
    }

    /// "Hide" button.
    pub fn hide(&mut self) {
        if self.view.has_banner() {
            self.view.set_banner_visible(false);
            self.acknowledge();
        }
    }

    /// "Accept cookies" button.
    pub fn accept(&mut self) {
        self.gateway.approve_all_cookie_types();
        self.view.set_message_visible(false);
        self.view.set_confirmation_visible(true);
        self.view.focus_confirmation();
        self.acknowledge();
    }

    fn show(&mut self) {
        if self.is_in_cookies_page() || self.gateway.page().is_framed() {
            self.view.set_banner_visible(false);
            return;
        }

        if self.view.has_banner() && !self.seen() {
            self.view.set_banner_visible(true);
            if self.gateway.read(POLICY_COOKIE).is_none() {
                self.gateway.set_default_consent_cookie();
            }
        } else {
            self.view.set_banner_visible(false);
        }
    }

    fn seen(&self) -> bool {
        self.gateway.read(SEEN_COOKIE_MESSAGE).as_deref() == Some("true")
    }

    fn acknowledge(&self) {
        let days = self.gateway.config().acknowledgement_expiry_days;
        self.gateway.write(SEEN_COOKIE_MESSAGE, Some("true"), Some(WriteOptions::days(days)));
    }

    fn is_in_cookies_page(&self) -> bool {
        self.gateway.page().pathname() == self.gateway.config().cookie_settings_path
    }
}
