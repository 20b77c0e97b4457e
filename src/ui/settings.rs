use crate::consent::{ConsentRecord, ConsentUpdate};
use crate::cookies::{
    CookieCategory, COOKIE_PREFERENCES_SET, POLICY_COOKIE, SEEN_COOKIE_MESSAGE,
};
use crate::errors::ConsentError;
use crate::gateway::{CookieGateway, WriteOptions};

const INPUT_PREFIX: &str = "cookies-";

/// The cookie settings page markup.
pub trait SettingsView {
    /// Checks the On (`approved`) or Off radio button for `category`.
    fn select_choice(&mut self, category: CookieCategory, approved: bool);
    fn set_warning_visible(&mut self, visible: bool);
    fn set_error_visible(&mut self, visible: bool);
    fn is_error_visible(&self) -> bool;
    fn set_confirmation_visible(&mut self, visible: bool);
    /// Points the "previous page" link at `href` and shows it, or hides it.
    fn set_previous_page_link(&mut self, href: Option<&str>);
    fn scroll_to_top(&mut self);
}

/// Receives analytics events. Sending is best-effort.
pub trait AnalyticsEvents {
    fn send_event(&self, category: &str, action: &str, label: &str);
}

/// One `<input>` of the settings form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    pub name: String,
    pub value: String,
    pub checked: bool,
}

impl FormInput {
    pub fn radio(name: impl Into<String>, value: impl Into<String>, checked: bool) -> Self {
        Self { name: name.into(), value: value.into(), checked }
    }
}

/// Drives the granular opt-in/opt-out form.
pub struct CookieSettings<'a, V: SettingsView> {
    gateway: &'a CookieGateway,
    view: V,
    analytics: Option<&'a dyn AnalyticsEvents>,
}

impl<'a, V: SettingsView> CookieSettings<'a, V> {
    pub fn new(gateway: &'a CookieGateway, view: V) -> Self {
        Self { gateway, view, analytics: None }
    }

    pub fn with_analytics(mut self, analytics: &'a dyn AnalyticsEvents) -> Self {
        self.analytics = Some(analytics);
        self
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Prepares the form: makes sure a consent record exists and, if the
    /// user has saved preferences before, pre-selects them.
    pub fn start(&mut self) {
        if self.gateway.read(POLICY_COOKIE).is_none() {
            self.gateway.set_default_consent_cookie();
        }

        if self.gateway.read(COOKIE_PREFERENCES_SET).is_none() {
            return;
        }

        let record = self.gateway.get_consent_cookie().unwrap_or_default();
        self.view.set_warning_visible(false);
        for category in CookieCategory::ALL.into_iter().filter(CookieCategory::is_optional) {
            self.view.select_choice(category, record.get(category));
        }
    }

    /// Handles a form submission.
    ///
    /// Every optional category needs an answer. An incomplete form shows the
    /// error message and changes no cookie. Inputs for `essential` are
    /// ignored; the form never turns it off.
    pub fn submit(&mut self, inputs: &[FormInput]) -> Result<ConsentRecord, ConsentError> {
        let update = Self::collect_choices(inputs);
        let required = CookieCategory::ALL.iter().filter(|c| c.is_optional()).count();
        if update.len() < required {
            self.show_error();
            return Err(ConsentError::IncompleteSelection { answered: update.len(), required });
        }

        let record = self.gateway.set_consent_cookie(&update);
        let days = self.gateway.config().acknowledgement_expiry_days;
        self.gateway.write(COOKIE_PREFERENCES_SET, Some("true"), Some(WriteOptions::days(days)));

        self.fire_analytics_event(&update);

        if self.gateway.read(SEEN_COOKIE_MESSAGE).is_none() {
            self.gateway.write(SEEN_COOKIE_MESSAGE, Some("true"), Some(WriteOptions::days(days)));
        }

        self.view.set_warning_visible(false);
        if self.view.is_error_visible() {
            self.view.set_error_visible(false);
        }
        self.show_confirmation();

        Ok(record)
    }

    fn collect_choices(inputs: &[FormInput]) -> ConsentUpdate {
        inputs
            .iter()
            .filter(|input| input.checked)
            .filter_map(|input| {
                let name = input.name.strip_prefix(INPUT_PREFIX).unwrap_or(input.name.as_str());
                match name.parse::<CookieCategory>() {
                    Ok(category) if category.is_optional() => {
                        Some((category, input.value == "On"))
                    }
                    Ok(category) => {
                        log::debug!(
                            "ignoring form input {}: {category} cannot be changed",
                            input.name
                        );
                        None
                    }
                    Err(e) => {
                        log::debug!("ignoring form input {}: {e}", input.name);
                        None
                    }
                }
            })
            .collect()
    }

    fn fire_analytics_event(&self, update: &ConsentUpdate) {
        let Some(analytics) = self.analytics else {
            return;
        };

        let label = update
            .iter()
            .map(|(category, approved)| {
                format!("{category}-{}", if approved { "yes" } else { "no" })
            })
            .collect::<Vec<_>>()
            .join(" ");
        analytics.send_event("cookieSettings", "Save changes", &label);
    }

    fn show_confirmation(&mut self) {
        self.view.scroll_to_top();

        let page = self.gateway.page();
        let previous = page.referrer_path().filter(|path| *path != page.pathname());
        self.view.set_previous_page_link(previous);

        self.view.set_confirmation_visible(true);
    }

    fn show_error(&mut self) {
        self.view.set_error_visible(true);
        self.view.scroll_to_top();
    }
}
