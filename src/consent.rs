//! Consent: the [`ConsentRecord`] persisted in `cookie_policy` and the
//! [`ConsentStore`] that owns it.

mod record;
mod store;

pub use record::ConsentRecord;
pub use record::ConsentUpdate;

pub use store::CascadeDelete;
pub use store::ConsentStore;
