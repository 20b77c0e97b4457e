pub mod config;
pub mod consent;
pub mod cookies;
pub mod errors;
pub mod gateway;
pub mod page;
pub mod ui;

pub use config::GatewayConfig;
pub use consent::{ConsentRecord, ConsentStore, ConsentUpdate};
pub use cookies::{CookieCategory, CookieRegistry};
pub use errors::ConsentError;
pub use gateway::{CookieGateway, WriteOptions};
pub use page::PageContext;
