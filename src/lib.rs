//! # Contacts Agent Library
//!
//! Retrieves a user's address book from the contacts feed service using an
//! AuthSub delegated-authorization token, walks the paginated feed and turns
//! each page's Atom/GData markup into typed [`Contact`] records.
//!
//! Modules:
//! - `auth`: AuthSub session state, request url, token exchange and revocation
//! - `transport`: the GET capability used for every outbound request
//! - `feed`: pagination loop and page parser
//! - `contacts`: contact model and the accumulating contact list
//! - `client`: the fetch facade tying everything together
//! - `config`: YAML service configuration, defaults and validation

pub mod auth;
pub mod client;
pub mod config;
pub mod contacts;
pub mod error;
pub mod feed;
pub mod observability;
pub mod transport;
pub mod utils;
pub mod tests;

pub use crate::auth::session::Session;
pub use crate::client::ContactsClient;
pub use crate::config::settings::ServiceConfig;
pub use crate::contacts::{Contact, ContactList, PhotoRef};
pub use crate::error::ContactsError;
