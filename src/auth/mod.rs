//! AuthSub credential handling.
//!
//! - `session`: the credential and its lifecycle state
//! - `authsub_url`: canonical AuthSubRequest url the user is sent to
//! - `token_manager`: exchange for a session token, revoke, header value

pub mod authsub_url;
pub mod session;
pub mod token_manager;

pub use authsub_url::build_authorization_url;
pub use session::{Session, SessionState};
pub use token_manager::TokenManager;
