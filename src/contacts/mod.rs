//! Contact model produced by the feed parser.

pub mod contact;
pub mod contact_list;
pub mod photo;

pub use contact::{Contact, InstantMessage, PhoneNumber, PostalAddress};
pub use contact_list::ContactList;
pub use photo::PhotoRef;
