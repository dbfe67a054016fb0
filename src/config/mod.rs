pub mod endpoints;
pub mod proc_initiator;
pub mod proc_loader;
pub mod proc_validator;
pub mod settings;
