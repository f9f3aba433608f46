pub mod backend;
pub mod client;
pub mod messages;

pub use backend::{Backend, HttpBackend, ServiceError, ServiceResult};
pub use client::Client;
