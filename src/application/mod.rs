pub mod auth_service;
pub mod record_service;
pub mod record_store;
pub mod session_store;
pub mod summary;
pub mod tracker;
