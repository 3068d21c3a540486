pub mod http_gateway;
pub mod memory;
pub mod session_storage;
pub mod user_repository;
