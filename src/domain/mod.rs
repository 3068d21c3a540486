pub mod error;
pub mod gateway;
pub mod models;
pub mod repository;
pub mod session;
pub mod user;
