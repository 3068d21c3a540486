//! Personal finance tracker.
//!
//! The client side ([`application::tracker::FinanceTracker`] and the stores it
//! owns) keeps a local mirror of one user's transactions in step with the
//! finance API. The server side (`presentation`, backed by the services and
//! in-memory repositories) implements that API.

pub mod application;
pub mod data;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
