//! Version 1 endpoints
//!
//! Served at the root paths the existing web client already calls.

pub mod routes;
pub mod search;
pub mod subscriptions;
pub mod user;
pub mod videos;
pub mod watch;
