//! Account management service: registration, lookup, full and partial
//! updates, password and privilege changes, and deletion of user accounts.

pub mod config;
pub mod db;
pub mod entities;
pub mod handler;
pub mod logging;
pub mod openapi;
pub mod repo;
pub mod schema;
pub mod service;
pub mod state;
#[cfg(test)]
pub mod test_support;
