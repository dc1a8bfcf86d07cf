//! Project audit tracking backend.
//!
//! Clients own users and projects, projects own requirements, requirements own
//! audit tasks, and audit tasks own issues. Users are linked to projects through
//! a many-to-many assignment. Everything is persisted in a single SQLite file
//! and served over a JSON HTTP API.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod models;

pub use error::{Error, Result};
