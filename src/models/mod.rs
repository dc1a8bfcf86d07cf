//! Domain models for the audit tracker.
//!
//! # Hierarchy
//!
//! - [`Client`]: An organisation being audited. Owns users and projects.
//! - [`User`]: A person with a fixed [`Role`]. Belongs to at most one client and
//!   can be assigned to any number of projects.
//! - [`Project`]: An audit engagement. Belongs to at most one client and owns
//!   requirements.
//! - [`Requirement`]: Something the project must satisfy. Owns audit tasks.
//! - [`AuditTask`]: A check performed against a requirement. Owns at most one issue.
//! - [`Issue`]: A finding raised by an audit task.
//!
//! # Projections
//!
//! Each entity has a `*Detail` projection carrying optionally loaded relations.
//! Which relations are fetched is decided per call by a [`LoadSet`]. A relation
//! that was not loaded, or was loaded and turned out empty, is `None` and is left
//! out of the serialized response entirely.

mod audit_task;
mod client;
mod issue;
mod load;
mod project;
mod requirement;
mod user;

pub use audit_task::*;
pub use client::*;
pub use issue::*;
pub use load::*;
pub use project::*;
pub use requirement::*;
pub use user::*;
