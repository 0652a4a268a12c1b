//! Client library for crowd-sourced wildlife-incident reporting.
//!
//! Users authenticate against a managed identity service, submit geolocated
//! incident reports, browse recent incidents as a list or map, and read
//! educational resources. Both backend services are external collaborators
//! reached over HTTPS; this crate implements the flows, validation, and
//! spatial indexing in front of them.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Backend endpoint configuration.
pub mod config;
/// The failure taxonomy shared by every flow.
pub mod error;
/// Submission, retrieval, auth, and map-viewport flows.
pub mod flow;
/// Device geolocation acquisition.
pub mod location;
/// Domain records, report drafting, and the spatial index codec.
pub mod model;
/// Clients for the managed identity and document services.
pub mod server;
/// Device-local session snapshot persistence.
pub mod session;

pub use error::{Error, Result};
