//! Incident reporting and account registration core: drafts, validators,
//! submit controllers, role capabilities and the reference SQLite store.

pub mod account;
pub mod capability;
pub mod config;
pub mod geolocation;
pub mod incident;
pub mod model;
pub mod navigation;
pub mod repository;
pub mod store;
pub mod validation;

pub use location_registry::LocationHierarchy;
