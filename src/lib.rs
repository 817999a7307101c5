//! Diskview Core Library
//!
//! This library provides the core functionality for diskview, a small web
//! front end for browsing and downloading files shared through Yandex Disk
//! public links.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`disk`] - Remote listing and download client
//! - [`category`] - File-type categories and listing filters
//! - [`cache`] - Process-lifetime listing cache
//! - [`listing`] - Cache-then-fetch listing resolution
//! - [`bundle`] - Zip bundling of selected files
//! - [`web`] - axum router, handlers and HTML pages

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bundle;
pub mod cache;
pub mod category;
pub mod disk;
pub mod listing;
mod user_agent;
pub mod web;

// Re-export commonly used types
pub use bundle::{Bundle, BundleError, build_bundle};
pub use cache::ListingCache;
pub use category::{Category, filter_listing};
pub use disk::{ClientSettings, DiskApi, DiskError, FileRecord, ResourceType, YandexDiskClient};
pub use listing::{ListingError, browse, load_listing};
pub use web::{AppState, router};
