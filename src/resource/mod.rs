//! Resource abstraction layer
//!
//! Collection endpoints are defined in JSON files compiled into the binary,
//! so new read-only resources can be added without code changes.
//!
//! # Architecture
//!
//! - [`registry`] - Loads resource definitions and create templates from embedded JSON
//! - [`fetcher`] - Fetches collections and extracts their items
//! - [`lister`] - Decodes a collection into [`ResourceSummary`] values
//! - [`classifier`] - Maps declared types to per-type mutation endpoints
//!
//! # Resource Definitions
//!
//! Resources are defined in JSON files under `src/resources/`:
//! - `compute.json` - Blades, rack units and physical summaries
//! - `license.json` - Account license data and resource counts
//! - `asset.json` - Device registrations
//! - `policy.json` - BIOS/boot/NTP policies, server profiles and default policy templates

pub mod classifier;
mod fetcher;
pub mod lister;
mod registry;

pub use classifier::{classify, Classification, DeclaredType, EndpointRoute};
pub use fetcher::{extract_items, fetch_items, fetch_resource};
pub use lister::{ResourceLister, ResourceSummary};
pub use registry::*;
