//! Intersight API interaction module
//!
//! # Module Structure
//!
//! - [`auth`] - HTTP-signature request signing from an API key id and RSA secret key
//! - [`client`] - Main client for making API requests against a base URL
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use isctl::intersight::{auth::KeyFileCredentials, client::IntersightClient};
//!
//! async fn example() -> isctl::Result<()> {
//!     let credentials = KeyFileCredentials::from_file("key-id", "SecretKey.txt".as_ref())?;
//!     let client = IntersightClient::new(
//!         isctl::intersight::client::DEFAULT_BASE_URL,
//!         Arc::new(credentials),
//!     )?;
//!     let blades = client.get("compute/Blades").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
