//! isctl - command-line client for the Intersight infrastructure API
//!
//! The interesting part is [`bulk`]: enumerate a mixed collection of compute
//! nodes, route a mutation to each node's own endpoint and report one
//! outcome per node, carrying on past individual failures.

pub mod bulk;
pub mod commands;
pub mod config;
pub mod error;
pub mod intersight;
pub mod resource;

pub use error::{Error, Result};
