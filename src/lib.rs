//! Pool DB - swimming-pool water chemistry tracker
//!
//! This library exposes the core modules for testing and reuse.

pub mod capture;
pub mod chem;
pub mod common;
pub mod config;
pub mod entity;
pub mod error;
pub mod routes;
pub mod sensors;
pub mod store;
