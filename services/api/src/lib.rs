//! services/api/src/lib.rs
//!
//! Library half of the `api` service: the portal adapter, the web boundary,
//! and the ambient configuration and error types the binaries share.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
