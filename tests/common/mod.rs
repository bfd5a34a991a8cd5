//! Shared fixtures for the integration tests
//!
//! A three-climb catalog, annotators over in-memory stores, and helpers for
//! driving the HTTP router without a socket.

#![allow(dead_code)]

pub mod catalog;
pub mod http;

pub use catalog::{catalog_json, three_climb_catalog};
pub use http::{app, app_with_timeout, send};
