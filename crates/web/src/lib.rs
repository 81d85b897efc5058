//! Stockroom web application library.
//!
//! The server is exposed as a library so the router can be driven in
//! process by tests against in-memory stores.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
