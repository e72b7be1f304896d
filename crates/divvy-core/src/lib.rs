//! Core Divvy library (session bootstrap, routing, credential storage, forms).

pub mod auth;
pub mod config;
pub mod form;
pub mod router;
pub mod session;
