//! Auth module: credential storage and token refresh.
//!
//! This module contains:
//! - `credentials`: Stored credential entries and the token blob format
//! - `backend`: The refresh endpoint client and its trait seam

pub mod backend;
pub mod credentials;
