//! Session module: shared auth state and the startup bootstrap.
//!
//! This module contains:
//! - `state`: Session flags behind a cloneable context handle
//! - `bootstrap`: One-shot pipeline turning a saved credential into a session

pub mod bootstrap;
pub mod state;
