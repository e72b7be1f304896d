//! Shared session state.
//!
//! Both flags start false. The bootstrap pipeline owns the loading flag;
//! the authenticated flag is public so an interactive sign-in can flip it.

use std::sync::{Arc, Mutex};

/// Session flags read by the route gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Whether the user currently counts as signed in.
    pub is_authenticated: bool,
    /// Whether the startup bootstrap is in flight.
    pub is_loading: bool,
}

/// Cloneable handle to the session state shared by the bootstrap pipeline
/// and the route gate.
///
/// One context exists per app and is passed to whoever needs it; there is
/// no process-wide global.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<Mutex<SessionState>>,
}

impl SessionContext {
    /// Creates a context with both flags false.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the current flags.
    pub fn snapshot(&self) -> SessionState {
        *self.inner.lock().unwrap()
    }

    /// Returns whether the user currently counts as signed in.
    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated
    }

    /// Returns whether the startup bootstrap is in flight.
    pub fn is_loading(&self) -> bool {
        self.snapshot().is_loading
    }

    /// Sets the authenticated flag (bootstrap verdict or interactive sign-in).
    pub fn set_authenticated(&self, value: bool) {
        self.inner.lock().unwrap().is_authenticated = value;
    }

    /// Loading is owned by the bootstrap pipeline.
    pub(crate) fn set_loading(&self, value: bool) {
        self.inner.lock().unwrap().is_loading = value;
    }
}
