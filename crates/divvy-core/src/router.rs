//! Route gating over the session state.
//!
//! Mirrors the mobile client's navigator: the loading screen while the
//! bootstrap runs, the signed-in stack once authenticated, otherwise the
//! sign-in screen. The route set is pure data; rendering is out of scope.

use crate::session::state::{SessionContext, SessionState};

/// A navigable screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Loading,
    Home,
    Expense,
    FriendExpenses,
    SignIn,
}

impl Destination {
    /// Screen name as registered with the mobile navigator.
    pub fn name(&self) -> &'static str {
        match self {
            Destination::Loading => "Loading",
            Destination::Home => "Home",
            Destination::Expense => "Expense",
            Destination::FriendExpenses => "FriendExpenses",
            Destination::SignIn => "SignIn",
        }
    }
}

/// The set of destinations mounted for a given session state.
///
/// Exactly one set is mounted at a time; navigation can only reach
/// destinations inside the current set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSet {
    /// Bootstrap in flight; only the loading screen exists.
    Loading,
    /// Signed in; the home stack.
    Authenticated,
    /// Signed out; only the sign-in screen exists.
    Unauthenticated,
}

impl RouteSet {
    /// The set mounted before any session state has been observed.
    ///
    /// The bootstrap starts at mount, so the first observable frame is the
    /// loading screen.
    pub fn initial() -> Self {
        RouteSet::Loading
    }

    /// Stable lower-case label, used in logs and machine-readable output.
    pub fn name(&self) -> &'static str {
        match self {
            RouteSet::Loading => "loading",
            RouteSet::Authenticated => "authenticated",
            RouteSet::Unauthenticated => "unauthenticated",
        }
    }

    /// Destinations in this set. The first entry is the screen shown first.
    pub fn destinations(&self) -> &'static [Destination] {
        match self {
            RouteSet::Loading => &[Destination::Loading],
            RouteSet::Authenticated => &[
                Destination::Home,
                Destination::Expense,
                Destination::FriendExpenses,
            ],
            RouteSet::Unauthenticated => &[Destination::SignIn],
        }
    }

    /// Whether a destination is reachable in this set.
    pub fn contains(&self, destination: Destination) -> bool {
        self.destinations().contains(&destination)
    }
}

/// Maps session flags to the mounted route set.
///
/// Loading wins over everything else; authenticated wins over signed out.
pub fn route_for(state: SessionState) -> RouteSet {
    if state.is_loading {
        RouteSet::Loading
    } else if state.is_authenticated {
        RouteSet::Authenticated
    } else {
        RouteSet::Unauthenticated
    }
}

/// Read handle pairing a session context with the route mapping.
#[derive(Debug, Clone)]
pub struct RouteGate {
    ctx: SessionContext,
}

impl RouteGate {
    /// Creates a gate over a session context.
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    /// Returns the route set for the context's current state.
    pub fn current(&self) -> RouteSet {
        route_for(self.ctx.snapshot())
    }
}
