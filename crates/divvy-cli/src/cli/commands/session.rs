//! Session command handler.
//!
//! Runs the startup bootstrap against the real credential store and auth
//! backend, then reports the resulting route set the way the app would
//! mount it.

use anyhow::{Context, Result};
use divvy_core::auth::backend::HttpAuthBackend;
use divvy_core::auth::credentials::FileCredentialStore;
use divvy_core::config::Config;
use divvy_core::router;
use divvy_core::session::bootstrap::{BootstrapOutcome, SessionBootstrapper};
use divvy_core::session::state::SessionContext;
use serde::Serialize;

/// Machine-readable summary of one bootstrap run.
#[derive(Serialize)]
struct SessionReport<'a> {
    outcome: &'a str,
    authenticated: bool,
    route_set: &'a str,
    screens: Vec<&'a str>,
}

/// Always exits 0: every bootstrap outcome is a valid answer, including
/// the signed-out ones.
pub async fn run(json: bool) -> Result<()> {
    let config = Config::load().context("load config")?;
    let store = FileCredentialStore::new();
    let backend = HttpAuthBackend::from_config(&config)?;

    let ctx = SessionContext::new();
    let outcome = SessionBootstrapper::new(store, backend).run(&ctx).await;

    let state = ctx.snapshot();
    let routes = router::route_for(state);
    let screens: Vec<&'static str> = routes.destinations().iter().map(|d| d.name()).collect();

    if json {
        let report = SessionReport {
            outcome: outcome.label(),
            authenticated: state.is_authenticated,
            route_set: routes.name(),
            screens,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match outcome {
        BootstrapOutcome::Refreshed => println!("✓ Signed in (tokens refreshed)"),
        BootstrapOutcome::RefreshRejected { status } => {
            println!("✓ Signed in (refresh rejected with status {status})");
        }
        BootstrapOutcome::NoCredential => println!("Not signed in (no saved credential)."),
        BootstrapOutcome::InvalidCredential => {
            println!("Not signed in (saved credential is unusable).");
        }
        BootstrapOutcome::RefreshFailed => println!("Not signed in (token refresh failed)."),
        BootstrapOutcome::Cancelled => println!("Session check cancelled."),
    }
    println!("  Screens: {}", screens.join(", "));

    Ok(())
}
