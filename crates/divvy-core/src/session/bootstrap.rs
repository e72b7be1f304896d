//! One-shot session bootstrap.
//!
//! At startup the client tries to turn the saved credential entry into a live
//! session: read the entry, refresh with its stored refresh token, persist the
//! rotated pair, and flip the shared authenticated flag. The pipeline never
//! returns an error; every degraded path folds into a [`BootstrapOutcome`]
//! and is logged at warn.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::auth::backend::AuthBackend;
use crate::auth::credentials::{CredentialStore, TokenBlob};
use crate::session::state::SessionContext;

/// Verdict of a bootstrap run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// No saved entry; the user signs in by hand.
    NoCredential,
    /// An entry existed but could not be used: the store read failed or the
    /// password side was not a token blob with a refresh token.
    InvalidCredential,
    /// The refresh request never produced an HTTP response.
    RefreshFailed,
    /// The server answered 200 and the rotated pair was persisted.
    Refreshed,
    /// The server answered something other than 200. The stored entry is
    /// left untouched.
    RefreshRejected {
        /// HTTP status the server answered with.
        status: u16,
    },
    /// The pipeline was cancelled between steps. The authenticated flag
    /// keeps whatever value it had before the run.
    Cancelled,
}

impl BootstrapOutcome {
    /// Whether this outcome flips the session to authenticated.
    ///
    /// `RefreshRejected` grants access: the mobile client marks the session
    /// authenticated whenever an entry existed and the refresh round-trip
    /// completed, regardless of status. Callers that want a stricter gate
    /// must match on the outcome itself.
    pub fn grants_access(&self) -> bool {
        matches!(
            self,
            BootstrapOutcome::Refreshed | BootstrapOutcome::RefreshRejected { .. }
        )
    }

    /// Short machine-friendly label for logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            BootstrapOutcome::NoCredential => "no_credential",
            BootstrapOutcome::InvalidCredential => "invalid_credential",
            BootstrapOutcome::RefreshFailed => "refresh_failed",
            BootstrapOutcome::Refreshed => "refreshed",
            BootstrapOutcome::RefreshRejected { .. } => "refresh_rejected",
            BootstrapOutcome::Cancelled => "cancelled",
        }
    }
}

/// One-shot pipeline turning the saved credential into a live session.
///
/// `run` consumes the bootstrapper, so a second run of the same instance is
/// a compile error. The mobile client got the same guarantee from a
/// mount-once effect.
pub struct SessionBootstrapper<S, A> {
    store: S,
    backend: A,
    cancel: CancellationToken,
}

impl<S: CredentialStore, A: AuthBackend> SessionBootstrapper<S, A> {
    /// Creates a bootstrapper over a credential store and refresh backend.
    pub fn new(store: S, backend: A) -> Self {
        Self {
            store,
            backend,
            cancel: CancellationToken::new(),
        }
    }

    /// Returns a token that cancels the pipeline between steps.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the pipeline to completion.
    ///
    /// The loading flag wraps the whole run. The authenticated flag is set
    /// before loading clears, in the order the mobile client applies them.
    pub async fn run(self, ctx: &SessionContext) -> BootstrapOutcome {
        ctx.set_loading(true);
        let outcome = self.run_inner().await;

        if outcome.grants_access() {
            ctx.set_authenticated(true);
        }
        ctx.set_loading(false);

        debug!(outcome = outcome.label(), "session bootstrap finished");
        outcome
    }

    async fn run_inner(&self) -> BootstrapOutcome {
        if self.cancel.is_cancelled() {
            return BootstrapOutcome::Cancelled;
        }

        // Step 1: read the saved entry.
        let entry = match self.store.get().await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!("no saved credential entry");
                return BootstrapOutcome::NoCredential;
            }
            Err(e) => {
                warn!("credential store read failed: {e:#}");
                return BootstrapOutcome::InvalidCredential;
            }
        };

        // Step 2: the password side must carry a refresh token.
        let blob = match TokenBlob::parse(&entry.password) {
            Ok(blob) => blob,
            Err(e) => {
                warn!("saved credential is unusable: {e}");
                return BootstrapOutcome::InvalidCredential;
            }
        };

        if self.cancel.is_cancelled() {
            return BootstrapOutcome::Cancelled;
        }

        // Step 3: refresh with the stored refresh token.
        let authorization = format!("Bearer {}", blob.refresh);
        let response = match self.backend.refresh(&authorization).await {
            Ok(response) => response,
            Err(e) => {
                warn!("token refresh request failed: {e:#}");
                return BootstrapOutcome::RefreshFailed;
            }
        };

        if self.cancel.is_cancelled() {
            return BootstrapOutcome::Cancelled;
        }

        if response.status != 200 {
            warn!(
                status = response.status,
                "refresh rejected; session still counts as signed in"
            );
            return BootstrapOutcome::RefreshRejected {
                status: response.status,
            };
        }

        // Backend contract: a 200 carries tokens. A backend that breaks it
        // is treated like a failed refresh.
        let Some(pair) = response.tokens else {
            warn!("refresh returned 200 without tokens");
            return BootstrapOutcome::RefreshFailed;
        };

        // Step 4: persist the rotated pair under the same username.
        // Access is granted either way; a failed write only means the old
        // entry stays behind.
        let rotated = TokenBlob {
            access: Some(pair.access_token),
            refresh: pair.refresh_token,
        };
        match rotated.to_password() {
            Ok(password) => {
                if let Err(e) = self.store.set(&entry.username, &password).await {
                    warn!("failed to persist rotated tokens: {e:#}");
                }
            }
            Err(e) => {
                warn!("failed to serialize rotated tokens: {e:#}");
            }
        }

        BootstrapOutcome::Refreshed
    }
}
