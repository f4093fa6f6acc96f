//! Session manager: the single source of truth for who is logged in.
//!
//! State is published through a `watch` channel. Every committed transition
//! bumps a generation counter; async identity fetches remember the
//! generation they started under and their results are dropped if it has
//! moved on (e.g. a logout landed while `/auth/current_user` was in flight).
//! Generation checks and the writes they guard run under the channel's
//! write lock, so they serialize with `logout`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::api::AuthApi;
use super::credentials::CredentialStore;
#[cfg(any(test, feature = "demo-login"))]
use super::demo::DemoLogin;
use super::error::{AuthError, LineCallbackError};
use super::line::{LineCallback, LineOAuth};
use super::models::{AuthUser, LoginCredentials, Route, View};
use crate::common::{safe_email_log, safe_token_log};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Bootstrapping,
    Authenticated,
    Unauthenticated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub status: SessionStatus,
    pub user: Option<AuthUser>,
    /// True during bootstrap or an in-flight login
    pub is_loading: bool,
}

impl SessionState {
    fn bootstrapping() -> Self {
        Self {
            status: SessionStatus::Bootstrapping,
            user: None,
            is_loading: true,
        }
    }

    fn authenticated(user: AuthUser) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            user: Some(user),
            is_loading: false,
        }
    }

    fn unauthenticated() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            user: None,
            is_loading: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Redirect required before rendering `view`, if any
pub fn route_for(state: &SessionState, view: View) -> Option<Route> {
    if state.is_loading {
        return None;
    }
    match view {
        View::Protected if !state.is_authenticated() => Some(Route::Login),
        View::Login if state.is_authenticated() => Some(Route::Dashboard),
        _ => None,
    }
}

pub struct SessionManager {
    api: Arc<dyn AuthApi>,
    credentials: CredentialStore,
    line: Option<LineOAuth>,
    state: watch::Sender<SessionState>,
    generation: AtomicU64,
    bootstrapped: AtomicBool,
    #[cfg(any(test, feature = "demo-login"))]
    demo: Option<DemoLogin>,
}

impl SessionManager {
    pub fn new(api: Arc<dyn AuthApi>, credentials: CredentialStore) -> Self {
        let (state, _) = watch::channel(SessionState::bootstrapping());
        Self {
            api,
            credentials,
            line: None,
            state,
            generation: AtomicU64::new(0),
            bootstrapped: AtomicBool::new(false),
            #[cfg(any(test, feature = "demo-login"))]
            demo: None,
        }
    }

    pub fn with_line(mut self, line: LineOAuth) -> Self {
        self.line = Some(line);
        self
    }

    #[cfg(any(test, feature = "demo-login"))]
    pub fn with_demo_login(mut self, demo: DemoLogin) -> Self {
        self.demo = Some(demo);
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn line(&self) -> Option<&LineOAuth> {
        self.line.as_ref()
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    // ------------------------------------------------------------------------
    // Bootstrap
    // ------------------------------------------------------------------------

    /// Restores the session from persisted credentials. Runs at most once.
    ///
    /// With a token and a readable snapshot the session is published as
    /// authenticated immediately, then revalidated against the backend.
    pub async fn bootstrap(&self) {
        if self.bootstrapped.swap(true, Ordering::SeqCst) {
            warn!("Session bootstrap already ran, ignoring");
            return;
        }

        let start = self.generation.load(Ordering::SeqCst);

        let token = self.credentials.token().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read stored auth token");
            None
        });

        let Some(token) = token else {
            debug!("No stored auth token, session is unauthenticated");
            let _ = self.guarded(start, true, |state| {
                *state = SessionState::unauthenticated();
                Ok(())
            });
            return;
        };

        debug!(token = %safe_token_log(&token), "Found stored auth token");

        match self.credentials.cached_user() {
            Ok(Some(user)) => {
                let user = user.with_derived_name();
                debug!(user_id = %user.id, "Using cached user while revalidating");
                let _ = self.guarded(start, false, |state| {
                    *state = SessionState::authenticated(user);
                    Ok(())
                });
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to read cached user"),
        }

        let outcome = match self.api.current_user().await {
            Ok(user) => {
                let user = user.with_derived_name();
                self.guarded(start, true, |state| {
                    self.persist_snapshot(&user);
                    info!(user_id = %user.id, "Session revalidated");
                    *state = SessionState::authenticated(user.clone());
                    Ok(())
                })
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch current user, clearing session");
                self.guarded(start, true, |state| {
                    self.clear_credentials();
                    *state = SessionState::unauthenticated();
                    Ok(())
                })
            }
        };

        if let Err(AuthError::Superseded) = outcome {
            debug!("Discarding stale revalidation result; session changed meanwhile");
        }
    }

    /// Runs [`SessionManager::bootstrap`] on the tokio runtime
    pub fn spawn_bootstrap(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.bootstrap().await })
    }

    // ------------------------------------------------------------------------
    // Login / logout
    // ------------------------------------------------------------------------

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        #[cfg(any(test, feature = "demo-login"))]
        {
            if let Some(demo) = self.demo.as_ref().filter(|d| d.matches(email, password)) {
                return self.login_demo(demo);
            }
        }

        info!(email = %safe_email_log(email), provider = "password", "Login requested");

        let credentials = LoginCredentials {
            email: email.to_string(),
            password: password.to_string(),
        };

        let generation = self.begin_loading();
        let outcome = match self.api.login(&credentials).await {
            Ok(response) => {
                self.complete_token_login(generation, response.access_token, response.refresh_token)
                    .await
            }
            Err(e) => Err(e.into()),
        };
        self.finish_login(generation, "password", outcome)
    }

    pub async fn login_with_google(&self, id_token: &str) -> Result<AuthUser, AuthError> {
        info!(provider = "google", "Login requested");

        let generation = self.begin_loading();
        let outcome = match self.api.login_with_google(id_token).await {
            Ok(response) => {
                self.complete_token_login(generation, response.access_token, response.refresh_token)
                    .await
            }
            Err(e) => Err(e.into()),
        };
        self.finish_login(generation, "google", outcome)
    }

    /// Exchanges a LINE authorization code. The identity comes back with the
    /// token, so no `/auth/current_user` call is made.
    pub async fn login_with_line(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AuthUser, AuthError> {
        info!(provider = "line", redirect_uri = %redirect_uri, "Login requested");

        let generation = self.begin_loading();
        let outcome = match self.api.exchange_line_code(code, redirect_uri).await {
            Ok(response) => {
                let token = response.access_token.filter(|t| !t.is_empty());
                match token {
                    None => Err(AuthError::MissingToken),
                    Some(token) => {
                        let user = response.user.unwrap_or_default().into_auth_user();
                        let refresh_token = response.refresh_token;
                        self.guarded(generation, true, |state| {
                            self.store_tokens(&token, refresh_token.as_deref())?;
                            self.persist_snapshot(&user);
                            *state = SessionState::authenticated(user.clone());
                            Ok(user.clone())
                        })
                    }
                }
            }
            Err(e) => Err(e.into()),
        };
        self.finish_login(generation, "line", outcome)
    }

    /// Validates a LINE callback (provider error, code, CSRF state) and
    /// completes the login with the configured callback URL.
    pub async fn complete_line_login(
        &self,
        callback: &LineCallback,
    ) -> Result<AuthUser, LineCallbackError> {
        let line = self
            .line
            .as_ref()
            .ok_or(AuthError::NotConfigured("LINE_CHANNEL_ID"))?;

        let code = line.check_callback(callback)?;
        let user = self.login_with_line(&code, line.callback_url()).await?;
        Ok(user)
    }

    /// Local-only logout. Any identity fetch still in flight is invalidated.
    pub fn logout(&self) -> Route {
        self.sign_out();
        info!("User logged out");
        Route::Login
    }

    /// The backend rejected the stored token on some authenticated call.
    /// Signs the session out the same way `logout` does.
    pub fn handle_unauthorized(&self) -> Route {
        if self.sign_out() {
            warn!("Session token rejected by the backend, signed out");
        }
        Route::Login
    }

    /// Hook for an `ApiClient` that shares this manager's credentials. Holds
    /// only a weak handle, so the client may outlive the manager.
    pub fn unauthorized_hook(self: &Arc<Self>) -> impl Fn() + Send + Sync + 'static {
        let manager = Arc::downgrade(self);
        move || {
            if let Some(manager) = manager.upgrade() {
                manager.handle_unauthorized();
            }
        }
    }

    /// Soft refresh of the identity snapshot. Failures are logged and leave
    /// the session alone, except a 401 which signs it out.
    pub async fn refresh_user(&self) {
        let generation = self.generation.load(Ordering::SeqCst);

        let user = match self.api.current_user().await {
            Ok(user) => user.with_derived_name(),
            Err(e) if e.is_unauthorized() => {
                self.handle_unauthorized();
                return;
            }
            Err(e) => {
                warn!(error = %e, "Failed to refresh user");
                return;
            }
        };

        let outcome = self.guarded(generation, false, |state| {
            if state.status != SessionStatus::Authenticated {
                return Err(AuthError::Superseded);
            }
            self.persist_snapshot(&user);
            state.user = Some(user.clone());
            Ok(())
        });

        match outcome {
            Ok(()) => debug!(user_id = %user.id, "User refreshed"),
            Err(e) => debug!(error = %e, "Discarding refreshed user"),
        }
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Runs `f` under the state lock if no transition happened since
    /// `expected`; otherwise returns `AuthError::Superseded` without running
    /// it. `bump` marks a committed transition.
    fn guarded<R, F>(&self, expected: u64, bump: bool, f: F) -> Result<R, AuthError>
    where
        F: FnOnce(&mut SessionState) -> Result<R, AuthError>,
    {
        let mut outcome = None;
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != expected {
                return false;
            }
            let before = state.clone();
            let result = f(state);
            if result.is_ok() && bump {
                self.generation.fetch_add(1, Ordering::SeqCst);
            }
            outcome = Some(result);
            *state != before
        });
        outcome.unwrap_or(Err(AuthError::Superseded))
    }

    /// Clears credentials and publishes `Unauthenticated` as one committed
    /// transition. Returns whether the published state changed.
    fn sign_out(&self) -> bool {
        self.state.send_if_modified(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            self.clear_credentials();
            let next = SessionState::unauthenticated();
            let changed = *state != next;
            *state = next;
            changed
        })
    }

    fn begin_loading(&self) -> u64 {
        let mut generation = 0;
        self.state.send_if_modified(|state| {
            generation = self.generation.load(Ordering::SeqCst);
            let changed = !state.is_loading;
            state.is_loading = true;
            changed
        });
        generation
    }

    async fn complete_token_login(
        &self,
        generation: u64,
        access_token: Option<String>,
        refresh_token: Option<String>,
    ) -> Result<AuthUser, AuthError> {
        let token = access_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        // The identity call authenticates with the stored token
        self.guarded(generation, false, |_| {
            self.store_tokens(&token, refresh_token.as_deref())
        })?;

        let user = match self.api.current_user().await {
            Ok(user) => user.with_derived_name(),
            Err(e) => {
                // The previous identity went with the old token
                let _ = self.guarded(generation, true, |state| {
                    self.clear_credentials();
                    *state = SessionState::unauthenticated();
                    Ok(())
                });
                return Err(e.into());
            }
        };

        self.guarded(generation, true, |state| {
            self.persist_snapshot(&user);
            *state = SessionState::authenticated(user.clone());
            Ok(user.clone())
        })
    }

    fn finish_login(
        &self,
        generation: u64,
        provider: &'static str,
        outcome: Result<AuthUser, AuthError>,
    ) -> Result<AuthUser, AuthError> {
        match &outcome {
            Ok(user) => info!(
                user_id = %user.id,
                email = %safe_email_log(&user.email),
                provider = provider,
                "Login successful"
            ),
            Err(AuthError::Superseded) => warn!(
                provider = provider,
                "Discarding login result; session changed while it was in flight"
            ),
            Err(e) => {
                warn!(error = %e, provider = provider, "Login failed");
                let _ = self.guarded(generation, false, |state| {
                    state.is_loading = false;
                    if state.user.is_none() {
                        state.status = SessionStatus::Unauthenticated;
                    }
                    Ok(())
                });
            }
        }
        outcome
    }

    #[cfg(any(test, feature = "demo-login"))]
    fn login_demo(&self, demo: &DemoLogin) -> Result<AuthUser, AuthError> {
        warn!("Demo credentials used, bypassing backend authentication");

        let user = demo.user();
        let generation = self.generation.load(Ordering::SeqCst);
        self.guarded(generation, true, |state| {
            self.store_tokens(&demo.token, None)?;
            self.persist_snapshot(&user);
            *state = SessionState::authenticated(user.clone());
            Ok(user.clone())
        })
    }

    fn store_tokens(&self, token: &str, refresh_token: Option<&str>) -> Result<(), AuthError> {
        self.credentials.set_token(token)?;
        if let Some(refresh_token) = refresh_token.filter(|t| !t.is_empty()) {
            self.credentials.set_refresh_token(refresh_token)?;
        }
        Ok(())
    }

    // The snapshot only speeds up the next bootstrap; failing to write it is not fatal.
    fn persist_snapshot(&self, user: &AuthUser) {
        if let Err(e) = self.credentials.set_cached_user(user) {
            warn!(error = %e, user_id = %user.id, "Failed to persist user snapshot");
        }
    }

    fn clear_credentials(&self) {
        if let Err(e) = self.credentials.clear() {
            error!(error = %e, "Failed to clear persisted credentials");
        }
    }
}
