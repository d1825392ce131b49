//! Route guards
//!
//! Both guards start in [`GuardDecision::Unknown`] on every mount and on
//! every navigation, and resolve exactly once to `Allowed` or `Denied`. They never return an error: every
//! failure path becomes a denial, which the view turns into a redirect.

use crate::claims::AccessClaims;
use crate::config::AuthConfig;
use crate::refresh::TokenRefresher;
use crate::store::TokenStore;
use tracing::{debug, info, warn};

/// Why a guard refused to render its view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No access token stored
    NoSession,
    /// Access token could not be decoded
    InvalidSession,
    /// Access token expired and could not be refreshed
    SessionExpired,
    /// Admin view requested without any session
    NotAuthorized,
    /// Session exists but is not staff
    InsufficientPrivilege,
}

impl DenyReason {
    /// Route the visitor is sent to
    pub fn redirect_path(&self) -> &'static str {
        match self {
            Self::NoSession | Self::InvalidSession | Self::SessionExpired => AuthConfig::LOGIN_ROUTE,
            Self::NotAuthorized | Self::InsufficientPrivilege => AuthConfig::HOME_ROUTE,
        }
    }

    /// Message shown after the redirect
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoSession | Self::InvalidSession | Self::SessionExpired => {
                AuthConfig::LOGIN_MESSAGE
            }
            Self::NotAuthorized => AuthConfig::NOT_AUTHORIZED_MESSAGE,
            Self::InsufficientPrivilege => AuthConfig::ADMIN_ONLY_MESSAGE,
        }
    }
}

/// Outcome of a guard evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardDecision {
    /// Verification in flight
    #[default]
    Unknown,
    Allowed,
    Denied(DenyReason),
}

impl GuardDecision {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Guard state for one evaluation: `Unknown` until the first resolution,
/// then fixed until the guard starts over for a different route
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GuardState {
    route: Option<String>,
    decision: GuardDecision,
}

impl GuardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decision(&self) -> GuardDecision {
        self.decision
    }

    /// Route the current evaluation belongs to
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// Start evaluating for `route`. Moving to a different route drops the
    /// previous decision and returns `true`; the same route keeps it.
    pub fn begin(&mut self, route: &str) -> bool {
        if self.route.as_deref() == Some(route) {
            return false;
        }
        self.route = Some(route.to_string());
        self.decision = GuardDecision::Unknown;
        true
    }

    /// Record a terminal decision. Returns `false` and keeps the existing
    /// decision if the state was already resolved or `decision` is `Unknown`.
    pub fn resolve(&mut self, decision: GuardDecision) -> bool {
        if self.decision.is_resolved() || !decision.is_resolved() {
            return false;
        }
        self.decision = decision;
        true
    }

    /// Like [`resolve`](Self::resolve), but ignores a decision computed for a
    /// route the guard has since left.
    pub fn resolve_for(&mut self, route: &str, decision: GuardDecision) -> bool {
        self.route.as_deref() == Some(route) && self.resolve(decision)
    }
}

/// Gate for views that need a signed-in user
pub struct SessionGuard<'a, R: TokenRefresher + ?Sized> {
    store: &'a TokenStore,
    refresher: &'a R,
    leeway_secs: i64,
}

impl<'a, R: TokenRefresher + ?Sized> SessionGuard<'a, R> {
    pub fn new(store: &'a TokenStore, refresher: &'a R) -> Self {
        Self {
            store,
            refresher,
            leeway_secs: 0,
        }
    }

    /// Treat tokens expiring within `leeway_secs` as already expired.
    /// Negative values are clamped to zero.
    pub fn with_leeway(mut self, leeway_secs: i64) -> Self {
        self.leeway_secs = leeway_secs.max(0);
        self
    }

    pub async fn evaluate(&self) -> GuardDecision {
        let decision = self.decide().await;
        debug!("Session guard resolved to {decision:?}");
        decision
    }

    async fn decide(&self) -> GuardDecision {
        let Some(access_token) = self.store.access_token() else {
            return GuardDecision::Denied(DenyReason::NoSession);
        };

        let claims = match AccessClaims::decode(&access_token) {
            Ok(claims) => claims,
            Err(e) => {
                // A corrupt token is not refreshed even if a refresh token exists.
                warn!("Stored access token is unreadable: {e}");
                return GuardDecision::Denied(DenyReason::InvalidSession);
            }
        };

        if !claims.is_expired(self.leeway_secs) {
            return GuardDecision::Allowed;
        }

        if self.store.refresh_token().is_none() {
            info!("Access token expired and no refresh token is stored");
            return GuardDecision::Denied(DenyReason::SessionExpired);
        }

        match self
            .store
            .refresh_with(self.refresher, Some(access_token.as_str()))
            .await
        {
            Ok(_) => GuardDecision::Allowed,
            Err(e) if e.is_transient() => {
                warn!("Session refresh could not reach the server: {e}");
                GuardDecision::Denied(DenyReason::SessionExpired)
            }
            Err(e) => {
                info!("Session refresh rejected: {e}");
                GuardDecision::Denied(DenyReason::SessionExpired)
            }
        }
    }
}

/// Gate for staff-only views.
///
/// Assumes authentication is established elsewhere; it only checks the
/// privilege claim and never consults expiry or the network.
pub struct AdminGuard<'a> {
    store: &'a TokenStore,
}

impl<'a> AdminGuard<'a> {
    pub fn new(store: &'a TokenStore) -> Self {
        Self { store }
    }

    pub fn evaluate(&self) -> GuardDecision {
        let decision = match self.store.access_token() {
            None => GuardDecision::Denied(DenyReason::NotAuthorized),
            Some(token) => match AccessClaims::decode(&token) {
                Ok(claims) if claims.is_staff => GuardDecision::Allowed,
                Ok(_) => GuardDecision::Denied(DenyReason::InsufficientPrivilege),
                Err(e) => {
                    warn!("Stored access token is unreadable: {e}");
                    GuardDecision::Denied(DenyReason::InsufficientPrivilege)
                }
            },
        };
        debug!("Admin guard resolved to {decision:?}");
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::encode_unsigned;
    use crate::session::Session;
    use crate::tests::refresher::FakeRefresher;
    use chrono::Utc;

    fn token(exp_offset_secs: i64, is_staff: bool) -> String {
        encode_unsigned(&AccessClaims {
            exp: Utc::now().timestamp() + exp_offset_secs,
            is_staff,
            user_id: Some(42),
            username: Some("reader".to_string()),
        })
    }

    fn store_with(access: Option<&str>, refresh: Option<&str>) -> TokenStore {
        let store = TokenStore::in_memory();
        if let Some(access) = access {
            store.set_access_token(access).unwrap();
        }
        if let (Some(access), Some(refresh)) = (access, refresh) {
            store.save(&Session::new(access, refresh)).unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_session_guard_denies_without_token() {
        let store = TokenStore::in_memory();
        let refresher = FakeRefresher::succeeding("new");

        let decision = SessionGuard::new(&store, &refresher).evaluate().await;

        assert_eq!(decision, GuardDecision::Denied(DenyReason::NoSession));
        assert_eq!(refresher.calls(), 0);
    }

    #[tokio::test]
    async fn test_session_guard_allows_valid_token_without_network() {
        let access = token(3600, false);
        let store = store_with(Some(access.as_str()), Some("refresh"));
        let refresher = FakeRefresher::succeeding("new");

        for _ in 0..3 {
            let decision = SessionGuard::new(&store, &refresher).evaluate().await;
            assert_eq!(decision, GuardDecision::Allowed);
        }
        assert_eq!(refresher.calls(), 0);
        assert_eq!(store.access_token(), Some(access));
    }

    #[tokio::test]
    async fn test_session_guard_expired_without_refresh_token_skips_network() {
        let store = store_with(Some(token(-60, false).as_str()), None);
        let refresher = FakeRefresher::succeeding("new");

        let decision = SessionGuard::new(&store, &refresher).evaluate().await;

        assert_eq!(decision, GuardDecision::Denied(DenyReason::SessionExpired));
        assert_eq!(refresher.calls(), 0);
    }

    #[tokio::test]
    async fn test_session_guard_refreshes_expired_token() {
        let store = store_with(Some(token(-60, false).as_str()), Some("refresh"));
        let refresher = FakeRefresher::succeeding("new");

        let decision = SessionGuard::new(&store, &refresher).evaluate().await;

        assert_eq!(decision, GuardDecision::Allowed);
        assert_eq!(store.access_token().as_deref(), Some("new"));
        assert_eq!(refresher.calls(), 1);
    }

    #[tokio::test]
    async fn test_session_guard_denies_when_refresh_rejected() {
        let store = store_with(Some(token(-60, false).as_str()), Some("refresh"));
        let refresher = FakeRefresher::rejecting(400);

        let decision = SessionGuard::new(&store, &refresher).evaluate().await;

        assert_eq!(decision, GuardDecision::Denied(DenyReason::SessionExpired));
        let GuardDecision::Denied(reason) = decision else {
            unreachable!()
        };
        assert_eq!(reason.redirect_path(), "/login");
        assert_eq!(reason.message(), "Please log in to continue.");
    }

    #[tokio::test]
    async fn test_session_guard_denies_when_refresh_unreachable() {
        let store = store_with(Some(token(-60, false).as_str()), Some("refresh"));
        let refresher = FakeRefresher::unreachable();

        let decision = SessionGuard::new(&store, &refresher).evaluate().await;

        assert_eq!(decision, GuardDecision::Denied(DenyReason::SessionExpired));
    }

    #[tokio::test]
    async fn test_session_guard_does_not_refresh_corrupt_token() {
        let store = store_with(Some("garbage"), Some("refresh"));
        let refresher = FakeRefresher::succeeding("new");

        let decision = SessionGuard::new(&store, &refresher).evaluate().await;

        assert_eq!(decision, GuardDecision::Denied(DenyReason::InvalidSession));
        assert_eq!(refresher.calls(), 0);
    }

    #[tokio::test]
    async fn test_session_guard_leeway_triggers_early_refresh() {
        let store = store_with(Some(token(20, false).as_str()), Some("refresh"));
        let refresher = FakeRefresher::succeeding("new");

        let decision = SessionGuard::new(&store, &refresher)
            .with_leeway(30)
            .evaluate()
            .await;

        assert_eq!(decision, GuardDecision::Allowed);
        assert_eq!(refresher.calls(), 1);
    }

    #[tokio::test]
    async fn test_session_guard_survives_extreme_leeway() {
        let store = store_with(Some(token(3600, false).as_str()), Some("refresh"));
        let refresher = FakeRefresher::succeeding("new");

        let decision = SessionGuard::new(&store, &refresher)
            .with_leeway(i64::MAX)
            .evaluate()
            .await;
        assert_eq!(decision, GuardDecision::Allowed);
        assert_eq!(refresher.calls(), 1);

        let store = store_with(Some(token(3600, false).as_str()), Some("refresh"));
        let refresher = FakeRefresher::succeeding("new");
        let decision = SessionGuard::new(&store, &refresher)
            .with_leeway(i64::MIN)
            .evaluate()
            .await;
        assert_eq!(decision, GuardDecision::Allowed);
        assert_eq!(refresher.calls(), 0);
    }

    #[test]
    fn test_admin_guard_denies_without_token() {
        let store = TokenStore::in_memory();
        let decision = AdminGuard::new(&store).evaluate();
        assert_eq!(decision, GuardDecision::Denied(DenyReason::NotAuthorized));
        assert_eq!(DenyReason::NotAuthorized.redirect_path(), "/");
    }

    #[test]
    fn test_admin_guard_checks_staff_claim_regardless_of_expiry() {
        for offset in [3600, -3600] {
            let store = store_with(Some(token(offset, false).as_str()), Some("refresh"));
            assert_eq!(
                AdminGuard::new(&store).evaluate(),
                GuardDecision::Denied(DenyReason::InsufficientPrivilege)
            );

            let store = store_with(Some(token(offset, true).as_str()), Some("refresh"));
            assert_eq!(AdminGuard::new(&store).evaluate(), GuardDecision::Allowed);
        }
    }

    #[test]
    fn test_admin_guard_treats_corrupt_token_as_not_staff() {
        let store = store_with(Some("garbage"), None);
        assert_eq!(
            AdminGuard::new(&store).evaluate(),
            GuardDecision::Denied(DenyReason::InsufficientPrivilege)
        );
    }

    #[tokio::test]
    async fn test_valid_non_admin_scenario() {
        let store = store_with(Some(token(3600, false).as_str()), Some("refresh"));
        let refresher = FakeRefresher::succeeding("new");

        assert_eq!(
            SessionGuard::new(&store, &refresher).evaluate().await,
            GuardDecision::Allowed
        );
        let admin = AdminGuard::new(&store).evaluate();
        assert_eq!(admin, GuardDecision::Denied(DenyReason::InsufficientPrivilege));
        assert_eq!(DenyReason::InsufficientPrivilege.message(), "must be admin");
        assert_eq!(DenyReason::InsufficientPrivilege.redirect_path(), "/");
    }

    #[test]
    fn test_guard_state_resolves_once() {
        let mut state = GuardState::new();
        assert_eq!(state.decision(), GuardDecision::Unknown);

        assert!(!state.resolve(GuardDecision::Unknown));
        assert!(state.resolve(GuardDecision::Allowed));
        assert!(!state.resolve(GuardDecision::Denied(DenyReason::NoSession)));
        assert_eq!(state.decision(), GuardDecision::Allowed);
    }

    #[test]
    fn test_guard_state_starts_over_on_new_route() {
        let mut state = GuardState::new();
        assert!(state.begin("/orders"));
        assert!(state.resolve_for("/orders", GuardDecision::Allowed));

        // Same route: the decision stands.
        assert!(!state.begin("/orders"));
        assert_eq!(state.decision(), GuardDecision::Allowed);

        assert!(state.begin("/admin"));
        assert_eq!(state.decision(), GuardDecision::Unknown);
        assert_eq!(state.route(), Some("/admin"));

        // A late answer for the route we left is dropped.
        assert!(!state.resolve_for("/orders", GuardDecision::Allowed));
        assert_eq!(state.decision(), GuardDecision::Unknown);

        let denied = GuardDecision::Denied(DenyReason::InsufficientPrivilege);
        assert!(state.resolve_for("/admin", denied));
        assert_eq!(state.decision(), denied);
    }
}
