//! Allowed-role resolution for gated commands.
//!
//! The "allowed role" has three sources, in precedence order: a runtime
//! override set by `/setrole` during this process lifetime, the value
//! persisted behind the mediation API, and a static fallback from
//! deployment configuration. When none yields a role, gated commands are
//! denied with a distinct "unconfigured" message.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::warn;

use super::client::ApiClient;

/// Runtime role overrides, keyed by guild scope.
///
/// An explicit object with process lifetime, injected into the resolver.
/// Lost on restart; never treated as the source of truth. The lock is only
/// held for map access, never across an await point.
#[derive(Debug, Default)]
pub struct RoleOverrides {
    inner: Mutex<HashMap<Option<String>, String>>,
}

impl RoleOverrides {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an override for the given scope (`None` = global).
    pub fn set(&self, scope: Option<&str>, role_id: &str) {
        let mut map = self.inner.lock().expect("role override lock poisoned");
        map.insert(scope.map(str::to_string), role_id.to_string());
    }

    /// Look up an override: the exact scope first, then the global one.
    #[must_use]
    pub fn get(&self, scope: Option<&str>) -> Option<String> {
        let map = self.inner.lock().expect("role override lock poisoned");
        map.get(&scope.map(str::to_string))
            .or_else(|| map.get(&None))
            .cloned()
    }
}

/// Outcome of an authorization check, worth two distinct user messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    Authorized,
    /// No role is configured anywhere; gated commands are denied.
    NoRoleConfigured,
    /// A role is configured but the actor does not hold it.
    MissingRole,
}

/// Resolves the effective allowed role and decides authorization.
#[derive(Debug)]
pub struct RoleResolver {
    overrides: RoleOverrides,
    fallback: Option<String>,
}

impl RoleResolver {
    #[must_use]
    pub fn new(overrides: RoleOverrides, fallback: Option<String>) -> Self {
        Self { overrides, fallback }
    }

    /// Record a runtime override for the given scope.
    pub fn set_override(&self, scope: Option<&str>, role_id: &str) {
        self.overrides.set(scope, role_id);
    }

    /// Resolve the effective allowed role for a scope.
    ///
    /// Order: runtime override, then the mediation API's persisted value,
    /// then the static fallback. An unreachable API degrades to the
    /// fallback rather than failing the command.
    pub async fn effective_role(&self, scope: Option<&str>, client: &ApiClient) -> Option<String> {
        if let Some(role) = self.overrides.get(scope) {
            return Some(role);
        }

        match client.get_role().await {
            Ok(Some(role)) => Some(role),
            Ok(None) => self.fallback.clone(),
            Err(e) => {
                warn!("Falling back to configured role, config fetch failed: {e}");
                self.fallback.clone()
            }
        }
    }

    /// Decide whether an actor holding `member_role_ids` may run a gated
    /// command in the given scope.
    pub async fn authorize(
        &self,
        scope: Option<&str>,
        member_role_ids: &[String],
        client: &ApiClient,
    ) -> AuthDecision {
        match self.effective_role(scope, client).await {
            None => AuthDecision::NoRoleConfigured,
            Some(role) if role.is_empty() => AuthDecision::NoRoleConfigured,
            Some(role) => {
                if member_role_ids.iter().any(|r| r == &role) {
                    AuthDecision::Authorized
                } else {
                    AuthDecision::MissingRole
                }
            }
        }
    }
}

/// Alternate authorization scheme: a static list of required role ids from
/// deployment configuration. Membership in any listed role authorizes,
/// bypassing the mediation API entirely.
#[must_use]
pub fn authorize_static(required_role_ids: &[String], member_role_ids: &[String]) -> AuthDecision {
    if required_role_ids.is_empty() {
        return AuthDecision::NoRoleConfigured;
    }
    if member_role_ids
        .iter()
        .any(|r| required_role_ids.contains(r))
    {
        AuthDecision::Authorized
    } else {
        AuthDecision::MissingRole
    }
}
