//! Permission coordinator: grant checks and batched authorization prompts.
//!
//! How grant state is derived depends on the provider's [`GrantReporting`]:
//!
//! - `PerIdentifier`: the store reports each granted identifier, so grant
//!   state after a prompt is simply read back.
//! - `Coarse`: the store only says whether the prompt succeeded. Every
//!   requested permission is assumed to share that outcome, and the
//!   assumption is remembered for the rest of the session.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tracing::Instrument;
use uuid::Uuid;

use crate::catalog::{GrantReporting, Permission, PermissionCatalog, parse_permissions};
use crate::error::{HealthError, ProviderError};
use crate::observability;
use crate::HealthProvider;

pub struct PermissionCoordinator {
    provider: Arc<dyn HealthProvider>,
    catalog: PermissionCatalog,
    /// One permit: at most one prompt in flight.
    pending: Semaphore,
    /// Identifiers assumed granted after a successful coarse prompt.
    assumed: Mutex<BTreeSet<String>>,
}

impl PermissionCoordinator {
    pub fn new(provider: Arc<dyn HealthProvider>) -> Self {
        let catalog = provider.platform().catalog();
        Self {
            provider,
            catalog,
            pending: Semaphore::new(1),
            assumed: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn catalog(&self) -> PermissionCatalog {
        self.catalog
    }

    async fn effective_granted(&self) -> Result<BTreeSet<String>, ProviderError> {
        let mut granted = self.provider.granted_identifiers().await?;
        if self.provider.grant_reporting() == GrantReporting::Coarse {
            granted.extend(self.assumed.lock().await.iter().cloned());
        }
        Ok(granted)
    }

    /// The subset of `permissions` currently granted, from a single store read.
    pub async fn granted(
        &self,
        permissions: &[Permission],
    ) -> Result<BTreeSet<Permission>, ProviderError> {
        let granted = self.effective_granted().await?;
        Ok(permissions
            .iter()
            .copied()
            .filter(|p| self.catalog.is_satisfied(*p, &granted))
            .collect())
    }

    pub async fn is_granted(&self, permission: Permission) -> Result<bool, ProviderError> {
        Ok(self.granted(&[permission]).await?.contains(&permission))
    }

    /// Grant state for each recognised name in `names`, keyed by that name.
    pub async fn check_granted<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<BTreeMap<String, bool>, HealthError> {
        let requested = parse_permissions(names);
        if requested.is_empty() {
            return Ok(BTreeMap::new());
        }
        let granted = self.effective_granted().await?;
        Ok(self.grant_map(&requested, &granted))
    }

    /// Show one prompt for every recognised name, then report grant state.
    ///
    /// Fails with [`HealthError::RequestPending`] while another prompt is open.
    /// A prompt that errors is reported as all-false rather than an error.
    pub async fn request_granted<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<BTreeMap<String, bool>, HealthError> {
        let requested = parse_permissions(names);
        if requested.is_empty() {
            return Ok(BTreeMap::new());
        }

        let _permit = self
            .pending
            .try_acquire()
            .map_err(|_| HealthError::RequestPending)?;

        let identifiers = self.catalog.native_union(requested.iter().map(|(_, p)| p));
        let token = Uuid::new_v4();
        let span = tracing::info_span!("permission_request", %token, identifiers = identifiers.len());

        self.prompt(&requested, &identifiers).instrument(span).await
    }

    async fn prompt(
        &self,
        requested: &[(String, Permission)],
        identifiers: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, bool>, HealthError> {
        tracing::info!("showing authorization prompt");
        observability::record_permission_prompt(self.catalog.platform());

        let outcome = self.provider.request_authorization(identifiers).await;
        match (outcome, self.provider.grant_reporting()) {
            (Ok(_), GrantReporting::PerIdentifier) => match self.effective_granted().await {
                Ok(granted) => Ok(self.grant_map(requested, &granted)),
                Err(e) => {
                    tracing::warn!(error = %e, "could not read grants after prompt");
                    Ok(uniform_map(requested, false))
                }
            },
            (Ok(accepted), GrantReporting::Coarse) => {
                let mut assumed = self.assumed.lock().await;
                if accepted {
                    assumed.extend(identifiers.iter().cloned());
                } else {
                    assumed.retain(|id| !identifiers.contains(id));
                }
                tracing::debug!(accepted, "coarse prompt outcome applied to all requested");
                Ok(uniform_map(requested, accepted))
            }
            (Err(e), _) => {
                tracing::warn!(error = %e, "authorization prompt failed");
                Ok(uniform_map(requested, false))
            }
        }
    }

    fn grant_map(
        &self,
        requested: &[(String, Permission)],
        granted: &BTreeSet<String>,
    ) -> BTreeMap<String, bool> {
        requested
            .iter()
            .map(|(name, p)| (name.clone(), self.catalog.is_satisfied(*p, granted)))
            .collect()
    }
}

fn uniform_map(requested: &[(String, Permission)], value: bool) -> BTreeMap<String, bool> {
    requested
        .iter()
        .map(|(name, _)| (name.clone(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Platform;
    use crate::fixture::{FixtureData, FixtureProvider, PromptOutcome};
    use crate::test_utils::ScriptedProvider;

    fn hc(granted: &[&str]) -> FixtureData {
        let mut data = FixtureData::new(Platform::HealthConnect);
        data.granted = granted
            .iter()
            .map(|g| format!("android.permission.health.{g}"))
            .collect();
        data
    }

    #[tokio::test]
    async fn check_drops_unknown_names() {
        let provider = Arc::new(FixtureProvider::new(hc(&["READ_STEPS"])));
        let coordinator = PermissionCoordinator::new(provider);
        let map = coordinator
            .check_granted(&["READ_STEPS", "READ_SLEEP", "READ_ROUTE"])
            .await
            .unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["READ_STEPS"], true);
        assert_eq!(map["READ_ROUTE"], false);
        assert!(!map.contains_key("READ_SLEEP"));
    }

    #[tokio::test]
    async fn check_matches_unprefixed_identifiers() {
        let mut data = FixtureData::new(Platform::HealthConnect);
        data.granted = ["READ_HEART_RATE".to_string()].into();
        let coordinator = PermissionCoordinator::new(Arc::new(FixtureProvider::new(data)));
        assert!(coordinator.is_granted(Permission::HeartRate).await.unwrap());
    }

    #[tokio::test]
    async fn multi_identifier_permission_needs_all() {
        let mut data = FixtureData::new(Platform::HealthKit);
        data.granted = ["HKQuantityTypeIdentifierDistanceCycling".to_string()].into();
        let provider = Arc::new(FixtureProvider::new(data.clone()));
        let coordinator = PermissionCoordinator::new(provider);
        assert!(!coordinator.is_granted(Permission::Distance).await.unwrap());

        data.granted.extend(
            Platform::HealthKit
                .catalog()
                .resolve_native(Permission::Distance)
                .iter()
                .map(|s| s.to_string()),
        );
        let coordinator = PermissionCoordinator::new(Arc::new(FixtureProvider::new(data)));
        assert!(coordinator.is_granted(Permission::Distance).await.unwrap());
    }

    #[tokio::test]
    async fn request_issues_one_prompt_for_all_permissions() {
        let provider = Arc::new(FixtureProvider::new(hc(&[])));
        let coordinator = PermissionCoordinator::new(provider.clone());
        let map = coordinator
            .request_granted(&[
                "READ_STEPS",
                "READ_WORKOUTS",
                "READ_HEART_RATE",
                "READ_ROUTE",
                "READ_CALORIES",
                "READ_DISTANCE",
            ])
            .await
            .unwrap();
        assert_eq!(provider.authorization_requests(), 1);
        assert!(map.values().all(|v| *v));
    }

    #[tokio::test]
    async fn per_identifier_request_reports_partial_grants() {
        let mut data = hc(&[]);
        data.grantable = Some(["android.permission.health.READ_STEPS".to_string()].into());
        let coordinator = PermissionCoordinator::new(Arc::new(FixtureProvider::new(data)));
        let map = coordinator
            .request_granted(&["READ_STEPS", "READ_DISTANCE"])
            .await
            .unwrap();
        assert_eq!(map["READ_STEPS"], true);
        assert_eq!(map["READ_DISTANCE"], false);
    }

    #[tokio::test]
    async fn coarse_request_shares_outcome_and_remembers_it() {
        let provider = Arc::new(FixtureProvider::new(FixtureData::new(Platform::HealthKit)));
        let coordinator = PermissionCoordinator::new(provider);
        let map = coordinator
            .request_granted(&["READ_DISTANCE", "READ_HEART_RATE"])
            .await
            .unwrap();
        assert!(map.values().all(|v| *v));
        // The store itself reports nothing, the assumption carries over.
        assert!(coordinator.is_granted(Permission::Distance).await.unwrap());
        assert!(!coordinator.is_granted(Permission::Steps).await.unwrap());
    }

    #[tokio::test]
    async fn coarse_denial_is_all_false() {
        let mut data = FixtureData::new(Platform::HealthKit);
        data.prompt = PromptOutcome::Deny;
        let coordinator = PermissionCoordinator::new(Arc::new(FixtureProvider::new(data)));
        let map = coordinator
            .request_granted(&["READ_STEPS", "READ_WORKOUTS"])
            .await
            .unwrap();
        assert_eq!(map.len(), 2);
        assert!(map.values().all(|v| !*v));
    }

    #[tokio::test]
    async fn dismissed_prompt_is_all_false_not_an_error() {
        let mut data = hc(&["READ_STEPS"]);
        data.prompt = PromptOutcome::Dismiss;
        let coordinator = PermissionCoordinator::new(Arc::new(FixtureProvider::new(data)));
        let map = coordinator.request_granted(&["READ_STEPS"]).await.unwrap();
        assert_eq!(map["READ_STEPS"], false);
    }

    #[tokio::test]
    async fn failed_grant_read_after_prompt_is_all_false_not_an_error() {
        let provider = Arc::new(ScriptedProvider::new(hc(&[])).failing_grant_reads());
        let coordinator = PermissionCoordinator::new(provider.clone());
        let map = coordinator
            .request_granted(&["READ_STEPS", "READ_SLEEP"])
            .await
            .unwrap();
        assert_eq!(map, BTreeMap::from([("READ_STEPS".to_string(), false)]));
        assert_eq!(provider.authorization_requests(), 1);
        assert_eq!(provider.granted_reads(), 1);
    }

    #[tokio::test]
    async fn total_calories_is_not_answered_by_active_calories() {
        let provider = Arc::new(FixtureProvider::new(hc(&["READ_ACTIVE_CALORIES_BURNED"])));
        let coordinator = PermissionCoordinator::new(provider);
        let map = coordinator
            .check_granted(&["READ_TOTAL_CALORIES", "READ_ACTIVE_CALORIES"])
            .await
            .unwrap();
        assert_eq!(map, BTreeMap::from([("READ_ACTIVE_CALORIES".to_string(), true)]));
    }

    #[tokio::test]
    async fn empty_request_shows_no_prompt() {
        let provider = Arc::new(FixtureProvider::new(hc(&[])));
        let coordinator = PermissionCoordinator::new(provider.clone());
        let map = coordinator.request_granted(&["READ_SLEEP"]).await.unwrap();
        assert!(map.is_empty());
        assert_eq!(provider.authorization_requests(), 0);
    }

    #[tokio::test]
    async fn second_request_while_pending_is_rejected() {
        let scripted = ScriptedProvider::new(hc(&[])).with_prompt_gate();
        let gate = scripted.prompt_gate().expect("gate");
        let coordinator = Arc::new(PermissionCoordinator::new(Arc::new(scripted)));

        let first = {
            let c = coordinator.clone();
            tokio::spawn(async move { c.request_granted(&["READ_STEPS"]).await })
        };
        gate.opened.notified().await;

        let second = coordinator.request_granted(&["READ_ROUTE"]).await;
        assert!(matches!(second, Err(HealthError::RequestPending)));

        gate.release.notify_one();
        let first = first.await.expect("join").expect("first request");
        assert_eq!(first["READ_STEPS"], true);

        // The slot is free again once the first prompt resolved.
        let gate_again = coordinator.request_granted(&["READ_ROUTE"]);
        gate.release.notify_one();
        assert!(gate_again.await.is_ok());
    }
}
