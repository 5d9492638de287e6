//! Catalog load state machine.
//!
//! [`CatalogController`] owns the current record list for one active source
//! and drives it through `Idle → Loading → Ready | Failed`. Neither `Ready`
//! nor `Failed` is terminal: a refresh or a source switch starts a new load.
//! Selecting a source that needs a credential it doesn't have parks the
//! controller in `CredentialRequired` until the credential-entry flow
//! finishes.
//!
//! State is published through a `tokio::sync::watch` channel; presentation
//! layers call [`subscribe`](CatalogController::subscribe) and re-render on
//! change instead of the controller reacting to them.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use orrery_catalog::controller::CatalogController;
//! use orrery_catalog::registry::ProviderRegistry;
//! use orrery_catalog::sources::MockSource;
//!
//! let controller = CatalogController::new(
//!     Arc::new(ProviderRegistry::builtin()),
//!     Arc::new(MockSource::new()),
//! );
//! controller.load(false).await;
//! println!("{} models", controller.records().len());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::registry::ProviderRegistry;
use crate::sources::CatalogSource;
use crate::types::ModelRecord;
use crate::{Error, Result};

/// Where the controller is in its load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    /// Nothing loaded yet for the active source.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// Records reflect the last successful fetch.
    Ready,
    /// The last fetch failed; see `last_error`.
    Failed,
    /// The active source needs a credential before it can fetch.
    CredentialRequired,
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadStatus::Idle => "Idle",
            LoadStatus::Loading => "Loading",
            LoadStatus::Ready => "Ready",
            LoadStatus::Failed => "Failed",
            LoadStatus::CredentialRequired => "CredentialRequired",
        };
        f.write_str(name)
    }
}

/// Everything a consumer needs to render the catalog.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    status: LoadStatus,
    records: Arc<Vec<ModelRecord>>,
    last_error: Option<SourceError>,
    active_source_id: String,
    previous_source_id: Option<String>,
    generation: u64,
}

impl CatalogSnapshot {
    fn new(active_source_id: String) -> Self {
        Self {
            status: LoadStatus::Idle,
            records: Arc::default(),
            last_error: None,
            active_source_id,
            previous_source_id: None,
            generation: 0,
        }
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn records(&self) -> &Arc<Vec<ModelRecord>> {
        &self.records
    }

    pub fn last_error(&self) -> Option<&SourceError> {
        self.last_error.as_ref()
    }

    pub fn active_source_id(&self) -> &str {
        &self.active_source_id
    }

    /// Source that was active before the last switch, if any.
    pub fn previous_source_id(&self) -> Option<&str> {
        self.previous_source_id.as_deref()
    }

    /// Incremented on every source switch.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Human-readable explanation when the catalog needs attention.
    pub fn status_message(&self) -> Option<String> {
        match self.status {
            LoadStatus::Failed => self.last_error.as_ref().map(SourceError::user_message),
            LoadStatus::CredentialRequired => Some(SourceError::MissingCredential.user_message()),
            _ => None,
        }
    }
}

/// What a call to [`CatalogController::load`] ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Fetch succeeded and replaced the records.
    Loaded { count: usize },
    /// Fetch failed; the controller is now `Failed`.
    Failed(SourceError),
    /// Another load was already running; nothing was started.
    InFlight,
    /// Already `Ready` and the load wasn't forced.
    AlreadyLoaded,
    /// The source changed while fetching; the result was discarded.
    Superseded,
    /// The source needs a credential; no fetch was attempted.
    CredentialRequired,
}

/// Result of the external credential-entry flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialEntry {
    /// A credential was saved to the store.
    Saved,
    /// The user backed out.
    Cancelled,
}

/// Presents a credential capture UI for a source.
///
/// Implementations save the credential to the same store the source reads
/// from before returning `Saved`.
#[async_trait]
pub trait CredentialPrompt: Send + Sync {
    async fn request(&self, source_id: &str) -> CredentialEntry;
}

enum Begin {
    Start(u64, Arc<dyn CatalogSource>),
    Skip(LoadOutcome),
}

/// State machine over a set of registered sources.
pub struct CatalogController {
    registry: Arc<ProviderRegistry>,
    sources: HashMap<String, Arc<dyn CatalogSource>>,
    state: watch::Sender<CatalogSnapshot>,
}

impl CatalogController {
    /// Create a controller whose active source is `initial`.
    pub fn new(registry: Arc<ProviderRegistry>, initial: Arc<dyn CatalogSource>) -> Self {
        let (state, _) = watch::channel(CatalogSnapshot::new(initial.id().to_string()));
        let mut sources = HashMap::new();
        sources.insert(initial.id().to_string(), initial);
        Self {
            registry,
            sources,
            state,
        }
    }

    /// Register another selectable source.
    pub fn with_source(mut self, source: Arc<dyn CatalogSource>) -> Self {
        self.sources.insert(source.id().to_string(), source);
        self
    }

    /// Registered source ids, sorted.
    pub fn source_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.sources.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Get a registered source by id.
    pub fn source(&self, source_id: &str) -> Option<&Arc<dyn CatalogSource>> {
        self.sources.get(source_id)
    }

    /// Receive every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> LoadStatus {
        self.state.borrow().status
    }

    pub fn records(&self) -> Arc<Vec<ModelRecord>> {
        Arc::clone(&self.state.borrow().records)
    }

    pub fn last_error(&self) -> Option<SourceError> {
        self.state.borrow().last_error.clone()
    }

    pub fn active_source_id(&self) -> String {
        self.state.borrow().active_source_id.clone()
    }

    /// Fetch the active source's list.
    ///
    /// Does nothing while another load is in flight, or when already `Ready`
    /// unless `force` is set. A failure keeps whatever records the previous
    /// successful load for this source produced.
    pub async fn load(&self, force: bool) -> LoadOutcome {
        let mut begin = Begin::Skip(LoadOutcome::InFlight);
        self.state.send_if_modified(|state| match state.status {
            LoadStatus::Loading => false,
            LoadStatus::Ready if !force => {
                begin = Begin::Skip(LoadOutcome::AlreadyLoaded);
                false
            }
            _ => {
                let Some(source) = self.sources.get(&state.active_source_id) else {
                    return false;
                };
                state.status = LoadStatus::Loading;
                begin = Begin::Start(state.generation, Arc::clone(source));
                true
            }
        });

        let (generation, source) = match begin {
            Begin::Start(generation, source) => (generation, source),
            Begin::Skip(outcome) => {
                debug!(?outcome, "load skipped");
                return outcome;
            }
        };

        debug!(source = source.id(), generation, "loading catalog");
        let fetched_at = Utc::now().timestamp();
        let result = source
            .fetch()
            .await
            .map(|raws| {
                self.registry
                    .normalize_all(&raws, source.provider_id(), fetched_at)
            });

        self.finish(generation, source.id(), result)
    }

    /// Apply a fetch result unless the source changed in the meantime.
    fn finish(
        &self,
        generation: u64,
        source_id: &str,
        result: std::result::Result<Vec<ModelRecord>, SourceError>,
    ) -> LoadOutcome {
        let mut outcome = LoadOutcome::Superseded;
        self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            match result {
                Ok(records) => {
                    outcome = LoadOutcome::Loaded {
                        count: records.len(),
                    };
                    state.records = Arc::new(records);
                    state.last_error = None;
                    state.status = LoadStatus::Ready;
                }
                Err(error) => {
                    outcome = LoadOutcome::Failed(error.clone());
                    state.last_error = Some(error);
                    state.status = LoadStatus::Failed;
                }
            }
            true
        });

        match &outcome {
            LoadOutcome::Loaded { count } => debug!(source = source_id, count, "catalog ready"),
            LoadOutcome::Failed(error) => {
                warn!(source = source_id, error = %error, "catalog load failed")
            }
            _ => debug!(source = source_id, generation, "discarding stale fetch result"),
        }
        outcome
    }

    /// Make another registered source active.
    ///
    /// Clears records and error unconditionally. If the source needs a
    /// credential it doesn't have, stops in `CredentialRequired` without
    /// fetching; otherwise loads immediately. A fetch still running for the
    /// old source is left alone and its result discarded.
    pub async fn switch_source(&self, source_id: &str) -> Result<LoadOutcome> {
        let source = self
            .sources
            .get(source_id)
            .ok_or_else(|| Error::SourceNotFound(source_id.to_string()))?;
        let ready = !source.requires_credential() || source.credential_ready();

        self.state.send_modify(|state| {
            if state.active_source_id != source_id {
                let previous =
                    std::mem::replace(&mut state.active_source_id, source_id.to_string());
                state.previous_source_id = Some(previous);
            }
            state.generation += 1;
            state.records = Arc::default();
            state.last_error = None;
            state.status = if ready {
                LoadStatus::Idle
            } else {
                LoadStatus::CredentialRequired
            };
        });

        if !ready {
            info!(source = source_id, "switched catalog source, credential required");
            return Ok(LoadOutcome::CredentialRequired);
        }

        info!(source = source_id, "switched catalog source");
        Ok(self.load(true).await)
    }

    /// Reload after a failure.
    pub async fn retry(&self) -> Result<LoadOutcome> {
        self.expect_status(LoadStatus::Failed)?;
        Ok(self.load(true).await)
    }

    /// Finish the credential-entry flow for the active source.
    ///
    /// `Saved` loads the source if the credential is now usable. `Cancelled`
    /// reverts to the previously active source.
    pub async fn complete_credential_entry(&self, entry: CredentialEntry) -> Result<LoadOutcome> {
        let snapshot = self.snapshot();
        self.expect_status(LoadStatus::CredentialRequired)?;

        match entry {
            CredentialEntry::Saved => {
                let ready = self
                    .sources
                    .get(&snapshot.active_source_id)
                    .is_some_and(|s| s.credential_ready());
                if !ready {
                    debug!(source = %snapshot.active_source_id, "credential still missing");
                    return Ok(LoadOutcome::CredentialRequired);
                }

                self.state.send_if_modified(|state| {
                    if state.generation != snapshot.generation
                        || state.status != LoadStatus::CredentialRequired
                    {
                        return false;
                    }
                    state.status = LoadStatus::Idle;
                    true
                });
                Ok(self.load(true).await)
            }
            CredentialEntry::Cancelled => match snapshot.previous_source_id {
                Some(previous) => {
                    info!(source = %snapshot.active_source_id, reverted_to = %previous, "credential entry cancelled");
                    self.switch_source(&previous).await
                }
                None => Ok(LoadOutcome::CredentialRequired),
            },
        }
    }

    /// Run a credential prompt for the active source and apply its result.
    pub async fn request_credential(&self, prompt: &dyn CredentialPrompt) -> Result<LoadOutcome> {
        self.expect_status(LoadStatus::CredentialRequired)?;
        let source_id = self.active_source_id();
        let entry = prompt.request(&source_id).await;
        self.complete_credential_entry(entry).await
    }

    fn expect_status(&self, expected: LoadStatus) -> Result<()> {
        let actual = self.status();
        if actual == expected {
            Ok(())
        } else {
            Err(Error::InvalidState {
                expected: expected.to_string(),
                actual: actual.to_string(),
            })
        }
    }
}

impl fmt::Debug for CatalogController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogController")
            .field("sources", &self.source_ids())
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MockSource;
    use crate::types::RawModel;
    use std::time::Duration;

    fn mock(id: &str, models: &[&str]) -> Arc<MockSource> {
        Arc::new(
            MockSource::new()
                .with_id(id)
                .with_models(models.iter().map(|m| RawModel::new(*m)).collect())
                .with_delay(Duration::from_millis(50)),
        )
    }

    fn controller(initial: Arc<MockSource>) -> CatalogController {
        CatalogController::new(Arc::new(ProviderRegistry::builtin()), initial)
    }

    #[test]
    fn starts_idle_and_empty() {
        let controller = controller(mock("mock", &["a"]));
        assert_eq!(controller.status(), LoadStatus::Idle);
        assert!(controller.records().is_empty());
        assert!(controller.last_error().is_none());
        assert_eq!(controller.active_source_id(), "mock");
    }

    #[tokio::test(start_paused = true)]
    async fn load_transitions_to_ready() {
        let controller = controller(mock("mock", &["a", "b"]));
        let outcome = controller.load(false).await;

        assert_eq!(outcome, LoadOutcome::Loaded { count: 2 });
        assert_eq!(controller.status(), LoadStatus::Ready);
        assert_eq!(controller.records().len(), 2);
        assert_eq!(controller.records()[0].provider_id, "mock");
    }

    #[tokio::test(start_paused = true)]
    async fn unforced_load_when_ready_is_noop() {
        let source = mock("mock", &["a"]);
        let controller = controller(source.clone());
        controller.load(false).await;

        assert_eq!(controller.load(false).await, LoadOutcome::AlreadyLoaded);
        assert_eq!(source.fetch_count(), 1);

        assert_eq!(controller.load(true).await, LoadOutcome::Loaded { count: 1 });
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn first_failure_leaves_records_empty() {
        let source = Arc::new(MockSource::new().failing().with_delay(Duration::ZERO));
        let controller = controller(source);

        let outcome = controller.load(false).await;
        assert_eq!(outcome, LoadOutcome::Failed(SourceError::FetchFailed));
        assert_eq!(controller.status(), LoadStatus::Failed);
        assert_eq!(controller.last_error(), Some(SourceError::FetchFailed));
        assert!(controller.records().is_empty());
        assert_eq!(
            controller.snapshot().status_message().as_deref(),
            Some("Simulated fetch failure.")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn switch_to_unknown_source_errors() {
        let controller = controller(mock("mock", &["a"]));
        let err = controller.switch_source("nope").await.unwrap_err();
        assert!(matches!(err, Error::SourceNotFound(id) if id == "nope"));
        assert_eq!(controller.active_source_id(), "mock");
    }

    #[tokio::test(start_paused = true)]
    async fn switch_clears_and_reloads() {
        let controller = controller(mock("a", &["a1"])).with_source(mock("b", &["b1", "b2"]));
        controller.load(false).await;

        let outcome = controller.switch_source("b").await.unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded { count: 2 });

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.active_source_id(), "b");
        assert_eq!(snapshot.previous_source_id(), Some("a"));
        assert_eq!(snapshot.generation(), 1);
        assert_eq!(snapshot.records()[0].id, "b1");
    }

    #[tokio::test(start_paused = true)]
    async fn retry_only_from_failed() {
        let controller = controller(mock("mock", &["a"]));
        let err = controller.retry().await.unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState { ref expected, ref actual } if expected == "Failed" && actual == "Idle"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn complete_credential_entry_requires_substate() {
        let controller = controller(mock("mock", &["a"]));
        let err = controller
            .complete_credential_entry(CredentialEntry::Saved)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_transitions() {
        let controller = controller(mock("mock", &["a"]));
        let mut rx = controller.subscribe();
        assert_eq!(rx.borrow_and_update().status(), LoadStatus::Idle);

        controller.load(false).await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().status(), LoadStatus::Ready);
    }

    #[test]
    fn status_message_only_when_attention_needed() {
        let snapshot = CatalogSnapshot::new("mock".to_string());
        assert!(snapshot.status_message().is_none());
    }
}
