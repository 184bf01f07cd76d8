// ── Entity store ──
//
// The authoritative in-memory collection for one entity kind, plus the
// filter contract and busy flag. Every mutation goes service call →
// full reload; nothing is patched locally.

mod collection;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::watch;
use tracing::debug;
use vitrine_api::{EntityId, Resource};

use crate::catalog::{Catalogable, UNCATEGORIZED};
use crate::error::CoreError;
use crate::model::{DataSource, Filter, FilterPatch, Severity};
use crate::notify::Notifier;
use crate::service::{Draft, Patch, ResourceService};
use crate::validation::Validate;

pub use collection::Snapshot;
use collection::EntityCollection;

/// Store for one entity kind backed by a [`ResourceService`].
pub struct EntityStore<S: ResourceService> {
    service: S,
    notifier: Arc<dyn Notifier>,
    collection: EntityCollection<S::Entity>,
    filter: watch::Sender<Filter>,
    current: watch::Sender<Option<S::Entity>>,
    busy: BusyFlag,
    /// Incremented per load; a response is applied only if it still
    /// belongs to the latest load issued.
    generation: AtomicU64,
}

impl<S: ResourceService> EntityStore<S> {
    pub fn new(service: S, notifier: Arc<dyn Notifier>) -> Self {
        let (filter, _) = watch::channel(Filter::default());
        let (current, _) = watch::channel(None);
        Self {
            service,
            notifier,
            collection: EntityCollection::new(),
            filter,
            current,
            busy: BusyFlag::new(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<Snapshot<S::Entity>> {
        self.collection.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot<S::Entity>>> {
        self.collection.subscribe()
    }

    pub fn items(&self) -> Vec<S::Entity> {
        self.snapshot().items.clone()
    }

    pub fn total(&self) -> u64 {
        self.snapshot().total
    }

    pub fn source(&self) -> DataSource {
        self.snapshot().source
    }

    pub fn filter(&self) -> Filter {
        self.filter.borrow().clone()
    }

    pub fn subscribe_filter(&self) -> watch::Receiver<Filter> {
        self.filter.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    pub fn subscribe_busy(&self) -> watch::Receiver<bool> {
        self.busy.subscribe()
    }

    pub fn current(&self) -> Option<S::Entity> {
        self.current.borrow().clone()
    }

    /// Whether the service has fallen back to the built-in dataset this session.
    pub fn is_degraded(&self) -> bool {
        self.service.is_degraded()
    }

    // ── Derived views ────────────────────────────────────────────────

    pub fn active(&self) -> Vec<S::Entity> {
        self.snapshot()
            .items
            .iter()
            .filter(|e| e.is_active())
            .cloned()
            .collect()
    }

    pub fn inactive(&self) -> Vec<S::Entity> {
        self.snapshot()
            .items
            .iter()
            .filter(|e| !e.is_active())
            .cloned()
            .collect()
    }

    /// Items grouped by category; blank categories group under "Outros".
    pub fn by_category(&self) -> BTreeMap<String, Vec<S::Entity>> {
        let mut groups: BTreeMap<String, Vec<S::Entity>> = BTreeMap::new();
        for entity in &self.snapshot().items {
            let category = entity.category().trim();
            let key = if category.is_empty() { UNCATEGORIZED } else { category };
            groups.entry(key.to_owned()).or_default().push(entity.clone());
        }
        groups
    }

    // ── Filter ───────────────────────────────────────────────────────

    /// Merge `patch` into the filter. Does not reload.
    pub fn set_filter(&self, patch: FilterPatch) {
        self.filter.send_modify(|filter| filter.merge(patch));
    }

    /// Restore the default filter. Does not reload.
    pub fn reset_filter(&self) {
        self.filter.send_replace(Filter::default());
    }

    // ── Current entity ───────────────────────────────────────────────

    pub fn set_current(&self, entity: Option<S::Entity>) {
        self.current.send_replace(entity);
    }

    pub fn clear_current(&self) {
        self.current.send_replace(None);
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Fetch the collection for the current filter and swap it in.
    ///
    /// A response (or failure) that arrives after a newer load was issued
    /// is dropped without notifying.
    pub async fn load(&self) -> Result<(), CoreError> {
        let _busy = self.busy.enter();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let filter = self.filter();

        let outcome = self.service.list(&filter).await;
        if self.generation.load(Ordering::Acquire) != generation {
            debug!(
                resource = <S::Entity as Resource>::LABEL,
                generation,
                failed = outcome.is_err(),
                "discarding superseded load"
            );
            return Ok(());
        }
        match outcome {
            Ok(result) => {
                let source = result.source;
                let previous = self.collection.replace(result);
                self.announce_source_change(previous, source);
                Ok(())
            }
            Err(err) => {
                self.notifier.notify(err.user_message(), Severity::Error);
                Err(err)
            }
        }
    }

    /// Fetch one entity into the `current` slot.
    pub async fn fetch(&self, id: &EntityId) -> Result<S::Entity, CoreError> {
        let _busy = self.busy.enter();
        match self.service.get(id).await {
            Ok(entity) => {
                self.current.send_replace(Some(entity.clone()));
                Ok(entity)
            }
            Err(err) => Err(self.report(err)),
        }
    }

    /// Validate, create, then reload.
    pub async fn create(&self, draft: &Draft<S>) -> Result<Option<S::Entity>, CoreError> {
        draft.validate().map_err(|e| self.report(e))?;
        let _busy = self.busy.enter();
        let created = self.service.create(draft).await.map_err(|e| self.report(e))?;
        self.load().await?;
        self.success("created successfully");
        Ok(created)
    }

    /// Validate, update, then reload.
    pub async fn update(
        &self,
        id: &EntityId,
        patch: &Patch<S>,
    ) -> Result<Option<S::Entity>, CoreError> {
        patch.validate().map_err(|e| self.report(e))?;
        let _busy = self.busy.enter();
        let updated = self
            .service
            .update(id, patch)
            .await
            .map_err(|e| self.report(e))?;
        self.load().await?;
        self.success("updated successfully");
        Ok(updated)
    }

    /// Delete, then reload.
    pub async fn delete(&self, id: &EntityId) -> Result<(), CoreError> {
        let _busy = self.busy.enter();
        self.service.delete(id).await.map_err(|e| self.report(e))?;
        if self
            .current
            .borrow()
            .as_ref()
            .is_some_and(|current| current.id() == id)
        {
            self.current.send_replace(None);
        }
        self.load().await?;
        self.success("deleted successfully");
        Ok(())
    }

    /// Flip the `ativo` flag, then reload.
    pub async fn set_active(&self, id: &EntityId, active: bool) -> Result<(), CoreError> {
        let _busy = self.busy.enter();
        self.service
            .toggle_active(id, active)
            .await
            .map_err(|e| self.report(e))?;
        self.load().await?;
        self.success(if active { "activated" } else { "deactivated" });
        Ok(())
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Notify an error and hand it back for propagation.
    fn report(&self, err: CoreError) -> CoreError {
        self.notifier.notify(err.user_message(), Severity::Error);
        err
    }

    fn success(&self, what: &str) {
        let label = <S::Entity as Resource>::LABEL;
        self.notifier
            .notify(&format!("{label} {what}"), Severity::Success);
    }

    fn announce_source_change(&self, previous: DataSource, now: DataSource) {
        match (previous, now) {
            (DataSource::Live, DataSource::Fallback) => self.notifier.notify(
                "Backend unreachable: showing built-in sample data",
                Severity::Warning,
            ),
            (DataSource::Fallback, DataSource::Live) => {
                self.notifier.notify("Connection restored", Severity::Info);
            }
            _ => {}
        }
    }
}

// ── Busy flag ───────────────────────────────────────────────────────

/// Counts in-flight operations; observers see `true` while any run.
struct BusyFlag {
    in_flight: AtomicUsize,
    state: watch::Sender<bool>,
}

impl BusyFlag {
    fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            in_flight: AtomicUsize::new(0),
            state,
        }
    }

    fn enter(&self) -> BusyGuard<'_> {
        if self.in_flight.fetch_add(1, Ordering::AcqRel) == 0 {
            self.state.send_replace(true);
        }
        BusyGuard { flag: self }
    }

    fn get(&self) -> bool {
        *self.state.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}

struct BusyGuard<'a> {
    flag: &'a BusyFlag,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if self.flag.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.flag.state.send_replace(false);
        }
    }
}
