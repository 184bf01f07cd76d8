// ── Resource services ──
//
// Typed CRUD per entity kind. The HTTP implementation adds the client-side
// price range to live results and, when configured with a fallback
// dataset, serves it through the pipeline while the backend is down.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};
use vitrine_api::{ApiClient, EntityId, Resource};

use crate::catalog::Catalogable;
use crate::error::CoreError;
use crate::model::{CollectionResult, DataSource, Filter};
use crate::pipeline;

pub type Draft<S> = <<S as ResourceService>::Entity as Resource>::Draft;
pub type Patch<S> = <<S as ResourceService>::Entity as Resource>::Patch;

/// CRUD for one entity kind, as seen by an entity store.
pub trait ResourceService: Send + Sync + 'static {
    type Entity: Catalogable;

    fn list(
        &self,
        filter: &Filter,
    ) -> impl Future<Output = Result<CollectionResult<Self::Entity>, CoreError>> + Send;

    fn get(&self, id: &EntityId) -> impl Future<Output = Result<Self::Entity, CoreError>> + Send;

    /// Returns the created entity when the backend echoes it.
    fn create(
        &self,
        draft: &Draft<Self>,
    ) -> impl Future<Output = Result<Option<Self::Entity>, CoreError>> + Send;

    fn update(
        &self,
        id: &EntityId,
        patch: &Patch<Self>,
    ) -> impl Future<Output = Result<Option<Self::Entity>, CoreError>> + Send;

    fn delete(&self, id: &EntityId) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Equivalent to `update(id, { ativo })`.
    fn toggle_active(
        &self,
        id: &EntityId,
        active: bool,
    ) -> impl Future<Output = Result<Option<Self::Entity>, CoreError>> + Send {
        let patch = Self::Entity::toggle_patch(active);
        async move { self.update(id, &patch).await }
    }

    /// Whether any list call this session was served from the fallback.
    fn is_degraded(&self) -> bool {
        false
    }
}

/// [`ResourceService`] over the HTTP backend.
pub struct HttpCatalogService<E> {
    client: Arc<ApiClient>,
    fallback: Option<Vec<E>>,
    /// Latched for the session once any list was served from `fallback`.
    degraded: AtomicBool,
    /// Whether the most recent list was served from `fallback`.
    serving_fallback: AtomicBool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Catalogable> HttpCatalogService<E> {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            fallback: None,
            degraded: AtomicBool::new(false),
            serving_fallback: AtomicBool::new(false),
            _entity: PhantomData,
        }
    }

    /// Serve `dataset` from `list` whenever the backend is unreachable.
    pub fn with_fallback(mut self, dataset: Vec<E>) -> Self {
        self.fallback = Some(dataset);
        self
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    fn serve_fallback(&self, dataset: &[E], filter: &Filter) -> CollectionResult<E> {
        self.degraded.store(true, Ordering::Release);
        if !self.serving_fallback.swap(true, Ordering::AcqRel) {
            warn!(resource = E::LABEL, "backend unreachable, serving built-in dataset");
        }
        let items = pipeline::apply(dataset, filter);
        CollectionResult {
            total: u64::try_from(items.len()).unwrap_or(u64::MAX),
            items,
            source: DataSource::Fallback,
        }
    }
}

impl<E: Catalogable> ResourceService for HttpCatalogService<E> {
    type Entity = E;

    async fn list(&self, filter: &Filter) -> Result<CollectionResult<E>, CoreError> {
        match self.client.list::<E>(&filter.to_query()).await {
            Ok(listing) => {
                let fetched = listing.items.len();
                let items = pipeline::by_price_range(listing.items, filter.min_price, filter.max_price);
                let dropped = u64::try_from(fetched - items.len()).unwrap_or(0);
                if self.serving_fallback.swap(false, Ordering::AcqRel) {
                    info!(resource = E::LABEL, "backend reachable again");
                }
                Ok(CollectionResult {
                    items,
                    total: listing.total.saturating_sub(dropped),
                    source: DataSource::Live,
                })
            }
            Err(err) if err.is_unreachable() => match &self.fallback {
                Some(dataset) => Ok(self.serve_fallback(dataset, filter)),
                None => Err(err.into()),
            },
            Err(err) => Err(err.into()),
        }
    }

    async fn get(&self, id: &EntityId) -> Result<E, CoreError> {
        Ok(self.client.fetch::<E>(id).await?)
    }

    async fn create(&self, draft: &E::Draft) -> Result<Option<E>, CoreError> {
        Ok(self.client.create::<E>(draft).await?)
    }

    async fn update(&self, id: &EntityId, patch: &E::Patch) -> Result<Option<E>, CoreError> {
        Ok(self.client.update::<E>(id, patch).await?)
    }

    async fn delete(&self, id: &EntityId) -> Result<(), CoreError> {
        Ok(self.client.remove::<E>(id).await?)
    }

    fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Acquire)
    }
}
