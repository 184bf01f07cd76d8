// ── Session context ──
//
// Everything one process needs to talk to the backend: transport,
// credentials, stores and notifier, built once from a `SessionConfig`
// and passed around by reference.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use url::Url;
use vitrine_api::{
    ApiClient, Car, CredentialStore, DEFAULT_TIMEOUT, KeyValueStore, Product, TransportConfig,
};

use crate::auth::AuthStore;
use crate::dashboard::DashboardStore;
use crate::error::CoreError;
use crate::fallback::{sample_cars, sample_products};
use crate::notify::{DEFAULT_TTL, FanoutNotifier, NotificationCenter, Notifier, TracingNotifier};
use crate::preferences::Preferences;
use crate::service::HttpCatalogService;
use crate::store::EntityStore;

pub type ProductStore = EntityStore<HttpCatalogService<Product>>;
pub type CarStore = EntityStore<HttpCatalogService<Car>>;

/// Runtime settings the core needs. File and env handling live in
/// `vitrine-config`; this is the already-resolved result.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub api_url: Url,
    pub timeout: Duration,
    /// Serve the built-in dataset from `list` when the backend is unreachable.
    pub fallback_enabled: bool,
    pub notification_ttl: Duration,
}

impl SessionConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            timeout: DEFAULT_TIMEOUT,
            fallback_enabled: false,
            notification_ttl: DEFAULT_TTL,
        }
    }
}

pub struct Session {
    client: Arc<ApiClient>,
    notifications: Arc<NotificationCenter>,
    pub products: ProductStore,
    pub cars: CarStore,
    pub auth: AuthStore,
    pub dashboard: DashboardStore,
    pub preferences: Preferences,
}

impl Session {
    /// Build a session whose notifications go to the notification center
    /// and to the log.
    pub fn new(config: &SessionConfig, storage: Arc<dyn KeyValueStore>) -> Result<Self, CoreError> {
        Self::with_notifier(config, storage, Arc::new(TracingNotifier))
    }

    /// Build a session that additionally reports to `notifier`.
    pub fn with_notifier(
        config: &SessionConfig,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let credentials = CredentialStore::new(Arc::clone(&storage));
        let client = Arc::new(ApiClient::new(config.api_url.clone(), &transport, credentials)?);

        let notifications = Arc::new(NotificationCenter::new(config.notification_ttl));
        let center: Arc<dyn Notifier> = Arc::clone(&notifications) as Arc<dyn Notifier>;
        let notifier: Arc<dyn Notifier> = Arc::new(FanoutNotifier::new(vec![center, notifier]));

        let mut products = HttpCatalogService::new(Arc::clone(&client));
        let mut cars = HttpCatalogService::new(Arc::clone(&client));
        if config.fallback_enabled {
            products = products.with_fallback(sample_products());
            cars = cars.with_fallback(sample_cars());
        }
        debug!(
            api_url = %config.api_url,
            fallback = config.fallback_enabled,
            "session created"
        );

        Ok(Self {
            products: EntityStore::new(products, Arc::clone(&notifier)),
            cars: EntityStore::new(cars, Arc::clone(&notifier)),
            auth: AuthStore::new(Arc::clone(&client), Arc::clone(&notifier)),
            dashboard: DashboardStore::new(Arc::clone(&client), Arc::clone(&notifier)),
            preferences: Preferences::load(storage),
            client,
            notifications,
        })
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Whether either catalog has been served from the built-in dataset.
    pub fn is_degraded(&self) -> bool {
        self.products.is_degraded() || self.cars.is_degraded()
    }
}
