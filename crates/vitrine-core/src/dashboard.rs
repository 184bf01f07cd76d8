// ── Dashboard store ──

use std::sync::Arc;

use tokio::sync::watch;
use vitrine_api::{Activity, ApiClient, DashboardStats};

use crate::error::CoreError;
use crate::model::Severity;
use crate::notify::Notifier;

/// How many recent activities the dashboard keeps.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

pub struct DashboardStore {
    client: Arc<ApiClient>,
    notifier: Arc<dyn Notifier>,
    stats: watch::Sender<Arc<DashboardStats>>,
    activities: watch::Sender<Arc<Vec<Activity>>>,
    categories: watch::Sender<Arc<Vec<String>>>,
}

impl DashboardStore {
    pub fn new(client: Arc<ApiClient>, notifier: Arc<dyn Notifier>) -> Self {
        let (stats, _) = watch::channel(Arc::new(DashboardStats::default()));
        let (activities, _) = watch::channel(Arc::new(Vec::new()));
        let (categories, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            client,
            notifier,
            stats,
            activities,
            categories,
        }
    }

    pub fn stats(&self) -> Arc<DashboardStats> {
        self.stats.borrow().clone()
    }

    /// Most recent first, at most [`RECENT_ACTIVITY_LIMIT`].
    pub fn activities(&self) -> Arc<Vec<Activity>> {
        self.activities.borrow().clone()
    }

    pub fn categories(&self) -> Arc<Vec<String>> {
        self.categories.borrow().clone()
    }

    pub fn subscribe_stats(&self) -> watch::Receiver<Arc<DashboardStats>> {
        self.stats.subscribe()
    }

    pub async fn load_stats(&self) -> Result<(), CoreError> {
        let stats = self.client.dashboard_stats().await.map_err(|e| self.report(e))?;
        self.stats.send_replace(Arc::new(stats));
        Ok(())
    }

    pub async fn load_activities(&self) -> Result<(), CoreError> {
        let mut activities = self
            .client
            .dashboard_activities()
            .await
            .map_err(|e| self.report(e))?;
        activities.truncate(RECENT_ACTIVITY_LIMIT);
        self.activities.send_replace(Arc::new(activities));
        Ok(())
    }

    pub async fn load_categories(&self) -> Result<(), CoreError> {
        let categories = self.client.categories().await.map_err(|e| self.report(e))?;
        self.categories.send_replace(Arc::new(categories));
        Ok(())
    }

    /// Load all three concurrently; the first failure is returned.
    pub async fn load_all(&self) -> Result<(), CoreError> {
        tokio::try_join!(self.load_stats(), self.load_activities(), self.load_categories())?;
        Ok(())
    }

    fn report(&self, err: vitrine_api::Error) -> CoreError {
        let err = CoreError::from(err);
        self.notifier.notify(err.user_message(), Severity::Error);
        err
    }
}
