// ── Notifier ──
//
// Stores report outcomes as (message, severity) pairs. Presentation is
// the consumer's business: the CLI prints them, a GUI would show toasts.
// `NotificationCenter` keeps the live set with expiry for consumers that
// render a list; `TracingNotifier` just logs.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::model::{Notification, Severity};

/// Default lifetime of a notification.
pub const DEFAULT_TTL: Duration = Duration::from_millis(3000);

/// Receives user-facing outcome messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Logs notifications through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => error!(%severity, "{message}"),
            Severity::Warning => warn!(%severity, "{message}"),
            Severity::Success | Severity::Info => info!(%severity, "{message}"),
        }
    }
}

/// Holds the currently visible notifications.
///
/// Each notification is dropped after its ttl by a task on the ambient
/// tokio runtime; without a runtime they stay until dismissed or pruned.
pub struct NotificationCenter {
    ttl: Duration,
    active: Arc<watch::Sender<Arc<Vec<Notification>>>>,
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        let (active, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            ttl,
            active: Arc::new(active),
        }
    }

    /// Raise a notification with the default ttl. Returns its id.
    pub fn push(&self, message: &str, severity: Severity) -> Uuid {
        self.push_with_ttl(message, severity, self.ttl)
    }

    pub fn push_with_ttl(&self, message: &str, severity: Severity, ttl: Duration) -> Uuid {
        let notification = Notification::new(message, severity, ttl);
        let id = notification.id;
        self.active.send_modify(|list| {
            let mut next = list.as_ref().clone();
            next.push(notification);
            *list = Arc::new(next);
        });

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let active = Arc::clone(&self.active);
            handle.spawn(async move {
                tokio::time::sleep(ttl).await;
                remove(&active, id);
            });
        }
        id
    }

    /// Remove a notification before it expires. Unknown ids are ignored.
    pub fn dismiss(&self, id: Uuid) {
        remove(&self.active, id);
    }

    pub fn clear(&self) {
        self.active.send_if_modified(|list| {
            if list.is_empty() {
                return false;
            }
            *list = Arc::new(Vec::new());
            true
        });
    }

    /// Drop everything whose ttl has elapsed.
    pub fn prune_expired(&self) {
        let now = tokio::time::Instant::now();
        self.active.send_if_modified(|list| {
            if !list.iter().any(|n| n.is_expired(now)) {
                return false;
            }
            *list = Arc::new(list.iter().filter(|n| !n.is_expired(now)).cloned().collect());
            true
        });
    }

    /// Current snapshot, newest last.
    pub fn active(&self) -> Arc<Vec<Notification>> {
        self.active.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Notification>>> {
        self.active.subscribe()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl Notifier for NotificationCenter {
    fn notify(&self, message: &str, severity: Severity) {
        self.push(message, severity);
    }
}

fn remove(active: &watch::Sender<Arc<Vec<Notification>>>, id: Uuid) {
    active.send_if_modified(|list| {
        if !list.iter().any(|n| n.id == id) {
            return false;
        }
        *list = Arc::new(list.iter().filter(|n| n.id != id).cloned().collect());
        true
    });
}

/// Fan a notification out to several notifiers.
pub struct FanoutNotifier {
    targets: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new(targets: Vec<Arc<dyn Notifier>>) -> Self {
        Self { targets }
    }
}

impl Notifier for FanoutNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        for target in &self.targets {
            target.notify(message, severity);
        }
    }
}
