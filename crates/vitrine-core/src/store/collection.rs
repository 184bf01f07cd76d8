// ── Reactive entity collection ──
//
// Holds the authoritative list for one entity kind as an immutable
// snapshot behind a `watch` channel. A load replaces the whole snapshot
// in one send, so readers never observe items from one response paired
// with the total of another.

use std::sync::Arc;

use tokio::sync::watch;

use crate::model::{CollectionResult, DataSource};

/// One consistent view of a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub source: DataSource,
    /// Bumped on every replace; 0 means never loaded.
    pub version: u64,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            source: DataSource::Live,
            version: 0,
        }
    }
}

pub(crate) struct EntityCollection<T: Clone + Send + Sync + 'static> {
    snapshot: watch::Sender<Arc<Snapshot<T>>>,
}

impl<T: Clone + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::default()));
        Self { snapshot }
    }

    /// Swap in a freshly loaded result. Returns the source it replaced.
    pub(crate) fn replace(&self, result: CollectionResult<T>) -> DataSource {
        let mut previous = DataSource::Live;
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| {
            previous = snap.source;
            *snap = Arc::new(Snapshot {
                items: result.items,
                total: result.total,
                source: result.source,
                version: snap.version + 1,
            });
        });
        previous
    }

    /// Current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Snapshot<T>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Snapshot<T>>> {
        self.snapshot.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(items: &[&str], source: DataSource) -> CollectionResult<String> {
        CollectionResult {
            items: items.iter().map(|s| (*s).to_owned()).collect(),
            total: u64::try_from(items.len()).unwrap_or(0),
            source,
        }
    }

    #[test]
    fn starts_empty_and_unloaded() {
        let col: EntityCollection<String> = EntityCollection::new();
        let snap = col.snapshot();
        assert!(snap.items.is_empty());
        assert_eq!(snap.version, 0);
    }

    #[test]
    fn replace_swaps_items_and_total_together() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.replace(result(&["a", "b"], DataSource::Live));
        let before = col.snapshot();

        col.replace(result(&["c"], DataSource::Live));
        let after = col.snapshot();

        assert_eq!((before.items.len(), before.total), (2, 2));
        assert_eq!((after.items.len(), after.total), (1, 1));
        assert_eq!(after.version, 2);
    }

    #[test]
    fn replace_reports_previous_source() {
        let col: EntityCollection<String> = EntityCollection::new();
        assert_eq!(col.replace(result(&[], DataSource::Fallback)), DataSource::Live);
        assert_eq!(col.replace(result(&[], DataSource::Live)), DataSource::Fallback);
    }

    #[test]
    fn subscribers_see_replacements() {
        let col: EntityCollection<String> = EntityCollection::new();
        let mut rx = col.subscribe();
        col.replace(result(&["x"], DataSource::Live));
        assert!(rx.has_changed().unwrap_or(false));
        assert_eq!(rx.borrow_and_update().items, vec!["x".to_owned()]);
    }
}
