//! Data layer between `vitrine-api` and front ends.
//!
//! - **[`EntityStore`]**: authoritative in-memory collection per entity
//!   kind with a mergeable [`Filter`], a busy flag and a mutate-then-reload
//!   protocol. Snapshots are published through `tokio::sync::watch`.
//!
//! - **[`ResourceService`]**: typed CRUD per entity kind.
//!   [`HttpCatalogService`] talks to the backend and can fall back to a
//!   built-in dataset while it is unreachable.
//!
//! - **[`pipeline`]**: pure text → category → range → sort functions.
//!
//! - **[`Session`]**: builds transport, credentials, stores and notifier
//!   from a [`SessionConfig`].

pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod error;
pub mod fallback;
pub mod model;
pub mod notify;
pub mod pipeline;
pub mod preferences;
pub mod service;
pub mod session;
pub mod store;
pub mod validation;

// ── Primary re-exports ──────────────────────────────────────────────
pub use auth::AuthStore;
pub use catalog::{Catalogable, SortKey, StockLevel};
pub use dashboard::DashboardStore;
pub use error::CoreError;
pub use model::{
    CollectionResult, DataSource, Filter, FilterPatch, Notification, Severity, SortPreset, Theme,
};
pub use notify::{FanoutNotifier, NotificationCenter, Notifier, TracingNotifier};
pub use preferences::Preferences;
pub use service::{HttpCatalogService, ResourceService};
pub use session::{CarStore, ProductStore, Session, SessionConfig};
pub use store::{EntityStore, Snapshot};
pub use validation::Validate;

// Wire types, re-exported so front ends only depend on this crate.
pub use vitrine_api::Error as ApiError;
pub use vitrine_api::{
    Activity, AuthState, Car, CarDraft, CarPatch, CategoryCount, DashboardStats, EntityId,
    ErrorKind, FileStorage, KeyValueStore, MemoryStorage, Product, ProductDraft, ProductPatch,
    ProfilePatch, Resource, SortDirection, UserProfile,
};
