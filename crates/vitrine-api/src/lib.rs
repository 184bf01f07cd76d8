// vitrine-api: Async Rust client for the vitrine catalog backend

pub mod auth;
pub mod catalog;
pub mod client;
pub mod credentials;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::LoginOutcome;
pub use catalog::{ListQuery, Listing, SortDirection, normalize_listing, unwrap_entity};
pub use client::{ApiClient, AuthState};
pub use credentials::{
    CredentialStore, FileStorage, KeyValueStore, MemoryStorage, THEME_KEY, TOKEN_KEY, USER_KEY,
};
pub use error::{Error, ErrorKind};
pub use models::{
    Activity, Car, CarDraft, CarPatch, CategoryCount, DashboardStats, EntityId, Product,
    ProductDraft, ProductPatch, ProfilePatch, Resource, UserProfile,
};
pub use transport::{DEFAULT_TIMEOUT, TransportConfig};
